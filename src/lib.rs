//! Math API server library.
//!
//! Arithmetic endpoints guarded by either a static API key or a bearer token
//! issued after an OAuth login, plus the OAuth login endpoints themselves.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
