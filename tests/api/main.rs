//! API integration test suite.
//!
//! Drives the full route table in-process. OAuth tests talk to a mock
//! provider on an ephemeral port, so no network access is needed.
//!
//! Run with: cargo test --test api

mod mock_provider;
mod test_helpers;

mod test_oauth_routes;
mod test_public_routes;
