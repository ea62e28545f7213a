//! Arithmetic operations exposed under `/math`.

use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Apply the operation to `a` and `b`.
    pub fn apply(&self, a: f64, b: f64) -> AppResult<f64> {
        match self {
            Self::Add => Ok(add(a, b)),
            Self::Subtract => Ok(subtract(a, b)),
            Self::Multiply => Ok(multiply(a, b)),
            Self::Divide => divide(a, b),
        }
    }
}

impl std::fmt::Display for MathOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn add(a: f64, b: f64) -> f64 {
    let result = a + b;
    debug!("Adding {} + {} = {}", a, b, result);
    result
}

pub fn subtract(a: f64, b: f64) -> f64 {
    let result = a - b;
    debug!("Subtracting {} - {} = {}", a, b, result);
    result
}

pub fn multiply(a: f64, b: f64) -> f64 {
    let result = a * b;
    debug!("Multiplying {} * {} = {}", a, b, result);
    result
}

/// Divide `a` by `b`. Fails only when `b` is exactly zero.
pub fn divide(a: f64, b: f64) -> AppResult<f64> {
    if b == 0.0 {
        return Err(AppError::DivideByZero);
    }
    let result = a / b;
    debug!("Dividing {} / {} = {}", a, b, result);
    Ok(result)
}
