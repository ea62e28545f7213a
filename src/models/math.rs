//! Math endpoint models.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::MathOperation;

/// Operands passed as `?A=<float>&B=<float>`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OperandsQuery {
    /// First operand
    #[serde(rename = "A")]
    pub a: f64,
    /// Second operand
    #[serde(rename = "B")]
    pub b: f64,
}

/// Result of a math operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MathResult {
    pub operation: String,
    pub a: f64,
    pub b: f64,
    pub result: f64,
}

impl MathResult {
    pub fn new(operation: MathOperation, operands: OperandsQuery, result: f64) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            a: operands.a,
            b: operands.b,
            result,
        }
    }
}
