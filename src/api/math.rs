//! Arithmetic endpoints. Every route requires the `admin` or `user` role.

use actix_web::{HttpResponse, get, web};
use tracing::debug;

use crate::auth::{CurrentIdentity, RequireAuth};
use crate::error::AppResult;
use crate::models::{MathResult, OperandsQuery};
use crate::services::MathOperation;

/// Roles admitted to `/math`.
pub const MATH_ROLES: [&str; 2] = ["admin", "user"];

/// Configure math routes behind authentication.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/math")
            .wrap(RequireAuth::roles(MATH_ROLES))
            .service(add)
            .service(subtract)
            .service(multiply)
            .service(divide),
    );
}

fn calculate(
    operation: MathOperation,
    operands: OperandsQuery,
    caller: &CurrentIdentity,
) -> AppResult<HttpResponse> {
    debug!(
        user = %caller.subject,
        auth_type = caller.auth_type.as_str(),
        "User {} requesting {} operation",
        caller.subject,
        operation
    );
    let result = operation.apply(operands.a, operands.b)?;
    Ok(HttpResponse::Ok().json(MathResult::new(operation, operands, result)))
}

/// Add two numbers.
#[utoipa::path(
    get,
    path = "/math/add",
    tag = "Math",
    params(OperandsQuery),
    responses(
        (status = 200, description = "Sum of A and B", body = MathResult),
        (status = 307, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller lacks a permitted role")
    ),
    security(("bearer" = []))
)]
#[get("/add")]
pub async fn add(
    query: web::Query<OperandsQuery>,
    caller: CurrentIdentity,
) -> AppResult<HttpResponse> {
    calculate(MathOperation::Add, query.into_inner(), &caller)
}

/// Subtract B from A.
#[utoipa::path(
    get,
    path = "/math/subtract",
    tag = "Math",
    params(OperandsQuery),
    responses(
        (status = 200, description = "Difference of A and B", body = MathResult),
        (status = 307, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller lacks a permitted role")
    ),
    security(("bearer" = []))
)]
#[get("/subtract")]
pub async fn subtract(
    query: web::Query<OperandsQuery>,
    caller: CurrentIdentity,
) -> AppResult<HttpResponse> {
    calculate(MathOperation::Subtract, query.into_inner(), &caller)
}

/// Multiply two numbers.
#[utoipa::path(
    get,
    path = "/math/multiply",
    tag = "Math",
    params(OperandsQuery),
    responses(
        (status = 200, description = "Product of A and B", body = MathResult),
        (status = 307, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller lacks a permitted role")
    ),
    security(("bearer" = []))
)]
#[get("/multiply")]
pub async fn multiply(
    query: web::Query<OperandsQuery>,
    caller: CurrentIdentity,
) -> AppResult<HttpResponse> {
    calculate(MathOperation::Multiply, query.into_inner(), &caller)
}

/// Divide A by B.
///
/// A zero divisor yields 500 `DIVIDE_BY_ZERO`.
#[utoipa::path(
    get,
    path = "/math/divide",
    tag = "Math",
    params(OperandsQuery),
    responses(
        (status = 200, description = "Quotient of A and B", body = MathResult),
        (status = 307, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller lacks a permitted role"),
        (status = 500, description = "B is zero", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[get("/divide")]
pub async fn divide(
    query: web::Query<OperandsQuery>,
    caller: CurrentIdentity,
) -> AppResult<HttpResponse> {
    calculate(MathOperation::Divide, query.into_inner(), &caller)
}
