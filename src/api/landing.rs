//! Landing page: `/` redirects to the static login page under `/static`.

use std::path::Path;

use actix_files::Files;
use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

/// Landing page path.
pub const LANDING_PAGE: &str = "/static/index.html";

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, LANDING_PAGE))
        .finish()
}

/// Configure the root redirect.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(root);
}

/// File service for `/static`, or `None` when `dir` does not exist.
pub fn static_files(dir: &Path) -> Option<Files> {
    if !dir.is_dir() {
        return None;
    }
    Some(
        Files::new("/static", dir)
            .index_file("index.html")
            .prefer_utf8(true),
    )
}
