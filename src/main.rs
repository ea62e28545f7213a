//! Math API server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};

use math_api_lib::api;
use math_api_lib::auth::Authenticator;
use math_api_lib::config::Settings;
use math_api_lib::logging::LoggingConfig;
use math_api_lib::middleware::{self, RequestLogger};
use math_api_lib::services::{OAuthClient, oauth_provider};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let logging = match LoggingConfig::load(&settings.log_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}; using console logging only");
            LoggingConfig::default()
        }
    }
    .with_levels(&settings.log_level_console, &settings.log_level_file);

    let _log_guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  {}", settings.app_name);
    info!("  OAuth provider: {}", settings.oauth.provider);
    info!("========================================");

    for warning in settings.insecure_settings() {
        warn!("{}", warning);
    }

    let provider = match oauth_provider::provider_config(&settings.oauth.provider) {
        Ok(provider) => provider,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let oauth_client = match OAuthClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let authenticator = Authenticator::from_settings(&settings);
    info!("Loaded {} API keys", settings.api_keys.len());

    let bind_address = settings.bind_address();
    let cors_origins = settings.cors_allow_origins.clone();
    let static_dir = settings.static_dir.clone();
    let worker_count = num_cpus::get();

    if static_dir.is_dir() {
        info!("Serving static files from {}", static_dir.display());
    } else {
        warn!(
            "Static directory {} not found; landing page disabled",
            static_dir.display()
        );
    }

    let settings = web::Data::new(settings);
    let authenticator = web::Data::new(authenticator);
    let provider = web::Data::new(provider);
    let oauth_client = web::Data::new(oauth_client);

    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    HttpServer::new(move || {
        let mut app = App::new()
            // CORS must wrap outermost so preflight requests skip auth
            .wrap(RequestLogger)
            .wrap(middleware::build_cors(&cors_origins))
            .app_data(settings.clone())
            .app_data(authenticator.clone())
            .app_data(provider.clone())
            .app_data(oauth_client.clone())
            .configure(api::configure_routes);

        if let Some(files) = api::landing::static_files(&static_dir) {
            app = app.service(files);
        }

        app
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
