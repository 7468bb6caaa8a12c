use actix_web::{web, App, HttpServer};
use quiz_backend::config::Config;
use quiz_backend::infra::state::build_state;
use quiz_backend::middleware::cors::cors_middleware;
use quiz_backend::middleware::request_trace::RequestTrace;
use quiz_backend::middleware::structured_logger::StructuredLogger;
use quiz_backend::routes;
use quiz_backend::services::catalog;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let mut builder = build_state()
        .with_db(config.db.clone())
        .with_scheduler(config.scheduler.clone());

    if let Some(path) = &config.catalog_path {
        match catalog::load_from_path(path).await {
            Ok(loaded) => builder = builder.with_catalog(loaded),
            Err(e) => {
                error!(error = %e, "failed to load catalog");
                std::process::exit(1);
            }
        }
    }

    let app_state = match builder.build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(host = %config.host, port = config.port, "starting quiz backend");
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
