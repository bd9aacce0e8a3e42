//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

#[cfg(debug_assertions)]
use snapbeam::ApiDoc;
use snapbeam::inbound::http::health::HealthState;
use snapbeam::inbound::http::state::HttpState;
use snapbeam::inbound::http::{configure, json_config, not_found, query_config};
use snapbeam::{Cors, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::build_http_state;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;
    let body_limit = http_state.max_upload_bytes;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config(body_limit))
        .app_data(query_config())
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(not_found))
        .wrap(Cors)
        .wrap(Trace)
}

/// Open the configured stores and bind the HTTP server.
///
/// # Errors
/// Fails when a store cannot be opened or the listener cannot bind.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> Result<Server> {
    let http_state = build_http_state(&config)
        .await
        .wrap_err("failed to initialise stores")?;
    let server_health_state = health_state.clone();
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?
    .run();

    info!(%bind_addr, "snapbeam listening");
    health_state.mark_ready();
    Ok(server)
}
