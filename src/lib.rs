// src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc};

/// Monta o router completo da API.
pub fn app(app_state: AppState) -> Router {
    let sales_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales_by_client),
        )
        .route("/range", get(handlers::sales::list_sales_range))
        .route("/{sale_id}/receivables", get(handlers::sales::list_sale_receivables));

    let client_routes = Router::new()
        .route("/", post(handlers::catalog::create_client))
        .route("/{client_id}", get(handlers::catalog::get_client))
        .route("/{client_id}/memberships", get(handlers::memberships::list_memberships))
        .route(
            "/{client_id}/memberships/{membership_id}/suspend",
            post(handlers::memberships::suspend_membership),
        )
        .route(
            "/{client_id}/memberships/{membership_id}/adjust-days",
            post(handlers::memberships::adjust_membership_days),
        )
        .route(
            "/{client_id}/memberships/{membership_id}/cancel",
            post(handlers::memberships::cancel_membership),
        )
        .route(
            "/{client_id}/memberships/{membership_id}/suspensions",
            get(handlers::memberships::list_suspensions),
        )
        .route(
            "/{client_id}/memberships/{membership_id}/adjustments",
            get(handlers::memberships::list_adjustments),
        );

    let catalog_routes = Router::new()
        .route(
            "/acquirers",
            post(handlers::catalog::create_acquirer).get(handlers::catalog::list_acquirers),
        )
        .route(
            "/contracts",
            post(handlers::catalog::create_contract).get(handlers::catalog::list_contracts),
        );

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/sales", sales_routes)
        .nest("/api/clients", client_routes)
        .nest("/api", catalog_routes)
        .with_state(app_state)
}
