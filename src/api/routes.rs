use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use super::{events, handlers, middleware::admin_auth};
use crate::state::AppState;

pub fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/stats",
            get(handlers::stats_handler)
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
        .route(
            "/admin/disconnect",
            post(handlers::disconnect_handler)
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
        .route(
            "/events/notifications",
            post(events::notify_handler)
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
        .route(
            "/events/loans",
            post(events::loan_event_handler)
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
}
