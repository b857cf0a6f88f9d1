use crate::state::AppState;
use axum::Router;

pub mod cancel;
mod dto;
pub mod handlers;
mod images;
pub mod services;
pub mod view;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::view_routes())
        .merge(handlers::capture_routes())
}
