mod dto;
pub mod filters;
pub mod handlers;
pub mod repo_types;
pub mod services;
pub mod totals;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::expenses_routes())
        .merge(handlers::totals_routes())
}
