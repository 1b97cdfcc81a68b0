// Export route modules
pub mod messages;
pub mod stream;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(messages::routes())
        .merge(stream::routes(state))
}
