pub mod health;
pub mod question;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /questions                                        list, create
/// /questions/section/{section}/test/{test_id}       list by section and test
/// /questions/test/{test_id}                         list by test
/// /questions/{id}                                   get, full update, partial update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/questions", question::router())
}
