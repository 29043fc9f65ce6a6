//! Route definitions for the `/questions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::question;
use crate::state::AppState;

/// Routes mounted at `/questions`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /section/{section}/test/{test_id}  -> list_by_section_and_test
/// GET    /test/{test_id}                    -> list_by_test
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// PATCH  /{id}                              -> patch
/// DELETE /{id}                              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(question::list).post(question::create))
        .route(
            "/section/{section}/test/{test_id}",
            get(question::list_by_section_and_test),
        )
        .route("/test/{test_id}", get(question::list_by_test))
        .route(
            "/{id}",
            get(question::get_by_id)
                .put(question::update)
                .patch(question::patch)
                .delete(question::delete),
        )
}
