//! Handlers for the `/questions` resource.
//!
//! Writes that touch a question's image stage the storage change first
//! (upload) without holding a connection, then write the row inside a
//! transaction holding the row lock. The image read under that lock is the
//! one dropped after the commit. A failed write drops the freshly uploaded
//! object instead.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use satprep_core::error::CoreError;
use satprep_core::question::{
    deleted_message, not_deleted_message, not_updated_message, updated_message, ENTITY,
};
use satprep_core::types::DbId;
use satprep_db::models::question::{CreateQuestion, ImageColumn, PatchQuestion, Question};
use satprep_db::repositories::QuestionRepo;
use satprep_storage::{ImageAction, ImageChange};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::form::QuestionForm;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/v1/questions
///
/// Accepts fields plus an optional `image` file. The image is uploaded
/// before the row is inserted; if the insert fails the upload is removed.
pub async fn create(
    State(state): State<AppState>,
    form: QuestionForm,
) -> AppResult<(StatusCode, Json<Question>)> {
    let (input, upload) = form.into_create()?;
    input.validate()?;

    let action = upload.map_or(ImageAction::Keep, ImageAction::Replace);
    let change = state.images.prepare(None, action).await?;

    match QuestionRepo::create(&state.pool, &input, change.image()).await {
        Ok(question) => {
            state.images.commit(change);
            tracing::info!(
                question_id = question.question_id,
                test_id = question.test_id,
                has_image = question.image.is_some(),
                "Created question"
            );
            Ok((StatusCode::CREATED, Json(question)))
        }
        Err(e) => {
            state.images.rollback(change);
            Err(e.into())
        }
    }
}

/// GET /api/v1/questions
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Question>>> {
    let questions = QuestionRepo::list(&state.pool).await?;
    Ok(Json(questions))
}

/// GET /api/v1/questions/section/{section}/test/{test_id}
pub async fn list_by_section_and_test(
    State(state): State<AppState>,
    Path((section, test_id)): Path<(String, DbId)>,
) -> AppResult<Json<Vec<Question>>> {
    let questions = QuestionRepo::list_by_section_and_test(&state.pool, &section, test_id).await?;
    Ok(Json(questions))
}

/// GET /api/v1/questions/test/{test_id}
pub async fn list_by_test(
    State(state): State<AppState>,
    Path(test_id): Path<DbId>,
) -> AppResult<Json<Vec<Question>>> {
    let questions = QuestionRepo::list_by_test(&state.pool, test_id).await?;
    Ok(Json(questions))
}

/// GET /api/v1/questions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Question>> {
    let question = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(question))
}

/// PUT /api/v1/questions/{id}
///
/// Replaces every writable field. The image is kept unless a new file is
/// uploaded or `remove_image` is set.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    form: QuestionForm,
) -> AppResult<Json<MessageResponse>> {
    let (input, action) = form.into_update()?;
    input.validate()?;

    // Missing rows are rejected before anything is uploaded.
    QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let change = state.images.stage(action).await?;
    let rows = write_locked(&state, id, Write::Full(&input), change).await?;

    Ok(Json(update_outcome(id, rows)))
}

/// PATCH /api/v1/questions/{id}
///
/// Applies only the allow-listed fields present in the body, plus an
/// optional image replacement or removal.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    form: QuestionForm,
) -> AppResult<Json<MessageResponse>> {
    let (input, action) = form.into_patch()?;
    input.validate()?;

    let question = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if input.is_empty() && action.is_noop_for(question.image.as_deref()) {
        return Ok(Json(MessageResponse::new(not_updated_message(id))));
    }

    let change = state.images.stage(action).await?;
    let rows = write_locked(&state, id, Write::Partial(&input), change).await?;

    Ok(Json(update_outcome(id, rows)))
}

/// DELETE /api/v1/questions/{id}
///
/// Removes the row, then the image object. The object delete is awaited
/// but a failure only leaves an orphan behind and is logged; the record is
/// already gone at that point.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.pool.begin().await?;
    let question = QuestionRepo::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let rows = QuestionRepo::delete(&mut *tx, id).await?;
    tx.commit().await?;

    if rows != 1 {
        return Ok(Json(MessageResponse::new(not_deleted_message(id))));
    }

    if let Err(e) = state.images.delete_image(question.image.as_deref()).await {
        tracing::warn!(
            question_id = id,
            error = %e,
            "Question deleted but its image could not be removed, object is orphaned"
        );
    }

    tracing::info!(question_id = id, "Deleted question");
    Ok(Json(MessageResponse::new(deleted_message())))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// Column instruction for the staged image change.
fn image_column(change: &ImageChange) -> ImageColumn<'_> {
    if change.is_changed() {
        ImageColumn::Set(change.image())
    } else {
        ImageColumn::Keep
    }
}

#[derive(Clone, Copy)]
enum Write<'a> {
    Full(&'a CreateQuestion),
    Partial(&'a PatchQuestion),
}

/// Lock the row, apply `write` with the staged image, commit, then settle
/// the staged change.
///
/// The image read under the lock is the one superseded, so concurrent
/// replacements each drop exactly the object they overwrote. On any
/// failure (including the row vanishing since the upload) the transaction
/// is rolled back and the newly uploaded object is discarded.
async fn write_locked(
    state: &AppState,
    id: DbId,
    write: Write<'_>,
    change: ImageChange,
) -> AppResult<u64> {
    let written = async {
        let mut tx = state.pool.begin().await?;
        let question = QuestionRepo::lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let image = image_column(&change);
        let rows = match write {
            Write::Full(input) => QuestionRepo::update(&mut *tx, id, input, image).await?,
            Write::Partial(input) => QuestionRepo::patch(&mut *tx, id, input, image).await?,
        };
        tx.commit().await?;
        Ok::<_, AppError>((rows, question.image))
    }
    .await;

    match written {
        Ok((rows, current)) => {
            state.images.commit(change.superseding(current.as_deref()));
            Ok(rows)
        }
        Err(e) => {
            state.images.rollback(change);
            Err(e)
        }
    }
}

fn update_outcome(id: DbId, rows: u64) -> MessageResponse {
    if rows == 1 {
        tracing::info!(question_id = id, "Updated question");
        MessageResponse::new(updated_message())
    } else {
        MessageResponse::new(not_updated_message(id))
    }
}
