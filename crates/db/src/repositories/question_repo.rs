//! Repository for the `sat_questions` table.

use satprep_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::question::{CreateQuestion, ImageColumn, PatchQuestion, Question};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "question_id, test_id, section, question_text, hint, image, explanation, \
                       created_at, updated_at";

/// Provides CRUD operations for questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Insert a new question, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateQuestion,
        image: Option<&str>,
    ) -> Result<Question, sqlx::Error> {
        let query = format!(
            "INSERT INTO sat_questions (test_id, section, question_text, hint, image, explanation)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(input.test_id)
            .bind(&input.section)
            .bind(&input.question_text)
            .bind(&input.hint)
            .bind(image)
            .bind(&input.explanation)
            .fetch_one(executor)
            .await
    }

    /// List every question in insertion order.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sat_questions ORDER BY question_id");
        sqlx::query_as::<_, Question>(&query)
            .fetch_all(executor)
            .await
    }

    /// List questions belonging to a test.
    pub async fn list_by_test<'e>(
        executor: impl PgExecutor<'e>,
        test_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sat_questions
             WHERE test_id = $1
             ORDER BY question_id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(test_id)
            .fetch_all(executor)
            .await
    }

    /// List questions of one section within a test.
    pub async fn list_by_section_and_test<'e>(
        executor: impl PgExecutor<'e>,
        section: &str,
        test_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sat_questions
             WHERE section = $1 AND test_id = $2
             ORDER BY question_id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(section)
            .bind(test_id)
            .fetch_all(executor)
            .await
    }

    /// Find a question by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sat_questions WHERE question_id = $1");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a question and lock its row until the surrounding transaction ends.
    ///
    /// Concurrent writers to the same question block here, which serializes
    /// the read-upload-write sequence around the `image` column.
    pub async fn lock_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sat_questions WHERE question_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Replace every writable field of a question.
    ///
    /// Returns the number of rows affected (0 or 1).
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &CreateQuestion,
        image: ImageColumn<'_>,
    ) -> Result<u64, sqlx::Error> {
        let (set_image, image) = image.bind_parts();
        let result = sqlx::query(
            "UPDATE sat_questions SET
                test_id = $2,
                section = $3,
                question_text = $4,
                hint = $5,
                explanation = $6,
                image = CASE WHEN $7 THEN $8 ELSE image END
             WHERE question_id = $1",
        )
        .bind(id)
        .bind(input.test_id)
        .bind(&input.section)
        .bind(&input.question_text)
        .bind(&input.hint)
        .bind(&input.explanation)
        .bind(set_image)
        .bind(image)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Apply a partial update. Only non-`None` fields in `input` are applied.
    ///
    /// Returns the number of rows affected (0 or 1).
    pub async fn patch<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &PatchQuestion,
        image: ImageColumn<'_>,
    ) -> Result<u64, sqlx::Error> {
        let (set_image, image) = image.bind_parts();
        let result = sqlx::query(
            "UPDATE sat_questions SET
                test_id = COALESCE($2, test_id),
                section = COALESCE($3, section),
                question_text = COALESCE($4, question_text),
                hint = COALESCE($5, hint),
                explanation = COALESCE($6, explanation),
                image = CASE WHEN $7 THEN $8 ELSE image END
             WHERE question_id = $1",
        )
        .bind(id)
        .bind(input.test_id)
        .bind(&input.section)
        .bind(&input.question_text)
        .bind(&input.hint)
        .bind(&input.explanation)
        .bind(set_image)
        .bind(image)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a question by ID. Returns the number of rows removed.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sat_questions WHERE question_id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        tracing::debug!(question_id = id, rows = result.rows_affected(), "Deleted question");
        Ok(result.rows_affected())
    }
}
