//! Repository for the `response_templates` table.

use sqlx::PgPool;

use feedo_core::feedback::ResponseTemplate;
use feedo_core::types::RecordId;

use crate::error::DbError;
use crate::models::template::TemplateRow;

/// Column list for `response_templates` queries.
const COLUMNS: &str =
    "id, name, content, category, owner_id, is_default, created_at, updated_at";

/// Read access to canned response templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// List the templates visible to an owner: their own plus the built-in
    /// defaults, defaults first, newest first within each group.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner: RecordId,
    ) -> Result<Vec<ResponseTemplate>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM response_templates \
             WHERE owner_id = $1 OR is_default = TRUE \
             ORDER BY is_default DESC, created_at DESC"
        );
        let rows: Vec<TemplateRow> = sqlx::query_as(&query)
            .bind(owner)
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(TemplateRow::into_record).collect()
    }
}
