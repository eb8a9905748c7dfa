//! Row model for the `response_templates` table.

use sqlx::FromRow;

use feedo_core::feedback::{ResponseTemplate, TemplateCategory};
use feedo_core::types::{RecordId, Timestamp};

use crate::error::DbError;

/// A row from the `response_templates` table.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateRow {
    pub id: RecordId,
    pub name: String,
    pub content: String,
    pub category: String,
    pub owner_id: Option<RecordId>,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TemplateRow {
    pub fn into_record(self) -> Result<ResponseTemplate, DbError> {
        let category = TemplateCategory::parse(&self.category).ok_or_else(|| DbError::Decode {
            table: "response_templates",
            column: "category",
            value: self.category.clone(),
            id: self.id,
        })?;

        Ok(ResponseTemplate {
            id: self.id,
            name: self.name,
            content: self.content,
            category,
            owner_id: self.owner_id,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
