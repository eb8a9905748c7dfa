//! CSV export of a filtered listing.

use std::sync::Arc;

use chrono::NaiveDate;

use feedo_core::error::FeedoError;
use feedo_core::export::{build_csv, export_filename};
use feedo_core::filter::FeedbackFilters;
use feedo_core::query::build_export_query;
use feedo_core::types::RecordId;

use crate::store::FeedbackStore;

/// A rendered export: the suggested file name and the CSV payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Builds CSV downloads from the current listing filters.
pub struct CsvExporter {
    store: Arc<dyn FeedbackStore>,
}

impl CsvExporter {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Export every record matching the filters. The export variant of the
    /// query applies search, rating, status, and sentiment, but neither the
    /// period window nor pagination.
    pub async fn export(
        &self,
        owner: RecordId,
        filters: &FeedbackFilters,
        today: NaiveDate,
    ) -> Result<CsvExport, FeedoError> {
        let query = build_export_query(filters);
        let page = self.store.query_feedbacks(owner, &query).await?;
        tracing::info!(owner = %owner, records = page.records.len(), "Exported feedback CSV");

        Ok(CsvExport {
            filename: export_filename(today),
            content: build_csv(&page.records),
        })
    }
}
