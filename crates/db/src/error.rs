use feedo_core::types::RecordId;

/// Storage-layer error.
///
/// `Decode` covers rows that violate the typed contract (an enum column
/// holding text no variant matches). The CHECK constraints make this
/// unreachable through this crate's own writes, but rows written by other
/// tools still get validated instead of trusted.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid {column} value {value:?} on {table} row {id}")]
    Decode {
        table: &'static str,
        column: &'static str,
        value: String,
        id: RecordId,
    },
}
