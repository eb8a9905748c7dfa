//! CSV serialization for feedback exports.
//!
//! Pure string building; fetching the rows and handing the file to the host
//! happens in the client layer. Column labels are the Brazilian-Portuguese
//! ones the product ships with. The header row is plain; every data field
//! is wrapped in double quotes with embedded quotes doubled, so commas and
//! line breaks inside comments survive.

use chrono::NaiveDate;

use crate::feedback::Feedback;
use crate::types::Timestamp;

/// Export column labels, in order.
pub const EXPORT_HEADERS: [&str; 15] = [
    "Nome do Cliente",
    "Email",
    "Telefone",
    "Avaliação",
    "Comentário",
    "Sentimento",
    "Status",
    "Urgente",
    "Fonte",
    "Localização",
    "Categoria",
    "NPS",
    "Tags",
    "Data de Criação",
    "Última Atualização",
];

/// Quote a single CSV field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Timestamps render as `dd/mm/YYYY HH:MM:SS` in UTC.
fn format_export_timestamp(ts: Timestamp) -> String {
    ts.format("%d/%m/%Y %H:%M:%S").to_string()
}

fn csv_row(record: &Feedback) -> String {
    let fields = [
        csv_field(&record.customer_name),
        csv_field(&record.customer_email),
        csv_field(record.customer_phone.as_deref().unwrap_or("")),
        csv_field(&record.rating.to_string()),
        csv_field(&record.comment),
        csv_field(record.sentiment.as_str()),
        csv_field(record.status.as_str()),
        csv_field(if record.is_urgent { "Sim" } else { "Não" }),
        csv_field(record.source.as_str()),
        csv_field(record.location.as_deref().unwrap_or("")),
        csv_field(record.category.as_deref().unwrap_or("")),
        csv_field(
            &record
                .nps_score
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ),
        csv_field(&record.tags.join(", ")),
        csv_field(&format_export_timestamp(record.created_at)),
        csv_field(&format_export_timestamp(record.updated_at)),
    ];
    fields.join(",")
}

/// Serialize records into CSV: one header row plus one row per record,
/// newline separated.
pub fn build_csv(records: &[Feedback]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));
    for record in records {
        lines.push(csv_row(record));
    }
    lines.join("\n")
}

/// Download filename for an export generated on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("feedbacks_{}.csv", date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
