//! Feedback domain records, enumerations, and payload validation.
//!
//! Everything here is storage-agnostic. Enum values match the text stored in
//! the database columns (`snake_case`), and the strict `parse` constructors
//! are the single place row text is turned back into typed values.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Triage state of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Responded,
    Archived,
}

impl FeedbackStatus {
    /// Column text for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Responded => "responded",
            FeedbackStatus::Archived => "archived",
        }
    }

    /// Strict parse of column text. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(FeedbackStatus::Pending),
            "responded" => Some(FeedbackStatus::Responded),
            "archived" => Some(FeedbackStatus::Archived),
            _ => None,
        }
    }

    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// Allowed: `pending -> responded`, any state -> `archived`, and
    /// same-state no-ops (which is what makes a second `archive` call
    /// succeed instead of erroring).
    pub fn can_transition(self, to: FeedbackStatus) -> bool {
        self == to
            || to == FeedbackStatus::Archived
            || (self == FeedbackStatus::Pending && to == FeedbackStatus::Responded)
    }
}

/// Assigned polarity of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    /// Sentiment assigned at creation time.
    ///
    /// The creation path accepts no caller-supplied sentiment; it is derived
    /// from the star rating: 1-2 negative, 3 neutral, 4-5 positive.
    pub fn for_rating(rating: i16) -> Self {
        match rating {
            i16::MIN..=2 => Sentiment::Negative,
            3 => Sentiment::Neutral,
            _ => Sentiment::Positive,
        }
    }
}

/// How a feedback record entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceChannel {
    QrCode,
    Website,
    Email,
    Manual,
}

impl SourceChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceChannel::QrCode => "qr_code",
            SourceChannel::Website => "website",
            SourceChannel::Email => "email",
            SourceChannel::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "qr_code" => Some(SourceChannel::QrCode),
            "website" => Some(SourceChannel::Website),
            "email" => Some(SourceChannel::Email),
            "manual" => Some(SourceChannel::Manual),
            _ => None,
        }
    }
}

/// Audience of a canned response template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Positive,
    Neutral,
    Negative,
    General,
}

impl TemplateCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateCategory::Positive => "positive",
            TemplateCategory::Neutral => "neutral",
            TemplateCategory::Negative => "negative",
            TemplateCategory::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(TemplateCategory::Positive),
            "neutral" => Some(TemplateCategory::Neutral),
            "negative" => Some(TemplateCategory::Negative),
            "general" => Some(TemplateCategory::General),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A fully materialized feedback record, including its tags and the
/// responses sent so far (ordered by creation time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: RecordId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    /// Star rating, 1-5.
    pub rating: i16,
    pub comment: String,
    pub sentiment: Sentiment,
    pub status: FeedbackStatus,
    pub is_urgent: bool,
    pub source: SourceChannel,
    pub location: Option<String>,
    pub category: Option<String>,
    /// Net promoter score, 0-10.
    pub nps_score: Option<i16>,
    pub owner_id: RecordId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub tags: Vec<String>,
    pub responses: Vec<FeedbackResponse>,
}

/// One page of a feedback listing, plus the total number of records
/// matching the filters across all pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPage {
    pub records: Vec<Feedback>,
    pub total_count: i64,
}

/// A response sent for a feedback record. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: RecordId,
    pub feedback_id: RecordId,
    pub response_text: String,
    /// Name of the template the response started from, if any.
    pub template_used: Option<String>,
    pub owner_id: RecordId,
    pub created_at: Timestamp,
}

/// A canned response template. `owner_id = None` marks a built-in default
/// visible to every account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub id: RecordId,
    pub name: String,
    pub content: String,
    pub category: TemplateCategory,
    pub owner_id: Option<RecordId>,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Mutation payloads
// ---------------------------------------------------------------------------

/// Payload for creating a feedback record.
///
/// Sentiment is not part of the payload; it is derived from the rating via
/// [`Sentiment::for_rating`]. New records start `pending` and not urgent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewFeedback {
    #[validate(length(min = 1, max = 200, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "customer email is invalid"))]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
    pub source: SourceChannel,
    pub location: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, max = 10, message = "NPS score must be between 0 and 10"))]
    pub nps_score: Option<i16>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update payload. `None` means "leave unchanged"; clearing a value
/// is not expressible through this DTO.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FeedbackChanges {
    #[validate(length(min = 1, max = 200))]
    pub customer_name: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i16>,
    #[validate(length(min = 1))]
    pub comment: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub status: Option<FeedbackStatus>,
    pub is_urgent: Option<bool>,
    pub location: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, max = 10))]
    pub nps_score: Option<i16>,
}

impl FeedbackChanges {
    /// Changeset that only transitions the status.
    pub fn status_only(status: FeedbackStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Changeset that only flips the urgency flag.
    pub fn urgency(is_urgent: bool) -> Self {
        Self {
            is_urgent: Some(is_urgent),
            ..Default::default()
        }
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.customer_phone.is_none()
            && self.rating.is_none()
            && self.comment.is_none()
            && self.sentiment.is_none()
            && self.status.is_none()
            && self.is_urgent.is_none()
            && self.location.is_none()
            && self.category.is_none()
            && self.nps_score.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
