//! Wire DTOs for the case management API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Cases ---

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Active,
    Closed,
    Archived,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }
}

/// Case metadata as served by `GET /api/cases/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub case_number: Option<String>,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Documents ---

/// One uploaded document. `is_indexed` flips server-side once the ingestion
/// pipeline has made the file searchable; the client only observes it.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub case_id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub uploaded_at: DateTime<Utc>,
    pub is_indexed: bool,
}

/// A file handed to the upload endpoint as a multipart payload.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// --- Chat ---

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub case_id: i64,
    pub message: String,
}

/// Answer returned by `POST /api/chat/`. The `kvkk_warning` disclaimer
/// accompanies every answer and must always be shown alongside it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatAnswer {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub kvkk_warning: Option<String>,
}

/// One stored question/answer pair from `GET /api/chat/case/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatHistoryEntry {
    pub id: i64,
    pub message: String,
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// --- Templates ---

/// The fixed set of draft templates the backend can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Dilekce,
    Sozlesme,
    Tutanak,
}

impl TemplateType {
    pub const ALL: [Self; 3] = [Self::Dilekce, Self::Sozlesme, Self::Tutanak];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dilekce => "dilekce",
            Self::Sozlesme => "sozlesme",
            Self::Tutanak => "tutanak",
        }
    }
}

impl std::str::FromStr for TemplateType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dilekce" => Ok(Self::Dilekce),
            "sozlesme" => Ok(Self::Sozlesme),
            "tutanak" => Ok(Self::Tutanak),
            other => Err(format!(
                "unknown template type '{other}' (expected dilekce, sozlesme or tutanak)"
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateRequest {
    pub case_id: i64,
    pub template_type: TemplateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Generated draft returned by `POST /api/templates/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDraft {
    pub draft: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

// --- Errors ---

/// Error payload shape used by the backend for non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_deserializes_backend_shape() {
        let case: Case = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Kira tespit davası",
                "description": null,
                "client_name": "A. Yılmaz",
                "case_number": "2024/118",
                "status": "active",
                "created_at": "2024-03-01T09:30:00Z",
                "updated_at": "2024-03-02T10:00:00Z"
            }"#,
        )
        .expect("case json");
        assert_eq!(case.id, 7);
        assert_eq!(case.status, CaseStatus::Active);
        assert_eq!(case.case_number.as_deref(), Some("2024/118"));
    }

    #[test]
    fn document_record_deserializes_with_optional_fields_missing_values() {
        let record: DocumentRecord = serde_json::from_str(
            r#"{
                "id": 3,
                "case_id": 7,
                "filename": "contract.pdf",
                "file_path": "uploads/case_7/contract.pdf",
                "file_type": null,
                "file_size": null,
                "uploaded_at": "2024-03-01T09:30:00Z",
                "is_indexed": false
            }"#,
        )
        .expect("document json");
        assert!(!record.is_indexed);
        assert!(record.file_size.is_none());
    }

    #[test]
    fn chat_answer_tolerates_missing_kvkk_warning_and_sources() {
        let answer: ChatAnswer =
            serde_json::from_str(r#"{"response": "12 ay"}"#).expect("chat answer json");
        assert_eq!(answer.response, "12 ay");
        assert!(answer.sources.is_empty());
        assert!(answer.kvkk_warning.is_none());
    }

    #[test]
    fn template_type_round_trips_lowercase_wire_names() {
        for template_type in TemplateType::ALL {
            let encoded = serde_json::to_string(&template_type).expect("encode");
            assert_eq!(encoded, format!("\"{}\"", template_type.as_str()));
            let parsed: TemplateType = template_type.as_str().parse().expect("parse");
            assert_eq!(parsed, template_type);
        }
        assert!("mektup".parse::<TemplateType>().is_err());
    }

    #[test]
    fn template_request_omits_absent_context() {
        let body = serde_json::to_value(TemplateRequest {
            case_id: 7,
            template_type: TemplateType::Dilekce,
            context: None,
        })
        .expect("encode");
        assert!(body.get("context").is_none());
        assert_eq!(body["template_type"], "dilekce");
    }
}
