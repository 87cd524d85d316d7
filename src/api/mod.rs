//! Typed client for the case management HTTP API.
//!
//! Each method maps to one backend endpoint and is consumed as an opaque
//! request/response pair. Retry and backoff policy intentionally live with
//! the caller: the user is present and re-triggers failed actions.

pub mod types;

use reqwest::StatusCode;
use reqwest::multipart;

use crate::config::ClientConfig;
use crate::error::ApiError;
use types::{
    ApiErrorBody, Case, ChatAnswer, ChatHistoryEntry, ChatRequest, DocumentRecord, DocumentUpload,
    TemplateDraft, TemplateRequest, TemplateType,
};

/// HTTP client bound to one backend base URL.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_limit_bytes: u64,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ApiError::Init { source })?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            upload_limit_bytes: config.upload_limit_bytes,
        })
    }

    /// `GET /api/cases/{id}`
    pub async fn fetch_case(&self, case_id: i64) -> Result<Case, ApiError> {
        let endpoint = format!("{}/api/cases/{}", self.base_url, case_id);
        tracing::debug!(case_id, "fetching case metadata");

        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::CaseNotFound { case_id });
        }

        let response = check_status(&endpoint, response).await?;
        decode_json(&endpoint, response).await
    }

    /// `GET /api/documents/case/{id}`
    pub async fn list_documents(&self, case_id: i64) -> Result<Vec<DocumentRecord>, ApiError> {
        let endpoint = format!("{}/api/documents/case/{}", self.base_url, case_id);
        tracing::debug!(case_id, "listing case documents");

        let response = self.get(&endpoint).await?;
        decode_json(&endpoint, response).await
    }

    /// `POST /api/documents/{case_id}` with a multipart `file` field.
    ///
    /// The payload is passed through unvalidated apart from the configured
    /// size cap; content restrictions belong to the UI affordance.
    pub async fn upload_document(
        &self,
        case_id: i64,
        upload: DocumentUpload,
    ) -> Result<DocumentRecord, ApiError> {
        let size = upload.bytes.len() as u64;
        if size > self.upload_limit_bytes {
            return Err(ApiError::UploadTooLarge {
                filename: upload.filename,
                size,
                limit: self.upload_limit_bytes,
            });
        }

        let endpoint = format!("{}/api/documents/{}", self.base_url, case_id);
        tracing::debug!(case_id, filename = %upload.filename, size, "uploading document");

        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.filename);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|source| ApiError::Transport {
                    endpoint: endpoint.clone(),
                    source,
                })?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let response = check_status(&endpoint, response).await?;
        decode_json(&endpoint, response).await
    }

    /// `DELETE /api/documents/{id}`
    pub async fn delete_document(&self, document_id: i64) -> Result<(), ApiError> {
        let endpoint = format!("{}/api/documents/{}", self.base_url, document_id);
        tracing::debug!(document_id, "deleting document");

        let response = self
            .http
            .delete(&endpoint)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        check_status(&endpoint, response).await?;
        Ok(())
    }

    /// `GET /api/chat/case/{id}`
    pub async fn chat_history(&self, case_id: i64) -> Result<Vec<ChatHistoryEntry>, ApiError> {
        let endpoint = format!("{}/api/chat/case/{}", self.base_url, case_id);
        tracing::debug!(case_id, "loading chat history");

        let response = self.get(&endpoint).await?;
        decode_json(&endpoint, response).await
    }

    /// `POST /api/chat/`
    pub async fn send_question(&self, case_id: i64, message: &str) -> Result<ChatAnswer, ApiError> {
        let endpoint = format!("{}/api/chat/", self.base_url);
        tracing::debug!(case_id, "sending question");

        let response = self
            .http
            .post(&endpoint)
            .json(&ChatRequest {
                case_id,
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let response = check_status(&endpoint, response).await?;
        decode_json(&endpoint, response).await
    }

    /// `POST /api/templates/`
    pub async fn generate_template(
        &self,
        case_id: i64,
        template_type: TemplateType,
        context: Option<String>,
    ) -> Result<TemplateDraft, ApiError> {
        let endpoint = format!("{}/api/templates/", self.base_url);
        tracing::debug!(case_id, template_type = template_type.as_str(), "generating draft");

        let response = self
            .http
            .post(&endpoint)
            .json(&TemplateRequest {
                case_id,
                template_type,
                context,
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let response = check_status(&endpoint, response).await?;
        decode_json(&endpoint, response).await
    }

    async fn get(&self, endpoint: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        check_status(endpoint, response).await
    }
}

/// Map non-success statuses to `ApiError::Status`, pulling the backend's
/// `detail` field out of the body when it has one.
async fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    response.json().await.map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
