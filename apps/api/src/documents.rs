//! Resume document text extraction.
//!
//! PDFs go to Google Document AI when a processor is configured, and fall back
//! to the local `pdf-extract` parser when it is not or when the call fails.
//! Any other upload is read as UTF-8 text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DocumentAiConfig;
use crate::google_auth::TokenProvider;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document service error: {0}")]
    Service(String),

    #[error("Could not obtain an access token: {0}")]
    Auth(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A remote OCR-capable `pdf bytes -> text` service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn pdf_to_text(&self, pdf: &[u8]) -> Result<String, DocumentError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    raw_document: RawDocument<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    document: Option<ProcessedDocument>,
}

#[derive(Debug, Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
}

/// Google Document AI `:process` client.
pub struct DocumentAiClient {
    client: Client,
    config: DocumentAiConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl DocumentAiClient {
    pub fn new(
        config: DocumentAiConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            config,
            tokens,
        })
    }

    fn endpoint(&self) -> String {
        let c = &self.config;
        format!(
            "https://{loc}-documentai.googleapis.com/v1/projects/{project}/locations/{loc}/processors/{processor}:process",
            loc = c.location,
            project = c.project_id,
            processor = c.processor_id,
        )
    }
}

#[async_trait]
impl DocumentService for DocumentAiClient {
    async fn pdf_to_text(&self, pdf: &[u8]) -> Result<String, DocumentError> {
        let body = ProcessRequest {
            raw_document: RawDocument {
                content: STANDARD.encode(pdf),
                mime_type: "application/pdf",
            },
        };

        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocumentError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Service(format!("HTTP {status}: {body}")));
        }

        let processed: ProcessResponse = response
            .json()
            .await
            .map_err(|e| DocumentError::Service(e.to_string()))?;

        Ok(processed.document.map(|d| d.text).unwrap_or_default())
    }
}

/// Resume text extraction with a preferred service and a local fallback.
#[derive(Clone, Default)]
pub struct ResumeTextExtractor {
    service: Option<Arc<dyn DocumentService>>,
}

impl ResumeTextExtractor {
    pub fn new(service: Option<Arc<dyn DocumentService>>) -> Self {
        Self { service }
    }

    pub fn has_document_service(&self) -> bool {
        self.service.is_some()
    }

    /// Extracts text from an uploaded file, choosing the decoder by extension.
    pub async fn extract(&self, filename: &str, content: Bytes) -> Result<String, DocumentError> {
        if filename.to_ascii_lowercase().ends_with(".pdf") {
            self.pdf_to_text(content).await
        } else {
            Ok(String::from_utf8(content.to_vec())?)
        }
    }

    pub async fn pdf_to_text(&self, pdf: Bytes) -> Result<String, DocumentError> {
        if let Some(service) = &self.service {
            match service.pdf_to_text(&pdf).await {
                Ok(text) => return Ok(text),
                Err(e) => warn!("Document service failed, falling back to local PDF parser: {e}"),
            }
        }

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
            .await
            .map_err(|e| DocumentError::Pdf(e.to_string()))?
            .map_err(|e| DocumentError::Pdf(e.to_string()))?;

        debug!("Local PDF parser extracted {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedService {
        result: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentService for FixedService {
        async fn pdf_to_text(&self, _pdf: &[u8]) -> Result<String, DocumentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .map_err(|e| DocumentError::Service(e.to_string()))
        }
    }

    fn service(result: Result<&'static str, &'static str>) -> Arc<FixedService> {
        Arc::new(FixedService {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_plain_text_upload_is_decoded_as_utf8() {
        let extractor = ResumeTextExtractor::default();
        let text = extractor
            .extract("resume.txt", Bytes::from_static(b"Jane Doe\nPython, SQL"))
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe\nPython, SQL");
    }

    #[tokio::test]
    async fn test_invalid_utf8_upload_is_an_error() {
        let extractor = ResumeTextExtractor::default();
        let err = extractor
            .extract("resume.txt", Bytes::from(vec![0xff, 0xfe, 0x00]))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_pdf_extension_is_case_insensitive_and_uses_service() {
        let svc = service(Ok("from service"));
        let extractor = ResumeTextExtractor::new(Some(svc.clone()));

        let text = extractor.extract("CV.PDF", Bytes::from_static(b"%PDF-1.4")).await.unwrap();

        assert_eq!(text, "from service");
        assert_eq!(svc.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_failure_falls_back_to_local_parser() {
        let svc = service(Err("processor unavailable"));
        let extractor = ResumeTextExtractor::new(Some(svc.clone()));

        // Not a real PDF, so the local parser fails too; the error must come from it.
        let err = extractor
            .extract("cv.pdf", Bytes::from_static(b"not a pdf"))
            .await
            .unwrap_err();

        assert_eq!(svc.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, DocumentError::Pdf(_)));
    }

    #[test]
    fn test_extractor_reports_configured_service() {
        assert!(!ResumeTextExtractor::default().has_document_service());
        assert!(ResumeTextExtractor::new(Some(service(Ok("x")))).has_document_service());
    }

    struct FailingTokens;

    #[async_trait]
    impl TokenProvider for FailingTokens {
        async fn access_token(&self) -> Result<String, DocumentError> {
            Err(DocumentError::Auth("no credentials".to_string()))
        }
    }

    fn document_ai_config() -> DocumentAiConfig {
        DocumentAiConfig {
            project_id: "proj".to_string(),
            location: "eu".to_string(),
            processor_id: "abc123".to_string(),
            access_token: None,
        }
    }

    #[tokio::test]
    async fn test_token_failure_stops_before_the_request() {
        let client = DocumentAiClient::new(document_ai_config(), Arc::new(FailingTokens)).unwrap();
        let err = client.pdf_to_text(b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, DocumentError::Auth(_)));
    }

    #[test]
    fn test_document_ai_endpoint_shape() {
        let client = DocumentAiClient::new(document_ai_config(), Arc::new(FailingTokens)).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://eu-documentai.googleapis.com/v1/projects/proj/locations/eu/processors/abc123:process"
        );
    }

    #[test]
    fn test_process_request_serializes_base64_content() {
        let body = ProcessRequest {
            raw_document: RawDocument {
                content: STANDARD.encode(b"hi"),
                mime_type: "application/pdf",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["rawDocument"]["content"], "aGk=");
        assert_eq!(value["rawDocument"]["mimeType"], "application/pdf");
    }
}
