//! HTTP transport seam and the blocking reqwest implementation.

use std::time::Duration;

use reqwest::blocking::multipart;

use crate::payload::{AttachmentSource, FileAttachment, MultipartPart};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartPart>),
}

/// A POST request ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl TransportRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("http status {status}")]
    Status { status: u16, body: Option<String> },
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Synchronous POST client used by [`crate::WhatsappClient`].
pub trait HttpTransport: Send + Sync {
    fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`HttpTransport`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: Some(body).filter(|body| !body.is_empty()),
            });
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn build_form(parts: &[MultipartPart]) -> Result<multipart::Form, TransportError> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match part {
            MultipartPart::Text { name, contents } => form.text(name.clone(), contents.clone()),
            MultipartPart::File(attachment) => {
                form.part(attachment.part_name.clone(), file_part(attachment)?)
            }
        };
    }
    Ok(form)
}

fn file_part(attachment: &FileAttachment) -> Result<multipart::Part, TransportError> {
    let part = match &attachment.source {
        AttachmentSource::Path(path) => multipart::Part::file(path)?,
        AttachmentSource::Bytes(bytes) => multipart::Part::bytes(bytes.clone()),
    };
    let part = match &attachment.filename {
        Some(filename) => part.file_name(filename.clone()),
        None => part,
    };
    part.mime_str(&attachment.mime_type)
        .map_err(TransportError::from)
}
