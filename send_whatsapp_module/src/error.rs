use serde_json::Value;

use crate::transport::TransportError;

const NO_DESCRIPTION: &str = "no description given";
const NO_BODY: &str = "no response body found";

#[derive(Debug, thiserror::Error)]
pub enum WhatsappError {
    #[error("You must provide your whatsapp session to make any API requests.")]
    SessionNotProvided,
    #[error("Whatsapp api responded with an error `{status} - {description}`")]
    BackendRespondedWithError { status: u16, description: String },
    #[error("The communication with Whatsapp api failed. `{0}`")]
    CommunicationFailure(#[source] TransportError),
    #[error("could not build whatsapp message: {0}")]
    Message(#[from] MessageError),
}

impl WhatsappError {
    /// Classify a transport failure. Non-2xx responses become backend
    /// errors; everything else is a communication failure.
    pub fn from_transport(error: TransportError) -> Self {
        match error {
            TransportError::Status { status, body } => WhatsappError::BackendRespondedWithError {
                status,
                description: describe_error_body(body.as_deref()),
            },
            other => WhatsappError::CommunicationFailure(other),
        }
    }
}

/// Errors raised while assembling a payload, before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch remote file {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Best-effort description from an error response body.
///
/// Looks at `exception.description`, `exception.message`, `description` and
/// `message` in that order.
pub fn describe_error_body(body: Option<&str>) -> String {
    let Some(body) = body.map(str::trim).filter(|body| !body.is_empty()) else {
        return NO_BODY.to_string();
    };
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return NO_DESCRIPTION.to_string();
    };

    let candidates = [
        parsed.pointer("/exception/description"),
        parsed.pointer("/exception/message"),
        parsed.get("description"),
        parsed.get("message"),
    ];
    let description = candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    description
}
