//! Backend profiles for the supported WhatsApp gateway servers.
//!
//! Each gateway names the recipient and text fields differently and exposes
//! its own endpoint names. A [`BackendProfile`] captures those differences as
//! data so message builders and the client never branch on raw strings.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Abstract operations understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SendMessage,
    SendDocument,
    SendFile,
    SendFile64,
    SendVideo,
    SendPhoto,
    SendAnimation,
    SendAudio,
    SendLocation,
    SendContact,
    SendList,
    GetUpdates,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SendMessage => "sendMessage",
            Operation::SendDocument => "sendDocument",
            Operation::SendFile => "sendFile",
            Operation::SendFile64 => "sendFile64",
            Operation::SendVideo => "sendVideo",
            Operation::SendPhoto => "sendPhoto",
            Operation::SendAnimation => "sendAnimation",
            Operation::SendAudio => "sendAudio",
            Operation::SendLocation => "sendLocation",
            Operation::SendContact => "sendContact",
            Operation::SendList => "sendList",
            Operation::GetUpdates => "getUpdates",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway server implementation the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    WppConnect,
    WhatsappHttpApi,
    #[default]
    Default,
}

impl Backend {
    pub const ALL: [Backend; 3] = [
        Backend::WppConnect,
        Backend::WhatsappHttpApi,
        Backend::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::WppConnect => "wppconnect-server",
            Backend::WhatsappHttpApi => "whatsapp-http-api",
            Backend::Default => "default",
        }
    }

    /// Lenient parse used for configuration: unknown or blank names select
    /// the `default` backend.
    pub fn from_config_value(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> &'static BackendProfile {
        match self {
            Backend::WppConnect => &WPPCONNECT_PROFILE,
            Backend::WhatsappHttpApi => &WHATSAPP_HTTP_API_PROFILE,
            Backend::Default => &DEFAULT_PROFILE,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown whatsapp backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wppconnect-server" => Ok(Backend::WppConnect),
            "whatsapp-http-api" => Ok(Backend::WhatsappHttpApi),
            "default" => Ok(Backend::Default),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Field names and endpoint table for one backend.
#[derive(Debug)]
pub struct BackendProfile {
    pub backend: Backend,
    pub recipient_field: &'static str,
    pub text_field: &'static str,
    operations: &'static [(Operation, &'static str)],
}

impl BackendProfile {
    /// Endpoint from the fixed table, if the backend maps this operation.
    pub fn mapped_endpoint(&self, operation: Operation) -> Option<&'static str> {
        self.operations
            .iter()
            .find(|(candidate, _)| *candidate == operation)
            .map(|(_, endpoint)| *endpoint)
    }

    /// Resolve the concrete endpoint name for an operation.
    ///
    /// Overrides are keyed by the abstract operation name (`sendMessage`)
    /// and always win; otherwise the table entry is used, and operations the
    /// table does not know fall back to their own name.
    pub fn resolve_endpoint(
        &self,
        operation: Operation,
        overrides: &HashMap<String, String>,
    ) -> String {
        if let Some(endpoint) = overrides
            .get(operation.as_str())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
        {
            return endpoint.to_string();
        }
        self.mapped_endpoint(operation)
            .unwrap_or_else(|| operation.as_str())
            .to_string()
    }

    pub fn operations(&self) -> impl Iterator<Item = (Operation, &'static str)> + '_ {
        self.operations.iter().copied()
    }
}

static WPPCONNECT_PROFILE: BackendProfile = BackendProfile {
    backend: Backend::WppConnect,
    recipient_field: "phone",
    text_field: "message",
    operations: &[
        (Operation::SendMessage, "send-message"),
        (Operation::SendDocument, "send-file-base64"),
        (Operation::SendFile, "send-file-base64"),
        (Operation::SendFile64, "send-file-base64"),
        (Operation::SendVideo, "send-file-base64"),
        (Operation::SendPhoto, "send-image"),
        (Operation::SendAnimation, "send-image"),
        (Operation::SendAudio, "send-voice-base64"),
        (Operation::SendLocation, "send-location"),
        (Operation::SendContact, "contact-vcard"),
    ],
};

static WHATSAPP_HTTP_API_PROFILE: BackendProfile = BackendProfile {
    backend: Backend::WhatsappHttpApi,
    recipient_field: "chatId",
    text_field: "text",
    operations: &[
        (Operation::SendMessage, "sendText"),
        (Operation::SendDocument, "sendFile"),
        (Operation::SendFile, "sendFile"),
        (Operation::SendFile64, "sendFile"),
        (Operation::SendVideo, "sendFile"),
        (Operation::SendPhoto, "sendImage"),
        (Operation::SendAnimation, "sendImage"),
        (Operation::SendAudio, "sendVoice"),
        (Operation::SendContact, "sendContactVcard"),
    ],
};

static DEFAULT_PROFILE: BackendProfile = BackendProfile {
    backend: Backend::Default,
    recipient_field: "number",
    text_field: "text",
    operations: &[
        (Operation::SendMessage, "sendText"),
        (Operation::SendDocument, "sendFile"),
        (Operation::SendVideo, "sendFile"),
        (Operation::SendPhoto, "sendFile"),
        (Operation::SendAnimation, "sendFile"),
    ],
};
