use crate::client::{ApiResponse, WhatsappClient};
use crate::error::WhatsappError;
use crate::payload::{Payload, PayloadValue};

/// Poll for incoming updates.
#[derive(Debug, Clone, Default)]
pub struct UpdatesRequest {
    payload: Payload,
}

impl UpdatesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.payload.insert("limit", limit);
        self
    }

    /// Only the most recent update.
    pub fn latest(mut self) -> Self {
        self.payload.insert("offset", -1i64);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.payload.insert("offset", offset);
        self
    }

    pub fn options<K, V>(mut self, options: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PayloadValue>,
    {
        self.payload.merge(options.into_iter().collect());
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn get(&self, client: &WhatsappClient) -> Result<ApiResponse, WhatsappError> {
        client.get_updates(&self.payload)
    }
}
