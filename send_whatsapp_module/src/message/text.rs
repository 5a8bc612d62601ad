use crate::backend::Backend;
use crate::chunking::MAX_CHUNK_SIZE;

use super::{MessageBuilder, MessageFields};

/// Plain text message, optionally split into several requests.
#[derive(Debug, Clone)]
pub struct TextMessage {
    fields: MessageFields,
    chunk_size: usize,
    chunked: bool,
}

impl TextMessage {
    pub fn new(backend: Backend, content: impl Into<String>) -> Self {
        let mut message = Self {
            fields: MessageFields::new(backend),
            chunk_size: MAX_CHUNK_SIZE,
            chunked: false,
        };
        message.set_content(content.into());
        message
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.set_content(content.into());
        self
    }

    /// Append a line to the current content.
    pub fn line(mut self, content: impl AsRef<str>) -> Self {
        let mut text = self.text().unwrap_or_default().to_string();
        text.push_str(content.as_ref());
        text.push('\n');
        self.set_content(text);
        self
    }

    /// Split content longer than `limit` columns over several requests.
    /// The limit is capped at [`MAX_CHUNK_SIZE`].
    pub fn chunk(mut self, limit: usize) -> Self {
        self.chunk_size = limit.clamp(1, MAX_CHUNK_SIZE);
        self.chunked = true;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Content as it will be sent.
    pub fn text(&self) -> Option<&str> {
        self.fields
            .value(self.fields.profile().text_field)
            .and_then(|value| value.as_text())
    }

    fn set_content(&mut self, content: String) {
        let field = self.fields.profile().text_field;
        self.fields.set(field, content);
    }
}

impl MessageBuilder for TextMessage {
    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }
}
