use serde_json::Value;

use crate::backend::Backend;

use super::{MessageBuilder, MessageFields};

/// Question with a fixed set of choices (poll).
#[derive(Debug, Clone)]
pub struct ListMessage {
    fields: MessageFields,
}

impl ListMessage {
    pub fn new(backend: Backend, question: impl Into<String>) -> Self {
        Self {
            fields: MessageFields::new(backend),
        }
        .question(question)
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.fields.set("question", question.into());
        self
    }

    /// Choices, sent JSON-encoded in `options`.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<Value> = choices
            .into_iter()
            .map(|choice| Value::String(choice.into()))
            .collect();
        self.fields.set("options", Value::Array(choices).to_string());
        self
    }
}

impl MessageBuilder for ListMessage {
    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }
}
