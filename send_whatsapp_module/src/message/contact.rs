use crate::backend::Backend;
use crate::payload::PayloadValue;

use super::{MessageBuilder, MessageFields};

/// Contact card message.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    fields: MessageFields,
}

impl ContactMessage {
    pub fn new(backend: Backend, phone_number: impl Into<String>) -> Self {
        let mut message = Self {
            fields: MessageFields::new(backend),
        };
        message.set_phone_number(phone_number.into());
        message
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.set_phone_number(phone_number.into());
        self
    }

    /// Sets both `name` and `first_name`.
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        self.fields.set("name", first_name.clone());
        self.fields.set("first_name", first_name);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.fields.set("name", name.into());
        self
    }

    /// Appends to `name` and sets `last_name`.
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        let last_name = last_name.into();
        let name = match self.fields.get("name").and_then(PayloadValue::as_text) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, last_name),
            _ => last_name.clone(),
        };
        self.fields.set("name", name);
        self.fields.set("last_name", last_name);
        self
    }

    pub fn vcard(mut self, vcard: impl Into<String>) -> Self {
        self.fields.set("vcard", vcard.into());
        self
    }

    fn contact_field(&self) -> &'static str {
        match self.fields.backend() {
            Backend::WppConnect | Backend::WhatsappHttpApi => "contactsId",
            Backend::Default => "contact",
        }
    }

    fn set_phone_number(&mut self, phone_number: String) {
        let field = self.contact_field();
        self.fields.set(field, phone_number);
    }
}

impl MessageBuilder for ContactMessage {
    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }
}
