use crate::backend::Backend;

use super::{MessageBuilder, MessageFields};

/// Location pin message.
#[derive(Debug, Clone)]
pub struct LocationMessage {
    fields: MessageFields,
}

impl LocationMessage {
    pub fn new(backend: Backend, latitude: f64, longitude: f64) -> Self {
        Self {
            fields: MessageFields::new(backend),
        }
        .latitude(latitude)
        .longitude(longitude)
    }

    pub fn latitude(mut self, latitude: f64) -> Self {
        let field = match self.fields.backend() {
            Backend::WhatsappHttpApi => "latitude",
            _ => "lat",
        };
        self.fields.set(field, latitude);
        self
    }

    pub fn longitude(mut self, longitude: f64) -> Self {
        let field = match self.fields.backend() {
            Backend::WhatsappHttpApi => "longitude",
            Backend::WppConnect => "lng",
            Backend::Default => "log",
        };
        self.fields.set(field, longitude);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.fields.set("title", title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let field = match self.fields.backend() {
            Backend::WppConnect => "address",
            _ => "description",
        };
        self.fields.set(field, description.into());
        self
    }
}

impl MessageBuilder for LocationMessage {
    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }
}
