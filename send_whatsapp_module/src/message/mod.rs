//! Backend-agnostic message builders.
//!
//! Every builder is bound to a [`Backend`] at construction and writes its
//! fields using that backend's names. Builders share their common behaviour
//! through [`MessageBuilder`]; [`MessageKind`] is the closed set the client
//! dispatches on.

mod contact;
mod file;
mod list;
mod location;
mod text;

pub use contact::ContactMessage;
pub use file::{FileKind, FileMessage, FileSource};
pub use list::ListMessage;
pub use location::LocationMessage;
pub use text::TextMessage;

use serde::Serialize;

use crate::backend::{Backend, BackendProfile, Operation};
use crate::payload::{Payload, PayloadValue};

pub const REPLY_MARKUP_FIELD: &str = "reply_markup";
pub const DEFAULT_BUTTON_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

#[derive(Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: Vec<&'a [InlineButton]>,
}

/// State shared by every builder.
#[derive(Debug, Clone)]
pub struct MessageFields {
    backend: Backend,
    payload: Payload,
    options: Payload,
    buttons: Vec<InlineButton>,
    session: Option<String>,
}

impl MessageFields {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            payload: Payload::new(),
            options: Payload::new(),
            buttons: Vec::new(),
            session: None,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn profile(&self) -> &'static BackendProfile {
        self.backend.profile()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.payload.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<PayloadValue> {
        self.payload.remove(key)
    }

    /// Builder-computed value for `key`, ignoring caller options.
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.payload.get(key)
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        let field = self.profile().recipient_field;
        self.payload.insert(field, recipient.into());
    }

    pub fn set_session(&mut self, session: impl Into<String>) {
        self.session = Some(session.into());
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn merge_options(&mut self, options: Payload) {
        self.options.merge(options);
    }

    pub fn push_button(&mut self, button: InlineButton, columns: usize) {
        self.buttons.push(button);
        let markup = ReplyMarkup {
            inline_keyboard: self.buttons.chunks(columns.max(1)).collect(),
        };
        // Serialising plain strings cannot fail.
        if let Ok(encoded) = serde_json::to_string(&markup) {
            self.payload.insert(REPLY_MARKUP_FIELD, encoded);
        }
    }

    pub fn buttons(&self) -> &[InlineButton] {
        &self.buttons
    }

    /// Value for `key` as it will be sent: caller options win.
    pub fn value(&self, key: &str) -> Option<&PayloadValue> {
        self.options.get(key).or_else(|| self.payload.get(key))
    }

    pub fn has_recipient(&self) -> bool {
        match self.value(self.profile().recipient_field) {
            Some(PayloadValue::Text(value)) => !value.trim().is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Copy of the accumulated payload with caller options merged on top.
    pub fn payload(&self) -> Payload {
        let mut payload = self.payload.clone();
        payload.merge(self.options.clone());
        payload
    }
}

/// Behaviour shared by all message builders.
pub trait MessageBuilder: Sized {
    fn fields(&self) -> &MessageFields;
    fn fields_mut(&mut self) -> &mut MessageFields;

    /// Recipient, written under the backend's recipient field.
    fn to(mut self, recipient: impl Into<String>) -> Self {
        self.fields_mut().set_recipient(recipient);
        self
    }

    /// Extra fields sent as-is. They override builder-computed values.
    fn options<K, V>(mut self, options: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PayloadValue>,
    {
        self.fields_mut()
            .merge_options(options.into_iter().collect());
        self
    }

    /// Inline button opening a URL.
    fn button(mut self, text: impl Into<String>, url: impl Into<String>, columns: usize) -> Self {
        let button = InlineButton {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
        };
        self.fields_mut().push_button(button, columns);
        self
    }

    /// Inline button posting `callback_data` back to the bot.
    fn button_with_callback(
        mut self,
        text: impl Into<String>,
        callback_data: impl Into<String>,
        columns: usize,
    ) -> Self {
        let button = InlineButton {
            text: text.into(),
            url: None,
            callback_data: Some(callback_data.into()),
        };
        self.fields_mut().push_button(button, columns);
        self
    }

    /// Deliver without a notification sound.
    fn disable_notification(mut self, disable: bool) -> Self {
        self.fields_mut().set("disable_notification", disable);
        self
    }

    /// Send this message through `session` instead of the client's session.
    fn session(mut self, session: impl Into<String>) -> Self {
        self.fields_mut().set_session(session);
        self
    }

    fn has_recipient(&self) -> bool {
        self.fields().has_recipient()
    }

    fn to_not_given(&self) -> bool {
        !self.has_recipient()
    }

    fn has_session(&self) -> bool {
        self.fields().session().is_some()
    }

    fn payload(&self) -> Payload {
        self.fields().payload()
    }

    fn payload_value(&self, key: &str) -> Option<&PayloadValue> {
        self.fields().value(key)
    }

    fn backend(&self) -> Backend {
        self.fields().backend()
    }
}

/// Every message the client knows how to send.
#[derive(Debug, Clone)]
pub enum MessageKind {
    Text(TextMessage),
    File(FileMessage),
    Contact(ContactMessage),
    Location(LocationMessage),
    List(ListMessage),
}

impl MessageKind {
    pub fn fields(&self) -> &MessageFields {
        match self {
            MessageKind::Text(message) => message.fields(),
            MessageKind::File(message) => message.fields(),
            MessageKind::Contact(message) => message.fields(),
            MessageKind::Location(message) => message.fields(),
            MessageKind::List(message) => message.fields(),
        }
    }

    pub fn fields_mut(&mut self) -> &mut MessageFields {
        match self {
            MessageKind::Text(message) => message.fields_mut(),
            MessageKind::File(message) => message.fields_mut(),
            MessageKind::Contact(message) => message.fields_mut(),
            MessageKind::Location(message) => message.fields_mut(),
            MessageKind::List(message) => message.fields_mut(),
        }
    }

    /// Operation the client calls for this message.
    pub fn operation(&self) -> Operation {
        match self {
            MessageKind::Text(_) => Operation::SendMessage,
            MessageKind::File(message) => message.kind().operation(),
            MessageKind::Contact(_) => Operation::SendContact,
            MessageKind::Location(_) => Operation::SendLocation,
            MessageKind::List(_) => Operation::SendList,
        }
    }

    pub fn has_recipient(&self) -> bool {
        self.fields().has_recipient()
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.fields_mut().set_recipient(recipient);
    }

    pub fn session(&self) -> Option<&str> {
        self.fields().session()
    }

    pub fn payload(&self) -> Payload {
        self.fields().payload()
    }
}

impl From<TextMessage> for MessageKind {
    fn from(message: TextMessage) -> Self {
        MessageKind::Text(message)
    }
}

impl From<FileMessage> for MessageKind {
    fn from(message: FileMessage) -> Self {
        MessageKind::File(message)
    }
}

impl From<ContactMessage> for MessageKind {
    fn from(message: ContactMessage) -> Self {
        MessageKind::Contact(message)
    }
}

impl From<LocationMessage> for MessageKind {
    fn from(message: LocationMessage) -> Self {
        MessageKind::Location(message)
    }
}

impl From<ListMessage> for MessageKind {
    fn from(message: ListMessage) -> Self {
        MessageKind::List(message)
    }
}
