//! Ordered request payloads and their wire encodings.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

/// Binary content attached to a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    /// Multipart part name (the file kind, e.g. `document`).
    pub part_name: String,
    pub filename: Option<String>,
    pub mime_type: String,
    pub source: AttachmentSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentSource {
    /// Opened by the transport when the request is sent.
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Nested structure, flattened to bracketed keys when form encoded.
    Json(Value),
    File(FileAttachment),
}

impl PayloadValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PayloadValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, PayloadValue::File(_))
    }

    /// Value rendered for a form field. Files and nested values are not
    /// scalar and yield `None`.
    fn scalar(&self) -> Option<String> {
        match self {
            PayloadValue::Text(value) => Some(value.clone()),
            PayloadValue::Integer(value) => Some(value.to_string()),
            PayloadValue::Float(value) => Some(value.to_string()),
            PayloadValue::Bool(value) => Some(value.to_string()),
            PayloadValue::Json(_) | PayloadValue::File(_) => None,
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

impl From<&String> for PayloadValue {
    fn from(value: &String) -> Self {
        PayloadValue::Text(value.clone())
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Integer(value)
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        PayloadValue::Integer(value.into())
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        PayloadValue::Float(value)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

impl From<Value> for PayloadValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => PayloadValue::Text(text),
            Value::Bool(flag) => PayloadValue::Bool(flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => PayloadValue::Integer(integer),
                None => PayloadValue::Float(number.as_f64().unwrap_or_default()),
            },
            other => PayloadValue::Json(other),
        }
    }
}

impl From<FileAttachment> for PayloadValue {
    fn from(value: FileAttachment) -> Self {
        PayloadValue::File(value)
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text { name: String, contents: String },
    File(FileAttachment),
}

/// Field name to value mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: IndexMap<String, PayloadValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PayloadValue> {
        self.fields.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PayloadValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Merge another payload in; incoming values replace existing ones.
    pub fn merge(&mut self, other: Payload) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    pub fn has_file_attachment(&self) -> bool {
        self.fields.values().any(PayloadValue::is_file)
    }

    /// `application/x-www-form-urlencoded` pairs. Nested values become
    /// bracketed keys such as `file[mimetype]`.
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            match value {
                PayloadValue::Json(nested) => flatten_json(key, nested, &mut pairs),
                PayloadValue::File(attachment) => {
                    // Form bodies cannot carry bytes; send the reference instead.
                    if let AttachmentSource::Path(path) = &attachment.source {
                        pairs.push((key.clone(), path.to_string_lossy().into_owned()));
                    }
                }
                scalar => {
                    if let Some(rendered) = scalar.scalar() {
                        pairs.push((key.clone(), rendered));
                    }
                }
            }
        }
        pairs
    }

    /// Multipart parts: every field becomes a named text part except file
    /// attachments, which pass through as they are.
    pub fn to_multipart(&self) -> Vec<MultipartPart> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            match value {
                PayloadValue::File(attachment) => parts.push(MultipartPart::File(attachment.clone())),
                PayloadValue::Json(nested) => {
                    let mut pairs = Vec::new();
                    flatten_json(key, nested, &mut pairs);
                    parts.extend(
                        pairs
                            .into_iter()
                            .map(|(name, contents)| MultipartPart::Text { name, contents }),
                    );
                }
                scalar => {
                    if let Some(contents) = scalar.scalar() {
                        parts.push(MultipartPart::Text {
                            name: key.clone(),
                            contents,
                        });
                    }
                }
            }
        }
        parts
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<PayloadValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (key, value) in iter {
            payload.insert(key, value);
        }
        payload
    }
}

fn flatten_json(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_json(&format!("{}[{}]", prefix, key), nested, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_json(&format!("{}[{}]", prefix, index), nested, out);
            }
        }
        Value::String(text) => out.push((prefix.to_string(), text.clone())),
        Value::Null => out.push((prefix.to_string(), String::new())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
