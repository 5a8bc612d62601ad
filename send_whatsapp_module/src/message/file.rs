//! File and media messages.
//!
//! How the file travels depends on the backend:
//! - `wppconnect-server` wants a data URI in `base64` (`base64Ptt` for voice).
//! - `whatsapp-http-api` wants a nested `file` object carrying either
//!   base64 `data` or a `url`.
//! - `default` takes a multipart upload for local files and a plain `path`
//!   for anything it cannot open.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::backend::{Backend, Operation};
use crate::error::MessageError;
use crate::payload::{AttachmentSource, FileAttachment, PayloadValue};
use crate::transport::RequestBody;

use super::{MessageBuilder, MessageFields};

const CAPTION_FIELD: &str = "caption";
const FILE_FIELD: &str = "file";
const PATH_FIELD: &str = "path";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Document,
    Photo,
    Audio,
    Video,
    Animation,
    File64,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Document => "document",
            FileKind::Photo => "photo",
            FileKind::Audio => "audio",
            FileKind::Video => "video",
            FileKind::Animation => "animation",
            FileKind::File64 => "file64",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            FileKind::Document => Operation::SendDocument,
            FileKind::Photo => Operation::SendPhoto,
            FileKind::Audio => Operation::SendAudio,
            FileKind::Video => Operation::SendVideo,
            FileKind::Animation => Operation::SendAnimation,
            FileKind::File64 => Operation::SendFile64,
        }
    }
}

/// Where the file content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// Local path. Paths that cannot be opened are passed to the backend
    /// verbatim where it supports that.
    Path(PathBuf),
    /// Content already in memory (read from a stream).
    Bytes {
        data: Vec<u8>,
        filename: Option<String>,
    },
    /// Remote file.
    Url(String),
    /// Raw base64 content, with or without a `data:` prefix.
    Base64(String),
}

impl FileSource {
    pub fn from_reader(mut reader: impl Read, filename: Option<String>) -> std::io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(FileSource::Bytes { data, filename })
    }

    fn filename(&self) -> Option<String> {
        match self {
            FileSource::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            FileSource::Bytes { filename, .. } => filename.clone(),
            FileSource::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            FileSource::Base64(_) => None,
        }
    }
}

impl From<&str> for FileSource {
    fn from(value: &str) -> Self {
        if is_remote(value) {
            FileSource::Url(value.to_string())
        } else {
            FileSource::Path(PathBuf::from(value))
        }
    }
}

impl From<String> for FileSource {
    fn from(value: String) -> Self {
        FileSource::from(value.as_str())
    }
}

impl From<PathBuf> for FileSource {
    fn from(value: PathBuf) -> Self {
        FileSource::Path(value)
    }
}

impl From<&Path> for FileSource {
    fn from(value: &Path) -> Self {
        FileSource::Path(value.to_path_buf())
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}

fn guess_mime(name: Option<&str>) -> String {
    name.and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

fn data_uri(mime_type: &str, encoded: &str) -> String {
    format!("data:{};base64,{}", mime_type, encoded)
}

/// Photo, audio, video, animation or document message.
#[derive(Debug, Clone)]
pub struct FileMessage {
    fields: MessageFields,
    kind: FileKind,
}

impl FileMessage {
    pub fn new(backend: Backend, caption: impl Into<String>) -> Self {
        let mut message = Self {
            fields: MessageFields::new(backend),
            kind: FileKind::Document,
        };
        let caption = caption.into();
        if !caption.is_empty() {
            message.set_caption(caption);
        }
        message
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.set_caption(caption.into());
        self
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Attach a file of the given kind.
    pub fn file(
        mut self,
        source: impl Into<FileSource>,
        kind: FileKind,
        filename: Option<&str>,
    ) -> Result<Self, MessageError> {
        let source = source.into();
        self.kind = kind;
        self.rekey_caption();

        let filename = filename.map(str::to_string).or_else(|| source.filename());
        match self.fields.backend() {
            Backend::WppConnect => self.embed_data_uri(source, filename)?,
            Backend::WhatsappHttpApi => self.embed_file_object(source, filename)?,
            Backend::Default => self.attach(source, filename),
        }
        Ok(self)
    }

    pub fn photo(self, source: impl Into<FileSource>) -> Result<Self, MessageError> {
        self.file(source, FileKind::Photo, None)
    }

    /// Voice note or music file.
    pub fn audio(self, source: impl Into<FileSource>) -> Result<Self, MessageError> {
        self.file(source, FileKind::Audio, None)
    }

    pub fn video(self, source: impl Into<FileSource>) -> Result<Self, MessageError> {
        self.file(source, FileKind::Video, None)
    }

    /// GIF or silent H.264 clip.
    pub fn animation(self, source: impl Into<FileSource>) -> Result<Self, MessageError> {
        self.file(source, FileKind::Animation, None)
    }

    pub fn document(
        self,
        source: impl Into<FileSource>,
        filename: Option<&str>,
    ) -> Result<Self, MessageError> {
        self.file(source, FileKind::Document, filename)
    }

    /// Content that is already base64 encoded.
    pub fn file64(
        self,
        encoded: impl Into<String>,
        filename: Option<&str>,
    ) -> Result<Self, MessageError> {
        self.file(FileSource::Base64(encoded.into()), FileKind::File64, filename)
    }

    /// True when the payload carries binary content that needs a multipart
    /// upload.
    pub fn has_file(&self) -> bool {
        matches!(self.fields.value(FILE_FIELD), Some(PayloadValue::File(_)))
    }

    /// Request body for this message: multipart when [`Self::has_file`],
    /// form fields otherwise.
    pub fn to_request_body(&self) -> RequestBody {
        let payload = self.fields.payload();
        if self.has_file() {
            RequestBody::Multipart(payload.to_multipart())
        } else {
            RequestBody::Form(payload.to_form_pairs())
        }
    }

    fn caption_field(&self) -> &'static str {
        match (self.fields.backend(), self.kind) {
            (Backend::WppConnect, FileKind::Photo) => CAPTION_FIELD,
            (Backend::WppConnect, _) => self.fields.profile().text_field,
            _ => CAPTION_FIELD,
        }
    }

    fn set_caption(&mut self, caption: String) {
        let field = self.caption_field();
        self.fields.set(field, caption);
    }

    fn rekey_caption(&mut self) {
        let text_field = self.fields.profile().text_field;
        let existing = self
            .fields
            .remove(CAPTION_FIELD)
            .or_else(|| self.fields.remove(text_field));
        if let Some(PayloadValue::Text(caption)) = existing {
            self.set_caption(caption);
        }
    }

    fn embed_data_uri(
        &mut self,
        source: FileSource,
        filename: Option<String>,
    ) -> Result<(), MessageError> {
        let field = match self.kind {
            FileKind::Audio => "base64Ptt",
            _ => "base64",
        };
        let encoded = match source {
            FileSource::Base64(raw) if raw.trim_start().starts_with("data:") => raw,
            FileSource::Base64(raw) => data_uri(&guess_mime(filename.as_deref()), raw.trim()),
            FileSource::Path(path) => {
                let data = fs::read(&path)?;
                let mime_type = guess_mime(path.to_str());
                data_uri(&mime_type, &STANDARD.encode(data))
            }
            FileSource::Bytes { data, .. } => {
                data_uri(&guess_mime(filename.as_deref()), &STANDARD.encode(data))
            }
            FileSource::Url(url) => {
                let (data, mime_type) = fetch_remote(&url)?;
                let mime_type = mime_type.unwrap_or_else(|| guess_mime(filename.as_deref()));
                data_uri(&mime_type, &STANDARD.encode(data))
            }
        };
        self.fields.set(field, encoded);
        if let Some(filename) = filename {
            self.fields.set("filename", filename);
        }
        Ok(())
    }

    fn embed_file_object(
        &mut self,
        source: FileSource,
        filename: Option<String>,
    ) -> Result<(), MessageError> {
        let mut object = Map::new();
        let mime_type = match &source {
            FileSource::Path(path) => guess_mime(path.to_str()),
            _ => guess_mime(filename.as_deref()),
        };
        object.insert("mimetype".to_string(), json!(mime_type));
        if let Some(filename) = &filename {
            object.insert("filename".to_string(), json!(filename));
        }
        match source {
            FileSource::Path(path) => {
                let data = fs::read(&path)?;
                object.insert("data".to_string(), json!(STANDARD.encode(data)));
            }
            FileSource::Bytes { data, .. } => {
                object.insert("data".to_string(), json!(STANDARD.encode(data)));
            }
            FileSource::Url(url) => {
                object.insert("url".to_string(), json!(url));
            }
            FileSource::Base64(raw) => {
                object.insert("data".to_string(), json!(raw.trim()));
            }
        }
        self.fields.set(FILE_FIELD, PayloadValue::Json(Value::Object(object)));
        Ok(())
    }

    fn attach(&mut self, source: FileSource, filename: Option<String>) {
        if let Some(filename) = &filename {
            self.fields.set("fileName", filename.clone());
        }
        let attachment_source = match source {
            FileSource::Path(path) if is_readable_file(&path) => AttachmentSource::Path(path),
            FileSource::Bytes { data, .. } => AttachmentSource::Bytes(data),
            FileSource::Path(path) => {
                debug!("{} is not a readable file; sending as path", path.display());
                self.fields
                    .set(PATH_FIELD, path.to_string_lossy().into_owned());
                return;
            }
            FileSource::Url(raw) | FileSource::Base64(raw) => {
                self.fields.set(PATH_FIELD, raw);
                return;
            }
        };
        let mime_type = match &attachment_source {
            AttachmentSource::Path(path) => guess_mime(path.to_str()),
            AttachmentSource::Bytes(_) => guess_mime(filename.as_deref()),
        };
        self.fields.set(
            FILE_FIELD,
            FileAttachment {
                part_name: self.kind.as_str().to_string(),
                filename,
                mime_type,
                source: attachment_source,
            },
        );
    }
}

/// Download a remote file, returning its bytes and the served content type.
fn fetch_remote(url: &str) -> Result<(Vec<u8>, Option<String>), MessageError> {
    let fetch_error = |reason: String| MessageError::Fetch {
        url: url.to_string(),
        reason,
    };
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|err| fetch_error(err.to_string()))?;
    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let data = response
        .bytes()
        .map_err(|err| fetch_error(err.to_string()))?;
    Ok((data.to_vec(), mime_type))
}

impl MessageBuilder for FileMessage {
    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }
}
