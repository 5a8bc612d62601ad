pub mod backend;
pub mod chunking;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod payload;
pub mod transport;
pub mod updates;

pub use backend::{Backend, BackendProfile, Operation, UnknownBackend};
pub use client::{ApiResponse, SendOutcome, WhatsappClient};
pub use config::WhatsappConfig;
pub use error::{MessageError, WhatsappError};
pub use message::{
    ContactMessage, FileKind, FileMessage, FileSource, ListMessage, LocationMessage,
    MessageBuilder, MessageKind, TextMessage,
};
pub use payload::{Payload, PayloadValue};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
pub use updates::UpdatesRequest;
