//! Client for the WhatsApp gateway HTTP APIs.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendProfile, Operation};
use crate::chunking::chunk;
use crate::config::{WhatsappConfig, DEFAULT_BASE_URI, DEFAULT_CHUNK_DELAY, DEFAULT_SESSION_FIELD};
use crate::error::WhatsappError;
use crate::message::{
    ContactMessage, FileKind, FileMessage, ListMessage, LocationMessage, MessageBuilder,
    MessageKind, TextMessage, REPLY_MARKUP_FIELD,
};
use crate::payload::Payload;
use crate::transport::{
    HttpTransport, ReqwestTransport, RequestBody, TransportRequest, TransportResponse,
};

/// Decoded gateway response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body. Empty bodies decode to `null`, non-JSON bodies to a string.
    pub body: Value,
}

impl ApiResponse {
    fn from_transport(response: TransportResponse) -> Self {
        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or(Value::String(response.body))
        };
        Self {
            status: response.status,
            body,
        }
    }
}

/// Result of [`WhatsappClient::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// No recipient was available; nothing went over the wire.
    NotSent,
    Sent(ApiResponse),
    /// One response per transmitted chunk, in chunk order.
    Chunked(Vec<ApiResponse>),
}

impl SendOutcome {
    pub fn responses(&self) -> Vec<&ApiResponse> {
        match self {
            SendOutcome::NotSent => Vec::new(),
            SendOutcome::Sent(response) => vec![response],
            SendOutcome::Chunked(responses) => responses.iter().collect(),
        }
    }

    pub fn is_sent(&self) -> bool {
        !matches!(self, SendOutcome::NotSent)
    }
}

pub struct WhatsappClient {
    session: Option<String>,
    session_field: String,
    base_uri: String,
    backend: Backend,
    api_key: Option<String>,
    bearer_token: Option<String>,
    endpoint_overrides: HashMap<String, String>,
    chunk_delay: Duration,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for WhatsappClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsappClient")
            .field("session", &self.session)
            .field("session_field", &self.session_field)
            .field("base_uri", &self.base_uri)
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint_overrides", &self.endpoint_overrides)
            .field("chunk_delay", &self.chunk_delay)
            .finish()
    }
}

impl WhatsappClient {
    pub fn new(
        session: Option<String>,
        base_uri: Option<&str>,
        backend: Backend,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            session,
            session_field: DEFAULT_SESSION_FIELD.to_string(),
            base_uri: normalize_base_uri(base_uri.unwrap_or(DEFAULT_BASE_URI)),
            backend,
            api_key: None,
            bearer_token: None,
            endpoint_overrides: HashMap::new(),
            chunk_delay: DEFAULT_CHUNK_DELAY,
            transport,
        }
    }

    /// Client using the blocking reqwest transport.
    pub fn from_config(config: &WhatsappConfig) -> Result<Self, WhatsappError> {
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(WhatsappError::CommunicationFailure)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &WhatsappConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            session: config.session.clone(),
            session_field: config.session_field.clone(),
            base_uri: normalize_base_uri(&config.base_uri),
            backend: config.backend,
            api_key: config.api_key.clone(),
            bearer_token: config.bearer_token.clone(),
            endpoint_overrides: config.endpoint_overrides.clone(),
            chunk_delay: config.chunk_delay,
            transport,
        }
    }

    pub fn from_env() -> Result<Self, WhatsappError> {
        Self::from_config(&WhatsappConfig::from_env())
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn set_session(&mut self, session: impl Into<String>) -> &mut Self {
        self.session = Some(session.into());
        self
    }

    pub fn set_session_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.session_field = field.into();
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn set_base_uri(&mut self, base_uri: &str) -> &mut Self {
        self.base_uri = normalize_base_uri(base_uri);
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn profile(&self) -> &'static BackendProfile {
        self.backend.profile()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn set_bearer_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn set_endpoint_override(
        &mut self,
        operation: Operation,
        endpoint: impl Into<String>,
    ) -> &mut Self {
        self.endpoint_overrides
            .insert(operation.as_str().to_string(), endpoint.into());
        self
    }

    pub fn set_chunk_delay(&mut self, delay: Duration) -> &mut Self {
        self.chunk_delay = delay;
        self
    }

    pub fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) -> &mut Self {
        self.transport = transport;
        self
    }

    /// Endpoint name this client uses for `operation`.
    pub fn endpoint(&self, operation: Operation) -> String {
        self.profile()
            .resolve_endpoint(operation, &self.endpoint_overrides)
    }

    pub fn text(&self, content: impl Into<String>) -> TextMessage {
        TextMessage::new(self.backend, content)
    }

    pub fn file(&self, caption: impl Into<String>) -> FileMessage {
        FileMessage::new(self.backend, caption)
    }

    pub fn contact(&self, phone_number: impl Into<String>) -> ContactMessage {
        ContactMessage::new(self.backend, phone_number)
    }

    pub fn location(&self, latitude: f64, longitude: f64) -> LocationMessage {
        LocationMessage::new(self.backend, latitude, longitude)
    }

    pub fn list(&self, question: impl Into<String>) -> ListMessage {
        ListMessage::new(self.backend, question)
    }

    pub fn send_message(&self, params: &Payload) -> Result<ApiResponse, WhatsappError> {
        self.send_request(Operation::SendMessage, params, false)
    }

    /// Send a file payload; `kind` selects the endpoint.
    pub fn send_file(
        &self,
        params: &Payload,
        kind: FileKind,
        multipart: bool,
    ) -> Result<ApiResponse, WhatsappError> {
        self.send_request(kind.operation(), params, multipart)
    }

    pub fn send_contact(&self, params: &Payload) -> Result<ApiResponse, WhatsappError> {
        self.send_request(Operation::SendContact, params, false)
    }

    pub fn send_location(&self, params: &Payload) -> Result<ApiResponse, WhatsappError> {
        self.send_request(Operation::SendLocation, params, false)
    }

    pub fn send_list(&self, params: &Payload) -> Result<ApiResponse, WhatsappError> {
        self.send_request(Operation::SendList, params, false)
    }

    pub fn get_updates(&self, params: &Payload) -> Result<ApiResponse, WhatsappError> {
        self.send_request(Operation::GetUpdates, params, false)
    }

    /// Send a built message.
    ///
    /// Messages without a recipient are skipped. A session set on the
    /// message replaces the client session for this call only. Chunked text
    /// goes out one request per non-empty segment, in order, with the
    /// configured pause in between; reply markup rides on the last segment.
    pub fn send(&self, message: impl Into<MessageKind>) -> Result<SendOutcome, WhatsappError> {
        let message = message.into();
        if !message.has_recipient() {
            debug!(
                "skipping {} without recipient",
                message.operation().as_str()
            );
            return Ok(SendOutcome::NotSent);
        }

        let session = self.active_session(&message)?;
        match &message {
            MessageKind::Text(text) if text.is_chunked() => self.send_chunked(text, session),
            MessageKind::File(file) => self
                .request(
                    file.kind().operation(),
                    &file.fields().payload(),
                    file.has_file(),
                    Some(session),
                )
                .map(SendOutcome::Sent),
            other => self
                .request(other.operation(), &other.payload(), false, Some(session))
                .map(SendOutcome::Sent),
        }
    }

    /// Session for `message`: its own override when set and not blank,
    /// otherwise the client session.
    fn active_session<'a>(&'a self, message: &'a MessageKind) -> Result<&'a str, WhatsappError> {
        let non_blank = |session: &'a str| Some(session.trim()).filter(|s| !s.is_empty());
        message
            .session()
            .and_then(non_blank)
            .or_else(|| self.session.as_deref().and_then(non_blank))
            .ok_or(WhatsappError::SessionNotProvided)
    }

    fn send_chunked(
        &self,
        message: &TextMessage,
        session: &str,
    ) -> Result<SendOutcome, WhatsappError> {
        let text_field = message.fields().profile().text_field;
        let mut base = message.payload();
        let markup = base.remove(REPLY_MARKUP_FIELD);
        let text = message.text().unwrap_or_default();

        let segments: Vec<&str> = chunk(text, message.chunk_size())
            .into_iter()
            .map(|segment| segment.text)
            .filter(|segment| !segment.trim().is_empty())
            .collect();

        if segments.is_empty() {
            // Nothing worth splitting; send the message as written.
            return self
                .request(Operation::SendMessage, &message.payload(), false, Some(session))
                .map(SendOutcome::Sent);
        }

        let mut responses = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 && !self.chunk_delay.is_zero() {
                thread::sleep(self.chunk_delay);
            }
            let mut params = base.clone();
            params.insert(text_field, *segment);
            if index + 1 == segments.len() {
                if let Some(markup) = markup.clone() {
                    params.insert(REPLY_MARKUP_FIELD, markup);
                }
            }
            debug!("sending chunk {}/{}", index + 1, segments.len());
            responses.push(self.request(
                Operation::SendMessage,
                &params,
                false,
                Some(session),
            )?);
        }
        Ok(SendOutcome::Chunked(responses))
    }

    fn send_request(
        &self,
        operation: Operation,
        params: &Payload,
        multipart: bool,
    ) -> Result<ApiResponse, WhatsappError> {
        self.request(operation, params, multipart, self.session.as_deref())
    }

    fn request(
        &self,
        operation: Operation,
        params: &Payload,
        multipart: bool,
        session: Option<&str>,
    ) -> Result<ApiResponse, WhatsappError> {
        let session = session
            .map(str::trim)
            .filter(|session| !session.is_empty())
            .ok_or(WhatsappError::SessionNotProvided)?;

        let endpoint = self.endpoint(operation);
        let url = format!("{}/{}", self.base_uri, endpoint);

        let mut params = params.clone();
        params.insert(self.session_field.as_str(), session);

        let body = if multipart {
            RequestBody::Multipart(params.to_multipart())
        } else {
            RequestBody::Form(params.to_form_pairs())
        };

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(api_key) = self.api_key.as_ref() {
            headers.push(("X-Api-Key".to_string(), api_key.clone()));
        }
        if let Some(token) = self.bearer_token.as_ref() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = TransportRequest { url, headers, body };
        match self.transport.post(&request) {
            Ok(response) => {
                info!(
                    "whatsapp {} via {} returned {}",
                    operation, endpoint, response.status
                );
                Ok(ApiResponse::from_transport(response))
            }
            Err(err) => {
                let error = WhatsappError::from_transport(err);
                warn!("whatsapp {} via {} failed: {}", operation, endpoint, error);
                Err(error)
            }
        }
    }
}

fn normalize_base_uri(base_uri: &str) -> String {
    base_uri.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MultipartPart;
    use crate::transport::TransportError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<TransportRequest>>,
        failures: Mutex<Vec<TransportError>>,
    }

    impl RecordingTransport {
        fn failing_with(error: TransportError) -> Self {
            let transport = Self::default();
            transport.failures.lock().unwrap().push(error);
            transport
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpTransport for RecordingTransport {
        fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(error) = self.failures.lock().unwrap().pop() {
                return Err(error);
            }
            Ok(TransportResponse {
                status: 200,
                body: r#"{"status":"success"}"#.to_string(),
            })
        }
    }

    fn client(backend: Backend, transport: Arc<RecordingTransport>) -> WhatsappClient {
        let config = WhatsappConfig {
            backend,
            session: Some("default".to_string()),
            base_uri: "http://gateway.test/api/".to_string(),
            chunk_delay: Duration::ZERO,
            ..WhatsappConfig::default()
        };
        WhatsappClient::with_transport(&config, transport)
    }

    fn form(request: &TransportRequest) -> Vec<(String, String)> {
        match &request.body {
            RequestBody::Form(pairs) => pairs.clone(),
            other => panic!("expected form body, got {:?}", other),
        }
    }

    fn field<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn http_api_text_hits_send_text() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::WhatsappHttpApi, transport.clone());

        let outcome = client
            .send(client.text("hello").to("5511999999999"))
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://gateway.test/api/sendText");
        let pairs = form(&requests[0]);
        assert_eq!(
            pairs,
            vec![
                ("text".to_string(), "hello".to_string()),
                ("chatId".to_string(), "5511999999999".to_string()),
                ("session".to_string(), "default".to_string()),
            ]
        );
        assert_eq!(requests[0].header("accept"), Some("application/json"));
        match outcome {
            SendOutcome::Sent(response) => assert_eq!(response.body["status"], "success"),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn missing_session_fails_before_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let mut config = WhatsappConfig {
            session: None,
            ..WhatsappConfig::default()
        };
        config.chunk_delay = Duration::ZERO;
        let client = WhatsappClient::with_transport(&config, transport.clone());

        let result = client.send(client.text("hi").to("123"));
        assert!(matches!(result, Err(WhatsappError::SessionNotProvided)));

        let mut blank = WhatsappClient::with_transport(&config, transport.clone());
        blank.set_session("   ");
        let result = blank.send_message(&Payload::new());
        assert!(matches!(result, Err(WhatsappError::SessionNotProvided)));

        assert!(transport.requests().is_empty());
    }

    #[test]
    fn unset_session_in_environment_is_never_defaulted() {
        let transport = Arc::new(RecordingTransport::default());
        let config = WhatsappConfig::from_lookup(|_| None);
        let client = WhatsappClient::with_transport(&config, transport.clone());

        assert_eq!(client.session(), None);
        let result = client.send(client.text("hi").to("1"));
        assert!(matches!(result, Err(WhatsappError::SessionNotProvided)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn blank_chunked_text_still_requires_a_session() {
        let transport = Arc::new(RecordingTransport::default());
        let config = WhatsappConfig {
            session: None,
            chunk_delay: Duration::ZERO,
            ..WhatsappConfig::default()
        };
        let client = WhatsappClient::with_transport(&config, transport.clone());

        let result = client.send(client.text("   ").to("1").chunk(10));
        assert!(matches!(result, Err(WhatsappError::SessionNotProvided)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn blank_chunked_text_is_sent_once_as_written() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        let outcome = client.send(client.text("   ").to("1").chunk(10)).unwrap();

        assert!(matches!(outcome, SendOutcome::Sent(_)));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(field(&form(&requests[0]), "text"), Some("   "));
    }

    #[test]
    fn blank_message_session_falls_back_to_client_session() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        client
            .send(client.text("hi").to("123").session("  "))
            .unwrap();

        assert_eq!(field(&form(&transport.requests()[0]), "session"), Some("default"));
    }

    #[test]
    fn chunks_use_the_message_backend_text_field() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        let message = TextMessage::new(Backend::WppConnect, "alpha beta gamma delta")
            .to("5511")
            .chunk(11);
        client.send(message).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        let texts: Vec<Option<String>> = requests
            .iter()
            .map(|request| field(&form(request), "message").map(str::to_string))
            .collect();
        assert_eq!(
            texts,
            vec![Some("alpha beta ".to_string()), Some("gamma delta".to_string())]
        );
        for request in &requests {
            assert!(field(&form(request), "text").is_none());
        }
    }

    #[test]
    fn chunks_are_spaced_by_the_configured_delay() {
        let transport = Arc::new(RecordingTransport::default());
        let mut client = client(Backend::Default, transport.clone());
        let delay = Duration::from_millis(50);
        client.set_chunk_delay(delay);

        let started = std::time::Instant::now();
        let outcome = client
            .send(client.text("one two three").to("1").chunk(4))
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome.responses().len(), 3);
        assert!(elapsed >= delay * 2, "chunks sent after {:?}", elapsed);
        let texts: Vec<String> = transport
            .requests()
            .iter()
            .map(|request| field(&form(request), "text").unwrap_or_default().to_string())
            .collect();
        assert_eq!(texts, vec!["one ", "two ", "three"]);
    }

    #[test]
    fn message_without_recipient_is_not_sent() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        assert_eq!(client.send(client.text("hi")).unwrap(), SendOutcome::NotSent);
        assert_eq!(
            client.send(client.text("hi").to("")).unwrap(),
            SendOutcome::NotSent
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn message_session_overrides_client_session() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        client
            .send(client.text("hi").to("123").session("support"))
            .unwrap();
        client.send(client.text("hi").to("123")).unwrap();

        let requests = transport.requests();
        assert_eq!(field(&form(&requests[0]), "session"), Some("support"));
        assert_eq!(field(&form(&requests[1]), "session"), Some("default"));
        assert_eq!(client.session(), Some("default"));
    }

    #[test]
    fn auth_headers_are_attached() {
        let transport = Arc::new(RecordingTransport::default());
        let mut client = client(Backend::Default, transport.clone());
        client.set_api_key("key-1").set_bearer_token("tok-2");

        client.send(client.text("hi").to("123")).unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.header("x-api-key"), Some("key-1"));
        assert_eq!(request.header("authorization"), Some("Bearer tok-2"));
    }

    #[test]
    fn custom_session_field_and_override() {
        let transport = Arc::new(RecordingTransport::default());
        let mut client = client(Backend::WppConnect, transport.clone());
        client
            .set_session_field("sessionName")
            .set_endpoint_override(Operation::SendMessage, "messages/text");

        client.send(client.text("oi").to("5511")).unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://gateway.test/api/messages/text");
        let pairs = form(request);
        assert_eq!(field(&pairs, "sessionName"), Some("default"));
        assert_eq!(field(&pairs, "phone"), Some("5511"));
        assert_eq!(field(&pairs, "message"), Some("oi"));
    }

    #[test]
    fn chunked_text_sends_markup_only_on_last_segment() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        let message = client
            .text("alpha beta gamma delta epsilon")
            .to("123")
            .button("Open", "https://example.com", 2)
            .chunk(11);
        let outcome = client.send(message).unwrap();

        let requests = transport.requests();
        assert!(requests.len() > 1);
        match outcome {
            SendOutcome::Chunked(responses) => assert_eq!(responses.len(), requests.len()),
            other => panic!("unexpected outcome {:?}", other),
        }

        let texts: Vec<String> = requests
            .iter()
            .map(|request| field(&form(request), "text").unwrap_or_default().to_string())
            .collect();
        assert_eq!(texts.concat(), "alpha beta gamma delta epsilon");

        let (last, rest) = requests.split_last().unwrap();
        assert!(field(&form(last), "reply_markup").is_some());
        for request in rest {
            assert!(field(&form(request), "reply_markup").is_none());
            assert_eq!(field(&form(request), "number"), Some("123"));
        }
    }

    #[test]
    fn chunk_failure_stops_remaining_chunks() {
        let transport = Arc::new(RecordingTransport::failing_with(TransportError::Status {
            status: 500,
            body: Some(r#"{"message":"boom"}"#.to_string()),
        }));
        let client = client(Backend::Default, transport.clone());

        let result = client.send(client.text("one two three four").to("1").chunk(4));
        match result {
            Err(WhatsappError::BackendRespondedWithError {
                status,
                description,
            }) => {
                assert_eq!(status, 500);
                assert_eq!(description, "boom");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn connection_errors_are_communication_failures() {
        let transport = Arc::new(RecordingTransport::failing_with(TransportError::Timeout(
            "deadline elapsed".to_string(),
        )));
        let client = client(Backend::Default, transport);
        let result = client.send(client.text("hi").to("1"));
        assert!(matches!(result, Err(WhatsappError::CommunicationFailure(_))));
    }

    #[test]
    fn wppconnect_contact_targets_contact_vcard() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::WppConnect, transport.clone());

        client
            .send(client.contact("123").to("123").first_name("Ana"))
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://gateway.test/api/contact-vcard");
        let pairs = form(request);
        assert_eq!(field(&pairs, "phone"), Some("123"));
        assert_eq!(field(&pairs, "contactsId"), Some("123"));
        assert_eq!(field(&pairs, "name"), Some("Ana"));
        assert_eq!(field(&pairs, "first_name"), Some("Ana"));
    }

    #[test]
    fn file_with_attachment_goes_multipart() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::Default, transport.clone());

        let source = crate::message::FileSource::Bytes {
            data: b"%PDF".to_vec(),
            filename: Some("a.pdf".to_string()),
        };
        let message = client
            .file("report")
            .to("123")
            .document(source, None)
            .unwrap();
        client.send(message).unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://gateway.test/api/sendFile");
        match &request.body {
            RequestBody::Multipart(parts) => {
                assert!(parts.iter().any(|part| matches!(part, MultipartPart::File(_))));
                assert!(parts.iter().any(|part| matches!(
                    part,
                    MultipartPart::Text { name, contents } if name == "session" && contents == "default"
                )));
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn location_and_list_use_their_endpoints() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client(Backend::WhatsappHttpApi, transport.clone());

        client.send(client.location(1.0, 2.0).to("1")).unwrap();
        client
            .send(client.list("Lunch?").to("1").choices(["a", "b"]))
            .unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://gateway.test/api/sendLocation".to_string(),
                "http://gateway.test/api/sendList".to_string(),
            ]
        );
    }

    #[test]
    fn non_json_bodies_are_kept_as_text() {
        let response = ApiResponse::from_transport(TransportResponse {
            status: 200,
            body: "OK".to_string(),
        });
        assert_eq!(response.body, Value::String("OK".to_string()));

        let response = ApiResponse::from_transport(TransportResponse {
            status: 204,
            body: String::new(),
        });
        assert_eq!(response.body, Value::Null);
    }
}
