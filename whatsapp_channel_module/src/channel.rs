//! Notification channel that delivers through a [`WhatsappClient`].
//!
//! The host framework supplies the recipient ([`Notifiable`]) and the
//! message ([`WhatsappNotification`]); delivery failures are reported to a
//! [`FailureDispatcher`] before the error is handed back to the caller.

use std::collections::HashMap;

use send_whatsapp_module::{
    ContactMessage, FileMessage, ListMessage, LocationMessage, MessageKind, SendOutcome,
    TextMessage, WhatsappClient, WhatsappError,
};
use tracing::{debug, warn};

pub const CHANNEL_NAME: &str = "whatsapp";

/// Route key tried when the [`CHANNEL_NAME`] route is missing or blank.
pub const CHANNEL_TYPE_ROUTE: &str = "WhatsappChannel";

/// Something a notification can be delivered to.
pub trait Notifiable {
    /// Address for `channel`, if this target has one.
    fn route_notification_for(&self, channel: &str) -> Option<String>;
}

/// Ad-hoc target built from explicit routes.
#[derive(Debug, Clone, Default)]
pub struct RouteNotifiable {
    routes: HashMap<String, String>,
}

impl RouteNotifiable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, channel: impl Into<String>, address: impl Into<String>) -> Self {
        self.routes.insert(channel.into(), address.into());
        self
    }
}

impl Notifiable for RouteNotifiable {
    fn route_notification_for(&self, channel: &str) -> Option<String> {
        self.routes.get(channel).cloned()
    }
}

/// What a notification renders to.
#[derive(Debug, Clone)]
pub enum WhatsappContent {
    /// Sent as a text message with no other fields.
    Plain(String),
    Message(MessageKind),
}

impl From<&str> for WhatsappContent {
    fn from(text: &str) -> Self {
        WhatsappContent::Plain(text.to_string())
    }
}

impl From<String> for WhatsappContent {
    fn from(text: String) -> Self {
        WhatsappContent::Plain(text)
    }
}

impl From<MessageKind> for WhatsappContent {
    fn from(message: MessageKind) -> Self {
        WhatsappContent::Message(message)
    }
}

macro_rules! content_from_builder {
    ($($builder:ty),*) => {
        $(
            impl From<$builder> for WhatsappContent {
                fn from(message: $builder) -> Self {
                    WhatsappContent::Message(message.into())
                }
            }
        )*
    };
}

content_from_builder!(TextMessage, FileMessage, ContactMessage, LocationMessage, ListMessage);

pub trait WhatsappNotification {
    fn to_whatsapp(&self, notifiable: &dyn Notifiable) -> WhatsappContent;

    /// Name reported in [`NotificationFailed`].
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Failure event handed to the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFailed {
    pub channel: String,
    pub notification: String,
    pub recipient: Option<String>,
    pub error: String,
}

pub trait FailureDispatcher {
    fn dispatch(&self, event: NotificationFailed);
}

impl<F> FailureDispatcher for F
where
    F: Fn(NotificationFailed),
{
    fn dispatch(&self, event: NotificationFailed) {
        self(event)
    }
}

/// Reports failures to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureDispatcher;

impl FailureDispatcher for TracingFailureDispatcher {
    fn dispatch(&self, event: NotificationFailed) {
        warn!(
            "{} notification {} to {} failed: {}",
            event.channel,
            event.notification,
            event.recipient.as_deref().unwrap_or("<unknown>"),
            event.error
        );
    }
}

pub struct WhatsappChannel<D = TracingFailureDispatcher> {
    client: WhatsappClient,
    dispatcher: D,
}

impl WhatsappChannel<TracingFailureDispatcher> {
    pub fn new(client: WhatsappClient) -> Self {
        Self::with_dispatcher(client, TracingFailureDispatcher)
    }
}

impl<D: FailureDispatcher> WhatsappChannel<D> {
    pub fn with_dispatcher(client: WhatsappClient, dispatcher: D) -> Self {
        Self { client, dispatcher }
    }

    pub fn client(&self) -> &WhatsappClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut WhatsappClient {
        &mut self.client
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Deliver `notification` to `notifiable`.
    ///
    /// A message without a recipient is addressed through the notifiable's
    /// `whatsapp` route, then its `WhatsappChannel` route; when neither is
    /// set, nothing is sent.
    pub fn send(
        &self,
        notifiable: &dyn Notifiable,
        notification: &dyn WhatsappNotification,
    ) -> Result<SendOutcome, WhatsappError> {
        let mut message = match notification.to_whatsapp(notifiable) {
            WhatsappContent::Plain(text) => MessageKind::from(self.client.text(text)),
            WhatsappContent::Message(message) => message,
        };

        if !message.has_recipient() {
            let route = [CHANNEL_NAME, CHANNEL_TYPE_ROUTE].iter().find_map(|key| {
                notifiable
                    .route_notification_for(key)
                    .filter(|route| !route.trim().is_empty())
            });
            match route {
                Some(route) => message.set_recipient(route),
                None => {
                    debug!("{} has no whatsapp route; skipping", notification.name());
                    return Ok(SendOutcome::NotSent);
                }
            }
        }

        let recipient = recipient_of(&message);
        self.client.send(message).map_err(|error| {
            self.dispatcher.dispatch(NotificationFailed {
                channel: CHANNEL_NAME.to_string(),
                notification: notification.name(),
                recipient,
                error: error.to_string(),
            });
            error
        })
    }
}

fn recipient_of(message: &MessageKind) -> Option<String> {
    let fields = message.fields();
    fields
        .value(fields.profile().recipient_field)
        .and_then(|value| value.as_text())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use send_whatsapp_module::transport::{
        HttpTransport, RequestBody, TransportError, TransportRequest, TransportResponse,
    };
    use send_whatsapp_module::{Backend, MessageBuilder, WhatsappConfig};
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct SpyTransport {
        requests: Mutex<Vec<TransportRequest>>,
        status: Option<u16>,
    }

    impl SpyTransport {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status: None,
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status: Some(status),
            })
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpTransport for SpyTransport {
        fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.status {
                Some(status) => Err(TransportError::Status {
                    status,
                    body: Some(r#"{"exception":{"message":"session closed"}}"#.to_string()),
                }),
                None => Ok(TransportResponse {
                    status: 200,
                    body: "{}".to_string(),
                }),
            }
        }
    }

    fn client(transport: Arc<SpyTransport>) -> WhatsappClient {
        let config = WhatsappConfig {
            backend: Backend::WhatsappHttpApi,
            session: Some("default".to_string()),
            chunk_delay: Duration::ZERO,
            ..WhatsappConfig::default()
        };
        WhatsappClient::with_transport(&config, transport)
    }

    fn form_value(request: &TransportRequest, key: &str) -> Option<String> {
        match &request.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone()),
            RequestBody::Multipart(_) => None,
        }
    }

    struct OrderShipped;

    impl WhatsappNotification for OrderShipped {
        fn to_whatsapp(&self, _notifiable: &dyn Notifiable) -> WhatsappContent {
            "Your order shipped".into()
        }

        fn name(&self) -> String {
            "order_shipped".to_string()
        }
    }

    struct Addressed;

    impl WhatsappNotification for Addressed {
        fn to_whatsapp(&self, _notifiable: &dyn Notifiable) -> WhatsappContent {
            TextMessage::new(Backend::WhatsappHttpApi, "direct")
                .to("5511000000000")
                .into()
        }
    }

    #[test]
    fn plain_text_is_routed_to_notifiable() {
        let transport = SpyTransport::ok();
        let channel = WhatsappChannel::new(client(transport.clone()));
        let user = RouteNotifiable::new().route("whatsapp", "5511999999999");

        let outcome = channel.send(&user, &OrderShipped).unwrap();

        assert!(outcome.is_sent());
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with("/sendText"));
        assert_eq!(form_value(&requests[0], "chatId").as_deref(), Some("5511999999999"));
        assert_eq!(form_value(&requests[0], "text").as_deref(), Some("Your order shipped"));
    }

    #[test]
    fn explicit_recipient_wins_over_route() {
        let transport = SpyTransport::ok();
        let channel = WhatsappChannel::new(client(transport.clone()));
        let user = RouteNotifiable::new().route("whatsapp", "5511999999999");

        channel.send(&user, &Addressed).unwrap();

        let requests = transport.requests();
        assert_eq!(form_value(&requests[0], "chatId").as_deref(), Some("5511000000000"));
    }

    #[test]
    fn missing_route_sends_nothing() {
        let transport = SpyTransport::ok();
        let channel = WhatsappChannel::new(client(transport.clone()));

        let nobody = RouteNotifiable::new().route("mail", "a@example.com");
        assert_eq!(channel.send(&nobody, &OrderShipped).unwrap(), SendOutcome::NotSent);

        let blank = RouteNotifiable::new().route("whatsapp", "  ");
        assert_eq!(channel.send(&blank, &OrderShipped).unwrap(), SendOutcome::NotSent);

        assert!(transport.requests().is_empty());
    }

    #[test]
    fn type_keyed_route_is_used_when_whatsapp_route_is_blank() {
        let transport = SpyTransport::ok();
        let channel = WhatsappChannel::new(client(transport.clone()));

        let typed = RouteNotifiable::new().route(CHANNEL_TYPE_ROUTE, "5511777777777");
        channel.send(&typed, &OrderShipped).unwrap();

        let both = RouteNotifiable::new()
            .route("whatsapp", " ")
            .route("WhatsappChannel", "5511666666666");
        channel.send(&both, &OrderShipped).unwrap();

        let preferred = RouteNotifiable::new()
            .route("whatsapp", "5511555555555")
            .route("WhatsappChannel", "5511666666666");
        channel.send(&preferred, &OrderShipped).unwrap();

        let chat_ids: Vec<Option<String>> = transport
            .requests()
            .iter()
            .map(|request| form_value(request, "chatId"))
            .collect();
        assert_eq!(
            chat_ids,
            vec![
                Some("5511777777777".to_string()),
                Some("5511666666666".to_string()),
                Some("5511555555555".to_string()),
            ]
        );
    }

    #[test]
    fn failure_is_dispatched_then_returned() {
        let transport = SpyTransport::failing(422);
        let events = RefCell::new(Vec::new());
        let channel = WhatsappChannel::with_dispatcher(
            client(transport.clone()),
            |event: NotificationFailed| events.borrow_mut().push(event),
        );
        let user = RouteNotifiable::new().route("whatsapp", "5511999999999");

        let result = channel.send(&user, &OrderShipped);

        match result {
            Err(WhatsappError::BackendRespondedWithError { status, .. }) => assert_eq!(status, 422),
            other => panic!("unexpected result {:?}", other),
        }
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].channel, "whatsapp");
        assert_eq!(events[0].notification, "order_shipped");
        assert_eq!(events[0].recipient.as_deref(), Some("5511999999999"));
        assert!(events[0].error.contains("422 - session closed"));
    }

    #[test]
    fn success_dispatches_nothing() {
        let transport = SpyTransport::ok();
        let events = RefCell::new(Vec::new());
        let channel = WhatsappChannel::with_dispatcher(
            client(transport),
            |event: NotificationFailed| events.borrow_mut().push(event),
        );

        channel.send(&RouteNotifiable::new().route("whatsapp", "1"), &Addressed).unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn default_notification_name_is_type_name() {
        assert!(Addressed.name().ends_with("Addressed"));
    }
}
