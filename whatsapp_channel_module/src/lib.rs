pub mod channel;

pub use channel::{
    FailureDispatcher, Notifiable, NotificationFailed, RouteNotifiable, TracingFailureDispatcher,
    WhatsappChannel, WhatsappContent, WhatsappNotification, CHANNEL_NAME, CHANNEL_TYPE_ROUTE,
};
