//! # tm-notifications
//!
//! Email alerting service for Tasking Manager RS.
//!
//! Decides whether a notification may be sent (verification-gated dispatch),
//! formats the message for its category, and hands it to a mail transport.
//! Fire-and-forget per call: no queueing, no retries, no per-recipient
//! throttling state.
//!
//! ## Components
//!
//! - [`AlertRequest`] — transient value object describing one alert
//! - [`AlertGate`] — eligibility decision (non-empty address, verified email)
//! - [`Dispatcher`] — builds the message and hands it to the transport
//! - [`NotificationService`] — orchestrates gate and dispatcher

pub mod alert;
pub mod dispatch;
pub mod email;
pub mod gate;
pub mod service;

pub use alert::{wants_comment_alert, AlertRequest, MessageType};
pub use dispatch::{DispatchError, DispatchResult, Dispatcher};
pub use email::{
    ConsoleTransport, EmailAddress, EmailMessage, MailTransport, RecordingTransport,
    TransportError, TransportResult,
};
pub use gate::AlertGate;
pub use service::{NotificationService, ServiceError, ServiceResult};
