//! Stepgate Gateway
//!
//! Workflow admission: the path from a trigger request to a durable unit of
//! work on the queue.
//!
//! # Flow
//!
//! ```text
//! EnqueueRequest
//!   │
//!   ├─ active definition lookup ........ WorkflowNotFound
//!   ├─ required-field check ............ MissingRequiredFields
//!   ├─ template variable check ......... MissingTemplateVariables
//!   ├─ correlation id lookup ........... replay → existing execution
//!   ├─ insert pending execution ........ DuplicateCorrelationId → replay
//!   └─ publish QueueMessage ............ failure/timeout → delete execution
//! ```
//!
//! Nothing is persisted before every validation has passed. After the
//! execution row is inserted, a failed publish deletes it again so no
//! `pending` row survives without a queued message.
//!
//! Status queries read the execution row only; they never touch the queue.

mod config;
mod correlation;
mod error;
mod gateway;
mod message;
mod request;

pub use config::{DEFAULT_PUBLISH_TIMEOUT, DEFAULT_QUEUE_NAME, GatewayConfig};
pub use correlation::synthesize_correlation_id;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use message::snapshot_message;
pub use request::{
  AdmissionStatus, EnqueueRequest, EnqueueResponse, EnqueueStatus, Request, Response,
  StatusRequest,
};
