//! Event bus abstraction for verification lifecycle notifications.
//!
//! The lifecycle engine publishes an event on every state transition;
//! external collaborators (employee account management, notification
//! plumbing, audit writers) subscribe per employee. The trait allows
//! different implementations for broadcasting across server replicas:
//! - Memory (single server, tokio broadcast channels)
//! - Redis or Postgres (multi-server), if ever needed

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use abode_storage::{EmployeeId, VerificationId};

/// Kind of lifecycle transition an event describes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationEventKind {
    /// An address/inspection submission was persisted. Consumers that own
    /// employee accounts flip the employee to their active state on the
    /// first of these.
    Submitted,
    /// A GPS confirmation verified the record.
    Confirmed,
    /// An admin requested a fresh confirmation cycle.
    ReverificationRequested,
    /// An admin recorded an adjudication decision.
    Reviewed,
}

/// Event emitted after a verification record transition is persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationEvent {
    pub kind: VerificationEventKind,
    pub record_id: VerificationId,
    pub status: String,
    pub timestamp: i64,
}

/// Error type for event bus operations
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Stream of verification lifecycle events
pub type EventStream = Pin<Box<dyn Stream<Item = VerificationEvent> + Send>>;

/// Event bus trait for publishing and subscribing to lifecycle events.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a lifecycle event to all watchers of this employee.
    ///
    /// Called after the transition has been persisted; delivery is
    /// best-effort and never blocks the request that caused it.
    async fn publish(
        &self,
        employee_id: &EmployeeId,
        event: VerificationEvent,
    ) -> Result<(), EventBusError>;

    /// Subscribe to lifecycle events for an employee.
    ///
    /// Returns a stream that yields events as they occur, until dropped.
    async fn subscribe(&self, employee_id: &EmployeeId) -> Result<EventStream, EventBusError>;
}
