//! In-memory event bus implementation using tokio broadcast channels.
//!
//! Suitable for single-server deployments and tests. Events are only
//! broadcast within one process; replicas do not see each other's events.

use abode_events::{EventBus, EventBusError, EventStream, VerificationEvent};
use abode_storage::EmployeeId;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const CHANNEL_CAPACITY: usize = 100;

/// In-memory event bus using tokio broadcast channels, one per employee.
pub struct MemoryEventBus {
    channels: Arc<DashMap<EmployeeId, broadcast::Sender<VerificationEvent>>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
        }
    }

    fn get_or_create_channel(
        &self,
        employee_id: &EmployeeId,
    ) -> broadcast::Sender<VerificationEvent> {
        self.channels
            .entry(employee_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(
        &self,
        employee_id: &EmployeeId,
        event: VerificationEvent,
    ) -> Result<(), EventBusError> {
        let tx = self.get_or_create_channel(employee_id);

        // Ignore error if no receivers (this is fine)
        let _ = tx.send(event);

        Ok(())
    }

    async fn subscribe(&self, employee_id: &EmployeeId) -> Result<EventStream, EventBusError> {
        let tx = self.get_or_create_channel(employee_id);
        let rx = tx.subscribe();

        // Drop lagged-receiver errors; a consumer that fell behind should
        // re-read the record instead of replaying events.
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());

        Ok(Box::pin(stream))
    }
}
