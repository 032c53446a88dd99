//! Shared server state.

use std::sync::Arc;

use abode_events::{EventBus, EventBusError, VerificationEvent, VerificationEventKind};
use abode_storage::{Store, VerificationRecord};
use chrono::Utc;

use crate::config::ServerConfig;
use crate::geocode::Geocoder;
use crate::objects::ObjectStore;

/// State shared by every handler: the record store, the lifecycle event bus,
/// the external-service adapters and the organization configuration resolved
/// at startup.
#[derive(Clone)]
pub struct AbodeServer {
    pub store: Arc<dyn Store>,
    pub events: Arc<dyn EventBus>,
    pub config: ServerConfig,
    /// None when geocoding is disabled; submissions then never get expected
    /// coordinates.
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub objects: Arc<dyn ObjectStore>,
}

impl AbodeServer {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<dyn EventBus>,
        config: ServerConfig,
        geocoder: Option<Arc<dyn Geocoder>>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            events,
            config,
            geocoder,
            objects,
        }
    }

    /// Publish a lifecycle event for a persisted transition. Delivery is
    /// best-effort; a bus failure is logged and never fails the request.
    pub async fn publish_transition(
        &self,
        record: &VerificationRecord,
        kind: VerificationEventKind,
    ) {
        let event = VerificationEvent {
            kind,
            record_id: record.id.clone(),
            status: record.status.as_str().to_string(),
            timestamp: Utc::now().timestamp(),
        };
        if let Err(EventBusError::Backend(msg)) =
            self.events.publish(&record.employee_id, event).await
        {
            tracing::warn!("failed to publish lifecycle event: {}", msg);
        }
    }
}
