//! Common test helpers and utilities for server tests.
//!
//! This module provides shared test infrastructure including:
//! - Test server creation over in-memory SQLite
//! - Stub geocoder and in-memory object store
//! - Submission builders and a confirmed-record helper

use std::sync::{Arc, Mutex};

use abode_events_memory::MemoryEventBus;
use abode_geo::GeoPoint;
use abode_storage::{EmployeeId, Store, VerificationId, VerificationRecord};
use abode_store_sqlite::SqliteStore;
use async_trait::async_trait;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::evidence::{EvidenceFile, EvidenceUpload};
use crate::geocode::{GeocodeOutcome, Geocoder};
use crate::handlers::confirm::{self, ConfirmLocationRequest, ConfirmLocationResponse};
use crate::handlers::submit::{self, SubmitInspectionForm};
use crate::objects::{ObjectStore, ObjectStoreError};
use crate::server::AbodeServer;

/// The point the stub geocoder resolves every address to.
pub const EXPECTED_POINT: GeoPoint = GeoPoint {
    lat: 6.5244,
    lon: 3.3792,
};

/// Stub geocoder with a fixed answer; `point: None` simulates a provider
/// outage.
pub struct StubGeocoder {
    pub point: Option<GeoPoint>,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, _address: &str) -> GeocodeOutcome {
        match self.point {
            Some(point) => GeocodeOutcome {
                point: Some(point),
                display_name: Some("stub result".to_string()),
                error: None,
            },
            None => GeocodeOutcome::failed("stub provider outage"),
        }
    }
}

/// In-memory object store recording stored keys; optionally failing every
/// write to simulate a storage outage.
pub struct MemoryObjectStore {
    pub keys: Mutex<Vec<String>>,
    fail: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn stored_count(&self) -> usize {
        self.keys.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, _bytes: &[u8]) -> Result<String, ObjectStoreError> {
        if self.fail {
            return Err(ObjectStoreError::Write {
                key: key.to_string(),
                message: "simulated storage outage".to_string(),
            });
        }
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("mem://{}", key))
    }
}

/// Test helper: server with in-memory SQLite, working uploads and a geocoder
/// that resolves every address to [`EXPECTED_POINT`].
pub async fn create_test_server() -> AbodeServer {
    create_test_server_with(
        Some(Arc::new(StubGeocoder {
            point: Some(EXPECTED_POINT),
        })),
        Arc::new(MemoryObjectStore::new()),
    )
    .await
}

/// Test helper: server whose geocoding provider always fails.
pub async fn create_test_server_with_failing_geocoder() -> AbodeServer {
    create_test_server_with(
        Some(Arc::new(StubGeocoder { point: None })),
        Arc::new(MemoryObjectStore::new()),
    )
    .await
}

pub async fn create_test_server_with(
    geocoder: Option<Arc<dyn Geocoder>>,
    objects: Arc<dyn ObjectStore>,
) -> AbodeServer {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let events = Arc::new(MemoryEventBus::new());
    AbodeServer::new(store, events, ServerConfig::default(), geocoder, objects)
}

pub fn test_employee() -> EmployeeId {
    EmployeeId(Uuid::now_v7())
}

pub fn jpeg(len: usize) -> EvidenceFile {
    EvidenceFile {
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF; len],
    }
}

/// Front + street images, enough for a property without fence or gate.
pub fn basic_upload() -> EvidenceUpload {
    EvidenceUpload {
        front: Some(jpeg(128)),
        street: Some(jpeg(128)),
        gate: None,
        additional: Vec::new(),
    }
}

pub fn inspection_form() -> SubmitInspectionForm {
    SubmitInspectionForm {
        full_address: "12 Adeola Odeku St".to_string(),
        landmark: None,
        city: "Victoria Island".to_string(),
        region: "Eti-Osa".to_string(),
        state: "Lagos".to_string(),
        building_type: "bungalow".to_string(),
        building_purpose: "residential".to_string(),
        construction_status: "completed".to_string(),
        building_colour: Some("white".to_string()),
        has_fence: false,
        has_gate: false,
        occupant_description: "employee lives alone".to_string(),
        relationship: None,
        notes: None,
        window_start: "23:00".to_string(),
        window_end: "01:00".to_string(),
    }
}

/// Submit a valid inspection for the employee and return the stored record.
pub async fn submit_test_record(
    server: &AbodeServer,
    employee: &EmployeeId,
) -> VerificationRecord {
    submit::submit_inspection(server, employee.clone(), inspection_form(), basic_upload())
        .await
        .unwrap();
    server.store.get_active_verification(employee).await.unwrap()
}

/// Confirm a record from a point ~30 m from [`EXPECTED_POINT`], inside the
/// default test window.
pub async fn confirm_test_record(
    server: &AbodeServer,
    id: &VerificationId,
) -> ConfirmLocationResponse {
    confirm::confirm_location(
        server,
        id.clone(),
        ConfirmLocationRequest {
            latitude: EXPECTED_POINT.lat + 0.0002,
            longitude: EXPECTED_POINT.lon + 0.0002,
            distance_threshold_km: None,
            reporter_local_clock: "23:30".to_string(),
        },
    )
    .await
    .unwrap()
}
