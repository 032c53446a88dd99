//! Submission handlers: the legacy flat-address flow and the current
//! multipart inspection flow.

use abode_events::VerificationEventKind;
use abode_geo::{validate_slot_pair, GeoPoint};
use abode_storage::{
    DeclaredAddress, EmployeeId, EvidenceImages, LegacyAddress, OccupancyDetails, PropertyDetails,
    Store, StoreError, StructuredAddress, SubmissionParams, VerificationRecord,
    VerificationStatus,
};
use axum::extract::multipart::{Field, Multipart};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::evidence::{self, EvidenceFile, EvidenceUpload};
use crate::server::AbodeServer;

/// Legacy flat-address submission body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    pub window_start: String,
    pub window_end: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: String,
    pub status: String,
    pub window_start: String,
    pub window_end: String,
    pub images_uploaded: usize,
}

impl SubmitResponse {
    fn from_record(record: &VerificationRecord) -> Self {
        Self {
            id: record.id.0.to_string(),
            status: record.status.as_str().to_string(),
            window_start: record.window_start.clone(),
            window_end: record.window_end.clone(),
            images_uploaded: record.evidence.count(),
        }
    }
}

pub async fn submit_address(
    server: &AbodeServer,
    employee_id: EmployeeId,
    req: SubmitAddressRequest,
) -> Result<SubmitResponse, ApiError> {
    for (field, value) in [
        ("street", &req.street),
        ("city", &req.city),
        ("state", &req.state),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }
    }
    validate_slot_pair(&req.window_start, &req.window_end)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let active = active_record(server, &employee_id).await?;
    ensure_not_verified(&active)?;

    let address = DeclaredAddress::Legacy(LegacyAddress {
        street: req.street,
        city: req.city,
        state: req.state,
        zip: req.zip,
        landmark: req.landmark,
    });
    let expected = geocode_expected(server, &address).await;

    let params = SubmissionParams {
        employee_id: employee_id.clone(),
        address,
        property: None,
        occupancy: None,
        evidence: EvidenceImages::default(),
        window_start: req.window_start,
        window_end: req.window_end,
        expected,
    };
    let record = persist_submission(server, active, &params).await?;
    server
        .publish_transition(&record, VerificationEventKind::Submitted)
        .await;
    info!("address submitted for employee {}", employee_id.0);

    Ok(SubmitResponse::from_record(&record))
}

/// Inspection form fields, decoded from multipart text parts. String
/// booleans are parsed at this boundary; the domain only ever sees `bool`.
#[derive(Clone, Debug, Default)]
pub struct SubmitInspectionForm {
    pub full_address: String,
    pub landmark: Option<String>,
    pub city: String,
    pub region: String,
    pub state: String,
    pub building_type: String,
    pub building_purpose: String,
    pub construction_status: String,
    pub building_colour: Option<String>,
    pub has_fence: bool,
    pub has_gate: bool,
    pub occupant_description: String,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub window_start: String,
    pub window_end: String,
}

pub async fn submit_inspection(
    server: &AbodeServer,
    employee_id: EmployeeId,
    form: SubmitInspectionForm,
    upload: EvidenceUpload,
) -> Result<SubmitResponse, ApiError> {
    for (field, value) in [
        ("fullAddress", &form.full_address),
        ("city", &form.city),
        ("region", &form.region),
        ("buildingType", &form.building_type),
        ("buildingPurpose", &form.building_purpose),
        ("constructionStatus", &form.construction_status),
        ("occupantDescription", &form.occupant_description),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }
    }
    validate_slot_pair(&form.window_start, &form.window_end)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let active = active_record(server, &employee_id).await?;
    ensure_not_verified(&active)?;

    let property = PropertyDetails {
        building_type: form.building_type,
        building_purpose: form.building_purpose,
        construction_status: form.construction_status,
        building_colour: form.building_colour,
        has_fence: form.has_fence,
        has_gate: form.has_gate,
    };

    // The whole submission aborts on any upload failure; nothing is
    // persisted past this point unless every image landed.
    let images =
        evidence::run_pipeline(server.objects.as_ref(), &employee_id, &property, &upload).await?;

    let address = DeclaredAddress::Structured(StructuredAddress {
        full_address: form.full_address,
        landmark: form.landmark,
        city: form.city,
        region: form.region,
        state: form.state,
    });
    let expected = geocode_expected(server, &address).await;

    let params = SubmissionParams {
        employee_id: employee_id.clone(),
        address,
        property: Some(property),
        occupancy: Some(OccupancyDetails {
            occupant_description: form.occupant_description,
            relationship: form.relationship,
            notes: form.notes,
        }),
        evidence: images,
        window_start: form.window_start,
        window_end: form.window_end,
        expected,
    };
    let record = persist_submission(server, active, &params).await?;
    server
        .publish_transition(&record, VerificationEventKind::Submitted)
        .await;
    info!(
        "inspection submitted for employee {} ({} images)",
        employee_id.0,
        record.evidence.count()
    );

    Ok(SubmitResponse::from_record(&record))
}

/// Decode the multipart inspection request into typed form fields and the
/// evidence payload.
pub async fn read_inspection_multipart(
    mut multipart: Multipart,
) -> Result<(SubmitInspectionForm, EvidenceUpload), ApiError> {
    let mut form = SubmitInspectionForm::default();
    let mut upload = EvidenceUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "frontView" => upload.front = Some(read_file_part(&name, field).await?),
            "streetView" => upload.street = Some(read_file_part(&name, field).await?),
            "gateView" => upload.gate = Some(read_file_part(&name, field).await?),
            "additionalImages" | "additionalImages[]" => upload
                .additional
                .push(read_file_part("additionalImages", field).await?),
            _ => {
                let value = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("{}: invalid field value: {}", name, e))
                })?;
                assign_text_field(&mut form, &name, value)?;
            }
        }
    }

    Ok((form, upload))
}

async fn read_file_part(name: &str, field: Field<'_>) -> Result<EvidenceFile, ApiError> {
    let content_type = field.content_type().map(str::to_string).unwrap_or_default();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(format!("{}: failed to read upload: {}", name, e)))?;
    Ok(EvidenceFile {
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn assign_text_field(
    form: &mut SubmitInspectionForm,
    name: &str,
    value: String,
) -> Result<(), ApiError> {
    match name {
        "fullAddress" => form.full_address = value,
        "landmark" => form.landmark = some_nonempty(value),
        "city" => form.city = value,
        "region" => form.region = value,
        "state" => form.state = value,
        "buildingType" => form.building_type = value,
        "buildingPurpose" => form.building_purpose = value,
        "constructionStatus" => form.construction_status = value,
        "buildingColour" => form.building_colour = some_nonempty(value),
        "hasFence" => form.has_fence = parse_bool(name, &value)?,
        "hasGate" => form.has_gate = parse_bool(name, &value)?,
        "occupantDescription" => form.occupant_description = value,
        "relationship" => form.relationship = some_nonempty(value),
        "notes" => form.notes = some_nonempty(value),
        "windowStart" => form.window_start = value,
        "windowEnd" => form.window_end = value,
        // Unknown text fields are ignored rather than rejected.
        _ => {}
    }
    Ok(())
}

fn some_nonempty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ApiError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "{} must be 'true' or 'false'",
            field
        ))),
    }
}

pub(crate) async fn active_record(
    server: &AbodeServer,
    employee_id: &EmployeeId,
) -> Result<Option<VerificationRecord>, ApiError> {
    match server.store.get_active_verification(employee_id).await {
        Ok(record) => Ok(Some(record)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The one-time-verification rule: a verified record only reopens through an
/// admin re-verification request.
fn ensure_not_verified(active: &Option<VerificationRecord>) -> Result<(), ApiError> {
    if let Some(record) = active {
        if record.status == VerificationStatus::Verified {
            return Err(ApiError::Conflict(
                "address is already verified; resubmission requires an admin re-verification request"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

/// Best-effort geocoding; failure only leaves the expected coordinates
/// empty, which disables distance computation for the cycle.
async fn geocode_expected(server: &AbodeServer, address: &DeclaredAddress) -> Option<GeoPoint> {
    let geocoder = server.geocoder.as_ref()?;
    let outcome = geocoder.geocode(&address.display_line()).await;
    if let Some(err) = &outcome.error {
        tracing::warn!(
            "geocoding failed, proceeding without expected coordinates: {}",
            err
        );
    }
    outcome.point
}

async fn persist_submission(
    server: &AbodeServer,
    active: Option<VerificationRecord>,
    params: &SubmissionParams,
) -> Result<VerificationRecord, ApiError> {
    let record = match active {
        Some(existing) => server.store.apply_submission(&existing.id, params).await?,
        None => server.store.create_verification(params).await?,
    };
    Ok(record)
}
