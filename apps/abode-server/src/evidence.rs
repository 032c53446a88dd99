//! Validation and upload orchestration for inspection photographs.
//!
//! Intake tolerates a request with no files at all; required-slot presence
//! is then re-checked against what actually uploaded, so a missing mandatory
//! image always surfaces with a precise message. Any single upload failure
//! fails the whole call; the caller must not persist a record with a partial
//! image set.

use abode_storage::{EmployeeId, EvidenceImages, EvidenceSlot, PropertyDetails, MAX_ADDITIONAL_IMAGES};
use futures::future::try_join_all;
use uuid::Uuid;

use crate::error::ApiError;
use crate::objects::ObjectStore;

/// Accepted image MIME types.
const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Per-file size cap.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Total files across named slots and the gallery.
pub const MAX_TOTAL_FILES: usize = 8;

/// One uploaded file as decoded at the API boundary.
#[derive(Clone, Debug)]
pub struct EvidenceFile {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The evidence payload of one submission: named slots plus gallery.
#[derive(Debug, Default)]
pub struct EvidenceUpload {
    pub front: Option<EvidenceFile>,
    pub street: Option<EvidenceFile>,
    pub gate: Option<EvidenceFile>,
    pub additional: Vec<EvidenceFile>,
}

impl EvidenceUpload {
    fn named(&self) -> [(EvidenceSlot, Option<&EvidenceFile>); 3] {
        [
            (EvidenceSlot::Front, self.front.as_ref()),
            (EvidenceSlot::Street, self.street.as_ref()),
            (EvidenceSlot::Gate, self.gate.as_ref()),
        ]
    }

    fn count(&self) -> usize {
        self.named().iter().filter(|(_, file)| file.is_some()).count() + self.additional.len()
    }
}

/// Validate and persist a submission's evidence set, returning the stored
/// references. The named slots upload sequentially; the gallery fans out
/// concurrently and joins before anything is returned.
pub async fn run_pipeline(
    objects: &dyn ObjectStore,
    employee_id: &EmployeeId,
    property: &PropertyDetails,
    upload: &EvidenceUpload,
) -> Result<EvidenceImages, ApiError> {
    validate_files(upload)?;

    // A request that carries files must carry the mandatory ones; a no-file
    // request passes intake and gets its precise message from the post-upload
    // check below.
    if upload.count() > 0 {
        check_required(
            property,
            upload.front.is_some(),
            upload.street.is_some(),
            upload.gate.is_some(),
        )?;
    }

    let mut images = EvidenceImages::default();
    for (slot, file) in upload.named() {
        if let Some(file) = file {
            let url = put_file(objects, employee_id, slot.field_name(), file).await?;
            match slot {
                EvidenceSlot::Front => images.front = Some(url),
                EvidenceSlot::Street => images.street = Some(url),
                EvidenceSlot::Gate => images.gate = Some(url),
            }
        }
    }

    images.additional = try_join_all(
        upload
            .additional
            .iter()
            .map(|file| put_file(objects, employee_id, "additional", file)),
    )
    .await?;

    // Presence is re-checked against what actually landed, not just intake.
    check_required(
        property,
        images.front.is_some(),
        images.street.is_some(),
        images.gate.is_some(),
    )?;

    Ok(images)
}

fn validate_files(upload: &EvidenceUpload) -> Result<(), ApiError> {
    if upload.count() > MAX_TOTAL_FILES {
        return Err(ApiError::Validation(format!(
            "a submission carries at most {} images",
            MAX_TOTAL_FILES
        )));
    }
    if upload.additional.len() > MAX_ADDITIONAL_IMAGES {
        return Err(ApiError::Validation(format!(
            "at most {} additional images are allowed",
            MAX_ADDITIONAL_IMAGES
        )));
    }

    for (slot, file) in upload.named() {
        if let Some(file) = file {
            validate_file(slot.field_name(), file)?;
        }
    }
    for file in &upload.additional {
        validate_file("additionalImages", file)?;
    }
    Ok(())
}

fn validate_file(field: &str, file: &EvidenceFile) -> Result<(), ApiError> {
    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "{}: unsupported image type '{}' (allowed: JPEG, PNG, WebP)",
            field, file.content_type
        )));
    }
    if file.bytes.len() > MAX_FILE_BYTES {
        return Err(ApiError::Validation(format!(
            "{}: image exceeds the 5 MB size limit",
            field
        )));
    }
    Ok(())
}

fn check_required(
    property: &PropertyDetails,
    has_front: bool,
    has_street: bool,
    has_gate: bool,
) -> Result<(), ApiError> {
    if !has_front {
        return Err(ApiError::Validation(
            "frontView image is required".to_string(),
        ));
    }
    if !has_street {
        return Err(ApiError::Validation(
            "streetView image is required".to_string(),
        ));
    }
    if property.requires_gate_view() && !has_gate {
        return Err(ApiError::Validation(
            "gateView image is required when the property has a fence or gate".to_string(),
        ));
    }
    Ok(())
}

async fn put_file(
    objects: &dyn ObjectStore,
    employee_id: &EmployeeId,
    field: &str,
    file: &EvidenceFile,
) -> Result<String, ApiError> {
    let key = format!(
        "{}/{}-{}.{}",
        employee_id.0,
        field,
        Uuid::now_v7(),
        extension_for(&file.content_type)
    );
    objects
        .put(&key, &file.bytes)
        .await
        .map_err(|e| ApiError::EvidenceUpload(e.to_string()))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
