//! Handler modules for the HTTP surface.
//!
//! This module contains handler functions organized by lifecycle operation:
//! - submit: legacy flat-address and multipart inspection submissions
//! - confirm: night-window GPS confirmation
//! - review: admin adjudication and re-verification requests
//! - records: employee-facing and admin-facing read projections
//!
//! The axum routes below only extract and delegate; tests exercise the
//! handler functions directly.

pub mod confirm;
pub mod records;
pub mod review;
pub mod submit;

use std::sync::Arc;

use abode_storage::{AdminId, EmployeeId, VerificationId};
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AbodeServer;

pub fn router(server: Arc<AbodeServer>) -> Router {
    Router::new()
        .route("/api/employees/:employee_id/address", post(submit_address))
        .route(
            "/api/employees/:employee_id/inspection",
            post(submit_inspection),
        )
        .route("/api/verifications/:id/confirm", post(confirm_location))
        .route("/api/verifications/:id/reverify", post(request_reverification))
        .route("/api/verifications/:id/review", post(review))
        .route("/api/verifications/:id", get(get_record))
        .route("/api/admin/verifications/:id", get(get_admin_record))
        .route(
            "/api/admin/employees/:employee_id/verifications",
            get(list_employee_records),
        )
        .with_state(server)
}

/// The narrow contract with the upstream auth layer: it authenticates the
/// administrator and asserts their identity in this header.
fn admin_from_headers(headers: &HeaderMap) -> Result<AdminId, ApiError> {
    let value = headers
        .get("x-admin-id")
        .ok_or_else(|| ApiError::Validation("x-admin-id header is required".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::Validation("x-admin-id header is not valid text".to_string()))?;
    let id = Uuid::try_parse(value)
        .map_err(|_| ApiError::Validation("x-admin-id header is not a valid id".to_string()))?;
    Ok(AdminId(id))
}

async fn submit_address(
    State(server): State<Arc<AbodeServer>>,
    Path(employee_id): Path<Uuid>,
    Json(req): Json<submit::SubmitAddressRequest>,
) -> Result<Json<submit::SubmitResponse>, ApiError> {
    submit::submit_address(&server, EmployeeId(employee_id), req)
        .await
        .map(Json)
}

async fn submit_inspection(
    State(server): State<Arc<AbodeServer>>,
    Path(employee_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<submit::SubmitResponse>, ApiError> {
    let (form, upload) = submit::read_inspection_multipart(multipart).await?;
    submit::submit_inspection(&server, EmployeeId(employee_id), form, upload)
        .await
        .map(Json)
}

async fn confirm_location(
    State(server): State<Arc<AbodeServer>>,
    Path(id): Path<Uuid>,
    Json(req): Json<confirm::ConfirmLocationRequest>,
) -> Result<Json<confirm::ConfirmLocationResponse>, ApiError> {
    confirm::confirm_location(&server, VerificationId(id), req)
        .await
        .map(Json)
}

async fn request_reverification(
    State(server): State<Arc<AbodeServer>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<review::ReverifyResponse>, ApiError> {
    admin_from_headers(&headers)?;
    review::request_reverification(&server, VerificationId(id))
        .await
        .map(Json)
}

async fn review(
    State(server): State<Arc<AbodeServer>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<review::ReviewRequest>,
) -> Result<Json<review::ReviewResponse>, ApiError> {
    let admin = admin_from_headers(&headers)?;
    review::review(&server, VerificationId(id), admin, req)
        .await
        .map(Json)
}

async fn get_record(
    State(server): State<Arc<AbodeServer>>,
    Path(id): Path<Uuid>,
) -> Result<Json<records::VerificationView>, ApiError> {
    records::get_record_view(&server, VerificationId(id))
        .await
        .map(Json)
}

async fn get_admin_record(
    State(server): State<Arc<AbodeServer>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<records::AdminVerificationView>, ApiError> {
    admin_from_headers(&headers)?;
    records::get_admin_record_view(&server, VerificationId(id))
        .await
        .map(Json)
}

async fn list_employee_records(
    State(server): State<Arc<AbodeServer>>,
    Path(employee_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<records::AdminVerificationView>>, ApiError> {
    admin_from_headers(&headers)?;
    records::list_employee_records(&server, EmployeeId(employee_id))
        .await
        .map(Json)
}
