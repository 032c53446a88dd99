//! SQLite implementation of the abode [`Store`] trait.

use std::str::FromStr;

use abode_geo::{GeoPoint, RiskTier};
use abode_storage::{
    AdminId, ConfirmationParams, DeclaredAddress, EmployeeId, EvidenceImages, OccupancyDetails,
    PropertyDetails, ReviewParams, ReviewStatus, Store, StoreError, SubmissionParams,
    VerificationId, VerificationRecord, VerificationStatus,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const RECORD_COLUMNS: &str = "id, employee_id, address, property, occupancy, \
     front_image, street_image, gate_image, additional_images, \
     window_start, window_end, expected_lat, expected_lon, captured_lat, captured_lon, \
     distance_km, distance_flagged, risk_tier, status, \
     review_status, review_notes, reviewed_by, reviewed_at, \
     created_at, updated_at, verified_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn fetch_record(&self, id: &VerificationId) -> Result<VerificationRecord, StoreError> {
        let sql = format!("SELECT {} FROM verifications WHERE id = ?", RECORD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => row_to_record(&row),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Backend(e.to_string()))
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn parse_timestamp(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", secs)))
}

fn point_from_columns(lat: Option<f64>, lon: Option<f64>) -> Option<GeoPoint> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    }
}

fn row_to_record(row: &SqliteRow) -> Result<VerificationRecord, StoreError> {
    let backend = |e: sqlx::Error| StoreError::Backend(e.to_string());

    let id: String = row.try_get("id").map_err(backend)?;
    let employee_id: String = row.try_get("employee_id").map_err(backend)?;
    let address: String = row.try_get("address").map_err(backend)?;
    let property: Option<String> = row.try_get("property").map_err(backend)?;
    let occupancy: Option<String> = row.try_get("occupancy").map_err(backend)?;
    let additional_images: String = row.try_get("additional_images").map_err(backend)?;
    let risk_tier: Option<String> = row.try_get("risk_tier").map_err(backend)?;
    let status: String = row.try_get("status").map_err(backend)?;
    let review_status: String = row.try_get("review_status").map_err(backend)?;
    let reviewed_by: Option<String> = row.try_get("reviewed_by").map_err(backend)?;
    let reviewed_at: Option<i64> = row.try_get("reviewed_at").map_err(backend)?;
    let created_at: i64 = row.try_get("created_at").map_err(backend)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(backend)?;
    let verified_at: Option<i64> = row.try_get("verified_at").map_err(backend)?;

    let address: DeclaredAddress =
        serde_json::from_str(&address).map_err(|e| StoreError::Backend(e.to_string()))?;
    let property: Option<PropertyDetails> = property
        .map(|s| serde_json::from_str(&s).map_err(|e| StoreError::Backend(e.to_string())))
        .transpose()?;
    let occupancy: Option<OccupancyDetails> = occupancy
        .map(|s| serde_json::from_str(&s).map_err(|e| StoreError::Backend(e.to_string())))
        .transpose()?;
    let additional: Vec<String> = serde_json::from_str(&additional_images)
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    let evidence = EvidenceImages {
        front: row.try_get("front_image").map_err(backend)?,
        street: row.try_get("street_image").map_err(backend)?,
        gate: row.try_get("gate_image").map_err(backend)?,
        additional,
    };

    let risk_tier = risk_tier
        .map(|s| RiskTier::from_str(&s).map_err(|e| StoreError::Backend(e.to_string())))
        .transpose()?;
    let reviewed_by = reviewed_by
        .map(|s| parse_uuid(&s).map(AdminId))
        .transpose()?;

    Ok(VerificationRecord {
        id: VerificationId(parse_uuid(&id)?),
        employee_id: EmployeeId(parse_uuid(&employee_id)?),
        address,
        property,
        occupancy,
        evidence,
        window_start: row.try_get("window_start").map_err(backend)?,
        window_end: row.try_get("window_end").map_err(backend)?,
        expected: point_from_columns(
            row.try_get("expected_lat").map_err(backend)?,
            row.try_get("expected_lon").map_err(backend)?,
        ),
        captured: point_from_columns(
            row.try_get("captured_lat").map_err(backend)?,
            row.try_get("captured_lon").map_err(backend)?,
        ),
        distance_km: row.try_get("distance_km").map_err(backend)?,
        distance_flagged: row
            .try_get::<Option<bool>, _>("distance_flagged")
            .map_err(backend)?,
        risk_tier,
        status: VerificationStatus::from_str(&status)
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        review_status: ReviewStatus::from_str(&review_status)
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        review_notes: row.try_get("review_notes").map_err(backend)?,
        reviewed_by,
        reviewed_at: reviewed_at.map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(created_at)?,
        updated_at: parse_timestamp(updated_at)?,
        verified_at: verified_at.map(parse_timestamp).transpose()?,
    })
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    async fn create_verification(
        &self,
        params: &SubmissionParams,
    ) -> Result<VerificationRecord, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO verifications(
                 id, employee_id, address, property, occupancy,
                 front_image, street_image, gate_image, additional_images,
                 window_start, window_end, expected_lat, expected_lon,
                 status, review_status, created_at, updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.employee_id.0.to_string())
        .bind(to_json(&params.address)?)
        .bind(params.property.as_ref().map(to_json).transpose()?)
        .bind(params.occupancy.as_ref().map(to_json).transpose()?)
        .bind(&params.evidence.front)
        .bind(&params.evidence.street)
        .bind(&params.evidence.gate)
        .bind(to_json(&params.evidence.additional)?)
        .bind(&params.window_start)
        .bind(&params.window_end)
        .bind(params.expected.map(|p| p.lat))
        .bind(params.expected.map(|p| p.lon))
        .bind(VerificationStatus::PendingVerification.as_str())
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        self.fetch_record(&VerificationId(id)).await
    }

    async fn apply_submission(
        &self,
        id: &VerificationId,
        params: &SubmissionParams,
    ) -> Result<VerificationRecord, StoreError> {
        let now = Utc::now().timestamp();
        let res = sqlx::query(
            "UPDATE verifications SET
                 address = ?, property = ?, occupancy = ?,
                 front_image = ?, street_image = ?, gate_image = ?, additional_images = ?,
                 window_start = ?, window_end = ?, expected_lat = ?, expected_lon = ?,
                 captured_lat = NULL, captured_lon = NULL,
                 distance_km = NULL, distance_flagged = NULL, risk_tier = NULL,
                 verified_at = NULL, status = ?,
                 review_status = ?, review_notes = NULL, reviewed_by = NULL, reviewed_at = NULL,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(to_json(&params.address)?)
        .bind(params.property.as_ref().map(to_json).transpose()?)
        .bind(params.occupancy.as_ref().map(to_json).transpose()?)
        .bind(&params.evidence.front)
        .bind(&params.evidence.street)
        .bind(&params.evidence.gate)
        .bind(to_json(&params.evidence.additional)?)
        .bind(&params.window_start)
        .bind(&params.window_end)
        .bind(params.expected.map(|p| p.lat))
        .bind(params.expected.map(|p| p.lon))
        .bind(VerificationStatus::PendingVerification.as_str())
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_record(id).await
    }

    async fn get_verification(
        &self,
        id: &VerificationId,
    ) -> Result<VerificationRecord, StoreError> {
        self.fetch_record(id).await
    }

    async fn get_active_verification(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<VerificationRecord, StoreError> {
        let sql = format!(
            "SELECT {} FROM verifications WHERE employee_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            RECORD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => row_to_record(&row),
        }
    }

    async fn list_verifications(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM verifications WHERE employee_id = ?
             ORDER BY created_at ASC, rowid ASC",
            RECORD_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(employee_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn record_confirmation(
        &self,
        id: &VerificationId,
        params: &ConfirmationParams,
    ) -> Result<VerificationRecord, StoreError> {
        let now = Utc::now().timestamp();
        let res = sqlx::query(
            "UPDATE verifications SET
                 captured_lat = ?, captured_lon = ?,
                 distance_km = ?, distance_flagged = ?, risk_tier = ?,
                 verified_at = ?, status = ?,
                 review_status = ?, review_notes = NULL, reviewed_by = NULL, reviewed_at = NULL,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(params.captured.lat)
        .bind(params.captured.lon)
        .bind(params.distance_km)
        .bind(params.distance_flagged)
        .bind(params.risk_tier.map(|t| t.as_str()))
        .bind(params.verified_at.timestamp())
        .bind(VerificationStatus::Verified.as_str())
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_record(id).await
    }

    async fn reset_confirmation(
        &self,
        id: &VerificationId,
    ) -> Result<VerificationRecord, StoreError> {
        let now = Utc::now().timestamp();
        let res = sqlx::query(
            "UPDATE verifications SET
                 captured_lat = NULL, captured_lon = NULL,
                 distance_km = NULL, distance_flagged = NULL, risk_tier = NULL,
                 verified_at = NULL, status = ?,
                 review_status = ?, review_notes = NULL, reviewed_by = NULL, reviewed_at = NULL,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(VerificationStatus::ReverificationRequired.as_str())
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_record(id).await
    }

    async fn record_review(
        &self,
        id: &VerificationId,
        params: &ReviewParams,
    ) -> Result<VerificationRecord, StoreError> {
        let now = Utc::now().timestamp();
        let res = match params.record_status {
            Some(status) => {
                sqlx::query(
                    "UPDATE verifications SET
                         review_status = ?, review_notes = ?, reviewed_by = ?, reviewed_at = ?,
                         status = ?, updated_at = ?
                     WHERE id = ?",
                )
                .bind(params.status.as_str())
                .bind(&params.notes)
                .bind(params.reviewed_by.0.to_string())
                .bind(params.reviewed_at.timestamp())
                .bind(status.as_str())
                .bind(now)
                .bind(id.0.to_string())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE verifications SET
                         review_status = ?, review_notes = ?, reviewed_by = ?, reviewed_at = ?,
                         updated_at = ?
                     WHERE id = ?",
                )
                .bind(params.status.as_str())
                .bind(&params.notes)
                .bind(params.reviewed_by.0.to_string())
                .bind(params.reviewed_at.timestamp())
                .bind(now)
                .bind(id.0.to_string())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_record(id).await
    }
}
