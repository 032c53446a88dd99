//! Declared address, property and occupancy blocks.

use serde::{Deserialize, Serialize};

/// Where the employee declares they live.
///
/// Two shapes exist in the store: structured submissions from the inspection
/// flow, and flat records that predate it. The discriminant is explicit so
/// call sites resolve the shape once instead of null-coalescing field by
/// field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DeclaredAddress {
    Structured(StructuredAddress),
    Legacy(LegacyAddress),
}

/// Structured address from the inspection submission flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub full_address: String,
    pub landmark: Option<String>,
    pub city: String,
    /// Region or sub-region (e.g. local government area).
    pub region: String,
    pub state: String,
}

/// Flat address fields from the legacy submit-address flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub landmark: Option<String>,
}

impl DeclaredAddress {
    /// Single display line for projections and geocoding queries.
    /// Structured fields take precedence; flat fields are the fallback shape.
    pub fn display_line(&self) -> String {
        match self {
            DeclaredAddress::Structured(a) => {
                format!("{}, {}, {}, {}", a.full_address, a.city, a.region, a.state)
            }
            DeclaredAddress::Legacy(a) => match &a.zip {
                Some(zip) => format!("{}, {}, {} {}", a.street, a.city, a.state, zip),
                None => format!("{}, {}, {}", a.street, a.city, a.state),
            },
        }
    }

    pub fn city(&self) -> &str {
        match self {
            DeclaredAddress::Structured(a) => &a.city,
            DeclaredAddress::Legacy(a) => &a.city,
        }
    }

    pub fn landmark(&self) -> Option<&str> {
        match self {
            DeclaredAddress::Structured(a) => a.landmark.as_deref(),
            DeclaredAddress::Legacy(a) => a.landmark.as_deref(),
        }
    }
}

/// Structured property attributes captured during inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub building_type: String,
    pub building_purpose: String,
    pub construction_status: String,
    pub building_colour: Option<String>,
    pub has_fence: bool,
    pub has_gate: bool,
}

impl PropertyDetails {
    /// The gate/fence evidence slot is only mandatory when the property
    /// declares one.
    pub fn requires_gate_view(&self) -> bool {
        self.has_fence || self.has_gate
    }
}

/// Occupancy attributes captured during inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyDetails {
    pub occupant_description: String,
    pub relationship: Option<String>,
    pub notes: Option<String>,
}
