//! Evidence image slots and stored references.

use serde::{Deserialize, Serialize};

/// Maximum number of supplementary gallery images per submission.
pub const MAX_ADDITIONAL_IMAGES: usize = 5;

/// Named evidence slots for inspection photographs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvidenceSlot {
    Front,
    Street,
    Gate,
}

impl EvidenceSlot {
    /// The multipart field name this slot arrives under.
    pub fn field_name(&self) -> &'static str {
        match self {
            EvidenceSlot::Front => "frontView",
            EvidenceSlot::Street => "streetView",
            EvidenceSlot::Gate => "gateView",
        }
    }
}

/// Stored object references for a record's evidence set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceImages {
    pub front: Option<String>,
    pub street: Option<String>,
    pub gate: Option<String>,
    pub additional: Vec<String>,
}

impl EvidenceImages {
    pub fn get(&self, slot: EvidenceSlot) -> Option<&str> {
        match slot {
            EvidenceSlot::Front => self.front.as_deref(),
            EvidenceSlot::Street => self.street.as_deref(),
            EvidenceSlot::Gate => self.gate.as_deref(),
        }
    }

    /// Total stored references, named slots plus gallery.
    pub fn count(&self) -> usize {
        [&self.front, &self.street, &self.gate]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
            + self.additional.len()
    }
}
