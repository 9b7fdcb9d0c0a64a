// libs/clinic-cell/src/models.rs
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use shared_utils::time_grid::quanta_needed;

// ==============================================================================
// CLINIC MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub label: String,
    pub capabilities: BTreeSet<String>,
}

impl Room {
    /// A room satisfies a procedure when it offers every required capability.
    pub fn satisfies(&self, procedure: &Procedure) -> bool {
        procedure.required_capabilities.is_subset(&self.capabilities)
    }
}

// ==============================================================================
// PROCEDURE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    /// Ordered: with `requires_anesthetist` the first entry is the primary
    /// (surgeon) role and the second the anesthetist role.
    #[serde(rename = "required_specs", alias = "required_specializations")]
    pub required_specializations: Vec<String>,
    pub required_capabilities: BTreeSet<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUp>,
    #[serde(default)]
    pub requires_anesthetist: bool,
}

impl Procedure {
    pub fn primary_specialization(&self) -> Option<&str> {
        self.required_specializations.first().map(String::as_str)
    }

    pub fn secondary_specialization(&self) -> Option<&str> {
        self.required_specializations.get(1).map(String::as_str)
    }

    pub fn quanta_needed(&self) -> u32 {
        quanta_needed(self.duration_minutes)
    }

    pub fn is_urgent(&self) -> bool {
        self.priority.as_deref() == Some("urgent")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub procedure_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}
