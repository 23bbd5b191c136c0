// libs/schedule-cell/src/models.rs
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==============================================================================
// SCHEDULE SETTINGS
// ==============================================================================

/// Administrative availability configuration: whole days that are closed and
/// slot labels that are closed on every day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub blocked_dates: BTreeSet<NaiveDate>,
    /// Display labels from the slot calendar, e.g. `"2:00 PM"`.
    pub disabled_time_slots: BTreeSet<String>,
}

impl ScheduleSettings {
    pub fn is_date_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_dates.contains(&date)
    }

    pub fn is_slot_disabled(&self, label: &str) -> bool {
        self.disabled_time_slots.contains(label)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDate {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockDateRequest {
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisableTimeSlotRequest {
    #[serde(default)]
    pub time: String,
}

/// Row shape of the `disabled_time_slots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisabledTimeSlotRow {
    pub time_label: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Fecha requerida")]
    MissingDate,

    #[error("Horario requerido")]
    MissingTime,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Time {0} is not part of the slot calendar")]
    UnknownSlot(String),

    #[error("La fecha ya está bloqueada")]
    AlreadyBlocked(NaiveDate),

    #[error("El horario ya está deshabilitado")]
    AlreadyDisabled(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
