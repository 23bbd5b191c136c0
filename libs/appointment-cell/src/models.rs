// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate, NaiveTime};
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub phone: String,
    pub email: String,
    pub date: NaiveDate,
    /// Stored 24-hour form, serialized as `HH:MM:SS`.
    pub time: NaiveTime,
    /// Service name as it was in the catalog when booked.
    pub service: String,
    pub status: AppointmentStatus,
    #[serde(rename = "rejectionReason", alias = "rejection_reason", default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(rename = "cancellationReason", alias = "cancellation_reason", default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Pending and approved appointments hold their slot.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn occupies(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.is_active() && self.date == date && self.time == time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Rejected | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Validated input for `AppointmentStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub client_name: String,
    pub phone: String,
    pub email: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service: String,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date: String,
    /// Either `"10:00 AM"` or `"10:00:00"`.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Accepted for compatibility; new appointments always start pending.
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub label: String,
    pub time: NaiveTime,
    pub bookable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub blocked: bool,
    pub slots: Vec<SlotAvailability>,
}

// ==============================================================================
// STATISTICS MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

impl AppointmentStats {
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        appointments.iter().fold(Self::default(), |mut stats, appointment| {
            stats.total += 1;
            match appointment.status {
                AppointmentStatus::Pending => stats.pending += 1,
                AppointmentStatus::Approved => stats.approved += 1,
                AppointmentStatus::Rejected => stats.rejected += 1,
                AppointmentStatus::Cancelled => stats.cancelled += 1,
            }
            stats
        })
    }
}

// ==============================================================================
// NOTIFICATION MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub service: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AppointmentStatus,
    pub title: String,
    pub message: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "appointmentDetails")]
    pub appointment_details: AppointmentDetails,
    #[serde(rename = "rejectionReason", skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(rename = "cancellationReason", skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Client e-mail the notification is addressed to.
    pub recipient: String,
}

/// One lifecycle step, as handed to the notification projector.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub from: Option<AppointmentStatus>,
    pub to: AppointmentStatus,
    pub appointment: Appointment,
    pub reason: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Datos incompletos: {0}")]
    MissingField(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("La fecha {0} no está disponible")]
    DateBlocked(NaiveDate),

    #[error("El horario {0} no está disponible")]
    TimeSlotDisabled(String),

    #[error("Appointment slot not available")]
    SlotNotAvailable,

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("A reason is required to cancel an appointment")]
    ReasonRequired,

    #[error("Appointments can only be cancelled at least {notice_days} day(s) in advance")]
    CancellationWindowClosed { notice_days: i64 },

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
