// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use shared_models::auth::Role;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

const SECONDS_PER_DAY: i64 = 86_400;

/// Business rules for appointment lifecycle management
#[derive(Debug, Clone)]
pub struct AppointmentLifecycleRules {
    /// Whole days between now and the appointment date required to cancel.
    pub cancellation_notice_days: i64,
}

impl Default for AppointmentLifecycleRules {
    fn default() -> Self {
        Self {
            cancellation_notice_days: 1,
        }
    }
}

pub struct AppointmentLifecycleService {
    rules: AppointmentLifecycleRules,
}

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self::with_rules(AppointmentLifecycleRules::default())
    }

    pub fn with_rules(rules: AppointmentLifecycleRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AppointmentLifecycleRules {
        &self.rules
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Approved,
                AppointmentStatus::Rejected,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Approved => vec![
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Rejected => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Approval and rejection belong to the administrator; cancellation to
    /// the client who booked.
    pub fn required_role(&self, new_status: AppointmentStatus) -> Option<Role> {
        match new_status {
            AppointmentStatus::Approved | AppointmentStatus::Rejected => Some(Role::Admin),
            AppointmentStatus::Cancelled => Some(Role::Client),
            AppointmentStatus::Pending => None,
        }
    }

    /// `ceil((date - now) / 1 day)`, with the date taken at UTC midnight.
    pub fn days_until(&self, date: NaiveDate, now: DateTime<Utc>) -> i64 {
        let start_of_day = date.and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now);
        let seconds = (start_of_day - now).num_seconds();

        // Integer division truncates toward zero, which is already the
        // ceiling for non-positive values
        if seconds > 0 {
            (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        } else {
            seconds / SECONDS_PER_DAY
        }
    }

    pub fn can_cancel(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        self.days_until(date, now) >= self.rules.cancellation_notice_days
    }

    /// Full check for moving `appointment` to `new_status` on behalf of
    /// `actor`. Returns the trimmed reason to store, if any.
    pub fn authorize_transition(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
        reason: Option<&str>,
        actor: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppointmentError> {
        self.validate_status_transition(appointment.status, new_status)?;

        if let Some(required) = self.required_role(new_status) {
            if required != actor {
                warn!("{} may not move appointment {} to {}", actor, appointment.id, new_status);
                return Err(AppointmentError::Unauthorized);
            }
        }

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let stored_reason = match new_status {
            AppointmentStatus::Cancelled => {
                if reason.is_none() {
                    return Err(AppointmentError::ReasonRequired);
                }
                if !self.can_cancel(appointment.date, now) {
                    warn!("Cancellation of {} refused: appointment on {} is too close",
                          appointment.id, appointment.date);
                    return Err(AppointmentError::CancellationWindowClosed {
                        notice_days: self.rules.cancellation_notice_days,
                    });
                }
                reason
            }
            AppointmentStatus::Rejected => reason,
            _ => None,
        };

        info!("Status transition validated: {} -> {}", appointment.status, new_status);
        Ok(stored_reason)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
