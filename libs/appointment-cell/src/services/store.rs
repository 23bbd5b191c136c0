// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::supabase::{api_error, SupabaseClient};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, NewAppointment};

/// Persistence boundary for appointments. Implementations must refuse a
/// `create` whose (date, time) is already held by an active appointment.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Stores a new pending appointment and returns it with its id.
    async fn create(&self, record: NewAppointment) -> Result<Appointment, AppointmentError>;

    /// Every appointment, ordered by (date, time) ascending.
    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError>;

    /// Moves the appointment from `from` to `status` only if it still holds
    /// `from`. `reason` lands in the rejection or cancellation field
    /// depending on `status`. Re-activating an appointment fails with
    /// `SlotNotAvailable` when another active appointment holds its slot.
    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        status: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError>;
}

fn apply_status(appointment: &mut Appointment, status: AppointmentStatus, reason: Option<String>) {
    appointment.status = status;
    match status {
        AppointmentStatus::Rejected => appointment.rejection_reason = reason,
        AppointmentStatus::Cancelled => appointment.cancellation_reason = reason,
        _ => {}
    }
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, record: NewAppointment) -> Result<Appointment, AppointmentError> {
        // Check and insert under one write lock so concurrent bookings
        // cannot both take the slot
        let mut appointments = self.appointments.write().await;

        if appointments.iter().any(|existing| existing.occupies(record.date, record.time)) {
            warn!("Slot {} {} already taken", record.date, record.time);
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_name: record.client_name,
            phone: record.phone,
            email: record.email,
            date: record.date,
            time: record.time,
            service: record.service,
            status: AppointmentStatus::Pending,
            rejection_reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
        };

        appointments.push(appointment.clone());
        debug!("Stored appointment {} ({} total)", appointment.id, appointments.len());
        Ok(appointment)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.appointments.read().await.clone();
        appointments.sort_by(|a, b| {
            (a.date, a.time, a.created_at).cmp(&(b.date, b.time, b.created_at))
        });
        Ok(appointments)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments.read().await
            .iter()
            .find(|appointment| appointment.id == id)
            .cloned()
            .ok_or(AppointmentError::NotFound)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        status: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.write().await;
        let index = appointments
            .iter()
            .position(|appointment| appointment.id == id)
            .ok_or(AppointmentError::NotFound)?;

        let current = &appointments[index];
        if current.status != from {
            warn!("Appointment {} is {} now, expected {}", id, current.status, from);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: status,
            });
        }

        if status.is_active() && !from.is_active() {
            let (date, time) = (current.date, current.time);
            let taken = appointments
                .iter()
                .any(|other| other.id != id && other.occupies(date, time));
            if taken {
                warn!("Cannot re-activate {}: slot {} {} already taken", id, date, time);
                return Err(AppointmentError::SlotNotAvailable);
            }
        }

        let appointment = &mut appointments[index];
        apply_status(appointment, status, reason);
        Ok(appointment.clone())
    }
}

// ==============================================================================
// SUPABASE STORE
// ==============================================================================

const APPOINTMENTS_TABLE: &str = "appointments";

/// PostgREST-backed store. Slot uniqueness relies on a partial unique index:
///
/// ```sql
/// create unique index appointments_active_slot
///     on appointments (date, time)
///     where status in ('pending', 'approved');
/// ```
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn first_or_not_found(rows: Vec<Appointment>) -> Result<Appointment, AppointmentError> {
        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }
}

fn database_error(err: anyhow::Error) -> AppointmentError {
    AppointmentError::DatabaseError(err.to_string())
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn create(&self, record: NewAppointment) -> Result<Appointment, AppointmentError> {
        let row = json!({
            "client_name": record.client_name,
            "phone": record.phone,
            "email": record.email,
            "date": record.date,
            "time": record.time,
            "service": record.service,
            "status": AppointmentStatus::Pending,
        });

        let rows: Vec<Appointment> = self.supabase
            .insert(APPOINTMENTS_TABLE, row)
            .await
            .map_err(|e| match api_error(&e) {
                Some(api) if api.is_conflict() => AppointmentError::SlotNotAvailable,
                _ => database_error(e),
            })?;

        let appointment = Self::first_or_not_found(rows)
            .map_err(|_| AppointmentError::DatabaseError("Insert returned no row".to_string()))?;
        info!("Appointment {} stored in Supabase", appointment.id);
        Ok(appointment)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.supabase
            .select(APPOINTMENTS_TABLE, "select=*&order=date.asc,time.asc")
            .await
            .map_err(database_error)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        let rows: Vec<Appointment> = self.supabase
            .select(APPOINTMENTS_TABLE, &format!("select=*&id=eq.{}", id))
            .await
            .map_err(database_error)?;
        Self::first_or_not_found(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        status: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let mut patch = json!({ "status": status });
        let reason_column = match status {
            AppointmentStatus::Rejected => Some("rejection_reason"),
            AppointmentStatus::Cancelled => Some("cancellation_reason"),
            _ => None,
        };
        if let (Some(column), Value::Object(map)) = (reason_column, &mut patch) {
            map.insert(column.to_string(), json!(reason));
        }

        // Conditional on the current status so a concurrent transition
        // matches no row instead of overwriting
        let filter = format!("id=eq.{}&status=eq.{}", id, from);
        let rows: Vec<Appointment> = self.supabase
            .update(APPOINTMENTS_TABLE, &filter, patch)
            .await
            .map_err(|e| match api_error(&e) {
                Some(api) if api.is_conflict() => AppointmentError::SlotNotAvailable,
                _ => database_error(e),
            })?;

        match rows.into_iter().next() {
            Some(appointment) => Ok(appointment),
            None => {
                let current = self.get(id).await?;
                warn!("Appointment {} is {} now, expected {}", id, current.status, from);
                Err(AppointmentError::InvalidStatusTransition {
                    from: current.status,
                    to: status,
                })
            }
        }
    }
}
