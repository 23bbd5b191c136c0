// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_cell::models::CatalogError;
use catalog_cell::services::CatalogService;
use schedule_cell::models::ScheduleError;
use schedule_cell::services::slots::{normalize_time, parse_date, SlotCalendar};
use schedule_cell::services::ScheduleService;
use shared_models::auth::{Role, User};

use crate::models::{
    Appointment, AppointmentError, AppointmentStats, AppointmentStatus, BookAppointmentRequest,
    DayAvailability, NewAppointment, Notification, StatusTransition, UpdateStatusRequest,
};
use crate::services::availability::AvailabilityResolver;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::notifications::{NotificationFeed, NotificationProjector};
use crate::services::store::AppointmentStore;

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    schedule: Arc<ScheduleService>,
    catalog: Arc<CatalogService>,
    resolver: AvailabilityResolver,
    lifecycle_service: AppointmentLifecycleService,
    projector: NotificationProjector,
    feed: Arc<NotificationFeed>,
}

fn schedule_error(e: ScheduleError) -> AppointmentError {
    match e {
        ScheduleError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
        ScheduleError::MissingDate => AppointmentError::MissingField("date"),
        ScheduleError::MissingTime => AppointmentError::MissingField("time"),
        other => AppointmentError::ValidationError(other.to_string()),
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        schedule: Arc<ScheduleService>,
        catalog: Arc<CatalogService>,
        lifecycle_service: AppointmentLifecycleService,
    ) -> Self {
        Self {
            store,
            schedule,
            catalog,
            resolver: AvailabilityResolver::new(),
            lifecycle_service,
            projector: NotificationProjector::new(),
            feed: Arc::new(NotificationFeed::new()),
        }
    }

    pub fn feed(&self) -> Arc<NotificationFeed> {
        Arc::clone(&self.feed)
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let client_name = required(&request.client_name, "client_name")?;
        let service_name = required(&request.service, "service")?;
        let phone = required(&request.phone, "phone")?;
        let email = required(&request.email, "email")?;
        let date = parse_date(&request.date).map_err(schedule_error)?;
        let time = normalize_time(&request.time).map_err(schedule_error)?;

        if let Some(status) = request.status.filter(|s| *s != AppointmentStatus::Pending) {
            debug!("Ignoring client-supplied status {} on booking", status);
        }

        if !SlotCalendar::contains(time) {
            return Err(AppointmentError::ValidationError(format!(
                "{} is not a bookable time", request.time.trim()
            )));
        }

        let service = self.catalog.find_by_name(&service_name).await.map_err(|e| match e {
            CatalogError::UnknownService(name) => {
                AppointmentError::ValidationError(format!("Unknown service: {}", name))
            }
            other => AppointmentError::ValidationError(other.to_string()),
        })?;

        // Advisory pre-check for a precise error; the store decides the race
        let settings = self.schedule.settings().await.map_err(schedule_error)?;
        let appointments = self.store.list_all().await?;
        self.resolver.check_slot(date, time, &settings, &appointments)?;

        let appointment = self.store.create(NewAppointment {
            client_name,
            phone,
            email,
            date,
            time,
            service: service.name,
        }).await?;

        info!("Appointment {} booked for {} {}", appointment.id, appointment.date, appointment.time);

        self.publish(StatusTransition {
            from: None,
            to: AppointmentStatus::Pending,
            appointment: appointment.clone(),
            reason: None,
        }).await;

        Ok(appointment)
    }

    /// All appointments, or those whose e-mail matches `email`.
    pub async fn list_appointments(&self, email: Option<&str>) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.store.list_all().await?;
        Ok(match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => appointments
                .into_iter()
                .filter(|appointment| appointment.email.eq_ignore_ascii_case(email))
                .collect(),
            None => appointments,
        })
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store.get(id).await
    }

    pub async fn get_stats(&self) -> Result<AppointmentStats, AppointmentError> {
        let appointments = self.store.list_all().await?;
        Ok(AppointmentStats::from_appointments(&appointments))
    }

    pub async fn day_availability(&self, raw_date: &str) -> Result<DayAvailability, AppointmentError> {
        let date = parse_date(raw_date).map_err(schedule_error)?;
        let settings = self.schedule.settings().await.map_err(schedule_error)?;
        let appointments = self.store.list_all().await?;
        Ok(self.resolver.day_availability(date, &settings, &appointments))
    }

    /// Moves an appointment along its lifecycle on behalf of `user`. Clients
    /// may only act on appointments booked with their own e-mail.
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.store.get(id).await?;

        if user.role == Role::Client {
            let owns = user.email.as_deref()
                .map(|email| email.eq_ignore_ascii_case(&current.email))
                .unwrap_or(false);
            if !owns {
                warn!("User {} tried to change appointment {} they do not own", user.id, id);
                return Err(AppointmentError::Unauthorized);
            }
        }

        let reason = self.lifecycle_service.authorize_transition(
            &current,
            request.status,
            request.reason.as_deref(),
            user.role,
            now,
        )?;

        let updated = self.store
            .update_status(id, current.status, request.status, reason.clone())
            .await?;
        info!("Appointment {} moved from {} to {}", id, current.status, updated.status);

        self.publish(StatusTransition {
            from: Some(current.status),
            to: updated.status,
            appointment: updated.clone(),
            reason,
        }).await;

        Ok(updated)
    }

    /// Admins see the whole feed; clients see their own notifications.
    pub async fn notifications_for(&self, user: &User) -> Vec<Notification> {
        match (&user.role, user.email.as_deref()) {
            (Role::Admin, _) => self.feed.all().await,
            (Role::Client, Some(email)) => self.feed.for_recipient(email).await,
            (Role::Client, None) => Vec::new(),
        }
    }

    async fn publish(&self, transition: StatusTransition) {
        let notification = self.projector.project(&transition, Utc::now());
        self.feed.push(notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use schedule_cell::services::InMemoryScheduleStore;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::services::store::InMemoryAppointmentStore;

    /// Serves a frozen snapshot from `get` to mimic a read that lost a race.
    #[derive(Default)]
    struct StaleReadStore {
        inner: InMemoryAppointmentStore,
        snapshot: Mutex<Option<Appointment>>,
    }

    #[async_trait]
    impl AppointmentStore for StaleReadStore {
        async fn create(&self, record: NewAppointment) -> Result<Appointment, AppointmentError> {
            self.inner.create(record).await
        }

        async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
            self.inner.list_all().await
        }

        async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
            match self.snapshot.lock().await.clone() {
                Some(snapshot) if snapshot.id == id => Ok(snapshot),
                _ => self.inner.get(id).await,
            }
        }

        async fn update_status(
            &self,
            id: Uuid,
            from: AppointmentStatus,
            status: AppointmentStatus,
            reason: Option<String>,
        ) -> Result<Appointment, AppointmentError> {
            self.inner.update_status(id, from, status, reason).await
        }
    }

    fn service() -> AppointmentBookingService {
        AppointmentBookingService::new(
            Arc::new(InMemoryAppointmentStore::new()),
            Arc::new(ScheduleService::new(Arc::new(InMemoryScheduleStore::new()))),
            Arc::new(CatalogService::new()),
            AppointmentLifecycleService::new(),
        )
    }

    fn request(date: &str, time: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            client_name: "Daniela Ríos".to_string(),
            service: "uñas de gel".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            phone: "3104445566".to_string(),
            email: "daniela@example.com".to_string(),
            status: Some(AppointmentStatus::Approved),
        }
    }

    fn client(email: &str) -> User {
        User {
            id: "client-1".to_string(),
            email: Some(email.to_string()),
            role: Role::Client,
            created_at: None,
        }
    }

    fn admin() -> User {
        User {
            id: "admin-1".to_string(),
            email: Some("admin@nails.test".to_string()),
            role: Role::Admin,
            created_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_booking_starts_pending_with_catalog_name() {
        let service = service();
        let appointment = service.book_appointment(request("2025-06-01", "10:00 AM")).await.unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.service, "Uñas de Gel");
        assert_eq!(appointment.time.to_string(), "10:00:00");

        let feed = service.notifications_for(&admin()).await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "Cita Solicitada");
    }

    #[tokio::test]
    async fn test_booking_validation() {
        let service = service();

        let mut missing = request("2025-06-01", "10:00 AM");
        missing.phone = "  ".to_string();
        assert_matches!(service.book_appointment(missing).await, Err(AppointmentError::MissingField("phone")));

        assert_matches!(
            service.book_appointment(request("2025-06-01", "1:00 PM")).await,
            Err(AppointmentError::ValidationError(_))
        );

        let mut unknown = request("2025-06-01", "10:00 AM");
        unknown.service = "Pedicure".to_string();
        assert_matches!(service.book_appointment(unknown).await, Err(AppointmentError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_double_booking_and_blocked_date() {
        let service = service();
        service.book_appointment(request("2025-06-01", "10:00 AM")).await.unwrap();

        assert_matches!(
            service.book_appointment(request("2025-06-01", "10:00:00")).await,
            Err(AppointmentError::SlotNotAvailable)
        );

        service.schedule.block_date("2025-06-02").await.unwrap();
        assert_matches!(
            service.book_appointment(request("2025-06-02", "10:00 AM")).await,
            Err(AppointmentError::DateBlocked(_))
        );
    }

    #[tokio::test]
    async fn test_reject_frees_slot_and_cannot_be_approved() {
        let service = service();
        let booked = service.book_appointment(request("2025-06-01", "10:00 AM")).await.unwrap();

        let rejected = service.update_status(
            booked.id,
            UpdateStatusRequest { status: AppointmentStatus::Rejected, reason: Some("Sin personal".to_string()) },
            &admin(),
            now(),
        ).await.unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Sin personal"));

        assert_matches!(
            service.update_status(
                booked.id,
                UpdateStatusRequest { status: AppointmentStatus::Approved, reason: None },
                &admin(),
                now(),
            ).await,
            Err(AppointmentError::InvalidStatusTransition { .. })
        );

        assert!(service.book_appointment(request("2025-06-01", "10:00 AM")).await.is_ok());
    }

    #[tokio::test]
    async fn test_client_cancels_only_own_appointment() {
        let service = service();
        let booked = service.book_appointment(request("2025-06-01", "3:00 PM")).await.unwrap();
        let cancel = || UpdateStatusRequest {
            status: AppointmentStatus::Cancelled,
            reason: Some("Viaje".to_string()),
        };

        assert_matches!(
            service.update_status(booked.id, cancel(), &client("otra@example.com"), now()).await,
            Err(AppointmentError::Unauthorized)
        );

        let cancelled = service
            .update_status(booked.id, cancel(), &client("Daniela@Example.com"), now())
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let own = service.notifications_for(&client("daniela@example.com")).await;
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].title, "Cita Cancelada");
        assert_eq!(own[0].cancellation_reason.as_deref(), Some("Viaje"));
    }

    #[tokio::test]
    async fn test_list_filter_and_stats() {
        let service = service();
        service.book_appointment(request("2025-06-01", "9:00 AM")).await.unwrap();
        let mut other = request("2025-06-01", "11:00 AM");
        other.email = "maria@example.com".to_string();
        service.book_appointment(other).await.unwrap();

        assert_eq!(service.list_appointments(None).await.unwrap().len(), 2);
        assert_eq!(service.list_appointments(Some("MARIA@example.com")).await.unwrap().len(), 1);

        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 2);
    }

    #[tokio::test]
    async fn test_day_availability_reflects_bookings() {
        let service = service();
        service.book_appointment(request("2025-06-01", "9:00 AM")).await.unwrap();

        let day = service.day_availability("2025-06-01").await.unwrap();
        assert!(!day.slots[0].bookable);
        assert!(day.slots[1..].iter().all(|slot| slot.bookable));

        assert_matches!(service.day_availability("").await, Err(AppointmentError::MissingField("date")));
    }

    #[tokio::test]
    async fn test_approval_on_stale_read_does_not_double_book() {
        let store = Arc::new(StaleReadStore::default());
        let service = AppointmentBookingService::new(
            store.clone(),
            Arc::new(ScheduleService::new(Arc::new(InMemoryScheduleStore::new()))),
            Arc::new(CatalogService::new()),
            AppointmentLifecycleService::new(),
        );

        let first = service.book_appointment(request("2025-06-01", "10:00 AM")).await.unwrap();
        *store.snapshot.lock().await = Some(first.clone());

        service.store
            .update_status(first.id, AppointmentStatus::Pending, AppointmentStatus::Rejected, None)
            .await
            .unwrap();
        let mut rebooking = request("2025-06-01", "10:00 AM");
        rebooking.email = "otra@example.com".to_string();
        service.book_appointment(rebooking).await.unwrap();

        assert_matches!(
            service.update_status(
                first.id,
                UpdateStatusRequest { status: AppointmentStatus::Approved, reason: None },
                &admin(),
                now(),
            ).await,
            Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Rejected, .. })
        );

        let active = service.list_appointments(None).await.unwrap()
            .iter()
            .filter(|a| a.is_active())
            .count();
        assert_eq!(active, 1);
    }
}
