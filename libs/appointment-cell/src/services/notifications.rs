// libs/appointment-cell/src/services/notifications.rs
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AppointmentDetails, AppointmentStatus, Notification, StatusTransition};

pub struct NotificationProjector;

impl NotificationProjector {
    pub fn new() -> Self {
        Self
    }

    /// Title and message shown to the client, keyed by the new status.
    pub fn copy_for(&self, status: AppointmentStatus) -> (&'static str, &'static str) {
        match status {
            AppointmentStatus::Pending => (
                "Cita Solicitada",
                "Tu solicitud de cita ha sido enviada y está pendiente de confirmación.",
            ),
            AppointmentStatus::Approved => (
                "Cita Confirmada",
                "¡Excelente! Tu cita ha sido confirmada.",
            ),
            AppointmentStatus::Rejected => (
                "Cita No Disponible",
                "Lamentamos informarte que no podemos confirmar tu cita en este horario.",
            ),
            AppointmentStatus::Cancelled => (
                "Cita Cancelada",
                "Has cancelado tu cita exitosamente.",
            ),
        }
    }

    pub fn project(&self, transition: &StatusTransition, at: DateTime<Utc>) -> Notification {
        let (title, message) = self.copy_for(transition.to);
        let appointment = &transition.appointment;

        Notification {
            id: Uuid::new_v4(),
            kind: transition.to,
            title: title.to_string(),
            message: message.to_string(),
            date: at,
            appointment_details: AppointmentDetails {
                service: appointment.service.clone(),
                date: appointment.date,
                time: appointment.time,
            },
            rejection_reason: match transition.to {
                AppointmentStatus::Rejected => transition.reason.clone(),
                _ => None,
            },
            cancellation_reason: match transition.to {
                AppointmentStatus::Cancelled => transition.reason.clone(),
                _ => None,
            },
            recipient: appointment.email.clone(),
        }
    }
}

impl Default for NotificationProjector {
    fn default() -> Self {
        Self::new()
    }
}

/// Oldest entries are dropped once the feed holds this many.
pub const MAX_NOTIFICATIONS: usize = 500;

/// Most-recent-first list of projected notifications. Not persisted.
pub struct NotificationFeed {
    entries: RwLock<VecDeque<Notification>>,
    limit: usize,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::with_limit(MAX_NOTIFICATIONS)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            limit: limit.max(1),
        }
    }

    pub async fn push(&self, notification: Notification) {
        debug!("Notification '{}' for {}", notification.title, notification.recipient);
        let mut entries = self.entries.write().await;
        entries.push_front(notification);
        entries.truncate(self.limit);
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn for_recipient(&self, email: &str) -> Vec<Notification> {
        self.entries.read().await
            .iter()
            .filter(|notification| notification.recipient.eq_ignore_ascii_case(email))
            .cloned()
            .collect()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new()
    }
}
