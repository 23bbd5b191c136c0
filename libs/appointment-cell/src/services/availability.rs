// libs/appointment-cell/src/services/availability.rs
use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use schedule_cell::models::ScheduleSettings;
use schedule_cell::services::slots::{display_label, normalize_time, SlotCalendar};

use crate::models::{Appointment, AppointmentError, DayAvailability, SlotAvailability};

/// Decides which (date, time) pairs can take a new appointment. Pure: the
/// caller supplies the settings snapshot and the current appointment list.
pub struct AvailabilityResolver;

impl AvailabilityResolver {
    pub fn new() -> Self {
        Self
    }

    /// `time` may be in display form (`"10:00 AM"`) or stored form
    /// (`"10:00:00"`). Unparseable times are never bookable.
    pub fn is_bookable(
        &self,
        date: NaiveDate,
        time: &str,
        settings: &ScheduleSettings,
        appointments: &[Appointment],
    ) -> bool {
        match normalize_time(time) {
            Ok(normalized) => self.check_slot(date, normalized, settings, appointments).is_ok(),
            Err(_) => false,
        }
    }

    /// Same decision as `is_bookable`, reporting which rule closed the slot.
    pub fn check_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        settings: &ScheduleSettings,
        appointments: &[Appointment],
    ) -> Result<(), AppointmentError> {
        if settings.is_date_blocked(date) {
            debug!("{} is blocked", date);
            return Err(AppointmentError::DateBlocked(date));
        }

        let label = display_label(time);
        if settings.is_slot_disabled(&label) {
            debug!("{} is disabled on every date", label);
            return Err(AppointmentError::TimeSlotDisabled(label));
        }

        if appointments.iter().any(|appointment| appointment.occupies(date, time)) {
            debug!("{} {} is held by an active appointment", date, label);
            return Err(AppointmentError::SlotNotAvailable);
        }

        Ok(())
    }

    /// Every catalog slot for `date` with its bookable flag.
    pub fn day_availability(
        &self,
        date: NaiveDate,
        settings: &ScheduleSettings,
        appointments: &[Appointment],
    ) -> DayAvailability {
        let slots = SlotCalendar::labels()
            .iter()
            .zip(SlotCalendar::times())
            .map(|(label, time)| SlotAvailability {
                label: label.to_string(),
                time,
                bookable: self.check_slot(date, time, settings, appointments).is_ok(),
            })
            .collect();

        DayAvailability {
            date,
            blocked: settings.is_date_blocked(date),
            slots,
        }
    }
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self::new()
    }
}
