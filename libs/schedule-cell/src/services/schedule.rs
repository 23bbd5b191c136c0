// libs/schedule-cell/src/services/schedule.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{BlockedDate, ScheduleError, ScheduleSettings};
use crate::services::settings::ScheduleSettingsStore;
use crate::services::slots::{parse_date, SlotCalendar};

/// Administrative toggles over the schedule settings, with input parsing.
pub struct ScheduleService {
    store: Arc<dyn ScheduleSettingsStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleSettingsStore>) -> Self {
        Self { store }
    }

    /// Snapshot passed to the availability resolver on every check.
    pub async fn settings(&self) -> Result<ScheduleSettings, ScheduleError> {
        self.store.load().await
    }

    pub async fn blocked_dates(&self) -> Result<Vec<BlockedDate>, ScheduleError> {
        let settings = self.store.load().await?;
        Ok(settings
            .blocked_dates
            .into_iter()
            .map(|date| BlockedDate { date })
            .collect())
    }

    pub async fn block_date(&self, raw_date: &str) -> Result<BlockedDate, ScheduleError> {
        let date = parse_date(raw_date)?;

        if let Err(e) = self.store.block_date(date).await {
            warn!("Could not block {}: {}", date, e);
            return Err(e);
        }

        info!("Date {} blocked", date);
        Ok(BlockedDate { date })
    }

    /// Unblocking a date that is not blocked succeeds without change.
    pub async fn unblock_date(&self, raw_date: &str) -> Result<(), ScheduleError> {
        let date = parse_date(raw_date)?;
        if self.store.unblock_date(date).await? {
            info!("Date {} unblocked", date);
        }
        Ok(())
    }

    /// Slot labels in calendar order.
    pub async fn disabled_time_slots(&self) -> Result<Vec<String>, ScheduleError> {
        let settings = self.store.load().await?;
        Ok(SlotCalendar::labels()
            .iter()
            .filter(|label| settings.is_slot_disabled(label))
            .map(|label| label.to_string())
            .collect())
    }

    pub async fn disable_time_slot(&self, raw_time: &str) -> Result<String, ScheduleError> {
        let label = SlotCalendar::canonical_label(raw_time)?;
        self.store.disable_slot(label).await?;
        info!("Time slot {} disabled on every date", label);
        Ok(label.to_string())
    }

    pub async fn enable_time_slot(&self, raw_time: &str) -> Result<(), ScheduleError> {
        let label = SlotCalendar::canonical_label(raw_time)?;
        if self.store.enable_slot(label).await? {
            info!("Time slot {} enabled", label);
        }
        Ok(())
    }
}
