// libs/schedule-cell/src/services/settings.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_database::supabase::{api_error, SupabaseClient};

use crate::models::{BlockedDate, DisabledTimeSlotRow, ScheduleError, ScheduleSettings};

/// Durable owner of blocked dates and disabled time slots.
#[async_trait]
pub trait ScheduleSettingsStore: Send + Sync {
    async fn load(&self) -> Result<ScheduleSettings, ScheduleError>;

    /// Fails with `AlreadyBlocked` if the date is already present.
    async fn block_date(&self, date: NaiveDate) -> Result<(), ScheduleError>;

    /// Returns whether the date was blocked before the call.
    async fn unblock_date(&self, date: NaiveDate) -> Result<bool, ScheduleError>;

    async fn disable_slot(&self, label: &str) -> Result<(), ScheduleError>;

    async fn enable_slot(&self, label: &str) -> Result<bool, ScheduleError>;
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Default)]
pub struct InMemoryScheduleStore {
    settings: RwLock<ScheduleSettings>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ScheduleSettings) -> Self {
        Self { settings: RwLock::new(settings) }
    }
}

#[async_trait]
impl ScheduleSettingsStore for InMemoryScheduleStore {
    async fn load(&self) -> Result<ScheduleSettings, ScheduleError> {
        Ok(self.settings.read().await.clone())
    }

    async fn block_date(&self, date: NaiveDate) -> Result<(), ScheduleError> {
        if !self.settings.write().await.blocked_dates.insert(date) {
            return Err(ScheduleError::AlreadyBlocked(date));
        }
        Ok(())
    }

    async fn unblock_date(&self, date: NaiveDate) -> Result<bool, ScheduleError> {
        Ok(self.settings.write().await.blocked_dates.remove(&date))
    }

    async fn disable_slot(&self, label: &str) -> Result<(), ScheduleError> {
        if !self.settings.write().await.disabled_time_slots.insert(label.to_string()) {
            return Err(ScheduleError::AlreadyDisabled(label.to_string()));
        }
        Ok(())
    }

    async fn enable_slot(&self, label: &str) -> Result<bool, ScheduleError> {
        Ok(self.settings.write().await.disabled_time_slots.remove(label))
    }
}

// ==============================================================================
// SUPABASE STORE
// ==============================================================================

const BLOCKED_DATES_TABLE: &str = "blocked_dates";
const DISABLED_SLOTS_TABLE: &str = "disabled_time_slots";

/// Backed by two PostgREST tables with unique keys on `date` and `time_label`.
pub struct SupabaseScheduleStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseScheduleStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

fn map_insert_error(err: anyhow::Error, conflict: ScheduleError) -> ScheduleError {
    match api_error(&err) {
        Some(api) if api.is_conflict() => conflict,
        _ => ScheduleError::DatabaseError(err.to_string()),
    }
}

fn database_error(err: anyhow::Error) -> ScheduleError {
    ScheduleError::DatabaseError(err.to_string())
}

#[async_trait]
impl ScheduleSettingsStore for SupabaseScheduleStore {
    async fn load(&self) -> Result<ScheduleSettings, ScheduleError> {
        debug!("Loading schedule settings from Supabase");

        let dates: Vec<BlockedDate> = self.supabase
            .select(BLOCKED_DATES_TABLE, "select=date&order=date.asc")
            .await
            .map_err(database_error)?;

        let slots: Vec<DisabledTimeSlotRow> = self.supabase
            .select(DISABLED_SLOTS_TABLE, "select=time_label")
            .await
            .map_err(database_error)?;

        Ok(ScheduleSettings {
            blocked_dates: dates.into_iter().map(|row| row.date).collect(),
            disabled_time_slots: slots.into_iter().map(|row| row.time_label).collect(),
        })
    }

    async fn block_date(&self, date: NaiveDate) -> Result<(), ScheduleError> {
        let _: Vec<BlockedDate> = self.supabase
            .insert(BLOCKED_DATES_TABLE, json!({ "date": date }))
            .await
            .map_err(|e| map_insert_error(e, ScheduleError::AlreadyBlocked(date)))?;

        info!("Blocked date {} in Supabase", date);
        Ok(())
    }

    async fn unblock_date(&self, date: NaiveDate) -> Result<bool, ScheduleError> {
        let removed: Vec<BlockedDate> = self.supabase
            .delete(BLOCKED_DATES_TABLE, &format!("date=eq.{}", date))
            .await
            .map_err(database_error)?;
        Ok(!removed.is_empty())
    }

    async fn disable_slot(&self, label: &str) -> Result<(), ScheduleError> {
        let _: Vec<DisabledTimeSlotRow> = self.supabase
            .insert(DISABLED_SLOTS_TABLE, json!({ "time_label": label }))
            .await
            .map_err(|e| map_insert_error(e, ScheduleError::AlreadyDisabled(label.to_string())))?;
        Ok(())
    }

    async fn enable_slot(&self, label: &str) -> Result<bool, ScheduleError> {
        let filter = format!("time_label=eq.{}", urlencoding::encode(label));
        let removed: Vec<DisabledTimeSlotRow> = self.supabase
            .delete(DISABLED_SLOTS_TABLE, &filter)
            .await
            .map_err(database_error)?;
        Ok(!removed.is_empty())
    }
}
