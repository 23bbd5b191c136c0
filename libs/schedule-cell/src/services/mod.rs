pub mod slots;
pub mod settings;
pub mod schedule;

pub use slots::SlotCalendar;
pub use settings::{InMemoryScheduleStore, ScheduleSettingsStore, SupabaseScheduleStore};
pub use schedule::ScheduleService;
