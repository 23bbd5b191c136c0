pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod notifications;
pub mod store;

pub use availability::AvailabilityResolver;
pub use booking::AppointmentBookingService;
pub use lifecycle::{AppointmentLifecycleRules, AppointmentLifecycleService};
pub use notifications::{NotificationFeed, NotificationProjector};
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
