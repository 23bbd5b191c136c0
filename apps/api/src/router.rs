use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tracing::info;

use appointment_cell::router::create_appointment_router;
use appointment_cell::services::{
    AppointmentBookingService, AppointmentLifecycleRules, AppointmentLifecycleService,
    AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore,
};
use auth_cell::router::auth_routes;
use auth_cell::services::{AccountService, AccountStore, InMemoryAccountStore, SupabaseAccountStore};
use catalog_cell::router::create_catalog_router;
use catalog_cell::services::CatalogService;
use schedule_cell::router::create_schedule_router;
use schedule_cell::services::{
    InMemoryScheduleStore, ScheduleService, ScheduleSettingsStore, SupabaseScheduleStore,
};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

/// Long-lived services shared by the cell routers.
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub schedule: Arc<ScheduleService>,
    pub catalog: Arc<CatalogService>,
    pub booking: Arc<AppointmentBookingService>,
}

impl AppServices {
    /// Picks Supabase-backed stores when Supabase is configured and
    /// in-memory stores otherwise.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let (appointment_store, settings_store, account_store): (
            Arc<dyn AppointmentStore>,
            Arc<dyn ScheduleSettingsStore>,
            Arc<dyn AccountStore>,
        ) = if config.is_supabase_configured() {
            info!("Using Supabase at {}", config.supabase_url);
            let supabase = Arc::new(SupabaseClient::new(config));
            (
                Arc::new(SupabaseAppointmentStore::new(supabase.clone())),
                Arc::new(SupabaseScheduleStore::new(supabase.clone())),
                Arc::new(SupabaseAccountStore::new(supabase)),
            )
        } else {
            info!("Supabase not configured, keeping data in memory");
            (
                Arc::new(InMemoryAppointmentStore::new()),
                Arc::new(InMemoryScheduleStore::new()),
                Arc::new(InMemoryAccountStore::new()),
            )
        };

        let accounts = Arc::new(AccountService::from_config(config, account_store).await?);
        let schedule = Arc::new(ScheduleService::new(settings_store));
        let catalog = Arc::new(CatalogService::new());
        let lifecycle = AppointmentLifecycleService::with_rules(AppointmentLifecycleRules {
            cancellation_notice_days: config.cancellation_notice_days,
        });
        let booking = Arc::new(AppointmentBookingService::new(
            appointment_store,
            schedule.clone(),
            catalog.clone(),
            lifecycle,
        ));

        Ok(Self { accounts, schedule, catalog, booking })
    }
}

pub fn create_router(config: Arc<AppConfig>, services: AppServices) -> Router {
    Router::new()
        .route("/", get(|| async { "Nail salon booking API is running!" }))
        .nest("/auth", auth_routes(config.clone(), services.accounts))
        .nest("/services", create_catalog_router(config.clone(), services.catalog))
        .merge(create_schedule_router(config.clone(), services.schedule))
        .merge(create_appointment_router(config, services.booking))
}
