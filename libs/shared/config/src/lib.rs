use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    pub token_ttl_hours: i64,
    pub cancellation_notice_days: i64,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            jwt_secret: String::new(),
            admin_email: String::new(),
            admin_password: String::new(),
            token_ttl_hours: 24,
            cancellation_notice_days: 1,
            server_port: 3001,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using in-memory stores");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_EMAIL not set, no administrator will be seeded");
                    String::new()
                }),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_PASSWORD not set, no administrator will be seeded");
                    String::new()
                }),
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", defaults.token_ttl_hours),
            cancellation_notice_days: parse_or(
                "CANCELLATION_NOTICE_DAYS",
                defaults.cancellation_notice_days,
            ),
            server_port: parse_or("SERVER_PORT", defaults.server_port),
        };

        if config.jwt_secret.is_empty() {
            warn!("Application not fully configured - tokens cannot be issued without JWT_SECRET");
        }

        config
    }

    /// True when appointments and schedule settings should live in Supabase.
    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn has_admin_seed(&self) -> bool {
        !self.admin_email.is_empty() && !self.admin_password.is_empty()
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
