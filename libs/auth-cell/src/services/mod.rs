pub mod accounts;
pub mod password;
pub mod store;

pub use accounts::AccountService;
pub use password::PasswordService;
pub use store::{AccountStore, InMemoryAccountStore, SupabaseAccountStore};
