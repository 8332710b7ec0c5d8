pub mod adapters;
pub mod config;

pub use adapters::BufPayClient;
pub use config::BufPayConfig;
