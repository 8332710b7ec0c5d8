pub mod bufpay_config;

pub use bufpay_config::{BufPayConfig, DEFAULT_BASE_URL};
