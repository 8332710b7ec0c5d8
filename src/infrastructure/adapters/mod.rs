pub mod bufpay_adapter;

pub use bufpay_adapter::BufPayClient;
