pub mod bufpay_port;

pub use bufpay_port::BufPayPort;
