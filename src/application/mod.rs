pub mod dto;
pub mod payment_service;

pub use dto::{CreatePaymentRequest, ErrorResponse};
pub use payment_service::PaymentService;
