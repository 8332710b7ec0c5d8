pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{
    NotificationPayload, PaymentDetails, PaymentRequest, PaymentRequestBuilder, PaymentStatus,
};
pub use errors::{DomainError, DomainResult};
pub use value_objects::{Credentials, PayType};
