//! Payment gateway integration
//!
//! Request envelopes, the HTTP transport seam, the retrying gateway client,
//! response decoding and failure classification.

pub mod activity;
pub mod classifier;
pub mod client;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

pub use activity::ActivityIndicator;
pub use classifier::{GatewayFailure, Refusal, RefusalReason};
pub use client::GatewayClient;
pub use request::{GatewayRequest, PaymentDetailsRequest, PaymentMethodsRequest, PaymentsRequest};
pub use response::{PaymentMethodsResponse, PaymentOutcome, PaymentsResponse};
pub use transport::{HttpTransport, OutgoingRequest, RawResponse, ReqwestTransport, TransportFailure};
