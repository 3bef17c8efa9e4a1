//! Retrying HTTP client
//!
//! Every remote call goes through [`RetryingClient`], so backoff and the set
//! of retryable statuses are defined once.

pub mod retry;
pub mod transport;

pub use retry::{RetryPolicy, RetryingClient, RETRYABLE_STATUSES};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, JSON_API};
