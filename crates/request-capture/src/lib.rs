//! # Request Capture
//!
//! Every HTTP call a step makes goes through an [`HttpSender`]. Wrapping the
//! real sender in an [`EvidenceCollector`] records each exchange into the
//! scenario's evidence log without touching the request or the response.
//!
//! The [`validate`] helpers check responses and, on mismatch, log the full
//! body and add a line to the scenario's failure narrative.

pub mod collector;
pub mod error_body;
pub mod request;
pub mod response;
pub mod sender;
pub mod validate;

pub use collector::EvidenceCollector;
pub use error_body::ErrorBody;
pub use request::{ApiRequest, HttpMethod};
pub use response::ApiResponse;
pub use sender::{HttpSender, ReqwestSender};
