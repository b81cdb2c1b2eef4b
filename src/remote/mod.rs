//! Remote Dida365 Access
//!
//! Transport trait, the reqwest implementation, and endpoint constants.

pub mod client;
pub mod transport;
pub mod urls;

pub use client::{time_to_millis, DidaClient};
pub use transport::{AuthTokens, FocusTransport};
