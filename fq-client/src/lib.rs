//! fq-client - speculative side of the quoting flow
//!
//! Prices a configuration locally the moment it changes, then settles on the
//! server's authoritative quote once the configuration has been quiet for the
//! debounce window. Both evaluations run the same `fq_common::pricing` code.

pub mod http;
pub mod pricer;
pub mod session;

pub use http::HttpPricingClient;
pub use pricer::AuthoritativePricer;
pub use session::{Quote, QuoteSession, QuoteSource, QuoteState};
