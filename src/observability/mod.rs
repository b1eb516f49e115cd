//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span of a request
//! - Metrics are optional and cheap when disabled

pub mod logging;
pub mod metrics;
