//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request log event
//! - Metrics are cheap and optional: nothing requires a recorder

pub mod logging;
pub mod metrics;
