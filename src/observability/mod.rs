//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain subsystem produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//! ```

pub mod logging;
pub mod metrics;
