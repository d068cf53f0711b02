//! Telemetry and reporting subsystem.
//!
//! Counters and a time-to-complete histogram collected while the simulation
//! runs, plus exporters that hand a [`SimulationReport`] to whatever
//! reporting layer sits outside the crate.

pub mod export;
pub mod metrics;

pub use export::{ConsoleExporter, ReportExporter, SimulationReport};
pub use metrics::{Metrics, MetricsSnapshot};

#[cfg(feature = "telemetry")]
pub use export::JsonExporter;
