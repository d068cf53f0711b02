pub use crate::config::{BurstRange, ConfigBuilder, ProcessConfig, SimulationConfig, ThreadCount};
pub use crate::error::{Error, Result};
pub use crate::executor::{PanicStrategy, SleepWorkload, Workload};
pub use crate::process::{BurstTimeSource, Process, ProcessId, ProcessState};
pub use crate::queue::{CompletedQueue, QueueItem, ReadyQueue};
pub use crate::scheduler::{Scheduler, SortingStyle};
pub use crate::simulation::{Setup, Simulation, SimulationSnapshot};
pub use crate::sync::RunState;

pub use crate::telemetry::{ConsoleExporter, Metrics, MetricsSnapshot, ReportExporter, SimulationReport};

#[cfg(feature = "telemetry")]
pub use crate::telemetry::JsonExporter;
