//! Report export for the external reporting layer.

use super::metrics::MetricsSnapshot;
use crate::error::Result;
use crate::queue::CompletionSummary;
use crate::scheduler::SortingStyle;

/// Trait for exporting simulation reports to different sinks
pub trait ReportExporter: Send + Sync {
    fn export(&self, report: &SimulationReport) -> Result<()>;
}

/// Point-in-time view of a run, flattened for serialization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimulationReport {
    pub uptime_secs: f64,
    pub ready: usize,
    pub running: bool,
    pub completed: usize,
    pub processes_generated: u64,
    pub processes_dispatched: u64,
    pub processes_faulted: u64,
    pub age_selections: u64,
    pub burst_time_selections: u64,
    pub last_sorting_style: SortingStyle,
    pub mean_ttc_ms: f64,
    pub p50_ttc_ms: f64,
    pub p95_ttc_ms: f64,
    pub p99_ttc_ms: f64,
    pub max_ttc_ms: f64,
    pub throughput_per_sec: f64,
    pub completion: CompletionSummary,
}

impl SimulationReport {
    pub fn new(
        snapshot: &MetricsSnapshot,
        completion: CompletionSummary,
        ready: usize,
        running: bool,
        last_sorting_style: SortingStyle,
    ) -> Self {
        let ms = |d: std::time::Duration| d.as_secs_f64() * 1_000.0;
        Self {
            uptime_secs: snapshot.uptime.as_secs_f64(),
            ready,
            running,
            completed: completion.count,
            processes_generated: snapshot.processes_generated,
            processes_dispatched: snapshot.processes_dispatched,
            processes_faulted: snapshot.processes_faulted,
            age_selections: snapshot.age_selections,
            burst_time_selections: snapshot.burst_time_selections,
            last_sorting_style,
            mean_ttc_ms: ms(snapshot.mean_ttc),
            p50_ttc_ms: ms(snapshot.p50_ttc),
            p95_ttc_ms: ms(snapshot.p95_ttc),
            p99_ttc_ms: ms(snapshot.p99_ttc),
            max_ttc_ms: ms(snapshot.max_ttc),
            throughput_per_sec: snapshot.throughput(),
            completion,
        }
    }
}

/// Export reports as pretty-printed JSON.
#[cfg(feature = "telemetry")]
#[derive(Debug)]
pub struct JsonExporter {
    output_path: std::path::PathBuf,
}

#[cfg(feature = "telemetry")]
impl JsonExporter {
    pub fn new(output_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn render(report: &SimulationReport) -> Result<String> {
        serde_json::to_string_pretty(report).map_err(|e| {
            crate::error::Error::export(format!("JSON serialization failed: {}", e))
        })
    }
}

#[cfg(feature = "telemetry")]
impl ReportExporter for JsonExporter {
    fn export(&self, report: &SimulationReport) -> Result<()> {
        let json = Self::render(report)?;
        std::fs::write(&self.output_path, json)?;
        Ok(())
    }
}

/// Export reports to stdout
#[derive(Debug)]
pub struct ConsoleExporter {
    verbose: bool,
}

impl ConsoleExporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ReportExporter for ConsoleExporter {
    fn export(&self, report: &SimulationReport) -> Result<()> {
        println!("=== SJF Simulation ===");
        println!("Uptime: {:.2}s", report.uptime_secs);
        println!(
            "Ready: {}  Running: {}  Completed: {}",
            report.ready, report.running, report.completed
        );
        println!(
            "Generated: {}  Dispatched: {}  Faulted: {}",
            report.processes_generated, report.processes_dispatched, report.processes_faulted
        );
        println!(
            "Selections: {} by burst time, {} by age (last: {})",
            report.burst_time_selections, report.age_selections, report.last_sorting_style
        );

        if self.verbose {
            println!("\nTime to complete:");
            println!("  Mean: {:.2}ms", report.mean_ttc_ms);
            println!("  P50: {:.2}ms", report.p50_ttc_ms);
            println!("  P95: {:.2}ms", report.p95_ttc_ms);
            println!("  P99: {:.2}ms", report.p99_ttc_ms);
            println!("  Max: {:.2}ms", report.max_ttc_ms);

            println!("\nCompleted processes:");
            println!("  Mean turnaround: {:.3}s", report.completion.mean_turnaround_secs);
            println!("  Mean waiting: {:.3}s", report.completion.mean_waiting_secs);
            println!("  Throughput: {:.2}/s", report.throughput_per_sec);
        }

        println!("======================");

        Ok(())
    }
}

impl Default for ConsoleExporter {
    fn default() -> Self {
        Self::new(false)
    }
}
