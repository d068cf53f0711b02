use crate::error::{Error, Result};
use crate::executor::PanicStrategy;
use std::time::Duration;

/// How many subtasks a generated process gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCount {
    /// Exactly `n` subtasks.
    Fixed(usize),
    /// A uniformly random count in `[1, max]`.
    UpTo(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        ThreadCount::UpTo(5)
    }
}

/// Parameters used to build one process control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessConfig {
    pub threads: ThreadCount,
    /// One subtask is elongated with probability `1 / max_long_thread_chance`.
    /// Zero disables elongation.
    pub max_long_thread_chance: u32,
    pub long_thread_bt_multiplier: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            threads: ThreadCount::default(),
            max_long_thread_chance: 10,
            long_thread_bt_multiplier: 10,
        }
    }
}

impl ProcessConfig {
    pub fn new(threads: ThreadCount) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    pub fn max_long_thread_chance(mut self, chance: u32) -> Self {
        self.max_long_thread_chance = chance;
        self
    }

    pub fn long_thread_bt_multiplier(mut self, multiplier: u32) -> Self {
        self.long_thread_bt_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.threads {
            ThreadCount::Fixed(0) => {
                return Err(Error::config("threads", "fixed subtask count must be >= 1"))
            }
            ThreadCount::UpTo(0) => {
                return Err(Error::config("threads", "max subtask count must be >= 1"))
            }
            _ => {}
        }

        if self.long_thread_bt_multiplier < 1 {
            return Err(Error::config(
                "long_thread_bt_multiplier",
                "must be >= 1",
            ));
        }

        Ok(())
    }
}

/// Integer sampling range for burst times; a sample is `randint(min, max) / divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstRange {
    pub min: u32,
    pub max: u32,
    pub divisor: u32,
}

impl Default for BurstRange {
    fn default() -> Self {
        Self {
            min: 50,
            max: 300,
            divisor: 100,
        }
    }
}

impl BurstRange {
    pub fn validate(&self) -> Result<()> {
        if self.divisor == 0 {
            return Err(Error::config("burst_range.divisor", "must be > 0"));
        }
        if self.min > self.max {
            return Err(Error::config(
                "burst_range",
                format!("min ({}) must be <= max ({})", self.min, self.max),
            ));
        }
        Ok(())
    }

    pub fn lower(&self) -> f64 {
        self.min as f64 / self.divisor as f64
    }

    pub fn upper(&self) -> f64 {
        self.max as f64 / self.divisor as f64
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub age_threshold: u64,
    pub process: ProcessConfig,
    pub burst_range: BurstRange,
    /// Wall-clock time slept per unit of burst time.
    pub time_scale: Duration,
    pub seed: Option<u64>,
    pub panic_strategy: PanicStrategy,
    pub thread_name_prefix: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            age_threshold: 10,
            process: ProcessConfig::default(),
            burst_range: BurstRange::default(),
            time_scale: Duration::from_secs(1),
            seed: None,
            panic_strategy: PanicStrategy::default(),
            thread_name_prefix: "sjf".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        self.process.validate()?;
        self.burst_range.validate()?;

        if self.time_scale.is_zero() {
            return Err(Error::config("time_scale", "must be non-zero"));
        }

        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix", "must not be empty"));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: SimulationConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    pub fn age_threshold(mut self, threshold: u64) -> Self {
        self.config.age_threshold = threshold;
        self
    }

    pub fn process(mut self, process: ProcessConfig) -> Self {
        self.config.process = process;
        self
    }

    pub fn burst_range(mut self, min: u32, max: u32, divisor: u32) -> Self {
        self.config.burst_range = BurstRange { min, max, divisor };
        self
    }

    pub fn time_scale(mut self, scale: Duration) -> Self {
        self.config.time_scale = scale;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<SimulationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        let range = BurstRange::default();
        assert_eq!(range.lower(), 0.5);
        assert_eq!(range.upper(), 3.0);
    }

    #[test]
    fn test_builder_rejects_zero_subtasks() {
        let err = SimulationConfig::builder()
            .process(ProcessConfig::new(ThreadCount::Fixed(0)))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("threads"));

        let err = ProcessConfig::new(ThreadCount::UpTo(0)).validate().unwrap_err();
        assert_eq!(err.field(), Some("threads"));
    }

    #[test]
    fn test_builder_rejects_zero_multiplier() {
        let err = SimulationConfig::builder()
            .process(ProcessConfig::default().long_thread_bt_multiplier(0))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("long_thread_bt_multiplier"));
    }

    #[test]
    fn test_builder_rejects_bad_burst_range() {
        let err = SimulationConfig::builder()
            .burst_range(300, 50, 100)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("burst_range"));

        let err = SimulationConfig::builder()
            .burst_range(1, 2, 0)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("burst_range.divisor"));
    }

    #[test]
    fn test_builder_rejects_zero_time_scale_and_empty_prefix() {
        let err = SimulationConfig::builder()
            .time_scale(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("time_scale"));

        let err = SimulationConfig::builder()
            .thread_name_prefix("")
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("thread_name_prefix"));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = SimulationConfig::builder()
            .age_threshold(3)
            .seed(7)
            .time_scale(Duration::from_millis(1))
            .process(ProcessConfig::new(ThreadCount::Fixed(2)).max_long_thread_chance(0))
            .build()
            .unwrap();

        assert_eq!(config.age_threshold, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.process.threads, ThreadCount::Fixed(2));
        assert_eq!(config.process.max_long_thread_chance, 0);
    }
}
