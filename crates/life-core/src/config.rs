//! Configuration types for the simulation.

use crate::{Error, FillMode, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 36, cols: 64 }
    }
}

impl GridConfig {
    /// Both sides must be at least 1 and the cell count must be addressable.
    pub fn validate(&self) -> Result<()> {
        let addressable = self
            .rows
            .checked_mul(self.cols)
            .is_some_and(|cells| cells <= isize::MAX as usize);
        if self.rows < 1 || self.cols < 1 || !addressable {
            return Err(Error::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

/// Step interval and speed control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Step interval at speed 0 (milliseconds)
    pub base_interval_ms: u64,
    /// Shortest interval the ticker may run at (milliseconds)
    pub min_interval_ms: u64,
    /// Largest accepted speed value
    pub max_speed: u64,
    /// Speed granularity; requested speeds are rounded down to a multiple of this
    pub speed_step: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 1000,
            min_interval_ms: 100,
            max_speed: 900,
            speed_step: 25,
        }
    }
}

impl TimingConfig {
    /// Clamp a requested speed into `[0, max_speed]` and snap it to `speed_step`.
    pub fn clamp_speed(&self, speed: u64) -> u64 {
        let speed = speed.min(self.max_speed);
        let step = self.speed_step.max(1);
        speed - speed % step
    }

    /// Interval between steps at the given speed, never below `min_interval_ms`.
    pub fn interval_for(&self, speed: u64) -> Duration {
        let speed = self.clamp_speed(speed);
        let ms = self
            .base_interval_ms
            .saturating_sub(speed)
            .max(self.min_interval_ms);
        Duration::from_millis(ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_interval_ms == 0 {
            return Err(Error::Config("min_interval_ms must be at least 1".to_string()));
        }
        if self.base_interval_ms < self.min_interval_ms {
            return Err(Error::Config(format!(
                "base_interval_ms ({}) is below min_interval_ms ({})",
                self.base_interval_ms, self.min_interval_ms
            )));
        }
        if self.speed_step == 0 {
            return Err(Error::Config("speed_step must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Configuration for one simulation session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Grid dimensions, fixed for the lifetime of the session
    pub grid: GridConfig,
    /// Timer configuration
    pub timing: TimingConfig,
    /// Random seed for reproducible random fills; entropy when absent
    pub seed: Option<u64>,
    /// Probability that a cell is alive after a random fill (0.0 to 1.0)
    pub random_density: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            timing: TimingConfig::default(),
            seed: None,
            random_density: 0.5,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if !(0.0..=1.0).contains(&self.random_density) {
            return Err(Error::Config(format!(
                "random_density must be within 0.0..=1.0, got {}",
                self.random_density
            )));
        }
        self.timing.validate()
    }
}

/// Configuration for the headless runner binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Session configuration
    pub session: SessionConfig,
    /// Fill used for the initial grid when no pattern is given
    pub initial_fill: FillMode,
    /// Named pattern stamped at the grid centre instead of `initial_fill`
    pub pattern: Option<String>,
    /// Initial speed applied once the session is running
    pub speed: u64,
    /// Stop after this many generations
    pub max_generations: Option<u64>,
    /// Print every generation to stdout
    pub render: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            initial_fill: FillMode::Random,
            pattern: None,
            speed: 0,
            max_generations: None,
            render: true,
        }
    }
}

impl RunnerConfig {
    /// Parse a runner configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.session.validate()?;
        tracing::debug!(
            rows = config.session.grid.rows,
            cols = config.session.grid.cols,
            "Parsed runner configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let grid = GridConfig::default();
        assert_eq!(grid.rows, 36);
        assert_eq!(grid.cols, 64);

        let timing = TimingConfig::default();
        assert_eq!(timing.base_interval_ms, 1000);
        assert_eq!(timing.max_speed, 900);

        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_interval_range() {
        let timing = TimingConfig::default();
        assert_eq!(timing.interval_for(0), Duration::from_millis(1000));
        assert_eq!(timing.interval_for(250), Duration::from_millis(750));
        assert_eq!(timing.interval_for(900), Duration::from_millis(100));
        // Beyond max_speed is clamped
        assert_eq!(timing.interval_for(5000), Duration::from_millis(100));
    }

    #[test]
    fn test_speed_snaps_to_step() {
        let timing = TimingConfig::default();
        assert_eq!(timing.clamp_speed(130), 125);
        assert_eq!(timing.clamp_speed(24), 0);
        assert_eq!(timing.clamp_speed(901), 900);
    }

    #[test]
    fn test_interval_never_below_minimum() {
        let timing = TimingConfig {
            base_interval_ms: 500,
            min_interval_ms: 100,
            max_speed: 900,
            speed_step: 1,
        };
        assert_eq!(timing.interval_for(450), Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_session_configs() {
        let mut config = SessionConfig::default();
        config.grid.rows = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDimensions { rows: 0, cols: 64 })
        ));

        let mut config = SessionConfig::default();
        config.grid.rows = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDimensions { cols: 64, .. })
        ));

        let mut config = SessionConfig::default();
        config.random_density = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SessionConfig::default();
        config.timing.speed_step = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_grid_cell_count_must_fit() {
        assert!(GridConfig { rows: 1, cols: 1 }.validate().is_ok());
        assert!(GridConfig { rows: usize::MAX, cols: 1 }.validate().is_err());
        assert!(GridConfig { rows: usize::MAX, cols: 2 }.validate().is_err());
        assert!(GridConfig { rows: 1 << 10, cols: 1 << 10 }.validate().is_ok());
    }

    #[test]
    fn test_runner_config_partial_json() {
        let config = RunnerConfig::from_json(
            r#"{ "session": { "grid": { "rows": 10 }, "seed": 7 }, "pattern": "glider" }"#,
        )
        .unwrap();
        assert_eq!(config.session.grid.rows, 10);
        assert_eq!(config.session.grid.cols, 64);
        assert_eq!(config.session.seed, Some(7));
        assert_eq!(config.pattern.as_deref(), Some("glider"));
        assert!(config.render);
    }

    #[test]
    fn test_runner_config_rejects_zero_cols() {
        let result = RunnerConfig::from_json(r#"{ "session": { "grid": { "cols": 0 } } }"#);
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }
}
