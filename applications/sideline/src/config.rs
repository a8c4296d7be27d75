/// Soundboard configuration
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sideline_playback::EngineSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sideline.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SidelineConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub driver: DriverSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Level/progress sampling period, kept within 90-120 ms
    #[serde(default = "default_meter_interval_ms")]
    pub meter_interval_ms: u64,

    #[serde(default = "default_fade_steps")]
    pub fade_steps: u32,

    #[serde(default = "default_autofade_on_play_ms")]
    pub autofade_on_play_ms: u64,

    #[serde(default = "default_autofade_on_end_ms")]
    pub autofade_on_end_ms: u64,

    #[serde(default = "default_rapid_rate")]
    pub rapid_rate: f32,

    #[serde(default = "default_rapid_window_ms")]
    pub rapid_window_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverSettings {
    /// Period of the clock task advancing the engine
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl SidelineConfig {
    /// Load configuration from `sideline.toml` and `SIDELINE_*` variables
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a specific file and the environment
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = PathBuf::from(path);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (SIDELINE_ENGINE__SAMPLE_RATE=44100)
        settings = settings.add_source(
            config::Environment::with_prefix("SIDELINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        use crate::error::AppError;

        if self.engine.sample_rate == 0 {
            return Err(AppError::Config("engine.sample_rate must be positive".into()));
        }
        if self.engine.fade_steps == 0 {
            return Err(AppError::Config("engine.fade_steps must be positive".into()));
        }
        if !(self.engine.rapid_rate.is_finite() && self.engine.rapid_rate > 0.0) {
            return Err(AppError::Config("engine.rapid_rate must be positive".into()));
        }
        if self.driver.tick_ms == 0 {
            return Err(AppError::Config("driver.tick_ms must be positive".into()));
        }
        Ok(())
    }

    /// Engine tuning derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        let engine = &self.engine;
        EngineSettings {
            sample_rate: engine.sample_rate,
            fade_steps: engine.fade_steps,
            meter_interval: Duration::from_millis(engine.meter_interval_ms.clamp(90, 120)),
            autofade_on_play: Duration::from_millis(engine.autofade_on_play_ms),
            autofade_on_end: Duration::from_millis(engine.autofade_on_end_ms),
            rapid_rate: engine.rapid_rate,
            rapid_window: Duration::from_millis(engine.rapid_window_ms),
            ..EngineSettings::default()
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.driver.tick_ms)
    }
}

// Default values
impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            meter_interval_ms: default_meter_interval_ms(),
            fade_steps: default_fade_steps(),
            autofade_on_play_ms: default_autofade_on_play_ms(),
            autofade_on_end_ms: default_autofade_on_end_ms(),
            rapid_rate: default_rapid_rate(),
            rapid_window_ms: default_rapid_window_ms(),
        }
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://sideline.db".to_string()
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_meter_interval_ms() -> u64 {
    100
}

fn default_fade_steps() -> u32 {
    20
}

fn default_autofade_on_play_ms() -> u64 {
    1500
}

fn default_autofade_on_end_ms() -> u64 {
    2000
}

fn default_rapid_rate() -> f32 {
    2.0
}

fn default_rapid_window_ms() -> u64 {
    3000
}

fn default_tick_ms() -> u64 {
    10
}

fn default_log_filter() -> String {
    "sideline=info".to_string()
}
