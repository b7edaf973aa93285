use crate::{
    confetti::DEFAULT_CONFETTI_COUNT,
    options::DEFAULT_OPTIONS_TEXT,
    wheel::{
        DEFAULT_CONFETTI_DURATION,
        DEFAULT_REMOVAL_DELAY,
        DEFAULT_SPIN_DURATION,
        WheelTimings,
    },
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub const CONFIG_ROOT: &str = "~/.config/spin-wheel";
const CONFIG_FILE: &str = "config.json";
const LOG_DIR: &str = "logs";
const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial contents of the option editor, parsed like typed input.
    pub options: String,
    pub remove_winner: bool,
    pub spin_duration_ms: u64,
    pub removal_delay_ms: u64,
    pub confetti_duration_ms: u64,
    pub confetti_count: usize,
    pub frame_rate: u32,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            options: DEFAULT_OPTIONS_TEXT.to_string(),
            remove_winner: false,
            spin_duration_ms: DEFAULT_SPIN_DURATION.as_millis() as u64,
            removal_delay_ms: DEFAULT_REMOVAL_DELAY.as_millis() as u64,
            confetti_duration_ms: DEFAULT_CONFETTI_DURATION.as_millis() as u64,
            confetti_count: DEFAULT_CONFETTI_COUNT,
            frame_rate: DEFAULT_FRAME_RATE,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn timings(&self) -> WheelTimings {
        WheelTimings {
            spin: Duration::from_millis(self.spin_duration_ms),
            removal_delay: Duration::from_millis(self.removal_delay_ms),
            confetti: Duration::from_millis(self.confetti_duration_ms),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.clamp(1, 240)))
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(raw) => expand_path(raw),
            None => expand_path(CONFIG_ROOT).join(LOG_DIR),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(eyre!("frame_rate must be positive"));
        }
        if self.spin_duration_ms == 0 {
            return Err(eyre!("spin_duration_ms must be positive"));
        }
        Ok(())
    }
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

pub fn default_config_path() -> PathBuf {
    expand_path(CONFIG_ROOT).join(CONFIG_FILE)
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Opens the store at `path`, writing a default config if none exists.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_structure(&path)?;
        Ok(Self { path })
    }

    pub fn load(&self) -> Result<AppConfig> {
        read_config(&self.path)
    }

}

pub fn ensure_structure(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create config directory {}", dir.display()))?;
    }
    if !path.exists() {
        write_config(path, &AppConfig::default())
            .wrap_err_with(|| format!("Failed to initialize config file at {}", path.display()))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let data = fs::read(path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(AppConfig::default());
    }
    let config = serde_json::from_slice::<AppConfig>(&data)
        .wrap_err("Failed to parse config JSON")?;
    config.validate()?;
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_vec_pretty(config).wrap_err("Failed to serialize config")?;
    fs::write(path, json).wrap_err("Failed to write config file")?;
    Ok(())
}
