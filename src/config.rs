use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use facial_tension::EngineConfig;

use crate::replay::ReplayError;

/// 检测器输出的坐标约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    /// 图像归一化坐标 (0-1)
    Normalized,
    /// 像素坐标 (x·w, y·h, z·w)
    Pixel,
}

impl FromStr for CoordinateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" | "normalised" => Ok(Self::Normalized),
            "pixel" | "pixels" => Ok(Self::Pixel),
            other => Err(format!("unknown coordinate mode: {other}")),
        }
    }
}

impl fmt::Display for CoordinateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normalized => f.write_str("normalized"),
            Self::Pixel => f.write_str("pixel"),
        }
    }
}

/// 关键点坐标约定 + 像素模式下的帧尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    pub mode: CoordinateMode,
    pub width: f64,
    pub height: f64,
}

impl Default for CoordinateFrame {
    fn default() -> Self {
        Self {
            mode: CoordinateMode::Normalized,
            width: 640.0,
            height: 480.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    /// JSON 格式的引擎配置文件，未设置时使用默认配置
    pub engine_config_path: Option<String>,
    /// 以下两项仅在设置时覆盖引擎配置
    pub auto_calibrate: Option<bool>,
    pub use_baseline: Option<bool>,
    pub coordinates: CoordinateFrame,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = CoordinateFrame::default();
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            engine_config_path: env::var("ENGINE_CONFIG_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            auto_calibrate: env_opt_bool("AUTO_CALIBRATE"),
            use_baseline: env_opt_bool("USE_BASELINE"),
            coordinates: CoordinateFrame {
                mode: env_or_parse("COORDINATE_MODE", defaults.mode),
                width: env_or_parse("FRAME_WIDTH", defaults.width),
                height: env_or_parse("FRAME_HEIGHT", defaults.height),
            },
        }
    }

    /// 读取引擎配置文件（如有），叠加环境变量覆盖项并校验
    pub fn engine_config(&self) -> Result<EngineConfig, ReplayError> {
        let mut engine = match &self.engine_config_path {
            Some(path) => load_engine_config(Path::new(path))?,
            None => EngineConfig::default(),
        };
        if let Some(auto_calibrate) = self.auto_calibrate {
            engine.auto_calibrate = auto_calibrate;
        }
        if let Some(use_baseline) = self.use_baseline {
            engine.use_baseline = use_baseline;
        }
        engine.validate()?;
        Ok(engine)
    }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ReplayError> {
    let raw = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&raw)
        .map_err(|e| ReplayError::Config(format!("{}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "Loaded engine config");
    Ok(config)
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    env_opt_bool(key).unwrap_or(default)
}

pub fn env_opt_bool(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    let parsed = parse_bool(&raw);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Failed to parse boolean env var, ignoring");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "RUST_LOG",
            "ENABLE_FILE_LOGS",
            "LOG_DIR",
            "ENGINE_CONFIG_PATH",
            "AUTO_CALIBRATE",
            "USE_BASELINE",
            "COORDINATE_MODE",
            "FRAME_WIDTH",
            "FRAME_HEIGHT",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.enable_file_logs);
        assert!(cfg.engine_config_path.is_none());
        assert_eq!(cfg.auto_calibrate, None);
        assert_eq!(cfg.coordinates, CoordinateFrame::default());

        let engine = cfg.engine_config().expect("default engine config");
        assert_eq!(engine, EngineConfig::default());
    }

    #[test]
    fn parses_coordinate_settings() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("COORDINATE_MODE", "Pixel");
        env::set_var("FRAME_WIDTH", "1280");
        env::set_var("FRAME_HEIGHT", "720");

        let cfg = Config::from_env();
        assert_eq!(cfg.coordinates.mode, CoordinateMode::Pixel);
        assert_eq!(cfg.coordinates.width, 1280.0);
        assert_eq!(cfg.coordinates.height, 720.0);
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("COORDINATE_MODE", "polar");
        env::set_var("FRAME_WIDTH", "wide");
        env::set_var("AUTO_CALIBRATE", "maybe");

        let cfg = Config::from_env();
        assert_eq!(cfg.coordinates, CoordinateFrame::default());
        assert_eq!(cfg.auto_calibrate, None);
    }

    #[test]
    fn env_overrides_engine_file() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let engine = EngineConfig {
            history_capacity: 3,
            auto_calibrate: true,
            ..EngineConfig::default()
        };
        write!(file, "{}", serde_json::to_string(&engine).expect("json")).expect("write");

        env::set_var("ENGINE_CONFIG_PATH", file.path());
        env::set_var("AUTO_CALIBRATE", "off");

        let loaded = Config::from_env().engine_config().expect("engine config");
        assert_eq!(loaded.history_capacity, 3);
        assert!(!loaded.auto_calibrate);
        assert!(loaded.use_baseline);
    }

    #[test]
    fn malformed_engine_file_is_config_error() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");
        env::set_var("ENGINE_CONFIG_PATH", file.path());

        let err = Config::from_env().engine_config().unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }
}
