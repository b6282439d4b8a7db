//! 引擎配置
//!
//! 构造一次，按引用传给各分析器；运行期间只读。

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateWeights, SeverityThresholds};
use crate::error::{Result, TensionError};
use crate::landmarks::{LandmarkIndexMap, LANDMARK_COUNT};
use crate::regions::{AnalyzerSettings, DEFAULT_BASELINE_EPSILON};
use crate::smoothing::DEFAULT_HISTORY_CAPACITY;

/// 配置文件只需写出要覆盖的字段，其余取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub landmark_count: usize,
    pub history_capacity: usize,
    pub baseline_epsilon: f64,
    /// 有基线时是否走基线模式
    pub use_baseline: bool,
    /// 会话首帧自动作为基线
    pub auto_calibrate: bool,
    pub weights: AggregateWeights,
    pub severity: SeverityThresholds,
    pub landmark_indices: LandmarkIndexMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            landmark_count: LANDMARK_COUNT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            baseline_epsilon: DEFAULT_BASELINE_EPSILON,
            use_baseline: true,
            auto_calibrate: true,
            weights: AggregateWeights::default(),
            severity: SeverityThresholds::default(),
            landmark_indices: LandmarkIndexMap::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.landmark_count == 0 {
            return Err(TensionError::InvalidConfig(
                "landmarkCount must be > 0".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(TensionError::InvalidConfig(
                "historyCapacity must be > 0".to_string(),
            ));
        }
        if !(self.baseline_epsilon.is_finite() && self.baseline_epsilon > 0.0) {
            return Err(TensionError::InvalidConfig(
                "baselineEpsilon must be a positive finite number".to_string(),
            ));
        }

        self.weights.validate()?;
        self.severity.validate()?;
        self.landmark_indices.validate(self.landmark_count)?;
        Ok(())
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            landmark_count: self.landmark_count,
            history_capacity: self.history_capacity,
            baseline_epsilon: self.baseline_epsilon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analyzer_settings(), AnalyzerSettings::default());
    }

    #[test]
    fn rejects_zero_capacity_and_epsilon() {
        let config = EngineConfig {
            history_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TensionError::InvalidConfig(_))
        ));

        let config = EngineConfig {
            baseline_epsilon: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn index_map_must_fit_landmark_count() {
        let config = EngineConfig {
            landmark_count: 100,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TensionError::IndexOutOfRange { len: 100, .. })
        ));
    }

    #[test]
    fn single_field_file_overrides_only_that_field() {
        let config: EngineConfig = serde_json::from_str(r#"{"useBaseline": false}"#).unwrap();
        assert!(!config.use_baseline);
        assert_eq!(
            config,
            EngineConfig {
                use_baseline: false,
                ..EngineConfig::default()
            }
        );
        assert!(config.validate().is_ok());

        let empty: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn nested_section_fields_default_individually() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"severity": {"low": 2.0, "high": 7.0}, "historyCapacity": 3}"#)
                .unwrap();
        assert_eq!(config.history_capacity, 3);
        assert_eq!(config.severity.low, 2.0);
        assert_eq!(config.landmark_count, LANDMARK_COUNT);
        assert!(config.auto_calibrate);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "landmarkCount": 468,
            "historyCapacity": 3,
            "baselineEpsilon": 0.000001,
            "useBaseline": false,
            "autoCalibrate": false,
            "severity": { "low": 2.0, "high": 7.0 }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_capacity, 3);
        assert!(!config.use_baseline);
        assert_eq!(config.severity.high, 7.0);
        assert_eq!(config.weights, AggregateWeights::default());
        assert_eq!(config.landmark_indices, LandmarkIndexMap::default());
        assert!(config.validate().is_ok());
    }
}
