//! 综合评分模块
//!
//! 把五个区域的平滑分数 (0-1) 按固定权重融合成三个 0-10 指标：
//! - 疼痛：眉 25% + 面部扭曲 30% + 眼 20% + 下颌 20% + 鼻唇沟 5%
//! - 压力：眼 50% + 眉 30% + 下颌 20%
//! - 焦虑：眼 30% + 眉 30% + 下颌 25% + 面部扭曲 15%
//!
//! 疼痛等级：
//! - Low (< 3)
//! - Moderate (3-6)
//! - High (>= 6)

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TensionError};
use crate::regions::Region;

/// 指标满分
pub const SCORE_SCALE: f64 = 10.0;

/// 权重和允许的偏差
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainWeights {
    pub brow: f64,
    pub grimace: f64,
    pub eye: f64,
    pub jaw: f64,
    pub nasolabial: f64,
}

impl Default for PainWeights {
    fn default() -> Self {
        Self {
            brow: 0.25,
            grimace: 0.30,
            eye: 0.20,
            jaw: 0.20,
            nasolabial: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressWeights {
    pub eye: f64,
    pub brow: f64,
    pub jaw: f64,
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            eye: 0.50,
            brow: 0.30,
            jaw: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnxietyWeights {
    pub eye: f64,
    pub brow: f64,
    pub jaw: f64,
    pub grimace: f64,
}

impl Default for AnxietyWeights {
    fn default() -> Self {
        Self {
            eye: 0.30,
            brow: 0.30,
            jaw: 0.25,
            grimace: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateWeights {
    #[serde(default)]
    pub pain: PainWeights,
    #[serde(default)]
    pub stress: StressWeights,
    #[serde(default)]
    pub anxiety: AnxietyWeights,
}

fn check_table(name: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(TensionError::InvalidConfig(format!(
            "{name} weights must be finite and >= 0"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(TensionError::InvalidConfig(format!(
            "{name} weights should sum to ~1.0 (got {sum:.3})"
        )));
    }
    Ok(())
}

impl AggregateWeights {
    pub fn validate(&self) -> Result<()> {
        let p = &self.pain;
        check_table("pain", &[p.brow, p.grimace, p.eye, p.jaw, p.nasolabial])?;
        let s = &self.stress;
        check_table("stress", &[s.eye, s.brow, s.jaw])?;
        let a = &self.anxiety;
        check_table("anxiety", &[a.eye, a.brow, a.jaw, a.grimace])?;
        Ok(())
    }
}

/// 疼痛分级阈值（0-10 分制）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityThresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            low: 3.0,
            high: 6.0,
        }
    }
}

impl SeverityThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=SCORE_SCALE).contains(&self.low) || !(0.0..=SCORE_SCALE).contains(&self.high) {
            return Err(TensionError::InvalidConfig(
                "severity thresholds must be in [0,10]".to_string(),
            ));
        }
        if self.low >= self.high {
            return Err(TensionError::InvalidConfig(
                "severity.low must be < severity.high".to_string(),
            ));
        }
        Ok(())
    }

    pub fn classify(&self, pain_score: f64) -> Severity {
        match pain_score {
            s if s < self.low => Severity::Low,
            s if s < self.high => Severity::Moderate,
            _ => Severity::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 五个区域本帧的平滑分数 (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionScores {
    pub brow: f64,
    pub eye: f64,
    pub grimace: f64,
    pub jaw: f64,
    pub nasolabial: f64,
}

impl RegionScores {
    /// 所有区域同一分数
    pub fn uniform(score: f64) -> Self {
        Self {
            brow: score,
            eye: score,
            grimace: score,
            jaw: score,
            nasolabial: score,
        }
    }

    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::Brow => self.brow,
            Region::Eye => self.eye,
            Region::Grimace => self.grimace,
            Region::Jaw => self.jaw,
            Region::Nasolabial => self.nasolabial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// 疼痛评分 (0-10)
    pub pain_score: f64,
    pub stress_score: f64,
    pub anxiety_score: f64,
    pub severity: Severity,
    /// 区域 → 平滑百分比 (0-100)
    pub indicators: BTreeMap<Region, f64>,
}

/// 固定权重融合器，无状态
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    weights: AggregateWeights,
    thresholds: SeverityThresholds,
}

impl Aggregator {
    pub fn new(weights: AggregateWeights, thresholds: SeverityThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn weights(&self) -> &AggregateWeights {
        &self.weights
    }

    pub fn combine(&self, scores: &RegionScores) -> AggregateResult {
        let p = &self.weights.pain;
        let pain = scores.brow * p.brow
            + scores.grimace * p.grimace
            + scores.eye * p.eye
            + scores.jaw * p.jaw
            + scores.nasolabial * p.nasolabial;

        let s = &self.weights.stress;
        let stress = scores.eye * s.eye + scores.brow * s.brow + scores.jaw * s.jaw;

        let a = &self.weights.anxiety;
        let anxiety = scores.eye * a.eye
            + scores.brow * a.brow
            + scores.jaw * a.jaw
            + scores.grimace * a.grimace;

        let pain_score = Self::to_scale(pain);
        let indicators = Region::ALL
            .iter()
            .map(|&region| (region, scores.get(region) * 100.0))
            .collect();

        AggregateResult {
            pain_score,
            stress_score: Self::to_scale(stress),
            anxiety_score: Self::to_scale(anxiety),
            severity: self.thresholds.classify(pain_score),
            indicators,
        }
    }

    fn to_scale(weighted: f64) -> f64 {
        (weighted * SCORE_SCALE).clamp(0.0, SCORE_SCALE)
    }
}
