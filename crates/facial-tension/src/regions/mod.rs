//! 区域紧张度分析器
//!
//! 五个区域（眉、眼、面部扭曲、下颌、鼻唇沟）共用同一套流程，
//! 只在关键点选取和几何量组合方式上不同：
//!
//! 1. 从当前帧计算区域几何量
//! 2. 有基线且调用方要求时，按相对基线的变化量加权组合（基线模式）；
//!    否则按经验常模计算绝对几何比例（绝对模式）
//! 3. 乘以区域灵敏度系数后截断到 [0, 1]
//! 4. 写入历史窗口，得到近因加权平滑分数
//!
//! 区域差异由 [`RegionModel`] 描述，[`RegionAnalyzer`] 负责基线、历史和评分流程。

pub mod brow;
pub mod eye;
pub mod grimace;
pub mod jaw;
pub mod nasolabial;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TensionError};
use crate::landmarks::{LandmarkIndexMap, Landmarks, LANDMARK_COUNT};
use crate::smoothing::{RecencyWindow, DEFAULT_HISTORY_CAPACITY};

pub use brow::{Brow, BrowMeasurements};
pub use eye::{Eye, EyeMeasurements};
pub use grimace::{Grimace, GrimaceMeasurements};
pub use jaw::{Jaw, JawMeasurements};
pub use nasolabial::{Nasolabial, NasolabialMeasurements};

/// 基线量接近 0 时的除数下限
pub const DEFAULT_BASELINE_EPSILON: f64 = 1e-6;

/// 描述分档边界（分数，非百分比）
const BAND_EDGES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Brow,
    Eye,
    Grimace,
    Jaw,
    Nasolabial,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Brow,
        Region::Eye,
        Region::Grimace,
        Region::Jaw,
        Region::Nasolabial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Brow => "brow",
            Region::Eye => "eye",
            Region::Grimace => "grimace",
            Region::Jaw => "jaw",
            Region::Nasolabial => "nasolabial",
        }
    }

    /// 灵敏度系数：把细微的几何变化放大到可用的 0-1 区间
    pub fn sensitivity(&self) -> f64 {
        match self {
            Region::Brow => 3.5,
            Region::Eye => 3.5,
            Region::Grimace => 3.0,
            Region::Jaw => 3.5,
            Region::Nasolabial => 2.5,
        }
    }

    fn labels(&self) -> [&'static str; 5] {
        match self {
            Region::Brow => [
                "minimal tension",
                "slight tension",
                "moderate tension",
                "significant tension",
                "severe tension (furrowed brows)",
            ],
            Region::Eye => [
                "eyes relaxed, normal aperture",
                "slight eye narrowing",
                "moderate squinting",
                "significant squinting (narrowed eyes)",
                "severe squinting (eyes tightly narrowed)",
            ],
            Region::Grimace => [
                "relaxed expression",
                "slight mouth tension",
                "moderate grimacing",
                "significant grimacing (corners depressed)",
                "severe grimacing (tight lips, corner tension)",
            ],
            Region::Jaw => [
                "jaw relaxed",
                "slight jaw tension",
                "moderate jaw clenching",
                "significant jaw tension (elevated muscle tension)",
                "severe jaw clenching (tight jaw muscles)",
            ],
            Region::Nasolabial => [
                "minimal facial strain",
                "slight nasolabial tension",
                "moderate facial strain",
                "significant strain (deepened folds)",
                "severe facial strain (pronounced fold deepening)",
            ],
        }
    }

    /// 0-1 分数映射到五档描述：[0,0.2) [0.2,0.4) [0.4,0.6) [0.6,0.8) [0.8,1]
    pub fn describe(&self, score: f64) -> &'static str {
        let band = BAND_EDGES.iter().take_while(|&&edge| score >= edge).count();
        self.labels()[band]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 本帧实际使用的评分路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// 相对基线的变化量
    Baseline,
    /// 绝对几何比例 vs 经验常模
    Absolute,
}

/// 单区域几何模型
pub trait RegionModel: Sized {
    /// 区域几何量（同时作为基线快照和诊断输出）
    type Measurements: Copy + fmt::Debug + PartialEq + Serialize;

    const REGION: Region;

    /// 从索引映射中解析本区域所需的关键点
    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self>;

    fn measure(&self, landmarks: &Landmarks) -> Result<Self::Measurements>;

    /// 基线模式下的原始紧张度（灵敏度放大前）
    fn relative_tension(
        current: &Self::Measurements,
        baseline: &Self::Measurements,
        epsilon: f64,
    ) -> f64;

    /// 绝对模式下的原始紧张度（灵敏度放大前）
    fn absolute_tension(current: &Self::Measurements) -> f64;
}

/// `|current - baseline| / max(baseline, epsilon)`
pub fn relative_change(current: f64, baseline: f64, epsilon: f64) -> f64 {
    (current - baseline).abs() / baseline.max(epsilon)
}

/// 分析器可调参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    /// 每帧应有的关键点数量
    pub landmark_count: usize,
    pub history_capacity: usize,
    pub baseline_epsilon: f64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            landmark_count: LANDMARK_COUNT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            baseline_epsilon: DEFAULT_BASELINE_EPSILON,
        }
    }
}

/// 单帧单区域评分结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord<M> {
    pub region: Region,
    /// 本帧原始分数 (0-1)
    pub raw_score: f64,
    /// 原始分数百分比 (0-100)
    pub percentage: f64,
    /// 平滑分数 (0-1)
    pub smoothed_score: f64,
    pub smoothed_percentage: f64,
    pub measurements: M,
    /// 分析器是否已记录基线
    pub has_baseline: bool,
    pub mode: ScoringMode,
}

/// 区域分析器：基线 + 有界历史 + 评分流程
///
/// 每个被跟踪对象各持有一份实例；帧必须按到达顺序串行送入，
/// 平滑窗口对顺序敏感。
#[derive(Debug, Clone)]
pub struct RegionAnalyzer<M: RegionModel> {
    model: M,
    baseline: Option<M::Measurements>,
    history: RecencyWindow,
    baseline_epsilon: f64,
    landmark_count: usize,
}

impl<M: RegionModel> RegionAnalyzer<M> {
    pub fn new(map: &LandmarkIndexMap, settings: AnalyzerSettings) -> Result<Self> {
        Ok(Self {
            model: M::from_index_map(map)?,
            baseline: None,
            history: RecencyWindow::new(settings.history_capacity),
            baseline_epsilon: settings.baseline_epsilon,
            landmark_count: settings.landmark_count,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(&LandmarkIndexMap::default(), AnalyzerSettings::default())
    }

    pub fn region(&self) -> Region {
        M::REGION
    }

    /// 数量不符的帧在测量前拒绝，基线与历史不受影响
    fn ensure_shape(&self, landmarks: &Landmarks) -> Result<()> {
        if landmarks.len() != self.landmark_count {
            return Err(TensionError::LandmarkCount {
                expected: self.landmark_count,
                actual: landmarks.len(),
            });
        }
        Ok(())
    }

    /// 以中性表情帧记录基线，覆盖已有基线
    pub fn set_baseline(&mut self, landmarks: &Landmarks) -> Result<()> {
        self.ensure_shape(landmarks)?;
        let measurements = self.model.measure(landmarks)?;
        tracing::debug!(region = %M::REGION, baseline = ?measurements, "Baseline captured");
        self.baseline = Some(measurements);
        Ok(())
    }

    /// 计算本帧评分
    ///
    /// `use_baseline` 为 true 但尚未记录基线时，静默退回绝对模式，
    /// 可通过结果中的 `has_baseline` / `mode` 观察到。
    pub fn analyze(
        &mut self,
        landmarks: &Landmarks,
        use_baseline: bool,
    ) -> Result<ScoreRecord<M::Measurements>> {
        self.ensure_shape(landmarks)?;
        let current = self.model.measure(landmarks)?;

        let (tension, mode) = match (&self.baseline, use_baseline) {
            (Some(baseline), true) => (
                M::relative_tension(&current, baseline, self.baseline_epsilon),
                ScoringMode::Baseline,
            ),
            _ => (M::absolute_tension(&current), ScoringMode::Absolute),
        };

        let raw_score = (tension * M::REGION.sensitivity()).clamp(0.0, 1.0);
        let smoothed_score = self.history.push(raw_score);

        tracing::trace!(
            region = %M::REGION,
            raw_score,
            smoothed_score,
            ?mode,
            "Region analyzed"
        );

        Ok(ScoreRecord {
            region: M::REGION,
            raw_score,
            percentage: raw_score * 100.0,
            smoothed_score,
            smoothed_percentage: smoothed_score * 100.0,
            measurements: current,
            has_baseline: self.baseline.is_some(),
            mode,
        })
    }

    pub fn get_description(&self, score: f64) -> &'static str {
        M::REGION.describe(score)
    }

    /// 清空平滑历史，基线保留
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn clear_baseline(&mut self) {
        self.baseline = None;
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<&M::Measurements> {
        self.baseline.as_ref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{neutral_face, scaled_face};
    use crate::geometry::Point;

    #[test]
    fn band_edges_are_exact() {
        for region in Region::ALL {
            let labels = region.labels();
            assert_eq!(region.describe(0.0), labels[0]);
            assert_eq!(region.describe(0.199), labels[0]);
            assert_eq!(region.describe(0.2), labels[1]);
            assert_eq!(region.describe(0.399), labels[1]);
            assert_eq!(region.describe(0.4), labels[2]);
            assert_eq!(region.describe(0.599), labels[2]);
            assert_eq!(region.describe(0.6), labels[3]);
            assert_eq!(region.describe(0.799), labels[3]);
            assert_eq!(region.describe(0.8), labels[4]);
            assert_eq!(region.describe(1.0), labels[4]);
        }
    }

    #[test]
    fn relative_change_is_floored_by_epsilon() {
        assert_eq!(relative_change(0.2, 0.1, 1e-6), 1.0);
        let bounded = relative_change(0.5, 0.0, 1e-6);
        assert!(bounded.is_finite());
        assert!((bounded - 0.5e6).abs() < 1e-3);
    }

    #[test]
    fn missing_baseline_falls_back_to_absolute_mode() {
        let face = neutral_face();
        let mut with_request = RegionAnalyzer::<Brow>::with_defaults().unwrap();
        let mut without_request = RegionAnalyzer::<Brow>::with_defaults().unwrap();

        let a = with_request.analyze(&face, true).unwrap();
        let b = without_request.analyze(&face, false).unwrap();

        assert!(!a.has_baseline);
        assert_eq!(a.mode, ScoringMode::Absolute);
        assert_eq!(a.raw_score.to_bits(), b.raw_score.to_bits());
        assert_eq!(a.smoothed_score.to_bits(), b.smoothed_score.to_bits());
    }

    #[test]
    fn baseline_can_be_bypassed_per_call() {
        let face = neutral_face();
        let mut analyzer = RegionAnalyzer::<Jaw>::with_defaults().unwrap();
        analyzer.set_baseline(&face).unwrap();
        let record = analyzer.analyze(&face, false).unwrap();
        assert!(record.has_baseline);
        assert_eq!(record.mode, ScoringMode::Absolute);
    }

    #[test]
    fn history_is_bounded_and_reset_keeps_baseline() {
        let face = neutral_face();
        let mut analyzer = RegionAnalyzer::<Eye>::with_defaults().unwrap();
        analyzer.set_baseline(&face).unwrap();
        for _ in 0..8 {
            analyzer.analyze(&face, true).unwrap();
        }
        assert_eq!(analyzer.history_len(), DEFAULT_HISTORY_CAPACITY);

        analyzer.reset_history();
        assert_eq!(analyzer.history_len(), 0);
        assert!(analyzer.has_baseline());

        let record = analyzer.analyze(&scaled_face(0.9), true).unwrap();
        assert_eq!(record.smoothed_score, record.raw_score);
    }

    #[test]
    fn set_baseline_overwrites_previous_one() {
        let mut analyzer = RegionAnalyzer::<Grimace>::with_defaults().unwrap();
        analyzer.set_baseline(&scaled_face(0.8)).unwrap();
        let first = *analyzer.baseline().unwrap();
        analyzer.set_baseline(&neutral_face()).unwrap();
        assert_ne!(first, *analyzer.baseline().unwrap());

        analyzer.clear_baseline();
        assert!(!analyzer.has_baseline());
    }

    #[test]
    fn identical_frame_scores_zero_in_every_region() {
        let face = neutral_face();
        macro_rules! check {
            ($model:ty) => {{
                let mut analyzer = RegionAnalyzer::<$model>::with_defaults().unwrap();
                analyzer.set_baseline(&face).unwrap();
                let record = analyzer.analyze(&face, true).unwrap();
                assert_eq!(record.mode, ScoringMode::Baseline);
                assert_eq!(record.raw_score, 0.0, "{}", record.region);
                assert_eq!(record.percentage, 0.0);
            }};
        }
        check!(Brow);
        check!(Eye);
        check!(Grimace);
        check!(Jaw);
        check!(Nasolabial);
    }

    #[test]
    fn analyzer_construction_fails_on_incomplete_map() {
        let map = LandmarkIndexMap::empty();
        assert!(RegionAnalyzer::<Nasolabial>::new(&map, AnalyzerSettings::default()).is_err());
    }

    #[test]
    fn wrong_sized_frame_leaves_state_untouched() {
        let face = neutral_face();
        let mut extended = face.points().to_vec();
        extended.extend(vec![Point::default(); 32]);
        let extended = Landmarks::new(extended, 500).unwrap();
        let short = Landmarks::new(face.points()[..400].to_vec(), 400).unwrap();

        let mut analyzer = RegionAnalyzer::<Jaw>::with_defaults().unwrap();
        assert_eq!(
            analyzer.set_baseline(&extended).unwrap_err(),
            TensionError::LandmarkCount {
                expected: 468,
                actual: 500
            }
        );
        assert!(!analyzer.has_baseline());

        assert!(matches!(
            analyzer.analyze(&short, true),
            Err(TensionError::LandmarkCount { actual: 400, .. })
        ));
        assert!(analyzer.analyze(&extended, false).is_err());
        assert_eq!(analyzer.history_len(), 0);

        analyzer.set_baseline(&face).unwrap();
        assert!(analyzer.analyze(&face, true).is_ok());
        assert_eq!(analyzer.history_len(), 1);
    }

    #[test]
    fn landmark_count_comes_from_settings() {
        let settings = AnalyzerSettings {
            landmark_count: 500,
            ..AnalyzerSettings::default()
        };
        let mut analyzer =
            RegionAnalyzer::<Brow>::new(&LandmarkIndexMap::default(), settings).unwrap();
        let mut points = neutral_face().points().to_vec();
        points.extend(vec![Point::default(); 32]);
        let extended = Landmarks::new(points, 500).unwrap();
        assert!(analyzer.analyze(&extended, false).is_ok());
        assert!(analyzer.analyze(&neutral_face(), false).is_err());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let mut analyzer = RegionAnalyzer::<Brow>::with_defaults().unwrap();
        let record = analyzer.analyze(&neutral_face(), true).unwrap();
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["region"], "brow");
        assert_eq!(json["mode"], "absolute");
        assert!(json["smoothedPercentage"].is_number());
        assert!(json["measurements"]["leftDistance"].is_number());
    }
}
