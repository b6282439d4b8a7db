//! 单个被测对象的分析会话
//!
//! 持有五个区域分析器和融合器，按到达顺序逐帧处理：
//! 首帧自动校准（可关闭）→ 五区域评分 → 融合 → 累计会话统计。
//! 多个对象需各自持有独立的会话。

use serde::Serialize;

use crate::aggregate::{AggregateResult, Aggregator, RegionScores};
use crate::config::EngineConfig;
use crate::error::{Result, TensionError};
use crate::landmarks::Landmarks;
use crate::regions::{
    Brow, BrowMeasurements, Eye, EyeMeasurements, Grimace, GrimaceMeasurements, Jaw,
    JawMeasurements, Nasolabial, NasolabialMeasurements, RegionAnalyzer, RegionModel, ScoreRecord,
};

/// 区域评分 + 本帧原始分数的分档描述
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionOutcome<M> {
    #[serde(flatten)]
    pub record: ScoreRecord<M>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBreakdown {
    pub brow: RegionOutcome<BrowMeasurements>,
    pub eye: RegionOutcome<EyeMeasurements>,
    pub grimace: RegionOutcome<GrimaceMeasurements>,
    pub jaw: RegionOutcome<JawMeasurements>,
    pub nasolabial: RegionOutcome<NasolabialMeasurements>,
}

impl RegionBreakdown {
    pub fn smoothed_scores(&self) -> RegionScores {
        RegionScores {
            brow: self.brow.record.smoothed_score,
            eye: self.eye.record.smoothed_score,
            grimace: self.grimace.record.smoothed_score,
            jaw: self.jaw.record.smoothed_score,
            nasolabial: self.nasolabial.record.smoothed_score,
        }
    }
}

/// 单帧分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    /// 从 0 开始的帧序号
    pub frame_index: u64,
    pub calibrated: bool,
    #[serde(flatten)]
    pub aggregate: AggregateResult,
    pub regions: RegionBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAverages {
    pub frames: u64,
    pub average_pain: f64,
    pub average_stress: f64,
    pub average_anxiety: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningTotals {
    frames: u64,
    pain: f64,
    stress: f64,
    anxiety: f64,
}

impl RunningTotals {
    fn record(&mut self, result: &AggregateResult) {
        self.frames += 1;
        self.pain += result.pain_score;
        self.stress += result.stress_score;
        self.anxiety += result.anxiety_score;
    }

    fn averages(&self) -> SessionAverages {
        if self.frames == 0 {
            return SessionAverages::default();
        }
        let n = self.frames as f64;
        SessionAverages {
            frames: self.frames,
            average_pain: self.pain / n,
            average_stress: self.stress / n,
            average_anxiety: self.anxiety / n,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PainSession {
    config: EngineConfig,
    brow: RegionAnalyzer<Brow>,
    eye: RegionAnalyzer<Eye>,
    grimace: RegionAnalyzer<Grimace>,
    jaw: RegionAnalyzer<Jaw>,
    nasolabial: RegionAnalyzer<Nasolabial>,
    aggregator: Aggregator,
    calibrated: bool,
    totals: RunningTotals,
}

fn outcome<M: RegionModel>(
    analyzer: &mut RegionAnalyzer<M>,
    landmarks: &Landmarks,
    use_baseline: bool,
) -> Result<RegionOutcome<M::Measurements>> {
    let record = analyzer.analyze(landmarks, use_baseline)?;
    Ok(RegionOutcome {
        record,
        description: analyzer.get_description(record.raw_score),
    })
}

impl PainSession {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let map = &config.landmark_indices;
        let settings = config.analyzer_settings();

        let session = Self {
            brow: RegionAnalyzer::new(map, settings)?,
            eye: RegionAnalyzer::new(map, settings)?,
            grimace: RegionAnalyzer::new(map, settings)?,
            jaw: RegionAnalyzer::new(map, settings)?,
            nasolabial: RegionAnalyzer::new(map, settings)?,
            aggregator: Aggregator::new(config.weights, config.severity),
            calibrated: false,
            totals: RunningTotals::default(),
            config,
        };

        tracing::info!(
            landmark_count = session.config.landmark_count,
            use_baseline = session.config.use_baseline,
            auto_calibrate = session.config.auto_calibrate,
            "Pain session started"
        );
        Ok(session)
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn frames_processed(&self) -> u64 {
        self.totals.frames
    }

    /// 索引映射已按关键点数量校验，形状一致即保证五个区域都能测量，
    /// 不会出现只更新部分基线的情况
    fn ensure_shape(&self, landmarks: &Landmarks) -> Result<()> {
        if landmarks.len() != self.config.landmark_count {
            return Err(TensionError::LandmarkCount {
                expected: self.config.landmark_count,
                actual: landmarks.len(),
            });
        }
        Ok(())
    }

    /// 以当前帧为中性表情，为五个区域记录基线
    pub fn calibrate(&mut self, landmarks: &Landmarks) -> Result<()> {
        self.ensure_shape(landmarks)?;
        self.brow.set_baseline(landmarks)?;
        self.eye.set_baseline(landmarks)?;
        self.grimace.set_baseline(landmarks)?;
        self.jaw.set_baseline(landmarks)?;
        self.nasolabial.set_baseline(landmarks)?;
        self.calibrated = true;
        tracing::info!(frame = self.totals.frames, "Session calibrated");
        Ok(())
    }

    pub fn process_frame(&mut self, landmarks: &Landmarks) -> Result<FrameAnalysis> {
        self.ensure_shape(landmarks)?;

        if !self.calibrated && self.config.auto_calibrate {
            self.calibrate(landmarks)?;
        }

        let use_baseline = self.config.use_baseline;
        let regions = RegionBreakdown {
            brow: outcome(&mut self.brow, landmarks, use_baseline)?,
            eye: outcome(&mut self.eye, landmarks, use_baseline)?,
            grimace: outcome(&mut self.grimace, landmarks, use_baseline)?,
            jaw: outcome(&mut self.jaw, landmarks, use_baseline)?,
            nasolabial: outcome(&mut self.nasolabial, landmarks, use_baseline)?,
        };

        let aggregate = self.aggregator.combine(&regions.smoothed_scores());
        let frame_index = self.totals.frames;
        self.totals.record(&aggregate);

        tracing::debug!(
            frame = frame_index,
            pain = aggregate.pain_score,
            stress = aggregate.stress_score,
            anxiety = aggregate.anxiety_score,
            severity = %aggregate.severity,
            "Frame processed"
        );

        Ok(FrameAnalysis {
            frame_index,
            calibrated: self.calibrated,
            aggregate,
            regions,
        })
    }

    pub fn averages(&self) -> SessionAverages {
        self.totals.averages()
    }

    /// 只清平滑历史，基线和统计保留
    pub fn reset_history(&mut self) {
        self.brow.reset_history();
        self.eye.reset_history();
        self.grimace.reset_history();
        self.jaw.reset_history();
        self.nasolabial.reset_history();
    }

    /// 回到新会话状态：历史、基线、统计全部清空
    pub fn reset(&mut self) {
        self.reset_history();
        self.brow.clear_baseline();
        self.eye.clear_baseline();
        self.grimace.clear_baseline();
        self.jaw.clear_baseline();
        self.nasolabial.clear_baseline();
        self.calibrated = false;
        self.totals = RunningTotals::default();
        tracing::info!("Pain session reset");
    }
}
