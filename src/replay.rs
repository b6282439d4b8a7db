//! JSON-lines 帧回放
//!
//! 每行一帧：`{"landmarks": [[x, y, z], ...], "calibrate": false, "timestamp": "..."}`，
//! 关键点也可只给 `[x, y]`。坐标个数不对的帧与数量不对的帧一样跳过。
//! 输出每帧一行 `FrameReport`，最后一行为会话汇总。

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use facial_tension::{
    EngineConfig, FrameAnalysis, Landmarks, PainSession, SessionAverages, TensionError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{CoordinateFrame, CoordinateMode};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("engine error: {0}")]
    Tension(#[from] TensionError),
    #[error("config error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    pub landmarks: Vec<Vec<f64>>,
    /// 为 true 时先以本帧校准再分析
    #[serde(default)]
    pub calibrate: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// 输入文件中的行号（从 1 开始）
    pub line: usize,
    pub analysis: FrameAnalysis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub session_id: Uuid,
    pub frames_read: usize,
    pub frames_analyzed: usize,
    pub frames_skipped: usize,
    pub averages: SessionAverages,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum OutputLine<'a> {
    Frame(&'a FrameReport),
    Summary(&'a ReplaySummary),
}

pub struct Replayer {
    session: PainSession,
    session_id: Uuid,
    coordinates: CoordinateFrame,
}

impl Replayer {
    pub fn new(engine: EngineConfig, coordinates: CoordinateFrame) -> Result<Self, ReplayError> {
        if coordinates.mode == CoordinateMode::Pixel
            && !(coordinates.width > 0.0 && coordinates.height > 0.0)
        {
            return Err(ReplayError::Config(format!(
                "pixel coordinates need a positive frame size (got {}x{})",
                coordinates.width, coordinates.height
            )));
        }

        let session = PainSession::new(engine)?;
        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, coordinates = %coordinates.mode, "Replay session created");
        Ok(Self {
            session,
            session_id,
            coordinates,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session(&self) -> &PainSession {
        &self.session
    }

    fn to_landmarks(&self, rows: &[Vec<f64>]) -> Result<Landmarks, TensionError> {
        let points = Landmarks::points_from_rows(rows)?;
        let expected = self.session.config().landmark_count;
        match self.coordinates.mode {
            CoordinateMode::Normalized => Landmarks::new(points, expected),
            CoordinateMode::Pixel => Landmarks::from_pixels(
                points,
                self.coordinates.width,
                self.coordinates.height,
                expected,
            ),
        }
    }

    /// 处理一帧；形状不合法的帧返回 `Ok(None)`
    pub fn process(
        &mut self,
        input: &FrameInput,
        line: usize,
    ) -> Result<Option<FrameReport>, ReplayError> {
        let landmarks = match self.to_landmarks(&input.landmarks) {
            Ok(landmarks) => landmarks,
            Err(e) if e.is_invalid_input() => {
                tracing::warn!(line, error = %e, "Skipping malformed frame");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if input.calibrate {
            self.session.calibrate(&landmarks)?;
        }
        let analysis = self.session.process_frame(&landmarks)?;

        Ok(Some(FrameReport {
            session_id: self.session_id,
            timestamp: input.timestamp.unwrap_or_else(Utc::now),
            line,
            analysis,
        }))
    }

    /// 逐行回放；I/O 与 JSON 语法错误中止回放
    pub fn replay<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut frames_read = 0;
        let mut frames_analyzed = 0;

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            frames_read += 1;

            let frame: FrameInput = serde_json::from_str(&line)?;
            if let Some(report) = self.process(&frame, idx + 1)? {
                serde_json::to_writer(&mut output, &OutputLine::Frame(&report))?;
                writeln!(output)?;
                frames_analyzed += 1;
            }
        }

        let summary = ReplaySummary {
            session_id: self.session_id,
            frames_read,
            frames_analyzed,
            frames_skipped: frames_read - frames_analyzed,
            averages: self.session.averages(),
        };
        serde_json::to_writer(&mut output, &OutputLine::Summary(&summary))?;
        writeln!(output)?;
        output.flush()?;

        tracing::info!(
            session_id = %summary.session_id,
            frames_read = summary.frames_read,
            frames_analyzed = summary.frames_analyzed,
            frames_skipped = summary.frames_skipped,
            average_pain = summary.averages.average_pain,
            "Replay finished"
        );
        Ok(summary)
    }
}
