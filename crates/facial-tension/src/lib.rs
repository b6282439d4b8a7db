//! 面部紧张度 / 疼痛评分库
//!
//! 基于面部关键点的逐帧疼痛表情评分。核心为纯计算，不含检测和 I/O，
//! 可作为 rlib 被宿主程序调用，也可在 `wasm` 特性下编译为 WebAssembly。
//!
//! ## 模块
//! - `geometry`: 距离、夹角、质心、点到直线距离
//! - `landmarks`: 关键点数组与区域索引映射
//! - `smoothing`: 近因加权平滑窗口
//! - `regions`: 五个区域分析器（眉、眼、面部扭曲、下颌、鼻唇沟）
//! - `aggregate`: 疼痛 / 压力 / 焦虑综合评分
//! - `session`: 单个对象的逐帧分析会话
//! - `config`: 引擎配置

pub mod aggregate;
pub mod config;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod regions;
pub mod session;
pub mod smoothing;

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(test)]
mod fixtures;

// 重新导出核心类型，方便外部使用
pub use aggregate::{AggregateResult, AggregateWeights, Aggregator, RegionScores, Severity};
pub use config::EngineConfig;
pub use error::{Result, TensionError};
pub use geometry::Point;
pub use landmarks::{LandmarkIndexMap, Landmarks, LANDMARK_COUNT};
pub use regions::{Region, RegionAnalyzer, RegionModel, ScoreRecord, ScoringMode};
pub use session::{FrameAnalysis, PainSession, SessionAverages};
