//! 错误类型
//!
//! 核心只有两类失败：输入形状不合法（关键点数量、索引越界、区域映射缺失）
//! 和配置不合法。几何退化（零长度向量）不是错误，按约定回退为 0。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensionError {
    #[error("invalid input: expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
    #[error("invalid input: landmark index {index} out of range for {len} landmarks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid input: flat landmark buffer length {len} is not a multiple of 3")]
    FlatBufferShape { len: usize },
    #[error("invalid input: landmark {index} has {len} coordinates, expected 2 or 3")]
    PointArity { index: usize, len: usize },
    #[error("invalid input: region '{0}' missing from landmark index map")]
    MissingRegion(String),
    #[error("invalid input: region '{region}' needs {expected} indices, got {actual}")]
    RegionArity {
        region: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl TensionError {
    /// 是否属于输入形状类错误（调用方应在进入核心前校验）
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, TensionError::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, TensionError>;
