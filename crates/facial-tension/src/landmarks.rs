//! 关键点数组与区域索引映射
//!
//! 外部检测器每帧提供固定长度（参考配置 468 点）的三维关键点数组。
//! 坐标约定统一为图像归一化坐标；像素坐标需先经 [`Landmarks::from_pixels`] 转换，
//! 非基线模式下的经验阈值都以归一化坐标为前提。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TensionError};
use crate::geometry::Point;

/// MediaPipe Face Mesh 参考关键点数量
pub const LANDMARK_COUNT: usize = 468;

/// 单帧关键点数组，构造后只读
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: Vec<Point>,
}

impl Landmarks {
    /// 校验数量后构造
    pub fn new(points: Vec<Point>, expected: usize) -> Result<Self> {
        if points.len() != expected {
            return Err(TensionError::LandmarkCount {
                expected,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// 从扁平数组构造：x0, y0, z0, x1, y1, z1, ...
    pub fn from_flat(flat: &[f64], expected: usize) -> Result<Self> {
        if flat.len() % 3 != 0 {
            return Err(TensionError::FlatBufferShape { len: flat.len() });
        }
        let points = flat
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect();
        Self::new(points, expected)
    }

    /// 逐行坐标转为点：`[x, y]` 视为 z = 0，`[x, y, z]` 原样保留
    pub fn points_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<Point>> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| match *row.as_ref() {
                [x, y] => Ok(Point::planar(x, y)),
                [x, y, z] => Ok(Point::new(x, y, z)),
                ref other => Err(TensionError::PointArity {
                    index,
                    len: other.len(),
                }),
            })
            .collect()
    }

    /// 从像素坐标构造并归一化
    ///
    /// 检测器按 (x·w, y·h, z·w) 输出时，此处还原为 (x/w, y/h, z/w)。
    pub fn from_pixels(points: Vec<Point>, width: f64, height: f64, expected: usize) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(TensionError::InvalidConfig(format!(
                "frame size must be positive (got {width}x{height})"
            )));
        }
        let normalized = points
            .into_iter()
            .map(|p| Point::new(p.x / width, p.y / height, p.z / width))
            .collect();
        Self::new(normalized, expected)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Result<Point> {
        self.points
            .get(index)
            .copied()
            .ok_or(TensionError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    /// 返回一份 `index` 处被替换为 `point` 的拷贝（测试和合成数据用）
    pub fn with_point(&self, index: usize, point: Point) -> Result<Self> {
        let mut points = self.points.clone();
        let slot = points.get_mut(index).ok_or(TensionError::IndexOutOfRange {
            index,
            len: self.points.len(),
        })?;
        *slot = point;
        Ok(Self { points })
    }
}

/// 区域名称 → 关键点索引列表
///
/// 构造分析器时一次性解析，之后只读；多个分析器共享同一份引用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkIndexMap {
    regions: BTreeMap<String, Vec<usize>>,
}

impl Default for LandmarkIndexMap {
    fn default() -> Self {
        let entries: [(&str, &[usize]); 18] = [
            ("eyebrow_left", &[70, 107]),
            ("eyebrow_right", &[336, 300]),
            ("nose_bridge", &[168]),
            ("eye_left", &[159, 145]),
            ("eye_right", &[386, 374]),
            ("eye_left_corners", &[133, 33]),
            ("eye_right_corners", &[362, 263]),
            ("mouth_corners", &[61, 291]),
            ("mouth_center", &[0, 17]),
            ("upper_lip", &[13, 14]),
            ("lower_lip", &[78, 308]),
            ("jaw_left", &[234, 93]),
            ("jaw_right", &[454, 323]),
            ("jaw_bottom", &[152]),
            ("jaw_angles", &[172, 397]),
            ("nasolabial_left", &[48]),
            ("nasolabial_right", &[278]),
            ("nose_bottom", &[98, 327]),
        ];
        Self {
            regions: entries
                .iter()
                .map(|(name, idx)| (name.to_string(), idx.to_vec()))
                .collect(),
        }
    }
}

impl LandmarkIndexMap {
    pub fn empty() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }

    /// 覆盖或新增一个区域
    pub fn with_region(mut self, name: &str, indices: Vec<usize>) -> Self {
        self.regions.insert(name.to_string(), indices);
        self
    }

    pub fn region(&self, name: &str) -> Result<&[usize]> {
        self.regions
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TensionError::MissingRegion(name.to_string()))
    }

    /// 取区域前 `N` 个索引，数量不足即报错
    pub fn fixed<const N: usize>(&self, name: &str) -> Result<[usize; N]> {
        let indices = self.region(name)?;
        if indices.len() < N {
            return Err(TensionError::RegionArity {
                region: name.to_string(),
                expected: N,
                actual: indices.len(),
            });
        }
        let mut out = [0usize; N];
        out.copy_from_slice(&indices[..N]);
        Ok(out)
    }

    pub fn single(&self, name: &str) -> Result<usize> {
        self.fixed::<1>(name).map(|[i]| i)
    }

    pub fn pair(&self, name: &str) -> Result<[usize; 2]> {
        self.fixed::<2>(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// 所有索引必须小于关键点数量
    pub fn validate(&self, landmark_count: usize) -> Result<()> {
        for indices in self.regions.values() {
            if let Some(&index) = indices.iter().find(|&&i| i >= landmark_count) {
                return Err(TensionError::IndexOutOfRange {
                    index,
                    len: landmark_count,
                });
            }
        }
        Ok(())
    }
}
