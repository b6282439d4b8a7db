//! 眉部紧张度
//!
//! 皱眉时两侧眉毛向内下方收拢：眉毛跨度变短，两眉中心相对鼻梁的夹角变小。

use serde::Serialize;

use super::{relative_change, Region, RegionModel};
use crate::error::Result;
use crate::geometry::{angle, centroid, distance};
use crate::landmarks::{LandmarkIndexMap, Landmarks};

const ANGLE_WEIGHT: f64 = 0.6;
const DISTANCE_WEIGHT: f64 = 0.4;
/// 平均眉毛跨度的放大系数（归一化坐标）
const DISTANCE_SCALE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Brow {
    left: [usize; 2],
    right: [usize; 2],
    nose_bridge: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowMeasurements {
    /// 左眉两端点距离
    pub left_distance: f64,
    pub right_distance: f64,
    /// 左眉中心-鼻梁-右眉中心夹角（度）
    pub angle: f64,
}

impl RegionModel for Brow {
    type Measurements = BrowMeasurements;

    const REGION: Region = Region::Brow;

    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self> {
        Ok(Self {
            left: map.pair("eyebrow_left")?,
            right: map.pair("eyebrow_right")?,
            nose_bridge: map.single("nose_bridge")?,
        })
    }

    fn measure(&self, landmarks: &Landmarks) -> Result<BrowMeasurements> {
        let left = [landmarks.point(self.left[0])?, landmarks.point(self.left[1])?];
        let right = [
            landmarks.point(self.right[0])?,
            landmarks.point(self.right[1])?,
        ];
        let nose_bridge = landmarks.point(self.nose_bridge)?;

        Ok(BrowMeasurements {
            left_distance: distance(&left[0], &left[1]),
            right_distance: distance(&right[0], &right[1]),
            angle: angle(&centroid(&left), &nose_bridge, &centroid(&right)),
        })
    }

    fn relative_tension(
        current: &BrowMeasurements,
        baseline: &BrowMeasurements,
        epsilon: f64,
    ) -> f64 {
        let left = relative_change(current.left_distance, baseline.left_distance, epsilon);
        let right = relative_change(current.right_distance, baseline.right_distance, epsilon);
        let angle = relative_change(current.angle, baseline.angle, epsilon);
        (left + right + angle) / 3.0
    }

    fn absolute_tension(current: &BrowMeasurements) -> f64 {
        // 夹角越小越紧张
        let angle_factor = 1.0 - current.angle / 180.0;
        let avg_distance = (current.left_distance + current.right_distance) / 2.0;
        let distance_factor = 1.0 - (avg_distance * DISTANCE_SCALE).min(1.0);
        angle_factor * ANGLE_WEIGHT + distance_factor * DISTANCE_WEIGHT
    }
}
