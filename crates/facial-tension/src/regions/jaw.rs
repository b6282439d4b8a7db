//! 下颌紧咬检测
//!
//! 咬紧时咬肌隆起：下颌线两侧距离变化、下颌角间宽度变宽、以下巴为顶点的夹角变锐。

use serde::Serialize;

use super::{relative_change, Region, RegionModel};
use crate::error::Result;
use crate::geometry::{angle, distance};
use crate::landmarks::{LandmarkIndexMap, Landmarks};

const CHANGE_WEIGHT: f64 = 0.25;

const DISTANCE_FACTOR_WEIGHT: f64 = 0.4;
const WIDTH_FACTOR_WEIGHT: f64 = 0.3;
const ANGLE_FACTOR_WEIGHT: f64 = 0.3;

const DISTANCE_SCALE: f64 = 8.0;
const WIDTH_SCALE: f64 = 3.0;
/// 宽度因子的起算点
const WIDTH_OFFSET: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Jaw {
    left: [usize; 2],
    right: [usize; 2],
    chin: usize,
    /// [左下颌角, 右下颌角]
    angles: [usize; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JawMeasurements {
    pub left_distance: f64,
    pub right_distance: f64,
    pub jaw_width: f64,
    /// 左下颌角-下巴-右下颌角夹角（度）
    pub jaw_angle: f64,
}

impl RegionModel for Jaw {
    type Measurements = JawMeasurements;

    const REGION: Region = Region::Jaw;

    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self> {
        Ok(Self {
            left: map.pair("jaw_left")?,
            right: map.pair("jaw_right")?,
            chin: map.single("jaw_bottom")?,
            angles: map.pair("jaw_angles")?,
        })
    }

    fn measure(&self, landmarks: &Landmarks) -> Result<JawMeasurements> {
        let chin = landmarks.point(self.chin)?;
        let left_angle = landmarks.point(self.angles[0])?;
        let right_angle = landmarks.point(self.angles[1])?;

        Ok(JawMeasurements {
            left_distance: distance(
                &landmarks.point(self.left[0])?,
                &landmarks.point(self.left[1])?,
            ),
            right_distance: distance(
                &landmarks.point(self.right[0])?,
                &landmarks.point(self.right[1])?,
            ),
            jaw_width: distance(&left_angle, &right_angle),
            jaw_angle: angle(&left_angle, &chin, &right_angle),
        })
    }

    fn relative_tension(current: &JawMeasurements, baseline: &JawMeasurements, epsilon: f64) -> f64 {
        let left = relative_change(current.left_distance, baseline.left_distance, epsilon);
        let right = relative_change(current.right_distance, baseline.right_distance, epsilon);
        let width = relative_change(current.jaw_width, baseline.jaw_width, epsilon);
        let angle = relative_change(current.jaw_angle, baseline.jaw_angle, epsilon);
        (left + right + width + angle) * CHANGE_WEIGHT
    }

    fn absolute_tension(current: &JawMeasurements) -> f64 {
        let avg_distance = (current.left_distance + current.right_distance) / 2.0;
        let distance_factor = 1.0 - (avg_distance * DISTANCE_SCALE).min(1.0);
        let width_factor = ((current.jaw_width * WIDTH_SCALE).min(1.0) - WIDTH_OFFSET).max(0.0);
        let angle_factor = 1.0 - current.jaw_angle / 180.0;
        distance_factor * DISTANCE_FACTOR_WEIGHT
            + width_factor * WIDTH_FACTOR_WEIGHT
            + angle_factor * ANGLE_FACTOR_WEIGHT
    }
}
