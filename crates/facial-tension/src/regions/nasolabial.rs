//! 鼻唇沟加深检测
//!
//! 沟深定义为沟上关键点到「鼻翼底-同侧嘴角」连线的垂直距离；
//! 沟角为以沟点为顶点、指向鼻翼底和嘴角的夹角。

use serde::Serialize;

use super::{relative_change, Region, RegionModel};
use crate::error::Result;
use crate::geometry::{angle, point_line_distance};
use crate::landmarks::{LandmarkIndexMap, Landmarks};

const DEPTH_WEIGHT: f64 = 0.6;
const ANGLE_WEIGHT: f64 = 0.4;
const DEPTH_SCALE: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct Nasolabial {
    left_fold: usize,
    right_fold: usize,
    /// [左鼻翼底, 右鼻翼底]
    nose_bottom: [usize; 2],
    mouth_corners: [usize; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NasolabialMeasurements {
    pub left_depth: f64,
    pub right_depth: f64,
    pub left_angle: f64,
    pub right_angle: f64,
}

impl RegionModel for Nasolabial {
    type Measurements = NasolabialMeasurements;

    const REGION: Region = Region::Nasolabial;

    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self> {
        Ok(Self {
            left_fold: map.single("nasolabial_left")?,
            right_fold: map.single("nasolabial_right")?,
            nose_bottom: map.pair("nose_bottom")?,
            mouth_corners: map.pair("mouth_corners")?,
        })
    }

    fn measure(&self, landmarks: &Landmarks) -> Result<NasolabialMeasurements> {
        let side = |fold: usize, nose: usize, mouth: usize| -> Result<(f64, f64)> {
            let fold = landmarks.point(fold)?;
            let nose = landmarks.point(nose)?;
            let mouth = landmarks.point(mouth)?;
            Ok((
                point_line_distance(&fold, &nose, &mouth),
                angle(&nose, &fold, &mouth),
            ))
        };

        let (left_depth, left_angle) =
            side(self.left_fold, self.nose_bottom[0], self.mouth_corners[0])?;
        let (right_depth, right_angle) =
            side(self.right_fold, self.nose_bottom[1], self.mouth_corners[1])?;

        Ok(NasolabialMeasurements {
            left_depth,
            right_depth,
            left_angle,
            right_angle,
        })
    }

    fn relative_tension(
        current: &NasolabialMeasurements,
        baseline: &NasolabialMeasurements,
        epsilon: f64,
    ) -> f64 {
        let left_depth = relative_change(current.left_depth, baseline.left_depth, epsilon);
        let right_depth = relative_change(current.right_depth, baseline.right_depth, epsilon);
        let left_angle = relative_change(current.left_angle, baseline.left_angle, epsilon);
        let right_angle = relative_change(current.right_angle, baseline.right_angle, epsilon);
        ((left_depth + right_depth) * DEPTH_WEIGHT + (left_angle + right_angle) * ANGLE_WEIGHT)
            / 2.0
    }

    fn absolute_tension(current: &NasolabialMeasurements) -> f64 {
        let avg_depth = (current.left_depth + current.right_depth) / 2.0;
        let depth_factor = (avg_depth * DEPTH_SCALE).min(1.0);
        let avg_angle = (current.left_angle + current.right_angle) / 2.0;
        let angle_factor = 1.0 - avg_angle / 180.0;
        depth_factor * DEPTH_WEIGHT + angle_factor * ANGLE_WEIGHT
    }
}
