//! 面部扭曲（嘴部）检测
//!
//! 疼痛面容通常伴随嘴角收紧或下拉、口裂变小、唇部张力变化。

use serde::Serialize;

use super::{relative_change, Region, RegionModel};
use crate::error::Result;
use crate::geometry::distance;
use crate::landmarks::{LandmarkIndexMap, Landmarks};

const CORNER_CHANGE_WEIGHT: f64 = 0.4;
const VERTICAL_CHANGE_WEIGHT: f64 = 0.3;
const LIP_CHANGE_WEIGHT: f64 = 0.3;

const CORNER_FACTOR_WEIGHT: f64 = 0.35;
const VERTICAL_FACTOR_WEIGHT: f64 = 0.35;
const DEPRESSION_FACTOR_WEIGHT: f64 = 0.30;

const CORNER_SCALE: f64 = 5.0;
const VERTICAL_SCALE: f64 = 20.0;
const DEPRESSION_SCALE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Grimace {
    corners: [usize; 2],
    /// [上唇顶点, 下唇底点]
    center: [usize; 2],
    upper_lip: usize,
    lower_lip: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrimaceMeasurements {
    pub corner_distance: f64,
    pub vertical_distance: f64,
    pub lip_distance: f64,
    /// 嘴角中点低于嘴部中心的量（y 轴向下），不低于 0
    pub corner_depression: f64,
}

impl RegionModel for Grimace {
    type Measurements = GrimaceMeasurements;

    const REGION: Region = Region::Grimace;

    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self> {
        Ok(Self {
            corners: map.pair("mouth_corners")?,
            center: map.pair("mouth_center")?,
            upper_lip: map.single("upper_lip")?,
            lower_lip: map.single("lower_lip")?,
        })
    }

    fn measure(&self, landmarks: &Landmarks) -> Result<GrimaceMeasurements> {
        let left_corner = landmarks.point(self.corners[0])?;
        let right_corner = landmarks.point(self.corners[1])?;
        let top = landmarks.point(self.center[0])?;
        let bottom = landmarks.point(self.center[1])?;
        let upper = landmarks.point(self.upper_lip)?;
        let lower = landmarks.point(self.lower_lip)?;

        let corner_mid_y = (left_corner.y + right_corner.y) / 2.0;
        let center_y = (top.y + bottom.y) / 2.0;

        Ok(GrimaceMeasurements {
            corner_distance: distance(&left_corner, &right_corner),
            vertical_distance: distance(&top, &bottom),
            lip_distance: distance(&upper, &lower),
            corner_depression: (corner_mid_y - center_y).max(0.0),
        })
    }

    fn relative_tension(
        current: &GrimaceMeasurements,
        baseline: &GrimaceMeasurements,
        epsilon: f64,
    ) -> f64 {
        let corner = relative_change(current.corner_distance, baseline.corner_distance, epsilon);
        let vertical = relative_change(
            current.vertical_distance,
            baseline.vertical_distance,
            epsilon,
        );
        let lip = relative_change(current.lip_distance, baseline.lip_distance, epsilon);
        corner * CORNER_CHANGE_WEIGHT + vertical * VERTICAL_CHANGE_WEIGHT + lip * LIP_CHANGE_WEIGHT
    }

    fn absolute_tension(current: &GrimaceMeasurements) -> f64 {
        let corner_factor = 1.0 - (current.corner_distance * CORNER_SCALE).min(1.0);
        let vertical_factor = 1.0 - (current.vertical_distance * VERTICAL_SCALE).min(1.0);
        let depression_factor = (current.corner_depression * DEPRESSION_SCALE).min(1.0);
        corner_factor * CORNER_FACTOR_WEIGHT
            + vertical_factor * VERTICAL_FACTOR_WEIGHT
            + depression_factor * DEPRESSION_FACTOR_WEIGHT
    }
}
