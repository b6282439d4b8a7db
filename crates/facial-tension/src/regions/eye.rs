//! 眯眼检测
//!
//! 疼痛时眼裂变窄：上下眼睑间距减小，眼宽略有变化。
//! 绝对模式使用眼部纵横比（高/宽），正常约 0.25-0.35，眯眼时降到 0.15-0.20。

use serde::Serialize;

use super::{relative_change, Region, RegionModel};
use crate::error::Result;
use crate::geometry::distance;
use crate::landmarks::{LandmarkIndexMap, Landmarks};

const APERTURE_WEIGHT: f64 = 0.7;
const WIDTH_WEIGHT: f64 = 0.3;
/// 正常睁眼纵横比
const NORMAL_ASPECT_RATIO: f64 = 0.30;

#[derive(Debug, Clone)]
pub struct Eye {
    /// [上眼睑, 下眼睑]
    left_lids: [usize; 2],
    right_lids: [usize; 2],
    /// [内眼角, 外眼角]
    left_corners: [usize; 2],
    right_corners: [usize; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeMeasurements {
    pub left_aperture: f64,
    pub right_aperture: f64,
    pub left_width: f64,
    pub right_width: f64,
    pub left_aspect_ratio: f64,
    pub right_aspect_ratio: f64,
}

fn aspect_ratio(aperture: f64, width: f64) -> f64 {
    if width > 0.0 {
        aperture / width
    } else {
        0.0
    }
}

/// 眼裂相对基线的缩小量，张大时为负
fn reduction(current: f64, baseline: f64, epsilon: f64) -> f64 {
    (baseline - current) / baseline.max(epsilon)
}

impl RegionModel for Eye {
    type Measurements = EyeMeasurements;

    const REGION: Region = Region::Eye;

    fn from_index_map(map: &LandmarkIndexMap) -> Result<Self> {
        Ok(Self {
            left_lids: map.pair("eye_left")?,
            right_lids: map.pair("eye_right")?,
            left_corners: map.pair("eye_left_corners")?,
            right_corners: map.pair("eye_right_corners")?,
        })
    }

    fn measure(&self, landmarks: &Landmarks) -> Result<EyeMeasurements> {
        let span = |pair: [usize; 2]| -> Result<f64> {
            Ok(distance(&landmarks.point(pair[0])?, &landmarks.point(pair[1])?))
        };

        let left_aperture = span(self.left_lids)?;
        let right_aperture = span(self.right_lids)?;
        let left_width = span(self.left_corners)?;
        let right_width = span(self.right_corners)?;

        Ok(EyeMeasurements {
            left_aperture,
            right_aperture,
            left_width,
            right_width,
            left_aspect_ratio: aspect_ratio(left_aperture, left_width),
            right_aspect_ratio: aspect_ratio(right_aperture, right_width),
        })
    }

    fn relative_tension(current: &EyeMeasurements, baseline: &EyeMeasurements, epsilon: f64) -> f64 {
        let left_reduction = reduction(current.left_aperture, baseline.left_aperture, epsilon);
        let right_reduction = reduction(current.right_aperture, baseline.right_aperture, epsilon);
        let left_width = relative_change(current.left_width, baseline.left_width, epsilon);
        let right_width = relative_change(current.right_width, baseline.right_width, epsilon);

        ((left_reduction + right_reduction) * APERTURE_WEIGHT
            + (left_width + right_width) * WIDTH_WEIGHT)
            / 2.0
    }

    fn absolute_tension(current: &EyeMeasurements) -> f64 {
        let avg = (current.left_aspect_ratio + current.right_aspect_ratio) / 2.0;
        (NORMAL_ASPECT_RATIO - avg).max(0.0) / NORMAL_ASPECT_RATIO
    }
}
