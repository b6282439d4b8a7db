//! 测试用合成人脸
//!
//! 468 个点，语义关键点放在大致符合人脸结构的位置，其余点铺成网格。

use crate::geometry::Point;
use crate::landmarks::{Landmarks, LANDMARK_COUNT};

const FACE_CENTER: Point = Point {
    x: 0.5,
    y: 0.55,
    z: 0.0,
};

const NEUTRAL_KEYPOINTS: [(usize, f64, f64); 31] = [
    // 眉
    (70, 0.30, 0.30),
    (107, 0.42, 0.29),
    (336, 0.58, 0.29),
    (300, 0.70, 0.30),
    (168, 0.50, 0.36),
    // 眼睑与眼角
    (159, 0.37, 0.37),
    (145, 0.37, 0.40),
    (386, 0.63, 0.37),
    (374, 0.63, 0.40),
    (133, 0.42, 0.385),
    (33, 0.32, 0.385),
    (362, 0.58, 0.385),
    (263, 0.68, 0.385),
    // 嘴
    (61, 0.42, 0.70),
    (291, 0.58, 0.70),
    (0, 0.50, 0.665),
    (17, 0.50, 0.735),
    (13, 0.50, 0.69),
    (14, 0.50, 0.71),
    (78, 0.43, 0.70),
    (308, 0.57, 0.70),
    // 下颌
    (234, 0.20, 0.45),
    (93, 0.21, 0.55),
    (454, 0.80, 0.45),
    (323, 0.79, 0.55),
    (152, 0.50, 0.90),
    (172, 0.30, 0.78),
    (397, 0.70, 0.78),
    // 鼻唇沟
    (48, 0.43, 0.58),
    (278, 0.57, 0.58),
    (98, 0.46, 0.60),
];

pub fn neutral_points() -> Vec<Point> {
    let mut points: Vec<Point> = (0..LANDMARK_COUNT)
        .map(|i| {
            Point::new(
                0.1 + (i % 20) as f64 * 0.04,
                0.1 + (i / 20) as f64 * 0.03,
                0.0,
            )
        })
        .collect();
    for (index, x, y) in NEUTRAL_KEYPOINTS {
        points[index] = Point::planar(x, y);
    }
    points[327] = Point::planar(0.54, 0.60);
    points
}

pub fn neutral_face() -> Landmarks {
    Landmarks::new(neutral_points(), LANDMARK_COUNT).unwrap()
}

/// 以脸部中心为原点整体缩放
pub fn scaled_face(factor: f64) -> Landmarks {
    let points = neutral_points()
        .into_iter()
        .map(|p| FACE_CENTER.add(&p.sub(&FACE_CENTER).scale(factor)))
        .collect();
    Landmarks::new(points, LANDMARK_COUNT).unwrap()
}

/// 把 `indices` 中的点向它们的质心收拢，`fraction` = 0.5 表示距离减半
pub fn contract(face: &Landmarks, indices: &[usize], fraction: f64) -> Landmarks {
    let pts: Vec<Point> = indices.iter().map(|&i| face.point(i).unwrap()).collect();
    let center = crate::geometry::centroid(&pts);
    let mut out = face.clone();
    for (&i, p) in indices.iter().zip(pts) {
        let moved = center.add(&p.sub(&center).scale(1.0 - fraction));
        out = out.with_point(i, moved).unwrap();
    }
    out
}

/// 平移单个点
pub fn nudge(face: &Landmarks, index: usize, dx: f64, dy: f64) -> Landmarks {
    let p = face.point(index).unwrap();
    face.with_point(index, Point::new(p.x + dx, p.y + dy, p.z))
        .unwrap()
}
