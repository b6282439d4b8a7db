#![allow(dead_code)]

use facial_tension::{Landmarks, Point, LANDMARK_COUNT};

/// 语义关键点 (索引, x, y)，其余点铺成网格
const KEYPOINTS: [(usize, f64, f64); 32] = [
    (70, 0.30, 0.30),
    (107, 0.42, 0.29),
    (336, 0.58, 0.29),
    (300, 0.70, 0.30),
    (168, 0.50, 0.36),
    (159, 0.37, 0.37),
    (145, 0.37, 0.40),
    (386, 0.63, 0.37),
    (374, 0.63, 0.40),
    (133, 0.42, 0.385),
    (33, 0.32, 0.385),
    (362, 0.58, 0.385),
    (263, 0.68, 0.385),
    (61, 0.42, 0.70),
    (291, 0.58, 0.70),
    (0, 0.50, 0.665),
    (17, 0.50, 0.735),
    (13, 0.50, 0.69),
    (14, 0.50, 0.71),
    (78, 0.43, 0.70),
    (308, 0.57, 0.70),
    (234, 0.20, 0.45),
    (93, 0.21, 0.55),
    (454, 0.80, 0.45),
    (323, 0.79, 0.55),
    (152, 0.50, 0.90),
    (172, 0.30, 0.78),
    (397, 0.70, 0.78),
    (48, 0.43, 0.58),
    (278, 0.57, 0.58),
    (98, 0.46, 0.60),
    (327, 0.54, 0.60),
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
    for (index, x, y) in KEYPOINTS {
        points[index] = Point::planar(x, y);
    }
    points
}

pub fn neutral_face() -> Landmarks {
    Landmarks::new(neutral_points(), LANDMARK_COUNT).expect("neutral face")
}

/// 把 `indices` 中的点向它们的质心收拢
pub fn contract(points: &[Point], indices: &[usize], fraction: f64) -> Vec<Point> {
    let n = indices.len() as f64;
    let cx = indices.iter().map(|&i| points[i].x).sum::<f64>() / n;
    let cy = indices.iter().map(|&i| points[i].y).sum::<f64>() / n;
    let mut out = points.to_vec();
    for &i in indices {
        let p = points[i];
        out[i] = Point::new(
            cx + (p.x - cx) * (1.0 - fraction),
            cy + (p.y - cy) * (1.0 - fraction),
            p.z,
        );
    }
    out
}

/// 模拟疼痛面容：皱眉、眯眼、嘴角收紧
pub fn pained_points() -> Vec<Point> {
    let mut points = contract(&neutral_points(), &[70, 107], 0.3);
    points = contract(&points, &[336, 300], 0.3);
    points[159].y += 0.012;
    points[386].y += 0.012;
    points[61].x += 0.01;
    points[291].x -= 0.01;
    points[172].x -= 0.015;
    points[397].x += 0.015;
    points
}

pub fn to_rows(points: &[Point]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

/// 单帧 JSON-lines 输入
pub fn frame_line(points: &[Point], calibrate: bool) -> String {
    serde_json::json!({
        "landmarks": to_rows(points),
        "calibrate": calibrate,
    })
    .to_string()
}
