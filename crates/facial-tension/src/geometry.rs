//! 几何基础函数
//!
//! 所有区域分析器共用的纯函数：两点距离、三点夹角、质心、点到直线距离。
//! 二维输入以 `z = 0` 表示，距离与角度在三维下计算。

use serde::{Deserialize, Serialize};

/// 零长度向量判定阈值
const DEGENERATE_EPS: f64 = 1e-12;

/// 三维点（x, y 为图像归一化坐标，z 为相对深度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn sub(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(&self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.sub(other).norm()
    }
}

/// 欧氏距离
pub fn distance(p: &Point, q: &Point) -> f64 {
    p.distance(q)
}

/// 以 `vertex` 为顶点、指向 `p` 与 `q` 的两条射线夹角（度）
///
/// 余弦值先截断到 [-1, 1] 再取 acos，避免浮点溢出导致 NaN。
/// 任一射线长度为零（顶点与端点重合）时返回 0°。
pub fn angle(p: &Point, vertex: &Point, q: &Point) -> f64 {
    let u = p.sub(vertex);
    let v = q.sub(vertex);
    let denom = u.norm() * v.norm();
    if denom < DEGENERATE_EPS {
        return 0.0;
    }
    let cos = (u.dot(&v) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// 按维度求算术平均；空集返回原点
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let sum = points.iter().fold(Point::default(), |acc, p| acc.add(p));
    sum.scale(1.0 / points.len() as f64)
}

/// 点到直线（过 `a`、`b`）的垂直距离
///
/// 将点投影到直线上，返回点与投影点之间的距离。
/// `a`、`b` 重合时直线无定义，返回 0。
pub fn point_line_distance(point: &Point, a: &Point, b: &Point) -> f64 {
    let line = b.sub(a);
    let line_len = line.norm();
    if line_len < DEGENERATE_EPS {
        return 0.0;
    }
    let unit = line.scale(1.0 / line_len);
    let projection = point.sub(a).dot(&unit);
    let closest = a.add(&unit.scale(projection));
    point.distance(&closest)
}
