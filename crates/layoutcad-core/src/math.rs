//! 数学类型与平面几何计算
//!
//! 世界坐标统一使用 `f64`。计算过程保持全精度，
//! 只有存储/显示的测量值保留一位小数（见 [`round_to_tenth`]）。

use serde::{Deserialize, Serialize};

pub type Point2 = nalgebra::Point2<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;

/// 浮点比较容差
pub const EPSILON: f64 = 1e-9;

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 空包围盒（min > max），扩展任何点后变为有效
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

/// 两点间的欧氏距离
pub fn distance(p1: &Point2, p2: &Point2) -> f64 {
    (p2 - p1).norm()
}

/// 点到线段的距离
///
/// 投影参数被限制在线段范围内；退化线段（起点 == 终点）退化为点到点距离。
pub fn distance_point_to_segment(point: &Point2, seg_start: &Point2, seg_end: &Point2) -> f64 {
    let v = seg_end - seg_start;
    let w = point - seg_start;

    let c1 = w.dot(&v);
    if c1 <= 0.0 {
        return distance(point, seg_start);
    }

    let c2 = v.dot(&v);
    if c2 <= c1 {
        return distance(point, seg_end);
    }

    let projected = seg_start + v * (c1 / c2);
    distance(point, &projected)
}

/// 点是否在多边形内（射线法，奇偶规则）
///
/// 多边形视为隐式闭合，末尾重复的闭合点不影响结果。
/// 恰好落在边上的点：对同一输入总是给出同样的结果，但不保证归属哪一侧。
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// 多边形面积（鞋带公式）
///
/// `abs(Σ (x_i·y_{i+1} - x_{i+1}·y_i)) / 2`，少于3个点时为0。
pub fn polygon_area(polygon: &[Point2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let n = polygon.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice_area.abs() / 2.0
}

/// 点击是否闭合了多边形：已有至少3个点，且候选点落在首点的容差范围内
pub fn closes_polygon(points: &[Point2], candidate: &Point2, tolerance: f64) -> bool {
    match points.first() {
        Some(first) if points.len() >= 3 => distance(first, candidate) <= tolerance,
        _ => false,
    }
}

/// 测量值的存储/显示精度：一位小数
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn points_coincide(a: &Point2, b: &Point2) -> bool {
    distance(a, b) <= EPSILON
}

/// 互不重合的点的数量
pub fn distinct_point_count(points: &[Point2]) -> usize {
    let mut distinct: Vec<&Point2> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.iter().any(|q| points_coincide(p, q)) {
            distinct.push(p);
        }
    }
    distinct.len()
}

/// 闭合环：若末点不等于首点则追加首点
pub fn close_ring(points: &[Point2]) -> Vec<Point2> {
    let mut ring = points.to_vec();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if points.len() > 1 && !points_coincide(first, last) {
            ring.push(*first);
        }
    }
    ring
}

/// 去掉环末尾重复的闭合点
pub fn open_ring(points: &[Point2]) -> Vec<Point2> {
    let mut open = points.to_vec();
    if open.len() > 1 && points_coincide(&open[0], &open[open.len() - 1]) {
        open.pop();
    }
    open
}
