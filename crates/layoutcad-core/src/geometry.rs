//! 设施几何数据模型
//!
//! - 边界 (Boundary)：设施外轮廓，隐式闭合
//! - 障碍物 (Obstruction)：柱子、墙体、装卸门
//! - 区域 (Zone)：带名称与用途的多边形子区域
//! - 测量 (Measurement)：距离或面积
//!
//! 所有构造函数都会校验最少顶点数，存储中不会出现残缺的实体。

use crate::error::{GeometryError, GeometryResult};
use crate::math::{
    close_ring, distance, distinct_point_count, open_ring, point_in_polygon, polygon_area,
    round_to_tenth, Point2, Vector2, EPSILON,
};
use serde::{Deserialize, Serialize};

/// 长度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Meters => "m",
        }
    }

    pub fn area_label(&self) -> &'static str {
        match self {
            LengthUnit::Feet => "sq ft",
            LengthUnit::Meters => "sq m",
        }
    }
}

/// 设施基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FacilityInfo {
    pub name: String,
    pub description: String,
    /// 净高
    pub clear_height: f64,
    pub unit: LengthUnit,
}

fn require_points(kind: &'static str, points: &[Point2], required: usize) -> GeometryResult<()> {
    let found = distinct_point_count(points);
    if found < required {
        return Err(GeometryError::TooFewPoints {
            kind,
            required,
            found,
        });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> GeometryResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension { field, value })
    }
}

/// 设施外边界
///
/// 内部保存不含重复闭合点的顶点序列；导出时由 [`Boundary::ring`] 闭合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    points: Vec<Point2>,
}

impl Boundary {
    /// 从顶点序列（开放或闭合均可）创建边界，至少需要3个不同的顶点
    pub fn from_points(points: &[Point2]) -> GeometryResult<Self> {
        let points = open_ring(points);
        require_points("boundary", &points, 3)?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// 闭合环形式（末点 == 首点）
    pub fn ring(&self) -> Vec<Point2> {
        close_ring(&self.points)
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// 删除一个顶点，删除后仍需保留至少3个不同顶点
    pub fn remove_vertex(&mut self, index: usize) -> GeometryResult<Point2> {
        if index >= self.points.len() {
            return Err(GeometryError::NotFound(
                crate::entity::EntityRef::BoundaryVertex(index),
            ));
        }
        let mut remaining = self.points.clone();
        let removed = remaining.remove(index);
        require_points("boundary", &remaining, 3)?;
        self.points = remaining;
        Ok(removed)
    }
}

/// 障碍物类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstructionKind {
    Column,
    Wall,
    Dock,
}

impl ObstructionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObstructionKind::Column => "column",
            ObstructionKind::Wall => "wall",
            ObstructionKind::Dock => "dock",
        }
    }
}

/// 柱子：以中心点为中心的正方形
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub center: Point2,
    /// 边长
    pub size: f64,
    pub height: f64,
}

impl Column {
    pub fn footprint(&self) -> Vec<Point2> {
        rect_ring(self.center, self.size, self.size)
    }
}

/// 墙体：折线 + 宽度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub points: Vec<Point2>,
    pub width: f64,
    pub height: f64,
}

impl Wall {
    /// 每一段各自的矩形轮廓（宽度为 `width`），长度为零的段没有轮廓
    pub fn footprint(&self) -> Vec<Vec<Point2>> {
        self.points
            .windows(2)
            .filter_map(|seg| segment_ring(seg[0], seg[1], self.width))
            .collect()
    }
}

fn segment_ring(start: Point2, end: Point2, width: f64) -> Option<Vec<Point2>> {
    let dir = end - start;
    let len = dir.norm();
    if len < EPSILON {
        return None;
    }
    let normal = Vector2::new(-dir.y, dir.x) * (width / 2.0 / len);
    Some(vec![
        start + normal,
        end + normal,
        end - normal,
        start - normal,
        start + normal,
    ])
}

/// 装卸门：x方向为宽度，y方向为进深
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dock {
    pub center: Point2,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Dock {
    pub fn footprint(&self) -> Vec<Point2> {
        rect_ring(self.center, self.width, self.depth)
    }
}

fn rect_ring(center: Point2, width: f64, depth: f64) -> Vec<Point2> {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    vec![
        Point2::new(center.x - hw, center.y - hd),
        Point2::new(center.x + hw, center.y - hd),
        Point2::new(center.x + hw, center.y + hd),
        Point2::new(center.x - hw, center.y + hd),
        Point2::new(center.x - hw, center.y - hd),
    ]
}

/// 障碍物
///
/// 每个障碍物独占自己的几何数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Obstruction {
    Column(Column),
    Wall(Wall),
    Dock(Dock),
}

impl Obstruction {
    pub fn kind(&self) -> ObstructionKind {
        match self {
            Obstruction::Column(_) => ObstructionKind::Column,
            Obstruction::Wall(_) => ObstructionKind::Wall,
            Obstruction::Dock(_) => ObstructionKind::Dock,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            Obstruction::Column(c) => c.height,
            Obstruction::Wall(w) => w.height,
            Obstruction::Dock(d) => d.height,
        }
    }

    /// 闭合的占地轮廓；墙体每段一个
    pub fn footprints(&self) -> Vec<Vec<Point2>> {
        match self {
            Obstruction::Column(c) => vec![c.footprint()],
            Obstruction::Wall(w) => w.footprint(),
            Obstruction::Dock(d) => vec![d.footprint()],
        }
    }

    /// 占地面积，即各轮廓面积之和
    pub fn footprint_area(&self) -> f64 {
        self.footprints().iter().map(|ring| polygon_area(ring)).sum()
    }

    /// 校验形状不变式
    pub fn validate(&self) -> GeometryResult<()> {
        match self {
            Obstruction::Column(c) => {
                require_positive("size", c.size)?;
                require_positive("height", c.height)
            }
            Obstruction::Wall(w) => {
                require_points("wall", &w.points, 2)?;
                require_positive("width", w.width)?;
                require_positive("height", w.height)
            }
            Obstruction::Dock(d) => {
                require_positive("width", d.width)?;
                require_positive("depth", d.depth)?;
                require_positive("height", d.height)
            }
        }
    }
}

/// 区域用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ZonePurpose {
    Storage,
    Receiving,
    Shipping,
    Staging,
    Office,
    #[default]
    Other,
}

impl ZonePurpose {
    pub const ALL: [ZonePurpose; 6] = [
        ZonePurpose::Storage,
        ZonePurpose::Receiving,
        ZonePurpose::Shipping,
        ZonePurpose::Staging,
        ZonePurpose::Office,
        ZonePurpose::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZonePurpose::Storage => "storage",
            ZonePurpose::Receiving => "receiving",
            ZonePurpose::Shipping => "shipping",
            ZonePurpose::Staging => "staging",
            ZonePurpose::Office => "office",
            ZonePurpose::Other => "other",
        }
    }

    /// 不区分大小写解析；未知标签归为 `Other`
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(tag.trim()))
            .unwrap_or(ZonePurpose::Other)
    }
}

/// 区域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub purpose: ZonePurpose,
    points: Vec<Point2>,
}

impl Zone {
    pub fn new(
        name: impl Into<String>,
        purpose: ZonePurpose,
        points: &[Point2],
    ) -> GeometryResult<Self> {
        let points = open_ring(points);
        require_points("zone", &points, 3)?;
        Ok(Self {
            name: name.into(),
            purpose,
            points,
        })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn ring(&self) -> Vec<Point2> {
        close_ring(&self.points)
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    pub fn contains(&self, point: &Point2) -> bool {
        point_in_polygon(point, &self.points)
    }

    pub(crate) fn set_points(&mut self, points: &[Point2]) -> GeometryResult<()> {
        let points = open_ring(points);
        require_points("zone", &points, 3)?;
        self.points = points;
        Ok(())
    }
}

/// 测量
///
/// 测量值在创建时计算并保留一位小数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Measurement {
    Distance {
        start: Point2,
        end: Point2,
        value: f64,
        unit: LengthUnit,
    },
    Area {
        points: Vec<Point2>,
        value: f64,
        unit: LengthUnit,
    },
}

impl Measurement {
    pub fn distance(start: Point2, end: Point2, unit: LengthUnit) -> Self {
        Measurement::Distance {
            start,
            end,
            value: round_to_tenth(distance(&start, &end)),
            unit,
        }
    }

    /// 面积测量，至少需要3个不同顶点；退化多边形的面积为0
    pub fn area(points: &[Point2], unit: LengthUnit) -> GeometryResult<Self> {
        let points = open_ring(points);
        require_points("area measurement", &points, 3)?;
        let value = round_to_tenth(polygon_area(&points));
        Ok(Measurement::Area {
            points,
            value,
            unit,
        })
    }

    pub fn value(&self) -> f64 {
        match self {
            Measurement::Distance { value, .. } | Measurement::Area { value, .. } => *value,
        }
    }

    pub fn unit(&self) -> LengthUnit {
        match self {
            Measurement::Distance { unit, .. } | Measurement::Area { unit, .. } => *unit,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Measurement::Distance { .. } => "distance",
            Measurement::Area { .. } => "area",
        }
    }

    /// 显示文本，如 `5.0 ft`、`100.0 sq ft`
    pub fn label(&self) -> String {
        match self {
            Measurement::Distance { value, unit, .. } => format!("{:.1} {}", value, unit.label()),
            Measurement::Area { value, unit, .. } => {
                format!("{:.1} {}", value, unit.area_label())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_boundary_requires_three_points() {
        let err = Boundary::from_points(&square()[..2]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::TooFewPoints {
                kind: "boundary",
                required: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_boundary_strips_closing_point() {
        let ring = close_ring(&square());
        let boundary = Boundary::from_points(&ring).unwrap();
        assert_eq!(boundary.points().len(), 4);
        assert_eq!(boundary.ring().len(), 5);
        assert!((boundary.area() - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_boundary_remove_vertex_keeps_minimum() {
        let mut boundary = Boundary::from_points(&square()).unwrap();
        assert!(boundary.remove_vertex(3).is_ok());
        assert_eq!(boundary.points().len(), 3);
        assert!(boundary.remove_vertex(0).is_err());
        assert_eq!(boundary.points().len(), 3);
    }

    #[test]
    fn test_obstruction_footprints() {
        let column = Obstruction::Column(Column {
            center: Point2::new(5.0, 5.0),
            size: 2.0,
            height: 30.0,
        });
        assert!((column.footprint_area() - 4.0).abs() < EPSILON);

        let wall = Obstruction::Wall(Wall {
            points: vec![Point2::new(0.0, 0.0), Point2::new(0.0, 30.0)],
            width: 1.0,
            height: 20.0,
        });
        assert!((wall.footprint_area() - 30.0).abs() < EPSILON);
        let rings = wall.footprints();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert!((polygon_area(&rings[0]) - 30.0).abs() < EPSILON);
        assert!(point_in_polygon(&Point2::new(0.2, 15.0), &rings[0]));
        assert!(!point_in_polygon(&Point2::new(0.8, 15.0), &rings[0]));

        let dock = Dock {
            center: Point2::new(0.0, 0.0),
            width: 10.0,
            depth: 4.0,
            height: 14.0,
        };
        let ring = dock.footprint();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], Point2::new(-5.0, -2.0));
        assert!((polygon_area(&ring) - 40.0).abs() < EPSILON);
    }

    #[test]
    fn test_bent_wall_footprint_follows_every_segment() {
        // L 形墙：沿 x 轴 20，再沿 y 轴 10
        let wall = Wall {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, 10.0),
            ],
            width: 2.0,
            height: 20.0,
        };
        let rings = wall.footprint();
        assert_eq!(rings.len(), 2);

        // 拐角处的第二段在首末点连线上的矩形之外
        let on_second_leg = Point2::new(20.5, 8.0);
        assert!(rings.iter().any(|r| point_in_polygon(&on_second_leg, r)));
        let on_chord = Point2::new(10.0, 5.0);
        assert!(!rings.iter().any(|r| point_in_polygon(&on_chord, r)));

        let area = Obstruction::Wall(wall).footprint_area();
        assert!((area - 60.0).abs() < EPSILON);
    }

    #[test]
    fn test_obstruction_validate() {
        let wall = Obstruction::Wall(Wall {
            points: vec![Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)],
            width: 1.0,
            height: 20.0,
        });
        assert!(matches!(
            wall.validate(),
            Err(GeometryError::TooFewPoints { kind: "wall", .. })
        ));

        let column = Obstruction::Column(Column {
            center: Point2::origin(),
            size: 0.0,
            height: 30.0,
        });
        assert!(matches!(
            column.validate(),
            Err(GeometryError::InvalidDimension { field: "size", .. })
        ));
    }

    #[test]
    fn test_zone_purpose_from_tag() {
        assert_eq!(ZonePurpose::from_tag("Receiving"), ZonePurpose::Receiving);
        assert_eq!(ZonePurpose::from_tag("cold storage"), ZonePurpose::Other);
    }

    #[test]
    fn test_measurement_values() {
        let d = Measurement::distance(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0), LengthUnit::Feet);
        assert_eq!(d.value(), 5.0);
        assert_eq!(d.label(), "5.0 ft");

        let a = Measurement::area(&square(), LengthUnit::Meters).unwrap();
        assert_eq!(a.value(), 100.0);
        assert_eq!(a.label(), "100.0 sq m");

        let d = Measurement::distance(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), LengthUnit::Feet);
        assert_eq!(d.value(), 1.4);
    }
}
