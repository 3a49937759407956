//! 持久化载荷结构
//!
//! 与后端约定的闭合环多边形形式：边界与多边形均为 GeoJSON 风格的
//! `{"type": "Polygon", "coordinates": [[[x, y], ...]]}`，环的末点等于首点。
//! 区域和测量不属于边界/障碍物模型，放在 `metadata` 中。

use layoutcad_core::geometry::{LengthUnit, ObstructionKind, ZonePurpose};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 坐标对
pub type Position = [f64; 2];

/// 闭合环
pub type Ring = Vec<Position>;

/// 几何形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// 多边形：第一个环为外环
    Polygon { coordinates: Vec<Ring> },
    /// 折线（墙体中心线）
    LineString { coordinates: Vec<Position> },
}

impl Shape {
    pub fn polygon(ring: Ring) -> Self {
        Shape::Polygon {
            coordinates: vec![ring],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Polygon { .. } => "Polygon",
            Shape::LineString { .. } => "LineString",
        }
    }
}

/// 障碍物附加属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

/// 带类型标签的障碍物记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "type")]
    pub kind: ObstructionKind,
    pub shape: Shape,
    pub height: f64,
    #[serde(default)]
    pub properties: ShapeProperties,
}

/// 区域记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub name: String,
    #[serde(default)]
    pub purpose: ZonePurpose,
    pub boundary: Shape,
}

/// 测量记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeasurementRecord {
    Distance {
        coordinates: [Position; 2],
        value: f64,
        unit: LengthUnit,
    },
    Area {
        boundary: Shape,
        value: f64,
        unit: LengthUnit,
    },
}

/// 元数据块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadMetadata {
    pub zones: Vec<ZoneRecord>,
    pub measurements: Vec<MeasurementRecord>,
}

/// 设施几何载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityGeometryPayload {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub clear_height: f64,
    #[serde(default)]
    pub units: LengthUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Shape>,
    #[serde(default)]
    pub obstructions: Vec<ShapeRecord>,
    #[serde(default)]
    pub metadata: PayloadMetadata,
}

impl FacilityGeometryPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
