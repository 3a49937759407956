//! LayoutCAD 持久化格式
//!
//! 支持：
//! - 闭合环多边形载荷（边界 + 带类型的障碍物形状 + 区域/测量元数据）
//! - 载荷的 `.json` 文本文件与 `.lcad` 压缩二进制文件

pub mod adapter;
pub mod error;
pub mod native;
pub mod payload;

pub use adapter::{export, import};
pub use error::FileError;
pub use native::PayloadFormat;
pub use payload::{
    FacilityGeometryPayload, MeasurementRecord, PayloadMetadata, Shape, ShapeProperties,
    ShapeRecord, ZoneRecord,
};
pub use uuid::Uuid;
