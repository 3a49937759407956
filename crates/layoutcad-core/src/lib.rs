//! LayoutCAD 几何核心
//!
//! 设施平面几何的交互式编辑核心：坐标变换、网格捕捉、几何存储、
//! 面积/距离计算与拾取。
//!
//! # 架构设计
//!
//! - `math`: 平面几何计算（点在多边形内、点到线段距离、鞋带公式）
//! - `geometry`: 边界、障碍物、区域、测量的数据模型
//! - `store`: 持有所有实体并分配ID
//! - `view` / `snap`: 屏幕与世界坐标的映射、网格捕捉
//! - `hit_test`: 跨实体类别的拾取
//!
//! # 示例
//!
//! ```rust
//! use layoutcad_core::prelude::*;
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ];
//! assert_eq!(polygon_area(&square), 100.0);
//! ```

pub mod entity;
pub mod error;
pub mod geometry;
pub mod hit_test;
pub mod math;
pub mod snap;
pub mod store;
pub mod view;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::{EntityId, EntityKind, EntityRef};
    pub use crate::error::{GeometryError, GeometryResult};
    pub use crate::geometry::{
        Boundary, Column, Dock, FacilityInfo, LengthUnit, Measurement, Obstruction,
        ObstructionKind, Wall, Zone, ZonePurpose,
    };
    pub use crate::hit_test::{hit_test, HitTester};
    pub use crate::math::{
        distance, distance_point_to_segment, point_in_polygon, polygon_area, BoundingBox2,
        Point2, Vector2, EPSILON,
    };
    pub use crate::snap::{snap_to_grid, SnapConfig};
    pub use crate::store::{GeometryStore, ObstructionPatch, ZonePatch};
    pub use crate::view::{world_tolerance, ViewState, ZoomDirection};
}
