//! 实体标识

use serde::{Deserialize, Serialize};
use std::fmt;

/// 实体ID
///
/// 由 [`GeometryStore`](crate::store::GeometryStore) 单调递增分配，
/// 因此ID的大小顺序就是创建顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 实体类别，按拾取优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Boundary,
    Obstruction,
    Zone,
    Measurement,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Boundary => "boundary",
            EntityKind::Obstruction => "obstruction",
            EntityKind::Zone => "zone",
            EntityKind::Measurement => "measurement",
        }
    }
}

/// 对存储中某个可选中对象的引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// 整个边界
    Boundary,
    /// 边界上的一个顶点（按顶点序号）
    BoundaryVertex(usize),
    Obstruction(EntityId),
    Zone(EntityId),
    Measurement(EntityId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Boundary | EntityRef::BoundaryVertex(_) => EntityKind::Boundary,
            EntityRef::Obstruction(_) => EntityKind::Obstruction,
            EntityRef::Zone(_) => EntityKind::Zone,
            EntityRef::Measurement(_) => EntityKind::Measurement,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            EntityRef::Obstruction(id) | EntityRef::Zone(id) | EntityRef::Measurement(id) => {
                Some(*id)
            }
            EntityRef::Boundary | EntityRef::BoundaryVertex(_) => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Boundary => write!(f, "boundary"),
            EntityRef::BoundaryVertex(index) => write!(f, "boundary vertex {}", index),
            EntityRef::Obstruction(id) => write!(f, "obstruction {}", id),
            EntityRef::Zone(id) => write!(f, "zone {}", id),
            EntityRef::Measurement(id) => write!(f, "measurement {}", id),
        }
    }
}
