//! 几何存储
//!
//! 持有边界、障碍物、区域和测量。所有写操作要么完整成功，要么不改变存储；
//! 逐点累积发生在绘图会话中，不在这里。

use crate::entity::{EntityId, EntityRef};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{Boundary, FacilityInfo, Measurement, Obstruction, Zone, ZonePurpose};
use crate::math::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 障碍物的局部更新
///
/// 只有与障碍物类型相符的字段可以设置，否则整个更新被拒绝。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstructionPatch {
    pub center: Option<Point2>,
    pub height: Option<f64>,
    pub size: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
}

impl ObstructionPatch {
    pub fn height(height: f64) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }

    fn apply(&self, obstruction: &mut Obstruction) -> GeometryResult<()> {
        let kind = obstruction.kind().name();
        let not_applicable = |field: &'static str| GeometryError::PatchNotApplicable { field, kind };

        match obstruction {
            Obstruction::Column(c) => {
                if self.width.is_some() {
                    return Err(not_applicable("width"));
                }
                if self.depth.is_some() {
                    return Err(not_applicable("depth"));
                }
                if let Some(center) = self.center {
                    c.center = center;
                }
                if let Some(size) = self.size {
                    c.size = size;
                }
                if let Some(height) = self.height {
                    c.height = height;
                }
            }
            Obstruction::Wall(w) => {
                if self.center.is_some() {
                    return Err(not_applicable("center"));
                }
                if self.size.is_some() {
                    return Err(not_applicable("size"));
                }
                if self.depth.is_some() {
                    return Err(not_applicable("depth"));
                }
                if let Some(width) = self.width {
                    w.width = width;
                }
                if let Some(height) = self.height {
                    w.height = height;
                }
            }
            Obstruction::Dock(d) => {
                if self.size.is_some() {
                    return Err(not_applicable("size"));
                }
                if let Some(center) = self.center {
                    d.center = center;
                }
                if let Some(width) = self.width {
                    d.width = width;
                }
                if let Some(depth) = self.depth {
                    d.depth = depth;
                }
                if let Some(height) = self.height {
                    d.height = height;
                }
            }
        }
        obstruction.validate()
    }
}

/// 区域的局部更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub purpose: Option<ZonePurpose>,
    pub points: Option<Vec<Point2>>,
}

impl ZonePatch {
    fn apply(&self, zone: &mut Zone) -> GeometryResult<()> {
        if let Some(points) = &self.points {
            zone.set_points(points)?;
        }
        if let Some(name) = &self.name {
            zone.name = name.clone();
        }
        if let Some(purpose) = self.purpose {
            zone.purpose = purpose;
        }
        Ok(())
    }
}

/// 几何存储
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    info: FacilityInfo,
    boundary: Option<Boundary>,
    obstructions: BTreeMap<EntityId, Obstruction>,
    zones: BTreeMap<EntityId, Zone>,
    measurements: BTreeMap<EntityId, Measurement>,
    next_id: u64,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(info: FacilityInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::new(self.next_id)
    }

    pub fn info(&self) -> &FacilityInfo {
        &self.info
    }

    pub fn set_info(&mut self, info: FacilityInfo) {
        self.info = info;
    }

    // ========== 边界 ==========

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    /// 设置（替换）边界
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = Some(boundary);
    }

    pub fn clear_boundary(&mut self) -> Option<Boundary> {
        self.boundary.take()
    }

    pub fn remove_boundary_vertex(&mut self, index: usize) -> GeometryResult<Point2> {
        self.boundary
            .as_mut()
            .ok_or(GeometryError::NoBoundary)?
            .remove_vertex(index)
    }

    // ========== 障碍物 ==========

    pub fn add_obstruction(&mut self, obstruction: Obstruction) -> GeometryResult<EntityId> {
        obstruction.validate()?;
        let id = self.allocate_id();
        self.obstructions.insert(id, obstruction);
        Ok(id)
    }

    pub fn obstruction(&self, id: EntityId) -> Option<&Obstruction> {
        self.obstructions.get(&id)
    }

    /// 按ID升序（即创建顺序）遍历
    pub fn obstructions(&self) -> impl Iterator<Item = (EntityId, &Obstruction)> {
        self.obstructions.iter().map(|(id, o)| (*id, o))
    }

    pub fn update_obstruction(&mut self, id: EntityId, patch: &ObstructionPatch) -> GeometryResult<()> {
        let current = self
            .obstructions
            .get(&id)
            .ok_or(GeometryError::NotFound(EntityRef::Obstruction(id)))?;
        let mut updated = current.clone();
        patch.apply(&mut updated)?;
        self.obstructions.insert(id, updated);
        Ok(())
    }

    pub fn remove_obstruction(&mut self, id: EntityId) -> GeometryResult<Obstruction> {
        self.obstructions
            .remove(&id)
            .ok_or(GeometryError::NotFound(EntityRef::Obstruction(id)))
    }

    // ========== 区域 ==========

    pub fn add_zone(&mut self, zone: Zone) -> EntityId {
        let id = self.allocate_id();
        self.zones.insert(id, zone);
        id
    }

    pub fn zone(&self, id: EntityId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn zones(&self) -> impl Iterator<Item = (EntityId, &Zone)> {
        self.zones.iter().map(|(id, z)| (*id, z))
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn update_zone(&mut self, id: EntityId, patch: &ZonePatch) -> GeometryResult<()> {
        let current = self
            .zones
            .get(&id)
            .ok_or(GeometryError::NotFound(EntityRef::Zone(id)))?;
        let mut updated = current.clone();
        patch.apply(&mut updated)?;
        self.zones.insert(id, updated);
        Ok(())
    }

    pub fn remove_zone(&mut self, id: EntityId) -> GeometryResult<Zone> {
        self.zones
            .remove(&id)
            .ok_or(GeometryError::NotFound(EntityRef::Zone(id)))
    }

    // ========== 测量 ==========

    pub fn add_measurement(&mut self, measurement: Measurement) -> EntityId {
        let id = self.allocate_id();
        self.measurements.insert(id, measurement);
        id
    }

    pub fn measurement(&self, id: EntityId) -> Option<&Measurement> {
        self.measurements.get(&id)
    }

    pub fn measurements(&self) -> impl Iterator<Item = (EntityId, &Measurement)> {
        self.measurements.iter().map(|(id, m)| (*id, m))
    }

    pub fn remove_measurement(&mut self, id: EntityId) -> GeometryResult<Measurement> {
        self.measurements
            .remove(&id)
            .ok_or(GeometryError::NotFound(EntityRef::Measurement(id)))
    }

    // ========== 通用 ==========

    /// 删除引用指向的对象
    pub fn remove(&mut self, entity: EntityRef) -> GeometryResult<()> {
        match entity {
            EntityRef::Boundary => self
                .clear_boundary()
                .map(|_| ())
                .ok_or(GeometryError::NoBoundary),
            EntityRef::BoundaryVertex(index) => self.remove_boundary_vertex(index).map(|_| ()),
            EntityRef::Obstruction(id) => self.remove_obstruction(id).map(|_| ()),
            EntityRef::Zone(id) => self.remove_zone(id).map(|_| ()),
            EntityRef::Measurement(id) => self.remove_measurement(id).map(|_| ()),
        }
    }

    /// 引用是否仍指向存储中的对象
    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Boundary => self.boundary.is_some(),
            EntityRef::BoundaryVertex(index) => self
                .boundary
                .as_ref()
                .is_some_and(|b| index < b.points().len()),
            EntityRef::Obstruction(id) => self.obstructions.contains_key(&id),
            EntityRef::Zone(id) => self.zones.contains_key(&id),
            EntityRef::Measurement(id) => self.measurements.contains_key(&id),
        }
    }

    pub fn entity_count(&self) -> usize {
        usize::from(self.boundary.is_some())
            + self.obstructions.len()
            + self.zones.len()
            + self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// 边界围成的总面积
    pub fn total_area(&self) -> f64 {
        self.boundary.as_ref().map_or(0.0, Boundary::area)
    }

    /// 可用面积：总面积减去所有障碍物的占地面积
    pub fn usable_area(&self) -> f64 {
        let blocked: f64 = self
            .obstructions
            .values()
            .map(Obstruction::footprint_area)
            .sum();
        (self.total_area() - blocked).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Column, Dock, LengthUnit, Wall};
    use crate::math::EPSILON;

    fn column(x: f64, y: f64) -> Obstruction {
        Obstruction::Column(Column {
            center: Point2::new(x, y),
            size: 1.0,
            height: 30.0,
        })
    }

    fn rect(w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut store = GeometryStore::new();
        let a = store.add_obstruction(column(1.0, 1.0)).unwrap();
        let z = store.add_zone(Zone::new("Dock area", ZonePurpose::Receiving, &rect(5.0, 5.0)).unwrap());
        let b = store.add_obstruction(column(2.0, 2.0)).unwrap();
        assert!(a < z && z < b);
        let ids: Vec<_> = store.obstructions().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_invalid_obstruction_is_not_stored() {
        let mut store = GeometryStore::new();
        let wall = Obstruction::Wall(Wall {
            points: vec![Point2::new(0.0, 0.0)],
            width: 1.0,
            height: 10.0,
        });
        assert!(store.add_obstruction(wall).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_obstruction_height() {
        let mut store = GeometryStore::new();
        let id = store.add_obstruction(column(1.0, 1.0)).unwrap();
        store.update_obstruction(id, &ObstructionPatch::height(42.0)).unwrap();
        assert_eq!(store.obstruction(id).unwrap().height(), 42.0);
    }

    #[test]
    fn test_update_rejects_foreign_field_atomically() {
        let mut store = GeometryStore::new();
        let id = store.add_obstruction(column(1.0, 1.0)).unwrap();
        let patch = ObstructionPatch {
            height: Some(50.0),
            depth: Some(3.0),
            ..Default::default()
        };
        let err = store.update_obstruction(id, &patch).unwrap_err();
        assert_eq!(
            err,
            GeometryError::PatchNotApplicable {
                field: "depth",
                kind: "column"
            }
        );
        // 更新被整体拒绝
        assert_eq!(store.obstruction(id).unwrap().height(), 30.0);
    }

    #[test]
    fn test_update_rejects_invalid_dimension() {
        let mut store = GeometryStore::new();
        let id = store
            .add_obstruction(Obstruction::Dock(Dock {
                center: Point2::origin(),
                width: 10.0,
                depth: 4.0,
                height: 14.0,
            }))
            .unwrap();
        let patch = ObstructionPatch {
            width: Some(-1.0),
            ..Default::default()
        };
        assert!(store.update_obstruction(id, &patch).is_err());
        assert!(matches!(
            store.obstruction(id),
            Some(Obstruction::Dock(d)) if d.width == 10.0
        ));
    }

    #[test]
    fn test_update_zone() {
        let mut store = GeometryStore::new();
        let id = store.add_zone(Zone::new("A", ZonePurpose::Storage, &rect(5.0, 5.0)).unwrap());
        let patch = ZonePatch {
            name: Some("Bulk".to_string()),
            purpose: Some(ZonePurpose::Staging),
            points: None,
        };
        store.update_zone(id, &patch).unwrap();
        let zone = store.zone(id).unwrap();
        assert_eq!(zone.name, "Bulk");
        assert_eq!(zone.purpose, ZonePurpose::Staging);

        let bad = ZonePatch {
            points: Some(rect(5.0, 5.0)[..2].to_vec()),
            ..Default::default()
        };
        assert!(store.update_zone(id, &bad).is_err());
        assert_eq!(store.zone(id).unwrap().points().len(), 4);
    }

    #[test]
    fn test_remove() {
        let mut store = GeometryStore::new();
        let id = store.add_measurement(Measurement::distance(
            Point2::origin(),
            Point2::new(1.0, 0.0),
            LengthUnit::Feet,
        ));
        assert!(store.contains(EntityRef::Measurement(id)));
        store.remove(EntityRef::Measurement(id)).unwrap();
        assert!(!store.contains(EntityRef::Measurement(id)));
        assert_eq!(
            store.remove(EntityRef::Measurement(id)),
            Err(GeometryError::NotFound(EntityRef::Measurement(id)))
        );
        assert_eq!(store.remove(EntityRef::Boundary), Err(GeometryError::NoBoundary));
    }

    #[test]
    fn test_usable_area() {
        let mut store = GeometryStore::new();
        store.set_boundary(Boundary::from_points(&rect(100.0, 80.0)).unwrap());
        store.add_obstruction(column(10.5, 10.5)).unwrap();
        store
            .add_obstruction(Obstruction::Wall(Wall {
                points: vec![Point2::new(20.5, 0.0), Point2::new(20.5, 30.0)],
                width: 1.0,
                height: 12.0,
            }))
            .unwrap();
        assert!((store.total_area() - 8000.0).abs() < EPSILON);
        assert!((store.usable_area() - 7969.0).abs() < EPSILON);
    }
}
