//! 拾取
//!
//! 将世界坐标点解析为最近的可选中对象。按类别优先级依次检查：
//! 边界顶点 → 障碍物 → 区域 → 测量，返回第一个有命中的类别中距离最小者。
//!
//! 同一类别中距离相等时取ID最小（最早创建）的对象，边界顶点取序号最小者。

use crate::entity::EntityRef;
use crate::geometry::{Measurement, Obstruction};
use crate::math::{distance, distance_point_to_segment, point_in_polygon, Point2};
use crate::store::GeometryStore;
use crate::view::world_tolerance;

/// 拾取器
#[derive(Debug, Clone, Copy)]
pub struct HitTester<'a> {
    store: &'a GeometryStore,
    /// 世界坐标容差
    tolerance: f64,
}

impl<'a> HitTester<'a> {
    /// `tolerance_px` 是屏幕像素容差，按当前缩放换算为世界容差，
    /// 使拾取半径在屏幕上保持不变。
    pub fn new(store: &'a GeometryStore, tolerance_px: f64, scale: f64) -> Self {
        Self {
            store,
            tolerance: world_tolerance(tolerance_px, scale),
        }
    }

    pub fn hit_test(&self, point: &Point2) -> Option<EntityRef> {
        self.boundary_vertex(point)
            .or_else(|| self.obstruction(point))
            .or_else(|| self.zone(point))
            .or_else(|| self.measurement(point))
    }

    fn boundary_vertex(&self, point: &Point2) -> Option<EntityRef> {
        let boundary = self.store.boundary()?;
        let candidates = boundary
            .points()
            .iter()
            .enumerate()
            .map(|(index, vertex)| (EntityRef::BoundaryVertex(index), distance(point, vertex)));
        self.nearest(candidates)
    }

    fn obstruction(&self, point: &Point2) -> Option<EntityRef> {
        let candidates = self.store.obstructions().map(|(id, obstruction)| {
            let d = match obstruction {
                Obstruction::Column(c) => distance(point, &c.center),
                Obstruction::Dock(d) => distance(point, &d.center),
                Obstruction::Wall(w) => w
                    .points
                    .windows(2)
                    .map(|seg| distance_point_to_segment(point, &seg[0], &seg[1]))
                    .fold(f64::INFINITY, f64::min),
            };
            (EntityRef::Obstruction(id), d)
        });
        self.nearest(candidates)
    }

    fn zone(&self, point: &Point2) -> Option<EntityRef> {
        let candidates = self
            .store
            .zones()
            .map(|(id, zone)| (EntityRef::Zone(id), inside_distance(zone.contains(point))));
        self.nearest(candidates)
    }

    fn measurement(&self, point: &Point2) -> Option<EntityRef> {
        let candidates = self.store.measurements().map(|(id, m)| {
            let d = match m {
                Measurement::Distance { start, end, .. } => {
                    distance_point_to_segment(point, start, end)
                }
                Measurement::Area { points, .. } => {
                    inside_distance(point_in_polygon(point, points))
                }
            };
            (EntityRef::Measurement(id), d)
        });
        self.nearest(candidates)
    }

    /// 容差内距离最小者；严格小于比较保证相等时保留先出现的候选
    fn nearest(&self, candidates: impl Iterator<Item = (EntityRef, f64)>) -> Option<EntityRef> {
        let mut best: Option<(EntityRef, f64)> = None;
        for (entity, d) in candidates {
            if d > self.tolerance {
                continue;
            }
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((entity, d));
            }
        }
        best.map(|(entity, _)| entity)
    }
}

/// 多边形包含测试：在内部视为零距离命中
fn inside_distance(inside: bool) -> f64 {
    if inside {
        0.0
    } else {
        f64::INFINITY
    }
}

/// 便捷函数，见 [`HitTester`]
pub fn hit_test(
    point: &Point2,
    store: &GeometryStore,
    tolerance_px: f64,
    scale: f64,
) -> Option<EntityRef> {
    HitTester::new(store, tolerance_px, scale).hit_test(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Boundary, Column, Dock, LengthUnit, Wall, Zone, ZonePurpose};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn column(x: f64, y: f64) -> Obstruction {
        Obstruction::Column(Column {
            center: Point2::new(x, y),
            size: 2.0,
            height: 30.0,
        })
    }

    #[test]
    fn test_miss_returns_none() {
        let mut store = GeometryStore::new();
        store.add_obstruction(column(50.0, 50.0)).unwrap();
        assert_eq!(hit_test(&Point2::new(0.0, 0.0), &store, 10.0, 1.0), None);
        assert_eq!(hit_test(&Point2::new(0.0, 0.0), &GeometryStore::new(), 10.0, 1.0), None);
    }

    #[test]
    fn test_zone_wins_over_area_measurement() {
        let mut store = GeometryStore::new();
        // 测量先创建，但区域类别优先
        let m = store.add_measurement(
            Measurement::area(&rect(0.0, 0.0, 20.0, 20.0), LengthUnit::Feet).unwrap(),
        );
        let z = store.add_zone(Zone::new("Staging", ZonePurpose::Staging, &rect(5.0, 5.0, 30.0, 30.0)).unwrap());
        assert_eq!(
            hit_test(&Point2::new(10.0, 10.0), &store, 10.0, 1.0),
            Some(EntityRef::Zone(z))
        );
        // 仅在测量范围内
        assert_eq!(
            hit_test(&Point2::new(2.0, 2.0), &store, 1.0, 1.0),
            Some(EntityRef::Measurement(m))
        );
    }

    #[test]
    fn test_boundary_vertex_has_priority() {
        let mut store = GeometryStore::new();
        store.set_boundary(Boundary::from_points(&rect(0.0, 0.0, 100.0, 100.0)).unwrap());
        store.add_obstruction(column(1.0, 1.0)).unwrap();
        assert_eq!(
            hit_test(&Point2::new(1.0, 1.0), &store, 10.0, 1.0),
            Some(EntityRef::BoundaryVertex(0))
        );
        assert_eq!(
            hit_test(&Point2::new(99.0, 98.0), &store, 10.0, 1.0),
            Some(EntityRef::BoundaryVertex(2))
        );
    }

    #[test]
    fn test_nearest_obstruction_wins() {
        let mut store = GeometryStore::new();
        let _far = store.add_obstruction(column(0.0, 0.0)).unwrap();
        let near = store.add_obstruction(column(6.0, 0.0)).unwrap();
        assert_eq!(
            hit_test(&Point2::new(4.0, 0.0), &store, 10.0, 1.0),
            Some(EntityRef::Obstruction(near))
        );
    }

    #[test]
    fn test_equal_distance_picks_lowest_id() {
        let mut store = GeometryStore::new();
        let first = store.add_obstruction(column(-5.0, 0.0)).unwrap();
        let _second = store.add_obstruction(column(5.0, 0.0)).unwrap();
        assert_eq!(
            hit_test(&Point2::new(0.0, 0.0), &store, 10.0, 1.0),
            Some(EntityRef::Obstruction(first))
        );

        let z1 = store.add_zone(Zone::new("A", ZonePurpose::Storage, &rect(20.0, 20.0, 40.0, 40.0)).unwrap());
        let _z2 = store.add_zone(Zone::new("B", ZonePurpose::Office, &rect(25.0, 25.0, 45.0, 45.0)).unwrap());
        assert_eq!(
            hit_test(&Point2::new(30.0, 30.0), &store, 1.0, 1.0),
            Some(EntityRef::Zone(z1))
        );
    }

    #[test]
    fn test_wall_and_dock_metrics() {
        let mut store = GeometryStore::new();
        let wall = store
            .add_obstruction(Obstruction::Wall(Wall {
                points: vec![Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)],
                width: 1.0,
                height: 20.0,
            }))
            .unwrap();
        let dock = store
            .add_obstruction(Obstruction::Dock(Dock {
                center: Point2::new(50.0, 50.0),
                width: 10.0,
                depth: 4.0,
                height: 14.0,
            }))
            .unwrap();
        assert_eq!(
            hit_test(&Point2::new(60.0, 3.0), &store, 5.0, 1.0),
            Some(EntityRef::Obstruction(wall))
        );
        assert_eq!(
            hit_test(&Point2::new(52.0, 49.0), &store, 5.0, 1.0),
            Some(EntityRef::Obstruction(dock))
        );
    }

    #[test]
    fn test_tolerance_follows_zoom() {
        let mut store = GeometryStore::new();
        let id = store.add_obstruction(column(0.0, 0.0)).unwrap();
        let probe = Point2::new(8.0, 0.0);
        // 放大后世界容差变小
        assert_eq!(hit_test(&probe, &store, 10.0, 1.0), Some(EntityRef::Obstruction(id)));
        assert_eq!(hit_test(&probe, &store, 10.0, 2.0), None);
        // 缩小后世界容差变大
        assert_eq!(
            hit_test(&Point2::new(15.0, 0.0), &store, 10.0, 0.5),
            Some(EntityRef::Obstruction(id))
        );
    }

    #[test]
    fn test_distance_measurement_hit() {
        let mut store = GeometryStore::new();
        let id = store.add_measurement(Measurement::distance(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            LengthUnit::Feet,
        ));
        assert_eq!(
            hit_test(&Point2::new(5.0, 2.0), &store, 3.0, 1.0),
            Some(EntityRef::Measurement(id))
        );
        assert_eq!(hit_test(&Point2::new(5.0, 4.0), &store, 3.0, 1.0), None);
    }
}
