//! 绘图模式状态机
//!
//! 一个转换函数 `(会话, 存储, 事件) -> 副作用`，不依赖任何界面。
//! 点击坐标必须已经换算为世界坐标并按需捕捉。
//!
//! 转换返回 `Err` 时，会话的累积点与存储都保持原样。

use crate::action::{DrawingMode, EditorEvent, Effect, SelectionPatch};
use crate::config::EditorConfig;
use crate::session::DrawingSession;
use layoutcad_core::entity::EntityRef;
use layoutcad_core::error::{GeometryError, GeometryResult};
use layoutcad_core::geometry::{Boundary, Measurement, Zone, ZonePurpose};
use layoutcad_core::hit_test::HitTester;
use layoutcad_core::math::{close_ring, closes_polygon, points_coincide, Point2};
use layoutcad_core::store::GeometryStore;
use layoutcad_core::view::world_tolerance;
use tracing::{debug, warn};

/// 绘图模式状态机
///
/// 只借用配置和当前缩放，状态保存在 [`DrawingSession`] 中。
#[derive(Debug, Clone, Copy)]
pub struct DrawingModeMachine<'a> {
    config: &'a EditorConfig,
    scale: f64,
}

impl<'a> DrawingModeMachine<'a> {
    pub fn new(config: &'a EditorConfig, scale: f64) -> Self {
        Self { config, scale }
    }

    /// 闭合多边形时使用的世界坐标容差
    pub fn close_tolerance(&self) -> f64 {
        world_tolerance(self.config.snap.tolerance_px, self.scale)
    }

    pub fn transition(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
        event: EditorEvent,
    ) -> GeometryResult<Vec<Effect>> {
        let name = event.name();
        let result = match event {
            EditorEvent::SetMode(mode) => Ok(self.set_mode(session, mode)),
            EditorEvent::Click(point) => self.on_click(session, store, point),
            EditorEvent::FinalizeBoundary => self.finalize_boundary(session, store),
            EditorEvent::AddZone { name, purpose } => self.add_zone(session, store, name, purpose),
            EditorEvent::Finish => self.finish(session, store),
            EditorEvent::Cancel => Ok(self.cancel(session)),
            EditorEvent::UndoPoint => Ok(undo_point(session)),
            EditorEvent::DeleteSelected => delete_selected(session, store),
            EditorEvent::UpdateSelected(patch) => update_selected(session, store, &patch),
        };

        if let Err(e) = &result {
            warn!("Rejected {} in {} mode: {}", name, session.mode().name(), e);
        }
        result
    }

    fn set_mode(&self, session: &mut DrawingSession, mode: DrawingMode) -> Vec<Effect> {
        let mut effects = Vec::new();
        if session.point_count() > 0 {
            effects.push(Effect::PointsChanged(0));
        }
        if mode != DrawingMode::Select && session.selection().is_some() {
            session.select(None);
            effects.push(Effect::SelectionChanged(None));
        }
        session.set_mode(mode);
        effects.push(Effect::ModeChanged(mode));
        debug!("Mode set to {}", mode.name());
        effects
    }

    fn on_click(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
        point: Point2,
    ) -> GeometryResult<Vec<Effect>> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate {
                x: point.x,
                y: point.y,
            });
        }

        match session.mode() {
            DrawingMode::Select => {
                let hit = HitTester::new(store, self.config.snap.tolerance_px, self.scale)
                    .hit_test(&point);
                session.select(hit);
                match hit {
                    Some(entity) => debug!("Selected {}", entity),
                    None => debug!("Selection cleared"),
                }
                Ok(vec![Effect::SelectionChanged(hit)])
            }
            DrawingMode::Boundary | DrawingMode::Zone => {
                Ok(vec![Effect::PointsChanged(session.push_point(point))])
            }
            DrawingMode::Column => {
                let id = store.add_obstruction(self.config.obstructions.column_at(point))?;
                debug!("Placed column {} at ({}, {})", id, point.x, point.y);
                Ok(vec![Effect::Committed(EntityRef::Obstruction(id))])
            }
            DrawingMode::Dock => {
                let id = store.add_obstruction(self.config.obstructions.dock_at(point))?;
                debug!("Placed dock {} at ({}, {})", id, point.x, point.y);
                Ok(vec![Effect::Committed(EntityRef::Obstruction(id))])
            }
            DrawingMode::Wall => match session.first_point() {
                None => Ok(vec![Effect::PointsChanged(session.push_point(point))]),
                Some(start) => {
                    if points_coincide(&start, &point) {
                        return Err(GeometryError::TooFewPoints {
                            kind: "wall",
                            required: 2,
                            found: 1,
                        });
                    }
                    let wall = self.config.obstructions.wall_between(start, point);
                    let id = store.add_obstruction(wall)?;
                    session.clear_points();
                    debug!("Committed wall {}", id);
                    Ok(vec![
                        Effect::Committed(EntityRef::Obstruction(id)),
                        Effect::PointsChanged(0),
                    ])
                }
            },
            DrawingMode::MeasureDistance => match session.first_point() {
                None => Ok(vec![Effect::PointsChanged(session.push_point(point))]),
                Some(start) => {
                    let measurement = Measurement::distance(start, point, store.info().unit);
                    Ok(self.commit_measurement(session, store, measurement))
                }
            },
            DrawingMode::MeasureArea => {
                if closes_polygon(session.points(), &point, self.close_tolerance()) {
                    // 闭合点本身不参与面积计算
                    let measurement = Measurement::area(session.points(), store.info().unit)?;
                    Ok(self.commit_measurement(session, store, measurement))
                } else {
                    Ok(vec![Effect::PointsChanged(session.push_point(point))])
                }
            }
        }
    }

    /// 提交测量后回到选择模式
    fn commit_measurement(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
        measurement: Measurement,
    ) -> Vec<Effect> {
        let label = measurement.label();
        let id = store.add_measurement(measurement);
        session.set_mode(DrawingMode::Select);
        debug!("Committed measurement {}: {}", id, label);
        vec![
            Effect::Committed(EntityRef::Measurement(id)),
            Effect::PointsChanged(0),
            Effect::ModeChanged(DrawingMode::Select),
        ]
    }

    fn finalize_boundary(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
    ) -> GeometryResult<Vec<Effect>> {
        if session.mode() != DrawingMode::Boundary {
            return Ok(Vec::new());
        }

        let ring = close_ring(session.points());
        let boundary = Boundary::from_points(&ring)?;
        let vertices = boundary.points().len();
        store.set_boundary(boundary);
        session.clear_points();

        let mut effects = vec![Effect::Committed(EntityRef::Boundary), Effect::PointsChanged(0)];
        // 旧边界的顶点引用已失效
        if matches!(session.selection(), Some(EntityRef::BoundaryVertex(_))) {
            session.select(None);
            effects.push(Effect::SelectionChanged(None));
        }
        debug!("Committed boundary with {} vertices", vertices);
        Ok(effects)
    }

    fn add_zone(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
        name: String,
        purpose: ZonePurpose,
    ) -> GeometryResult<Vec<Effect>> {
        if session.mode() != DrawingMode::Zone {
            return Ok(Vec::new());
        }

        let zone = Zone::new(name, purpose, session.points())?;
        let area = zone.area();
        let id = store.add_zone(zone);
        session.clear_points();
        debug!("Committed zone {} ({:.1} sq units)", id, area);
        Ok(vec![
            Effect::Committed(EntityRef::Zone(id)),
            Effect::PointsChanged(0),
        ])
    }

    /// 完成当前累积，空缓冲时什么也不做
    fn finish(
        &self,
        session: &mut DrawingSession,
        store: &mut GeometryStore,
    ) -> GeometryResult<Vec<Effect>> {
        if session.point_count() == 0 {
            return Ok(Vec::new());
        }

        match session.mode() {
            DrawingMode::Boundary => self.finalize_boundary(session, store),
            DrawingMode::Zone => {
                let name = format!("Zone {}", store.zone_count() + 1);
                self.add_zone(session, store, name, ZonePurpose::default())
            }
            DrawingMode::MeasureArea => {
                let measurement = Measurement::area(session.points(), store.info().unit)?;
                Ok(self.commit_measurement(session, store, measurement))
            }
            DrawingMode::Wall => Err(GeometryError::TooFewPoints {
                kind: "wall",
                required: 2,
                found: session.point_count(),
            }),
            DrawingMode::MeasureDistance => Err(GeometryError::TooFewPoints {
                kind: "distance measurement",
                required: 2,
                found: session.point_count(),
            }),
            DrawingMode::Select | DrawingMode::Column | DrawingMode::Dock => Ok(Vec::new()),
        }
    }

    fn cancel(&self, session: &mut DrawingSession) -> Vec<Effect> {
        let mut effects = Vec::new();
        if session.clear_points() {
            debug!("Discarded points in {} mode", session.mode().name());
            effects.push(Effect::PointsChanged(0));
        }
        if session.mode() == DrawingMode::Select && session.selection().is_some() {
            session.select(None);
            effects.push(Effect::SelectionChanged(None));
        }
        effects
    }
}

fn undo_point(session: &mut DrawingSession) -> Vec<Effect> {
    match session.pop_point() {
        Some(_) => vec![Effect::PointsChanged(session.point_count())],
        None => Vec::new(),
    }
}

fn delete_selected(
    session: &mut DrawingSession,
    store: &mut GeometryStore,
) -> GeometryResult<Vec<Effect>> {
    let Some(entity) = session.selection() else {
        return Ok(Vec::new());
    };

    store.remove(entity)?;
    session.select(None);
    debug!("Deleted {}", entity);

    let changed = match entity {
        // 删除顶点只是修改边界
        EntityRef::BoundaryVertex(_) => Effect::Updated(EntityRef::Boundary),
        other => Effect::Removed(other),
    };
    Ok(vec![changed, Effect::SelectionChanged(None)])
}

fn update_selected(
    session: &DrawingSession,
    store: &mut GeometryStore,
    patch: &SelectionPatch,
) -> GeometryResult<Vec<Effect>> {
    let entity = session.selection().ok_or(GeometryError::NothingSelected)?;

    match (entity, patch) {
        (EntityRef::Obstruction(id), SelectionPatch::Obstruction(p)) => {
            store.update_obstruction(id, p)?
        }
        (EntityRef::Zone(id), SelectionPatch::Zone(p)) => store.update_zone(id, p)?,
        _ => {
            return Err(GeometryError::WrongTarget {
                expected: patch.target_name(),
                found: entity.kind().name(),
            })
        }
    }

    debug!("Updated {}", entity);
    Ok(vec![Effect::Updated(entity)])
}
