//! 导入/导出适配
//!
//! 在内部的开放顶点序列与持久化使用的闭合环形式之间转换。
//! 导入在新建的存储上进行，任何一条记录出错都会放弃整个导入。

use crate::error::FileError;
use crate::payload::{
    FacilityGeometryPayload, MeasurementRecord, PayloadMetadata, Position, Ring, Shape,
    ShapeProperties, ShapeRecord, ZoneRecord,
};
use layoutcad_core::geometry::{
    Boundary, Column, Dock, FacilityInfo, Measurement, Obstruction, ObstructionKind, Wall, Zone,
};
use layoutcad_core::math::{close_ring, distance, open_ring, points_coincide, BoundingBox2, Point2};
use layoutcad_core::store::GeometryStore;
use uuid::Uuid;

/// 闭合环最少坐标数（3个顶点 + 闭合点）
const MIN_RING_POSITIONS: usize = 4;

fn to_position(p: &Point2) -> Position {
    [p.x, p.y]
}

fn to_point(context: &str, position: &Position) -> Result<Point2, FileError> {
    let [x, y] = *position;
    if !(x.is_finite() && y.is_finite()) {
        return Err(FileError::malformed(context, "coordinate is not a finite number"));
    }
    Ok(Point2::new(x, y))
}

fn to_ring(points: &[Point2]) -> Ring {
    close_ring(points).iter().map(to_position).collect()
}

// ========== 导出 ==========

/// 导出为闭合环载荷
pub fn export(store: &GeometryStore, id: Uuid) -> FacilityGeometryPayload {
    let info = store.info();

    let boundary = store
        .boundary()
        .map(|b| Shape::polygon(to_ring(b.points())));

    let obstructions: Vec<ShapeRecord> = store
        .obstructions()
        .map(|(_, obstruction)| export_obstruction(obstruction))
        .collect();

    let zones = store
        .zones()
        .map(|(_, zone)| ZoneRecord {
            name: zone.name.clone(),
            purpose: zone.purpose,
            boundary: Shape::polygon(to_ring(zone.points())),
        })
        .collect();

    let measurements = store
        .measurements()
        .map(|(_, m)| match m {
            Measurement::Distance {
                start,
                end,
                value,
                unit,
            } => MeasurementRecord::Distance {
                coordinates: [to_position(start), to_position(end)],
                value: *value,
                unit: *unit,
            },
            Measurement::Area {
                points,
                value,
                unit,
            } => MeasurementRecord::Area {
                boundary: Shape::polygon(to_ring(points)),
                value: *value,
                unit: *unit,
            },
        })
        .collect();

    let payload = FacilityGeometryPayload {
        id,
        name: info.name.clone(),
        description: info.description.clone(),
        clear_height: info.clear_height,
        units: info.unit,
        boundary,
        obstructions,
        metadata: PayloadMetadata {
            zones,
            measurements,
        },
    };

    tracing::info!(
        "Exported facility {}: {} obstructions, {} zones, {} measurements",
        id,
        payload.obstructions.len(),
        payload.metadata.zones.len(),
        payload.metadata.measurements.len()
    );

    payload
}

fn export_obstruction(obstruction: &Obstruction) -> ShapeRecord {
    match obstruction {
        Obstruction::Column(c) => ShapeRecord {
            kind: ObstructionKind::Column,
            shape: Shape::polygon(c.footprint().iter().map(to_position).collect()),
            height: c.height,
            properties: ShapeProperties {
                size: Some(c.size),
                ..Default::default()
            },
        },
        Obstruction::Wall(w) => ShapeRecord {
            kind: ObstructionKind::Wall,
            shape: Shape::LineString {
                coordinates: w.points.iter().map(to_position).collect(),
            },
            height: w.height,
            properties: ShapeProperties {
                width: Some(w.width),
                ..Default::default()
            },
        },
        Obstruction::Dock(d) => ShapeRecord {
            kind: ObstructionKind::Dock,
            shape: Shape::polygon(d.footprint().iter().map(to_position).collect()),
            height: d.height,
            properties: ShapeProperties {
                width: Some(d.width),
                depth: Some(d.depth),
                ..Default::default()
            },
        },
    }
}

// ========== 导入 ==========

/// 从闭合环载荷重建存储
pub fn import(payload: &FacilityGeometryPayload) -> Result<GeometryStore, FileError> {
    let mut store = GeometryStore::with_info(FacilityInfo {
        name: payload.name.clone(),
        description: payload.description.clone(),
        clear_height: payload.clear_height,
        unit: payload.units,
    });

    if let Some(shape) = &payload.boundary {
        let points = polygon_points("boundary", shape)?;
        let boundary =
            Boundary::from_points(&points).map_err(|e| FileError::geometry("boundary", e))?;
        store.set_boundary(boundary);
    }

    for (index, record) in payload.obstructions.iter().enumerate() {
        let context = format!("obstruction {} ({})", index, record.kind.name());
        let obstruction = import_obstruction(&context, record)?;
        store
            .add_obstruction(obstruction)
            .map_err(|e| FileError::geometry(context.as_str(), e))?;
    }

    for (index, record) in payload.metadata.zones.iter().enumerate() {
        let context = format!("zone {} ('{}')", index, record.name);
        let points = polygon_points(&context, &record.boundary)?;
        let zone = Zone::new(record.name.clone(), record.purpose, &points)
            .map_err(|e| FileError::geometry(context.as_str(), e))?;
        store.add_zone(zone);
    }

    for (index, record) in payload.metadata.measurements.iter().enumerate() {
        let context = format!("measurement {}", index);
        let measurement = match record {
            MeasurementRecord::Distance {
                coordinates, unit, ..
            } => Measurement::distance(
                to_point(&context, &coordinates[0])?,
                to_point(&context, &coordinates[1])?,
                *unit,
            ),
            MeasurementRecord::Area { boundary, unit, .. } => {
                let points = polygon_points(&context, boundary)?;
                Measurement::area(&points, *unit)
                    .map_err(|e| FileError::geometry(context.as_str(), e))?
            }
        };
        store.add_measurement(measurement);
    }

    tracing::info!(
        "Imported facility {}: {} entities, total area {:.1}",
        payload.id,
        store.entity_count(),
        store.total_area()
    );

    Ok(store)
}

fn import_obstruction(context: &str, record: &ShapeRecord) -> Result<Obstruction, FileError> {
    let obstruction = match record.kind {
        ObstructionKind::Column => {
            let bbox = BoundingBox2::from_points(polygon_points(context, &record.shape)?);
            Obstruction::Column(Column {
                center: bbox.center(),
                size: bbox.width().max(bbox.height()),
                height: record.height,
            })
        }
        ObstructionKind::Dock => {
            let bbox = BoundingBox2::from_points(polygon_points(context, &record.shape)?);
            Obstruction::Dock(Dock {
                center: bbox.center(),
                width: bbox.width(),
                depth: bbox.height(),
                height: record.height,
            })
        }
        ObstructionKind::Wall => match &record.shape {
            Shape::LineString { coordinates } => {
                if coordinates.len() < 2 {
                    return Err(FileError::malformed(
                        context,
                        format!("line needs at least 2 positions, got {}", coordinates.len()),
                    ));
                }
                let width = record.properties.width.ok_or_else(|| {
                    FileError::malformed(context, "wall record has no width property")
                })?;
                let points = coordinates
                    .iter()
                    .map(|p| to_point(context, p))
                    .collect::<Result<Vec<_>, _>>()?;
                Obstruction::Wall(Wall {
                    points,
                    width,
                    height: record.height,
                })
            }
            Shape::Polygon { .. } => {
                let (points, width) = wall_from_outline(context, &record.shape)?;
                Obstruction::Wall(Wall {
                    points,
                    width,
                    height: record.height,
                })
            }
        },
    };
    Ok(obstruction)
}

/// 矩形墙体轮廓 -> (沿长边方向的中心线, 宽度)
fn wall_from_outline(context: &str, shape: &Shape) -> Result<(Vec<Point2>, f64), FileError> {
    let corners = polygon_points(context, shape)?;
    if corners.len() != 4 {
        return Err(FileError::malformed(
            context,
            format!("wall outline must have 4 corners, got {}", corners.len()),
        ));
    }
    let [p0, p1, p2, p3] = [corners[0], corners[1], corners[2], corners[3]];
    let mid = |a: Point2, b: Point2| Point2::from((a.coords + b.coords) / 2.0);

    let first_edge = distance(&p0, &p1);
    let second_edge = distance(&p1, &p2);
    if first_edge >= second_edge {
        Ok((vec![mid(p3, p0), mid(p1, p2)], second_edge))
    } else {
        Ok((vec![mid(p0, p1), mid(p2, p3)], first_edge))
    }
}

/// 读取多边形外环，校验闭合与最少坐标数，返回去掉闭合点的顶点
fn polygon_points(context: &str, shape: &Shape) -> Result<Vec<Point2>, FileError> {
    let ring = match shape {
        Shape::Polygon { coordinates } => coordinates
            .first()
            .ok_or_else(|| FileError::malformed(context, "polygon has no rings"))?,
        other => {
            return Err(FileError::malformed(
                context,
                format!("expected a Polygon, got a {}", other.type_name()),
            ))
        }
    };

    if ring.len() < MIN_RING_POSITIONS {
        return Err(FileError::malformed(
            context,
            format!(
                "ring needs at least {} positions, got {}",
                MIN_RING_POSITIONS,
                ring.len()
            ),
        ));
    }

    let points = ring
        .iter()
        .map(|p| to_point(context, p))
        .collect::<Result<Vec<_>, _>>()?;

    if !points_coincide(&points[0], &points[points.len() - 1]) {
        return Err(FileError::malformed(context, "ring is not closed"));
    }

    Ok(open_ring(&points))
}
