//! 视图变换
//!
//! 屏幕坐标与世界坐标之间的映射：`screen = world * scale + offset`。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 最小缩放
pub const MIN_SCALE: f64 = 0.1;
/// 最大缩放
pub const MAX_SCALE: f64 = 5.0;
/// 每次滚轮缩放的倍率
pub const ZOOM_STEP: f64 = 1.1;

/// 缩放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

/// 视图状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// 缩放系数，限制在 [MIN_SCALE, MAX_SCALE]
    pub scale: f64,
    /// 平移量（屏幕像素）
    pub offset: Vector2,
    /// 是否正在拖拽平移
    #[serde(skip)]
    pub dragging: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vector2::zeros(),
            dragging: false,
        }
    }
}

/// 屏幕像素容差换算为世界坐标容差，缩放不低于 `MIN_SCALE`
pub fn world_tolerance(tolerance_px: f64, scale: f64) -> f64 {
    tolerance_px / scale.max(MIN_SCALE)
}

impl ViewState {
    /// 非有限的缩放回到 1，非有限的平移回到原点，缩放再限制到 [MIN_SCALE, MAX_SCALE]
    pub fn new(scale: f64, offset: Vector2) -> Self {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        let offset = if offset.iter().all(|v| v.is_finite()) {
            offset
        } else {
            Vector2::zeros()
        };
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            offset,
            dragging: false,
        }
    }

    /// 缩放和平移均为有限值且缩放在范围内
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && (MIN_SCALE..=MAX_SCALE).contains(&self.scale)
            && self.offset.iter().all(|v| v.is_finite())
    }

    /// 屏幕坐标 -> 世界坐标
    pub fn to_world(&self, screen: Point2) -> Point2 {
        Point2::from((screen.coords - self.offset) / self.scale)
    }

    /// 世界坐标 -> 屏幕坐标
    pub fn to_screen(&self, world: Point2) -> Point2 {
        Point2::from(world.coords * self.scale + self.offset)
    }

    /// 以光标为中心缩放
    ///
    /// 缩放前位于 `screen` 下方的世界点，缩放后仍位于 `screen` 下方。
    pub fn zoom_at(&self, screen: Point2, direction: ZoomDirection) -> ViewState {
        let anchor = self.to_world(screen);
        let scale = match direction {
            ZoomDirection::In => self.scale * ZOOM_STEP,
            ZoomDirection::Out => self.scale / ZOOM_STEP,
        }
        .clamp(MIN_SCALE, MAX_SCALE);

        ViewState {
            scale,
            offset: screen.coords - anchor.coords * scale,
            dragging: self.dragging,
        }
    }

    /// 按屏幕像素平移，不改变缩放
    pub fn pan_by(&mut self, delta: Vector2) {
        self.offset += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    #[test]
    fn test_round_trip() {
        let view = ViewState::new(2.0, Vector2::new(30.0, -10.0));
        let world = Point2::new(12.5, 7.0);
        let screen = view.to_screen(world);
        assert_eq!(screen, Point2::new(55.0, 4.0));
        let back = view.to_world(screen);
        assert!((back - world).norm() < EPSILON);
    }

    #[test]
    fn test_zoom_keeps_cursor_anchor() {
        let mut view = ViewState::new(1.3, Vector2::new(-40.0, 25.0));
        let cursors = [
            Point2::new(0.0, 0.0),
            Point2::new(400.0, 300.0),
            Point2::new(-12.0, 977.5),
        ];
        for cursor in cursors {
            for direction in [ZoomDirection::In, ZoomDirection::Out, ZoomDirection::In] {
                let before = view.to_world(cursor);
                view = view.zoom_at(cursor, direction);
                let after = view.to_world(cursor);
                assert!((before - after).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        for _ in 0..100 {
            view = view.zoom_at(Point2::new(50.0, 50.0), ZoomDirection::In);
        }
        assert!((view.scale - MAX_SCALE).abs() < EPSILON);
        let before = view.to_world(Point2::new(50.0, 50.0));
        view = view.zoom_at(Point2::new(50.0, 50.0), ZoomDirection::In);
        assert!((view.to_world(Point2::new(50.0, 50.0)) - before).norm() < 1e-9);

        for _ in 0..100 {
            view = view.zoom_at(Point2::new(50.0, 50.0), ZoomDirection::Out);
        }
        assert!((view.scale - MIN_SCALE).abs() < EPSILON);
    }

    #[test]
    fn test_zoom_step() {
        let view = ViewState::default().zoom_at(Point2::origin(), ZoomDirection::In);
        assert!((view.scale - 1.1).abs() < EPSILON);
        let view = view.zoom_at(Point2::origin(), ZoomDirection::Out);
        assert!((view.scale - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_pan() {
        let mut view = ViewState::new(2.0, Vector2::zeros());
        view.pan_by(Vector2::new(10.0, 4.0));
        assert_eq!(view.scale, 2.0);
        assert_eq!(view.to_world(Point2::new(10.0, 4.0)), Point2::origin());
    }

    #[test]
    fn test_world_tolerance_scales_with_zoom() {
        assert!((world_tolerance(10.0, 2.0) - 5.0).abs() < EPSILON);
        assert!((world_tolerance(10.0, 0.0) - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_new_sanitizes_scale_and_offset() {
        let view = ViewState::new(0.0, Vector2::new(5.0, 5.0));
        assert_eq!(view.scale, MIN_SCALE);
        assert!(view.is_valid());
        assert!(view.to_world(Point2::new(15.0, 5.0)).x.is_finite());

        assert_eq!(ViewState::new(40.0, Vector2::zeros()).scale, MAX_SCALE);

        let view = ViewState::new(f64::NAN, Vector2::new(f64::INFINITY, 3.0));
        assert_eq!(view.scale, 1.0);
        assert_eq!(view.offset, Vector2::zeros());

        let raw = ViewState {
            scale: 0.0,
            offset: Vector2::zeros(),
            dragging: false,
        };
        assert!(!raw.is_valid());
    }
}
