//! 绘图会话
//!
//! 当前模式、尚未提交的累积点以及当前选中对象。累积点在切换模式、
//! 取消或成功提交时清空。

use crate::action::DrawingMode;
use layoutcad_core::entity::EntityRef;
use layoutcad_core::math::Point2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingSession {
    mode: DrawingMode,
    points: Vec<Point2>,
    selection: Option<EntityRef>,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn first_point(&self) -> Option<Point2> {
        self.points.first().copied()
    }

    pub fn selection(&self) -> Option<EntityRef> {
        self.selection
    }

    /// 切换模式并清空累积点
    pub(crate) fn set_mode(&mut self, mode: DrawingMode) {
        self.mode = mode;
        self.points.clear();
    }

    pub(crate) fn push_point(&mut self, point: Point2) -> usize {
        self.points.push(point);
        self.points.len()
    }

    /// 移除最后一个点，空缓冲时什么也不做
    pub(crate) fn pop_point(&mut self) -> Option<Point2> {
        self.points.pop()
    }

    /// 清空累积点，返回清空前是否有点
    pub(crate) fn clear_points(&mut self) -> bool {
        let had_points = !self.points.is_empty();
        self.points.clear();
        had_points
    }

    pub(crate) fn select(&mut self, selection: Option<EntityRef>) {
        self.selection = selection;
    }
}
