//! 绘图模式、编辑事件与副作用
//!
//! 所有交互都归结为一个 [`EditorEvent`]，由状态机消费并产生一组 [`Effect`]。

use layoutcad_core::entity::EntityRef;
use layoutcad_core::geometry::ZonePurpose;
use layoutcad_core::math::Point2;
use layoutcad_core::store::{ObstructionPatch, ZonePatch};
use serde::{Deserialize, Serialize};

/// 绘图模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    #[default]
    Select,
    Boundary,
    Column,
    Wall,
    Dock,
    Zone,
    MeasureDistance,
    MeasureArea,
}

impl DrawingMode {
    pub const ALL: [DrawingMode; 8] = [
        DrawingMode::Select,
        DrawingMode::Boundary,
        DrawingMode::Column,
        DrawingMode::Wall,
        DrawingMode::Dock,
        DrawingMode::Zone,
        DrawingMode::MeasureDistance,
        DrawingMode::MeasureArea,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DrawingMode::Select => "Select",
            DrawingMode::Boundary => "Boundary",
            DrawingMode::Column => "Column",
            DrawingMode::Wall => "Wall",
            DrawingMode::Dock => "Dock",
            DrawingMode::Zone => "Zone",
            DrawingMode::MeasureDistance => "Measure Distance",
            DrawingMode::MeasureArea => "Measure Area",
        }
    }

    /// 获取快捷键
    pub fn shortcut(&self) -> char {
        match self {
            DrawingMode::Select => 'V',
            DrawingMode::Boundary => 'B',
            DrawingMode::Column => 'C',
            DrawingMode::Wall => 'W',
            DrawingMode::Dock => 'D',
            DrawingMode::Zone => 'Z',
            DrawingMode::MeasureDistance => 'M',
            DrawingMode::MeasureArea => 'A',
        }
    }

    /// 按快捷键查找模式，不区分大小写
    pub fn from_shortcut(key: char) -> Option<DrawingMode> {
        let key = key.to_ascii_uppercase();
        Self::ALL.into_iter().find(|mode| mode.shortcut() == key)
    }
}

/// 针对当前选中对象的更新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPatch {
    Obstruction(ObstructionPatch),
    Zone(ZonePatch),
}

impl SelectionPatch {
    pub fn target_name(&self) -> &'static str {
        match self {
            SelectionPatch::Obstruction(_) => "obstruction",
            SelectionPatch::Zone(_) => "zone",
        }
    }
}

/// 编辑事件（点击坐标已是世界坐标，并已按需捕捉）
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// 切换模式，总会清空累积点
    SetMode(DrawingMode),
    Click(Point2),
    /// 闭合并提交边界
    FinalizeBoundary,
    /// 用累积点提交区域
    AddZone { name: String, purpose: ZonePurpose },
    /// 完成当前模式下进行中的累积
    Finish,
    /// 放弃累积点
    Cancel,
    /// 撤销最后一个累积点
    UndoPoint,
    DeleteSelected,
    UpdateSelected(SelectionPatch),
}

impl EditorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::SetMode(_) => "set mode",
            EditorEvent::Click(_) => "click",
            EditorEvent::FinalizeBoundary => "finalize boundary",
            EditorEvent::AddZone { .. } => "add zone",
            EditorEvent::Finish => "finish",
            EditorEvent::Cancel => "cancel",
            EditorEvent::UndoPoint => "undo point",
            EditorEvent::DeleteSelected => "delete selected",
            EditorEvent::UpdateSelected(_) => "update selected",
        }
    }
}

/// 状态转换产生的副作用，供宿主刷新界面
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// 新实体已写入存储
    Committed(EntityRef),
    Updated(EntityRef),
    Removed(EntityRef),
    SelectionChanged(Option<EntityRef>),
    ModeChanged(DrawingMode),
    /// 累积点数量变化
    PointsChanged(usize),
}
