//! 编辑器状态与控制器
//!
//! [`Editor`] 持有唯一的 [`EditorState`]（视图 + 绘图会话 + 几何存储），
//! 把宿主传来的指针/键盘事件换算成状态机事件。渲染端通过
//! [`Editor::snapshot`] 读取只读快照，不直接修改内部状态。

use crate::action::{DrawingMode, EditorEvent, Effect, SelectionPatch};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::machine::DrawingModeMachine;
use crate::session::DrawingSession;
use layoutcad_core::entity::EntityRef;
use layoutcad_core::error::GeometryResult;
use layoutcad_core::geometry::{FacilityInfo, ZonePurpose};
use layoutcad_core::math::{Point2, Vector2};
use layoutcad_core::snap::SnapConfig;
use layoutcad_core::store::GeometryStore;
use layoutcad_core::view::{ViewState, ZoomDirection};
use layoutcad_file::payload::FacilityGeometryPayload;
use layoutcad_file::{export, import, native, FileError, Uuid};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 鼠标按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// 修饰键
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// 按住 Shift 时不做网格捕捉
    pub shift: bool,
}

/// 指针事件（屏幕坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        button: PointerButton,
        position: Point2,
        modifiers: Modifiers,
    },
    Move {
        position: Point2,
    },
    Up {
        button: PointerButton,
        position: Point2,
    },
    /// 正值放大，负值缩小
    Wheel {
        position: Point2,
        delta: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Escape,
    Backspace,
    Delete,
    Enter,
    /// 模式快捷键，见 [`DrawingMode::shortcut`]
    Shortcut(char),
}

/// 编辑器状态
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub view: ViewState,
    pub session: DrawingSession,
    pub store: GeometryStore,
}

/// 供渲染使用的只读快照
#[derive(Debug, Clone, Copy)]
pub struct EditorSnapshot<'a> {
    pub store: &'a GeometryStore,
    pub view: &'a ViewState,
    pub session: &'a DrawingSession,
    pub snap: &'a SnapConfig,
    /// 光标所在的世界坐标
    pub cursor: Option<Point2>,
}

/// 编辑器控制器
pub struct Editor {
    state: EditorState,
    config: EditorConfig,
    facility_id: Uuid,
    /// 中键拖拽的上一个屏幕位置
    drag_anchor: Option<Point2>,
    cursor_world: Option<Point2>,
    /// 最近一次被拒绝操作的提示
    status_message: Option<String>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let info = FacilityInfo {
            unit: config.unit,
            ..Default::default()
        };
        Self {
            state: EditorState {
                view: ViewState::new(config.view.scale, config.view.offset),
                session: DrawingSession::new(),
                store: GeometryStore::with_info(info),
            },
            config,
            facility_id: Uuid::new_v4(),
            drag_anchor: None,
            cursor_world: None,
            status_message: None,
        }
    }

    /// 从已有载荷创建编辑器
    pub fn from_payload(
        config: EditorConfig,
        payload: &FacilityGeometryPayload,
    ) -> Result<Self, FileError> {
        let mut editor = Self::new(config);
        editor.load(payload)?;
        Ok(editor)
    }

    /// 把一个事件交给状态机
    ///
    /// 校验失败时返回错误并记录提示，状态保持不变。
    pub fn dispatch(&mut self, event: EditorEvent) -> GeometryResult<Vec<Effect>> {
        let machine = DrawingModeMachine::new(&self.config, self.state.view.scale);
        let result = machine.transition(&mut self.state.session, &mut self.state.store, event);
        self.status_message = result.as_ref().err().map(ToString::to_string);
        result
    }

    // ========== 输入映射 ==========

    pub fn handle_pointer(&mut self, event: PointerEvent) -> GeometryResult<Vec<Effect>> {
        match event {
            PointerEvent::Down {
                button: PointerButton::Primary,
                position,
                modifiers,
            } => {
                let world = self.state.view.to_world(position);
                let point = if modifiers.shift {
                    world
                } else {
                    self.config.snap.apply(world)
                };
                self.dispatch(EditorEvent::Click(point))
            }
            PointerEvent::Down {
                button: PointerButton::Secondary,
                ..
            } => self.dispatch(EditorEvent::Finish),
            PointerEvent::Down {
                button: PointerButton::Middle,
                position,
                ..
            } => {
                self.drag_anchor = Some(position);
                self.state.view.dragging = true;
                Ok(Vec::new())
            }
            PointerEvent::Move { position } => {
                if let Some(anchor) = self.drag_anchor {
                    self.pan_by(position - anchor);
                    self.drag_anchor = Some(position);
                }
                self.cursor_world = Some(self.state.view.to_world(position));
                Ok(Vec::new())
            }
            PointerEvent::Up {
                button: PointerButton::Middle,
                ..
            } => {
                self.drag_anchor = None;
                self.state.view.dragging = false;
                Ok(Vec::new())
            }
            PointerEvent::Up { .. } => Ok(Vec::new()),
            PointerEvent::Wheel { position, delta } => {
                if delta > 0.0 {
                    self.zoom_at(position, ZoomDirection::In);
                } else if delta < 0.0 {
                    self.zoom_at(position, ZoomDirection::Out);
                }
                Ok(Vec::new())
            }
        }
    }

    pub fn handle_key(&mut self, key: Key) -> GeometryResult<Vec<Effect>> {
        let event = match key {
            Key::Escape => EditorEvent::Cancel,
            Key::Backspace => EditorEvent::UndoPoint,
            Key::Delete => EditorEvent::DeleteSelected,
            Key::Enter => EditorEvent::Finish,
            Key::Shortcut(c) => match DrawingMode::from_shortcut(c) {
                Some(mode) => EditorEvent::SetMode(mode),
                None => return Ok(Vec::new()),
            },
        };
        self.dispatch(event)
    }

    // ========== 命令 ==========

    pub fn set_mode(&mut self, mode: DrawingMode) -> Vec<Effect> {
        // 切换模式不会失败
        self.dispatch(EditorEvent::SetMode(mode)).unwrap_or_default()
    }

    /// 以世界坐标点击，不做捕捉
    pub fn click(&mut self, point: Point2) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::Click(point))
    }

    pub fn finalize_boundary(&mut self) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::FinalizeBoundary)
    }

    pub fn add_zone(
        &mut self,
        name: impl Into<String>,
        purpose: ZonePurpose,
    ) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::AddZone {
            name: name.into(),
            purpose,
        })
    }

    pub fn finish(&mut self) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::Finish)
    }

    pub fn cancel(&mut self) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::Cancel)
    }

    pub fn undo_point(&mut self) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::UndoPoint)
    }

    pub fn delete_selected(&mut self) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::DeleteSelected)
    }

    pub fn update_selected(&mut self, patch: SelectionPatch) -> GeometryResult<Vec<Effect>> {
        self.dispatch(EditorEvent::UpdateSelected(patch))
    }

    // ========== 视图 ==========

    pub fn zoom_at(&mut self, screen: Point2, direction: ZoomDirection) {
        self.state.view = self.state.view.zoom_at(screen, direction);
    }

    pub fn pan_by(&mut self, delta: Vector2) {
        self.state.view.pan_by(delta);
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.config.snap.enabled = enabled;
    }

    // ========== 持久化 ==========

    pub fn set_facility_info(&mut self, info: FacilityInfo) {
        self.state.store.set_info(info);
    }

    /// 导出当前几何
    ///
    /// 处于边界模式且有未提交的点时先闭合边界，闭合失败则不导出。
    pub fn save(&mut self) -> GeometryResult<FacilityGeometryPayload> {
        if self.mode() == DrawingMode::Boundary && self.point_count() > 0 {
            self.finalize_boundary()?;
        }
        Ok(export(&self.state.store, self.facility_id))
    }

    /// 用载荷替换当前几何；失败时保持原状
    pub fn load(&mut self, payload: &FacilityGeometryPayload) -> Result<(), FileError> {
        let store = import(payload)?;
        self.state.store = store;
        self.state.session = DrawingSession::new();
        self.facility_id = payload.id;
        self.status_message = None;
        Ok(())
    }

    pub fn save_to_file(&mut self, path: &Path) -> Result<(), EditorError> {
        let payload = self.save()?;
        native::save(&payload, path)?;
        Ok(())
    }

    pub fn open_file(&mut self, path: &Path) -> Result<(), EditorError> {
        let payload = native::load(path)?;
        self.load(&payload)?;
        Ok(())
    }

    // ========== 查询 ==========

    pub fn mode(&self) -> DrawingMode {
        self.state.session.mode()
    }

    pub fn selection(&self) -> Option<EntityRef> {
        self.state.session.selection()
    }

    pub fn point_count(&self) -> usize {
        self.state.session.point_count()
    }

    pub fn store(&self) -> &GeometryStore {
        &self.state.store
    }

    pub fn view(&self) -> &ViewState {
        &self.state.view
    }

    pub fn session(&self) -> &DrawingSession {
        &self.state.session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn facility_id(&self) -> Uuid {
        self.facility_id
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn snapshot(&self) -> EditorSnapshot<'_> {
        EditorSnapshot {
            store: &self.state.store,
            view: &self.state.view,
            session: &self.state.session,
            snap: &self.config.snap,
            cursor: self.cursor_world,
        }
    }

    /// 当前模式的操作提示
    pub fn prompt(&self) -> String {
        let n = self.point_count();
        match self.mode() {
            DrawingMode::Select => "Click an object to select it".to_string(),
            DrawingMode::Column => "Click to place a column".to_string(),
            DrawingMode::Dock => "Click to place a dock door".to_string(),
            DrawingMode::Wall if n == 0 => "Click the wall start point".to_string(),
            DrawingMode::Wall => "Click the wall end point".to_string(),
            DrawingMode::MeasureDistance if n == 0 => "Click the first point".to_string(),
            DrawingMode::MeasureDistance => "Click the second point".to_string(),
            DrawingMode::Boundary | DrawingMode::Zone | DrawingMode::MeasureArea if n == 0 => {
                "Click to place the first corner".to_string()
            }
            DrawingMode::Boundary | DrawingMode::Zone | DrawingMode::MeasureArea if n < 3 => {
                format!("{} points, at least 3 needed", n)
            }
            DrawingMode::Boundary => format!("{} points, press Enter to close the boundary", n),
            DrawingMode::Zone => format!("{} points, press Enter to add the zone", n),
            DrawingMode::MeasureArea => format!("{} points, click near start to close", n),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
