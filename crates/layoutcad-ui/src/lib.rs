//! LayoutCAD 交互层
//!
//! 把指针/键盘输入解释为绘图操作。核心是 [`DrawingModeMachine`]，
//! 宿主通常只与 [`Editor`] 打交道。

pub mod action;
pub mod config;
pub mod error;
pub mod machine;
pub mod session;
pub mod state;

pub use action::{DrawingMode, EditorEvent, Effect, SelectionPatch};
pub use config::{EditorConfig, ObstructionDefaults};
pub use error::EditorError;
pub use machine::DrawingModeMachine;
pub use session::DrawingSession;
pub use state::{
    Editor, EditorSnapshot, EditorState, Key, Modifiers, PointerButton, PointerEvent,
};
