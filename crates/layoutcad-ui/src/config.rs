//! 编辑器配置

use crate::error::EditorError;
use layoutcad_core::geometry::{Column, Dock, LengthUnit, Obstruction, Wall};
use layoutcad_core::math::Point2;
use layoutcad_core::snap::SnapConfig;
use layoutcad_core::view::ViewState;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 点击放置障碍物时使用的默认尺寸
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstructionDefaults {
    pub column_size: f64,
    pub column_height: f64,
    pub wall_width: f64,
    pub wall_height: f64,
    pub dock_width: f64,
    pub dock_depth: f64,
    pub dock_height: f64,
}

impl Default for ObstructionDefaults {
    fn default() -> Self {
        Self {
            column_size: 2.0,
            column_height: 32.0,
            wall_width: 1.0,
            wall_height: 32.0,
            dock_width: 10.0,
            dock_depth: 4.0,
            dock_height: 14.0,
        }
    }
}

impl ObstructionDefaults {
    pub fn column_at(&self, center: Point2) -> Obstruction {
        Obstruction::Column(Column {
            center,
            size: self.column_size,
            height: self.column_height,
        })
    }

    pub fn dock_at(&self, center: Point2) -> Obstruction {
        Obstruction::Dock(Dock {
            center,
            width: self.dock_width,
            depth: self.dock_depth,
            height: self.dock_height,
        })
    }

    pub fn wall_between(&self, start: Point2, end: Point2) -> Obstruction {
        Obstruction::Wall(Wall {
            points: vec![start, end],
            width: self.wall_width,
            height: self.wall_height,
        })
    }
}

/// 编辑器配置，缺省字段使用默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub obstructions: ObstructionDefaults,
    /// 测量值使用的单位
    pub unit: LengthUnit,
    /// 初始视图，载入时缩放限制到 [MIN_SCALE, MAX_SCALE]
    pub view: ViewState,
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(text)?;
        if !config.view.is_valid() {
            tracing::warn!("Initial view scale {} is out of range, clamping", config.view.scale);
            config.view = ViewState::new(config.view.scale, config.view.offset);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }
}
