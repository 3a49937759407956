//! 网格捕捉
//!
//! 启用时将世界坐标的每个分量独立地取整到最近的网格间距倍数。

use crate::math::Point2;
use serde::{Deserialize, Serialize};

/// 捕捉配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 是否启用网格捕捉
    pub enabled: bool,
    /// 网格间距（世界坐标）
    pub grid_size: f64,
    /// 拾取/闭合容差（屏幕像素）
    pub tolerance_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_size: 1.0,
            tolerance_px: 10.0, // 10像素
        }
    }
}

impl SnapConfig {
    /// 捕捉点；未启用时原样返回
    pub fn apply(&self, point: Point2) -> Point2 {
        if self.enabled {
            snap_to_grid(point, self.grid_size)
        } else {
            point
        }
    }
}

/// 将点取整到网格；非正的网格间距视为不捕捉
pub fn snap_to_grid(point: Point2, grid_size: f64) -> Point2 {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return point;
    }
    Point2::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}
