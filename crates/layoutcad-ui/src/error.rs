//! 编辑器错误

use layoutcad_core::error::GeometryError;
use layoutcad_file::FileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// 校验失败，消息可直接展示给用户
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
