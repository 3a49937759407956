//! 文件与载荷错误定义

use layoutcad_core::error::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Malformed geometry in {context}: {reason}")]
    MalformedGeometry { context: String, reason: String },

    #[error("Invalid geometry in {context}: {source}")]
    Geometry {
        context: String,
        #[source]
        source: GeometryError,
    },
}

impl FileError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        FileError::MalformedGeometry {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn geometry(context: impl Into<String>, source: GeometryError) -> Self {
        FileError::Geometry {
            context: context.into(),
            source,
        }
    }
}
