//! 载荷文件读写
//!
//! - `.json`：与后端一致的文本形式
//! - `.lcad`：MessagePack + Zstd 的紧凑二进制形式，带16字节文件头

use crate::error::FileError;
use crate::payload::FacilityGeometryPayload;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 文件魔数 "LCAD"
const MAGIC: &[u8; 4] = b"LCAD";

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

/// Zstd 压缩级别
const COMPRESSION_LEVEL: i32 = 3;

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Compact,
}

impl PayloadFormat {
    /// 按扩展名判断，未知扩展名按 JSON 处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("lcad") => PayloadFormat::Compact,
            _ => PayloadFormat::Json,
        }
    }
}

/// 文件头（16 字节）
#[derive(Debug)]
struct FileHeader {
    version: u32,
    /// 标志位（预留）
    flags: u32,
    compressed_size: u32,
}

impl FileHeader {
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(MAGIC)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        Ok(())
    }

    fn read(reader: &mut impl Read) -> Result<Self, FileError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(FileError::InvalidFormat(
                "Invalid magic number, not a LayoutCAD file".to_string(),
            ));
        }

        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let version = u32::from_le_bytes(buf);
        reader.read_exact(&mut buf)?;
        let flags = u32::from_le_bytes(buf);
        reader.read_exact(&mut buf)?;
        let compressed_size = u32::from_le_bytes(buf);

        Ok(Self {
            version,
            flags,
            compressed_size,
        })
    }
}

/// 保存载荷，格式由扩展名决定
pub fn save(payload: &FacilityGeometryPayload, path: &Path) -> Result<(), FileError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match PayloadFormat::from_path(path) {
        PayloadFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, payload)?;
        }
        PayloadFormat::Compact => {
            let msgpack_data = rmp_serde::to_vec_named(payload)?;
            let compressed = zstd::encode_all(msgpack_data.as_slice(), COMPRESSION_LEVEL)?;
            let compressed_size = u32::try_from(compressed.len()).map_err(|_| {
                FileError::InvalidFormat("payload too large for the compact format".to_string())
            })?;
            FileHeader {
                version: FORMAT_VERSION,
                flags: 0,
                compressed_size,
            }
            .write(&mut writer)?;
            writer.write_all(&compressed)?;
        }
    }
    writer.flush()?;

    tracing::info!(
        "Saved facility {} ({} obstructions, {} zones) to {}",
        payload.id,
        payload.obstructions.len(),
        payload.metadata.zones.len(),
        path.display()
    );
    Ok(())
}

/// 读取载荷，格式由扩展名决定
pub fn load(path: &Path) -> Result<FacilityGeometryPayload, FileError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let payload: FacilityGeometryPayload = match PayloadFormat::from_path(path) {
        PayloadFormat::Json => serde_json::from_reader(reader)?,
        PayloadFormat::Compact => {
            let header = FileHeader::read(&mut reader)?;
            if header.version > FORMAT_VERSION {
                return Err(FileError::UnsupportedVersion(format!(
                    "File version {} is newer than supported version {}",
                    header.version, FORMAT_VERSION
                )));
            }
            if header.flags != 0 {
                tracing::warn!("Ignoring unknown header flags {:#x}", header.flags);
            }
            let mut compressed = vec![0u8; header.compressed_size as usize];
            reader.read_exact(&mut compressed)?;
            let msgpack_data = zstd::decode_all(compressed.as_slice())?;
            rmp_serde::from_slice(&msgpack_data)?
        }
    };

    tracing::info!("Loaded facility {} from {}", payload.id, path.display());
    Ok(payload)
}
