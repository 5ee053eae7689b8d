//! Fixed 32-byte file header.
//!
//! ```text
//! 0..4    magic "GGMX"
//! 4       version
//! 5       storage variant (0 raw, 1 lc1, 2 lc2)
//! 6       element kind (0 int, 1 float, 2 double)
//! 7       reserved
//! 8..12   levels   (u32 LE)
//! 12..16  lines    (u32 LE)
//! 16..20  columns  (u32 LE)
//! 20..28  offset of the line index, 0 for raw storage (u64 LE)
//! 28..32  reserved
//! ```

use super::{ElementKind, MatrixInfo, StorageVariant};
use crate::error::MatrixError;

/// Decoded file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixHeader {
    pub info: MatrixInfo,
    pub index_offset: u64,
}

impl MatrixHeader {
    pub const MAGIC: [u8; 4] = *b"GGMX";
    pub const VERSION: u8 = 1;
    pub const SIZE: usize = 32;

    pub fn new(info: MatrixInfo) -> Self {
        Self {
            info,
            index_offset: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&Self::MAGIC);
        out[4] = Self::VERSION;
        out[5] = self.info.variant.to_byte();
        out[6] = self.info.kind.to_byte();
        out[8..12].copy_from_slice(&self.info.levels.to_le_bytes());
        out[12..16].copy_from_slice(&self.info.lines.to_le_bytes());
        out[16..20].copy_from_slice(&self.info.columns.to_le_bytes());
        out[20..28].copy_from_slice(&self.index_offset.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MatrixError> {
        if bytes.len() < Self::SIZE {
            return Err(MatrixError::Format(format!(
                "file too short for header ({} bytes)",
                bytes.len()
            )));
        }
        if bytes[0..4] != Self::MAGIC {
            return Err(MatrixError::Format("bad magic bytes".to_string()));
        }
        if bytes[4] != Self::VERSION {
            return Err(MatrixError::Format(format!(
                "unsupported version {}",
                bytes[4]
            )));
        }
        let variant = StorageVariant::from_byte(bytes[5]).ok_or_else(|| {
            MatrixError::Format(format!("unknown storage variant {}", bytes[5]))
        })?;
        let kind = ElementKind::from_byte(bytes[6])
            .ok_or_else(|| MatrixError::Format(format!("unknown element kind {}", bytes[6])))?;

        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&bytes[20..28]);

        let info = MatrixInfo {
            levels: u32_at(8),
            lines: u32_at(12),
            columns: u32_at(16),
            kind,
            variant,
        };
        info.validate()?;

        Ok(Self {
            info,
            index_offset: u64::from_le_bytes(offset),
        })
    }
}
