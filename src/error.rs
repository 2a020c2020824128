//! # 错误类型模块
//!
//! 核心隐写流程中所有可能的失败情况。命令处理层再通过 `anyhow` 为其附加上下文。

use std::io;

use crate::frame::FrameError;

/// 编码或解码过程中可能出现的错误。
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// 签名错误，或头部/像素数据被截断。
    #[error("invalid bitmap format ({field}): {detail}")]
    InvalidBitmapFormat { field: &'static str, detail: String },

    /// 压缩的、非 24 位的或其他不支持的 BMP 变体。
    #[error("unsupported bitmap variant ({field}): {detail}")]
    UnsupportedBitmapVariant { field: &'static str, detail: String },

    /// 需要的位数超过了图像可容纳的位数。
    #[error("payload too large: requires {required_bits} bits, image holds {available_bits}")]
    PayloadTooLarge {
        required_bits: usize,
        available_bits: usize,
    },

    /// 帧校验失败。错误的口令与真实的数据损坏在这里无法区分。
    #[error("wrong passphrase or corrupted stream: {0}")]
    WrongPassphraseOrCorruptedStream(#[from] FrameError),

    /// 置换给出的槽位超出了像素缓冲区。
    #[error("slot {index} is outside the pixel buffer of {len} bytes")]
    InvalidSlot { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StegoError {
    pub(crate) fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidBitmapFormat {
            field,
            detail: detail.into(),
        }
    }

    pub(crate) fn unsupported(field: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedBitmapVariant {
            field,
            detail: detail.into(),
        }
    }
}
