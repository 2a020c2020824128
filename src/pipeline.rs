//! # 编码/解码流水线
//!
//! 编码：帧 → 纠错扩展 → 槽位置换 → LSB 写入。容量检查发生在任何像素被修改之前。
//! 解码：先只读取帧头所需的槽位并校验哨兵与长度，再读取完整数据流。

use crate::bitmap::BitmapImage;
use crate::capacity::{capacity_bits, capacity_bytes, ensure_fits, stream_bits};
use crate::error::StegoError;
use crate::frame::{self, FRAME_HEADER_BITS, FrameError};
use crate::hamming;
use crate::permutation::{self, PermutationKey};
use crate::steganography::{embed, extract};

/// 编码与解码共用的选项。解码时必须与编码时一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub passphrase: String,
    pub error_correction: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            passphrase: String::new(),
            error_correction: true,
        }
    }
}

impl Options {
    pub fn new(passphrase: impl Into<String>, error_correction: bool) -> Self {
        Self {
            passphrase: passphrase.into(),
            error_correction,
        }
    }

    fn key(&self) -> PermutationKey {
        PermutationKey::from_passphrase(&self.passphrase)
    }
}

/// 一次成功编码的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideReport {
    pub payload_bytes: usize,
    pub stream_bits: usize,
    pub capacity_bytes: usize,
    pub capacity_bits: usize,
}

impl HideReport {
    /// 嵌入的数据流占用可用槽位的百分比。
    pub fn usage_percent(&self) -> f64 {
        if self.capacity_bits == 0 {
            return 0.0;
        }
        self.stream_bits as f64 * 100.0 / self.capacity_bits as f64
    }
}

/// 解码得到的载荷以及纠错统计。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revealed {
    pub payload: Vec<u8>,
    pub corrected: usize,
    pub uncorrectable: usize,
}

/// 把载荷隐藏到图像中。
///
/// # Errors
///
/// 载荷超过容量时返回 `PayloadTooLarge`，此时图像不会被修改。
pub fn hide(
    image: &mut BitmapImage,
    payload: &[u8],
    options: &Options,
) -> Result<HideReport, StegoError> {
    let ecc = options.error_correction;
    ensure_fits(image, payload.len(), ecc)?;

    let framed = frame::frame(payload)?;
    let stream = if ecc {
        hamming::encode(&framed)
    } else {
        framed
    };
    debug_assert_eq!(stream.len(), stream_bits(payload.len(), ecc));

    let slots = capacity_bits(image);
    let permutation = permutation::generate(&options.key(), slots, stream.len())?;
    embed(image, &stream, &permutation)?;

    log::debug!(
        "embedded {} payload bytes as {} bits (ecc: {ecc})",
        payload.len(),
        stream.len()
    );

    Ok(HideReport {
        payload_bytes: payload.len(),
        stream_bits: stream.len(),
        capacity_bytes: capacity_bytes(image, ecc),
        capacity_bits: slots,
    })
}

/// 读取 `bit_count` 个槽位并按需纠错，返回帧位流和纠错统计。
fn read_stream(
    image: &BitmapImage,
    options: &Options,
    bit_count: usize,
) -> Result<hamming::Decoded, StegoError> {
    let permutation = permutation::generate(&options.key(), capacity_bits(image), bit_count)?;
    let raw = extract(image, &permutation, bit_count)?;

    Ok(if options.error_correction {
        hamming::decode(&raw)
    } else {
        hamming::Decoded {
            bits: raw,
            corrected: 0,
            uncorrectable: 0,
        }
    })
}

/// 从图像中恢复载荷。
///
/// # Errors
///
/// 口令错误或数据损坏时返回 `WrongPassphraseOrCorruptedStream`，两者无法区分。
pub fn reveal(image: &BitmapImage, options: &Options) -> Result<Revealed, StegoError> {
    let ecc = options.error_correction;
    let slots = capacity_bits(image);

    let header_bits = stream_bits(0, ecc);
    if header_bits > slots {
        return Err(FrameError::MissingHeader { available: slots }.into());
    }

    let header = read_stream(image, options, header_bits)?;
    let declared = frame::read_header(&header.bits)?;

    let capacity = capacity_bytes(image, ecc);
    if declared > capacity {
        return Err(FrameError::Truncated {
            declared,
            available: slots.saturating_sub(header_bits),
        }
        .into());
    }

    let stream = read_stream(image, options, stream_bits(declared, ecc))?;
    let payload = frame::unframe(&stream.bits)?;
    debug_assert!(stream.bits.len() >= FRAME_HEADER_BITS + payload.len() * 8);

    log::debug!(
        "recovered {} bytes, {} corrected, {} uncorrectable",
        payload.len(),
        stream.corrected,
        stream.uncorrectable
    );

    Ok(Revealed {
        payload,
        corrected: stream.corrected,
        uncorrectable: stream.uncorrectable,
    })
}
