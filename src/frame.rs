//! # 帧编解码模块
//!
//! 将载荷包装为自描述的位序列：
//!
//! ```text
//! [32 bits] 载荷长度 (大端 u32)
//! [32 bits] 哨兵 "TFLK"
//! [N bytes] 载荷
//! ```
//!
//! 所有字节均按最高有效位优先展开。显式长度前缀让解码不依赖任何终止符扫描。

use crate::constants::{FRAME_HEADER_BYTES, FRAME_SENTINEL, LENGTH_PREFIX_BITS};
use crate::error::StegoError;

/// 帧头所占的位数。
pub const FRAME_HEADER_BITS: usize = FRAME_HEADER_BYTES * 8;

/// 帧解析失败的原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame header needs 64 bits, only {available} available")]
    MissingHeader { available: usize },

    #[error("frame sentinel mismatch")]
    SentinelMismatch,

    #[error("declared length of {declared} bytes exceeds the {available} bits available")]
    Truncated { declared: usize, available: usize },
}

/// 把字节展开为位，最高位在前。
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// `bytes_to_bits` 的逆操作。不足 8 位的尾部被丢弃。
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect()
}

/// 把载荷长度转换为 32 位长度字段。超出范围时返回 `PayloadTooLarge`。
pub fn length_prefix(payload_len: usize) -> Result<u32, StegoError> {
    u32::try_from(payload_len).map_err(|_| StegoError::PayloadTooLarge {
        required_bits: payload_len.saturating_mul(8).saturating_add(FRAME_HEADER_BITS),
        available_bits: (u32::MAX as usize)
            .saturating_mul(8)
            .saturating_add(FRAME_HEADER_BITS),
    })
}

/// 为载荷加上长度前缀与哨兵，生成帧的位序列。
pub fn frame(payload: &[u8]) -> Result<Vec<bool>, StegoError> {
    let len = length_prefix(payload.len())?;

    let mut bytes = Vec::with_capacity(FRAME_HEADER_BYTES + payload.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(&FRAME_SENTINEL);
    bytes.extend_from_slice(payload);

    Ok(bytes_to_bits(&bytes))
}

/// 只读取帧头：校验哨兵并返回声明的载荷长度 (字节)。
pub fn read_header(bits: &[bool]) -> Result<usize, FrameError> {
    if bits.len() < FRAME_HEADER_BITS {
        return Err(FrameError::MissingHeader {
            available: bits.len(),
        });
    }

    let header = bits_to_bytes(&bits[..FRAME_HEADER_BITS]);
    let (len, sentinel) = header.split_at(LENGTH_PREFIX_BITS / 8);
    if sentinel != FRAME_SENTINEL {
        return Err(FrameError::SentinelMismatch);
    }

    Ok(u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize)
}

/// 从位序列中还原载荷。
///
/// 声明的长度之后的多余位 (例如纠错分组的填充) 会被忽略。
pub fn unframe(bits: &[bool]) -> Result<Vec<u8>, FrameError> {
    let declared = read_header(bits)?;
    let body = &bits[FRAME_HEADER_BITS..];

    match declared.checked_mul(8) {
        Some(needed) if needed <= body.len() => Ok(bits_to_bytes(&body[..needed])),
        _ => Err(FrameError::Truncated {
            declared,
            available: body.len(),
        }),
    }
}
