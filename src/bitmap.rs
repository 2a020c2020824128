//! # BMP 编解码模块
//!
//! 只处理未压缩的 24 位 BMP。头部被解析为一个扁平的、经过校验的 [`BitmapHeader`]，
//! 原始头部字节则原样保留，因此序列化时除了被修改的像素字节外，文件逐字节不变。

use crate::constants::{
    BMP_SIGNATURE, FILE_HEADER_SIZE, INFO_HEADER_SIZE, MAX_PIXEL_BYTES, MIN_HEADER_SIZE,
    SUPPORTED_BITS_PER_PIXEL,
};
use crate::error::StegoError;
use std::fs;
use std::path::Path;

/// 文件头与信息头中的全部字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
    pub info_size: u32,
    pub width: i32,
    /// 正数表示自下而上存储行，负数表示自上而下。
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

/// 行的存储顺序，由高度字段的符号决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    BottomUp,
    TopDown,
}

impl BitmapHeader {
    /// 从至少 54 字节的切片中读取字段，不做任何语义校验。
    fn read(bytes: &[u8]) -> Result<Self, StegoError> {
        if bytes.len() < MIN_HEADER_SIZE {
            return Err(StegoError::invalid(
                "header",
                format!(
                    "file is {} bytes, headers need {MIN_HEADER_SIZE}",
                    bytes.len()
                ),
            ));
        }

        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let i32_at = |at: usize| {
            i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        Ok(Self {
            signature: [bytes[0], bytes[1]],
            file_size: u32_at(2),
            reserved1: u16_at(6),
            reserved2: u16_at(8),
            pixel_offset: u32_at(10),
            info_size: u32_at(14),
            width: i32_at(18),
            height: i32_at(22),
            planes: u16_at(26),
            bits_per_pixel: u16_at(28),
            compression: u32_at(30),
            image_size: u32_at(34),
            x_pixels_per_meter: i32_at(38),
            y_pixels_per_meter: i32_at(42),
            colors_used: u32_at(46),
            colors_important: u32_at(50),
        })
    }

    /// 校验头部字段，返回像素区域的 (行跨度, 行数)。
    ///
    /// 出错时报告第一个不合法的字段。
    fn validate(&self, file_len: usize) -> Result<(usize, usize), StegoError> {
        if self.signature != BMP_SIGNATURE {
            return Err(StegoError::invalid(
                "signature",
                format!("expected \"BM\", found {:02X?}", self.signature),
            ));
        }
        if (self.info_size as usize) < INFO_HEADER_SIZE {
            return Err(StegoError::unsupported(
                "header size",
                format!(
                    "info header is {} bytes, at least {INFO_HEADER_SIZE} required",
                    self.info_size
                ),
            ));
        }
        if self.width <= 0 {
            return Err(StegoError::invalid(
                "width",
                format!("width must be positive, found {}", self.width),
            ));
        }
        if self.height == 0 {
            return Err(StegoError::invalid("height", "height is zero"));
        }
        if self.planes != 1 {
            return Err(StegoError::invalid(
                "planes",
                format!("expected 1 plane, found {}", self.planes),
            ));
        }
        if self.bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
            return Err(StegoError::unsupported(
                "bits per pixel",
                format!(
                    "only {SUPPORTED_BITS_PER_PIXEL} bpp is supported, found {}",
                    self.bits_per_pixel
                ),
            ));
        }
        if self.compression != 0 {
            return Err(StegoError::unsupported(
                "compression",
                format!("only uncompressed (0) is supported, found {}", self.compression),
            ));
        }

        let stride = row_stride(self.width.unsigned_abs() as usize);
        let rows = self.height.unsigned_abs() as usize;
        let pixel_len = stride
            .checked_mul(rows)
            .filter(|&len| len <= MAX_PIXEL_BYTES)
            .ok_or_else(|| {
                StegoError::unsupported(
                    "dimensions",
                    format!(
                        "{}x{} exceeds the {MAX_PIXEL_BYTES}-byte pixel limit",
                        self.width, rows
                    ),
                )
            })?;

        let offset = self.pixel_offset as usize;
        if offset < FILE_HEADER_SIZE + self.info_size as usize {
            return Err(StegoError::invalid(
                "pixel data offset",
                format!(
                    "offset {offset} overlaps the {}-byte headers",
                    FILE_HEADER_SIZE + self.info_size as usize
                ),
            ));
        }

        let end = offset.saturating_add(pixel_len);
        if (self.file_size as usize) < end {
            return Err(StegoError::invalid(
                "file size",
                format!(
                    "declared {} bytes, pixel data ends at {end}",
                    self.file_size
                ),
            ));
        }
        if file_len < end {
            return Err(StegoError::invalid(
                "pixel data",
                format!("file is {file_len} bytes, pixel data ends at {end}"),
            ));
        }
        if self.file_size as usize > file_len {
            return Err(StegoError::invalid(
                "file size",
                format!(
                    "declared {} bytes, file holds {file_len}",
                    self.file_size
                ),
            ));
        }

        Ok((stride, rows))
    }
}

/// 24 位像素一行所占的字节数，按 4 字节对齐。
pub fn row_stride(width: usize) -> usize {
    (width * 3).div_ceil(4) * 4
}

/// 解析后的 BMP 图像：不可变的头部与可变的像素缓冲区 (包含行填充)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapImage {
    header: BitmapHeader,
    /// 像素数据之前的原始字节，包括头部与可能存在的间隙。
    prefix: Vec<u8>,
    pixels: Vec<u8>,
    /// 像素数据之后多余的原始字节。
    trailer: Vec<u8>,
    stride: usize,
}

impl BitmapImage {
    /// 解析 BMP 文件内容。
    ///
    /// # Errors
    ///
    /// 签名错误或数据被截断时返回 `InvalidBitmapFormat`；
    /// 压缩或非 24 位图像返回 `UnsupportedBitmapVariant`。
    pub fn parse(bytes: &[u8]) -> Result<Self, StegoError> {
        let header = BitmapHeader::read(bytes)?;
        let (stride, rows) = header.validate(bytes.len())?;

        let offset = header.pixel_offset as usize;
        let end = offset + stride * rows;

        log::debug!(
            "parsed {}x{} bitmap, stride {stride}, pixel data {offset}..{end}",
            header.width,
            header.height
        );

        Ok(Self {
            header,
            prefix: bytes[..offset].to_vec(),
            pixels: bytes[offset..end].to_vec(),
            trailer: bytes[end..].to_vec(),
            stride,
        })
    }

    /// 读取并解析磁盘上的 BMP 文件。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StegoError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    /// 将图像写回字节序列。头部不会被重新计算。
    pub fn serialize(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.prefix.len() + self.pixels.len() + self.trailer.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&self.pixels);
        out.extend_from_slice(&self.trailer);
        out
    }

    pub fn header(&self) -> &BitmapHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width.unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        self.header.height.unsigned_abs()
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.header.bits_per_pixel
    }

    pub fn row_stride(&self) -> usize {
        self.stride
    }

    pub fn row_order(&self) -> RowOrder {
        if self.header.height < 0 {
            RowOrder::TopDown
        } else {
            RowOrder::BottomUp
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}
