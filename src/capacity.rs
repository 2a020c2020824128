//! # 容量规划模块
//!
//! 每个像素缓冲区字节 (包括行填充) 可容纳 1 位。启用纠错时每 4 位扩展为 7 位，
//! 再扣除 8 字节的帧头。

use crate::bitmap::BitmapImage;
use crate::constants::FRAME_HEADER_BYTES;
use crate::error::StegoError;
use crate::frame::FRAME_HEADER_BITS;
use crate::hamming;

/// 图像可嵌入的总位数。
pub fn capacity_bits(image: &BitmapImage) -> usize {
    image.pixels().len()
}

/// 在给定纠错设置下，图像可隐藏的最大载荷 (字节)。
pub fn capacity_bytes(image: &BitmapImage, ecc: bool) -> usize {
    let bits = capacity_bits(image);
    let frame_bits = if ecc {
        bits / hamming::CODEWORD_BITS * hamming::DATA_BITS
    } else {
        bits
    };
    (frame_bits / 8).saturating_sub(FRAME_HEADER_BYTES)
}

/// 嵌入 `payload_len` 字节载荷所需的槽位数。
pub fn stream_bits(payload_len: usize, ecc: bool) -> usize {
    let frame_bits = FRAME_HEADER_BITS + payload_len * 8;
    if ecc {
        hamming::encoded_len(frame_bits)
    } else {
        frame_bits
    }
}

/// 在修改任何像素之前确认载荷能够放下。
pub fn ensure_fits(image: &BitmapImage, payload_len: usize, ecc: bool) -> Result<(), StegoError> {
    let available_bits = capacity_bits(image);
    let required_bits = stream_bits(payload_len, ecc);
    if required_bits > available_bits || payload_len > capacity_bytes(image, ecc) {
        return Err(StegoError::PayloadTooLarge {
            required_bits,
            available_bits,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::tests::sample_bmp;

    #[test]
    fn hundred_by_hundred() {
        let image = BitmapImage::parse(&sample_bmp(100, 100)).unwrap();
        assert_eq!(capacity_bits(&image), 30_000);
        assert_eq!(capacity_bytes(&image, true), 30_000 * 4 / 7 / 8 - 8);
        assert_eq!(capacity_bytes(&image, true), 2_134);
        assert_eq!(capacity_bytes(&image, false), 3_742);
    }

    #[test]
    fn boundary_is_exact() {
        let image = BitmapImage::parse(&sample_bmp(37, 11)).unwrap();
        for ecc in [true, false] {
            let max = capacity_bytes(&image, ecc);
            assert!(ensure_fits(&image, max, ecc).is_ok());
            assert!(stream_bits(max, ecc) <= capacity_bits(&image));
            assert!(matches!(
                ensure_fits(&image, max + 1, ecc),
                Err(StegoError::PayloadTooLarge { .. })
            ));
        }
    }

    #[test]
    fn tiny_image_has_no_room() {
        let image = BitmapImage::parse(&sample_bmp(2, 2)).unwrap();
        assert_eq!(capacity_bits(&image), 16);
        assert_eq!(capacity_bytes(&image, true), 0);
        assert!(ensure_fits(&image, 0, true).is_err());
    }

    #[test]
    fn stream_bits_accounts_for_expansion() {
        assert_eq!(stream_bits(0, false), 64);
        assert_eq!(stream_bits(0, true), 112);
        assert_eq!(stream_bits(6, true), (64 + 48) / 4 * 7);
    }
}
