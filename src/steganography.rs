use crate::bitmap::BitmapImage;
use crate::error::StegoError;
use crate::permutation::SlotPermutation;

/// 按置换顺序把位流写入各槽位字节的最低有效位。
///
/// 第 i 位写入 `pixels[slots[i]]`，只改动该字节的最低位，其余字节保持不变。
pub fn embed(
    image: &mut BitmapImage,
    bits: &[bool],
    permutation: &SlotPermutation,
) -> Result<(), StegoError> {
    if bits.len() > permutation.len() {
        return Err(StegoError::PayloadTooLarge {
            required_bits: bits.len(),
            available_bits: permutation.len(),
        });
    }

    let pix = image.pixels_mut();
    let len = pix.len();

    bits.iter()
        .zip(permutation.as_slice())
        .try_for_each(|(&bit, &index)| {
            let byte = pix
                .get_mut(index)
                .ok_or(StegoError::InvalidSlot { index, len })?;
            *byte = (*byte & 0xFE) | bit as u8;
            Ok(())
        })
}

/// `embed` 的逆操作：按置换顺序读取前 `bit_count` 个槽位的最低有效位。
pub fn extract(
    image: &BitmapImage,
    permutation: &SlotPermutation,
    bit_count: usize,
) -> Result<Vec<bool>, StegoError> {
    if bit_count > permutation.len() {
        return Err(StegoError::PayloadTooLarge {
            required_bits: bit_count,
            available_bits: permutation.len(),
        });
    }

    let pix = image.pixels();

    permutation.as_slice()[..bit_count]
        .iter()
        .map(|&index| {
            pix.get(index)
                .map(|byte| byte & 1 == 1)
                .ok_or(StegoError::InvalidSlot {
                    index,
                    len: pix.len(),
                })
        })
        .collect()
}
