//! # 槽位置换模块
//!
//! 由口令派生种子，再用种子驱动的 Fisher-Yates 洗牌给出像素字节 (槽位) 的伪随机顺序。
//! 这只是混淆手段，并不提供机密性。
//!
//! 洗牌按正向部分 Fisher-Yates 进行：第 i 步只在 `[i, n)` 中抽取一次。
//! 因此对同一种子和槽位数，任意 `required` 得到的序列都是完整置换的前缀，
//! 解码时可以先只取帧头所需的槽位。随机区间使用 `u64`，保证各平台结果一致。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::StegoError;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 驱动洗牌的伪随机算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// 以 `seed_from_u64` 初始化的 ChaCha20，驱动正向 Fisher-Yates。
    ChaCha20FisherYates,
}

/// 置换密钥：种子加上算法标识。相同的密钥永远生成相同的置换。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationKey {
    pub seed: u64,
    pub algorithm: Algorithm,
}

impl PermutationKey {
    /// 用 64 位 FNV-1a 散列口令。空口令得到固定的默认种子。
    pub fn from_passphrase(passphrase: &str) -> Self {
        let seed = passphrase.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        });
        Self {
            seed,
            algorithm: Algorithm::ChaCha20FisherYates,
        }
    }
}

impl Default for PermutationKey {
    fn default() -> Self {
        Self::from_passphrase("")
    }
}

/// 逻辑位序号到像素缓冲区字节下标的映射。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPermutation {
    slots: Vec<usize>,
}

impl SlotPermutation {
    pub fn as_slice(&self) -> &[usize] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// 生成 `[0, slot_count)` 的伪随机置换，并返回前 `required` 个槽位。
///
/// # Errors
///
/// `required > slot_count` 时返回 `PayloadTooLarge`。
pub fn generate(
    key: &PermutationKey,
    slot_count: usize,
    required: usize,
) -> Result<SlotPermutation, StegoError> {
    if required > slot_count {
        return Err(StegoError::PayloadTooLarge {
            required_bits: required,
            available_bits: slot_count,
        });
    }

    let mut slots: Vec<usize> = (0..slot_count).collect();
    match key.algorithm {
        Algorithm::ChaCha20FisherYates => {
            let mut rng = ChaCha20Rng::seed_from_u64(key.seed);
            for i in 0..required {
                let j = rng.random_range(i as u64..slot_count as u64) as usize;
                slots.swap(i, j);
            }
        }
    }
    slots.truncate(required);

    log::debug!(
        "generated {required} of {slot_count} slots (seed {:#018x})",
        key.seed
    );
    Ok(SlotPermutation { slots })
}
