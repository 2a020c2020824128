//! # Hamming(7,4) 纠错模块
//!
//! 每 4 个数据位映射为一个 7 位码字，可纠正每个码字中任意 1 位翻转。
//! 码字按位置 1..=7 排列为 `p1 p2 d1 p3 d2 d3 d4`，以最高位优先写入位流。
//!
//! 整个层只由一对固定矩阵和两个纯函数组成。

/// 码字长度 (位)。
pub const CODEWORD_BITS: usize = 7;

/// 每个码字携带的数据位数。
pub const DATA_BITS: usize = 4;

/// 生成矩阵：第 i 行是第 i 个数据位 (d1..d4) 对码字的贡献。
/// 码字位置 p 对应掩码 `1 << (7 - p)`。
const GENERATOR: [u8; DATA_BITS] = [0x70, 0x4C, 0x2A, 0x69];

/// 校验矩阵：第 k 行覆盖位置编号中第 k 位为 1 的所有位置。
const PARITY_CHECK: [u8; 3] = [0x55, 0x33, 0x0F];

/// 数据位 d1..d4 在码字中的掩码 (位置 3、5、6、7)。
const DATA_MASKS: [u8; DATA_BITS] = [0x10, 0x04, 0x02, 0x01];

/// 纠错解码的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub bits: Vec<bool>,
    /// 被纠正的单比特错误数。
    pub corrected: usize,
    /// 无法纠正、数据位原样传递的码字数。
    pub uncorrectable: usize,
}

/// 对一个 4 位的半字节编码，`nibble` 的最高位为 d1。
pub fn encode_nibble(nibble: u8) -> u8 {
    GENERATOR
        .iter()
        .enumerate()
        .filter(|&(i, _)| (nibble >> (DATA_BITS - 1 - i)) & 1 == 1)
        .fold(0, |word, (_, row)| word ^ row)
}

/// 计算 7 位码字的伴随式。
pub fn syndrome(word: u8) -> u8 {
    PARITY_CHECK
        .iter()
        .enumerate()
        .fold(0, |s, (k, row)| s | (((word & row).count_ones() as u8) & 1) << k)
}

/// 在 7 个单比特错误模式中查找与伴随式匹配的那一个。
fn error_pattern(s: u8) -> Option<u8> {
    (0..CODEWORD_BITS)
        .map(|bit| 1u8 << bit)
        .find(|&mask| syndrome(mask) == s)
}

fn data_of(word: u8) -> u8 {
    DATA_MASKS
        .iter()
        .fold(0, |nibble, &mask| (nibble << 1) | u8::from(word & mask != 0))
}

/// 解码单个码字，返回 (半字节, 是否纠正, 是否无法纠正)。
pub fn decode_codeword(word: u8) -> (u8, bool, bool) {
    let word = word & 0x7F;
    match syndrome(word) {
        0 => (data_of(word), false, false),
        s => match error_pattern(s) {
            Some(mask) => (data_of(word ^ mask), true, false),
            None => (data_of(word), false, true),
        },
    }
}

/// 把位流编码为码字流。长度不是 4 的倍数时以 0 补齐。
pub fn encode(bits: &[bool]) -> Vec<bool> {
    let mut out = Vec::with_capacity(encoded_len(bits.len()));
    for chunk in bits.chunks(DATA_BITS) {
        let nibble = chunk
            .iter()
            .chain(std::iter::repeat(&false))
            .take(DATA_BITS)
            .fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
        let word = encode_nibble(nibble);
        out.extend((0..CODEWORD_BITS).rev().map(|shift| (word >> shift) & 1 == 1));
    }
    out
}

/// 解码码字流。
///
/// 永远不会失败：无法纠正的码字只被计数，其数据位原样输出。
/// 不足 7 位的尾部同样按无法纠正处理，缺失的位视为 0。
pub fn decode(stream: &[bool]) -> Decoded {
    let mut decoded = Decoded {
        bits: Vec::with_capacity(stream.len() / CODEWORD_BITS * DATA_BITS + DATA_BITS),
        corrected: 0,
        uncorrectable: 0,
    };

    for chunk in stream.chunks(CODEWORD_BITS) {
        let word = chunk
            .iter()
            .chain(std::iter::repeat(&false))
            .take(CODEWORD_BITS)
            .fold(0u8, |acc, &bit| (acc << 1) | bit as u8);

        let (nibble, corrected, uncorrectable) = if chunk.len() == CODEWORD_BITS {
            decode_codeword(word)
        } else {
            (data_of(word), false, true)
        };
        decoded.corrected += usize::from(corrected);
        decoded.uncorrectable += usize::from(uncorrectable);
        decoded
            .bits
            .extend((0..DATA_BITS).rev().map(|shift| (nibble >> shift) & 1 == 1));
    }

    if decoded.uncorrectable > 0 {
        log::warn!(
            "{} codeword(s) could not be corrected and were passed through",
            decoded.uncorrectable
        );
    }
    decoded
}

/// `bit_count` 个数据位编码后的长度 (位)。
pub fn encoded_len(bit_count: usize) -> usize {
    bit_count.div_ceil(DATA_BITS) * CODEWORD_BITS
}
