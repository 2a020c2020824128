/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// 支持的最小信息头 (BITMAPINFOHEADER) 大小 (字节)。
pub const INFO_HEADER_SIZE: usize = 40;

/// 两个头部合计的最小长度，即 54 字节。
pub const MIN_HEADER_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// BMP 签名 "BM"。
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

/// 唯一支持的位深。
pub const SUPPORTED_BITS_PER_PIXEL: u16 = 24;

/// 像素缓冲区的上限 (256 MiB)。超过该大小的图像在分配内存前即被拒绝。
pub const MAX_PIXEL_BYTES: usize = 256 * 1024 * 1024;

/// 帧长度字段的位数。长度以大端 `u32` 存储。
pub const LENGTH_PREFIX_BITS: usize = 32;

/// 紧随长度字段之后的固定哨兵，用于识别错误的口令或损坏的数据流。
pub const FRAME_SENTINEL: [u8; 4] = *b"TFLK";

/// 帧头 (长度 + 哨兵) 占用的字节数。
pub const FRAME_HEADER_BYTES: usize = LENGTH_PREFIX_BITS / 8 + FRAME_SENTINEL.len();

/// 环境变量名，可在其中提供口令。
pub const PASSPHRASE_ENV: &str = "THOUSANDFLICKS_PASSPHRASE";
