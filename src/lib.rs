//! # thousandflicks 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：BMP 编解码、帧编码、Hamming(7,4) 纠错、
//! 基于口令的槽位置换、LSB 嵌入与提取，以及容量规划。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod hamming;
pub mod handler;
pub mod permutation;
pub mod pipeline;
pub mod steganography;

pub use bitmap::BitmapImage;
pub use error::StegoError;
pub use pipeline::{Options, hide, reveal};
