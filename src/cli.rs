//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 口令也可以通过环境变量 `THOUSANDFLICKS_PASSPHRASE` 提供，命令行参数优先。

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::PASSPHRASE_ENV;

/// 在未压缩的 24 位 BMP 图像中隐藏或恢复任意数据，带 Hamming(7,4) 纠错与基于口令的槽位置换。
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 将文件内容隐藏到图像中。
    Encode(EncodeArgs),

    /// 将一段文本隐藏到图像中。
    EncodeText(EncodeTextArgs),

    /// 从图像中恢复隐藏的数据。
    Decode(DecodeArgs),

    /// 报告图像在启用与不启用纠错时可隐藏的最大字节数。
    Capacity(CapacityArgs),

    /// 报告图像的有效性、尺寸、位深与原始容量。
    Info(InfoArgs),
}

/// 编码与解码共用的参数。
#[derive(Args, Debug, Clone, Default)]
pub struct CodecArgs {
    /// 决定数据隐藏位置的口令。留空则使用固定的默认顺序。
    #[arg(short, long, env = PASSPHRASE_ENV, hide_env_values = true)]
    pub passphrase: Option<String>,

    /// 不使用 Hamming(7,4) 纠错。解码时必须与编码时一致。
    #[arg(long)]
    pub no_ecc: bool,
}

/// 'encode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// 载体图像。
    pub image: PathBuf,

    /// 输出图像。
    pub dest: PathBuf,

    /// 要隐藏的文件。
    pub payload: PathBuf,

    #[command(flatten)]
    pub codec: CodecArgs,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'encode-text' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EncodeTextArgs {
    pub image: PathBuf,

    pub dest: PathBuf,

    /// 要隐藏的文本。
    pub message: String,

    #[command(flatten)]
    pub codec: CodecArgs,

    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 含有隐藏数据的图像。
    pub image: PathBuf,

    /// 保存恢复数据的路径。省略时按文本输出到标准输出。
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,

    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CapacityArgs {
    pub image: PathBuf,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    pub image: PathBuf,
}
