use clap::Parser;

use thousandflicks::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_decode, handle_encode, handle_encode_text, handle_info},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据子命令将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 日志级别由 RUST_LOG 控制
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(args) => handle_encode(args),
        Commands::EncodeText(args) => handle_encode_text(args),
        Commands::Decode(args) => handle_decode(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Info(args) => handle_info(args),
    }
}
