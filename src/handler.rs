//! # 命令处理逻辑模块
//!
//! 包含各子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写流程以及向用户报告结果。
//! 所有输出文件都先写入同目录下的临时文件，再整体替换目标路径。

use crate::bitmap::{BitmapImage, RowOrder};
use crate::capacity::{capacity_bits, capacity_bytes};
use crate::cli::{CapacityArgs, CodecArgs, DecodeArgs, EncodeArgs, EncodeTextArgs, InfoArgs};
use crate::error::StegoError;
use crate::pipeline::{self, HideReport, Options};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

impl From<&CodecArgs> for Options {
    fn from(args: &CodecArgs) -> Self {
        Options::new(args.passphrase.clone().unwrap_or_default(), !args.no_ecc)
    }
}

fn load_image(path: &Path) -> Result<BitmapImage> {
    BitmapImage::load(path).with_context(|| {
        format!(
            "Unable to load image file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 原子地写入文件：先写入目标目录中的临时文件，再重命名到目标路径。
///
/// # Errors
///
/// 目标已存在且未指定 `force`，或任何写入步骤失败时返回错误。失败时目标文件保持原样。
pub fn write_atomically(dest: &Path, contents: &[u8], force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !dest.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).with_context(|| {
        format!(
            "Unable to create a temporary file next to: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| {
            format!(
                "Unable to write temporary file for: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;
    tmp.persist(dest).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    Ok(())
}

/// 把恢复的载荷按文本 (有损 UTF-8) 写出。
///
/// 载荷本身不以换行结尾时才补一个换行，已有的换行不会重复。
pub fn write_payload_text<W: Write>(out: &mut W, payload: &[u8]) -> std::io::Result<()> {
    out.write_all(String::from_utf8_lossy(payload).as_bytes())?;
    if !payload.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// 把载荷隐藏进图像并写出结果，`encode` 与 `encode-text` 共用。
fn hide_and_save(
    image_path: &Path,
    dest: &Path,
    payload: &[u8],
    codec: &CodecArgs,
    force: bool,
) -> Result<HideReport> {
    let mut image = load_image(image_path)?;
    let options = Options::from(codec);

    let report = match pipeline::hide(&mut image, payload, &options) {
        Err(err @ StegoError::PayloadTooLarge { .. }) => {
            let available = capacity_bytes(&image, options.error_correction);
            return Err(anyhow::Error::new(err).context(format!(
                "Not enough space in the image to hide the payload. \nRequired: {} bytes, Available: {} bytes",
                payload.len().to_string().red().bold(),
                available.to_string().green().bold()
            )));
        }
        other => other.context("Failed to hide the payload in the image.")?,
    };

    write_atomically(dest, &image.serialize(), force)?;
    Ok(report)
}

fn print_hide_report(report: &HideReport) {
    println!("     Payload: {} bytes", report.payload_bytes);
    println!("     Embedded stream: {} bits", report.stream_bits);
    println!("     Image capacity: {} bytes", report.capacity_bytes);
    println!("     Capacity used: {:.2}%", report.usage_percent());
}

/// 处理 'encode' 命令：把文件内容隐藏到图像中。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入图像或载荷文件，或图像不是受支持的 BMP。
/// * 图像没有足够的空间来隐藏载荷。
/// * 无法写入目标图像文件，或目标已存在且未指定 `--force`。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let payload = fs::read(&args.payload).with_context(|| {
        format!(
            "Unable to read payload file: {}",
            args.payload.to_string_lossy().red().bold()
        )
    })?;

    let report = hide_and_save(&args.image, &args.dest, &payload, &args.codec, args.force)?;

    println!(
        "The file has been successfully hidden and saved: {}",
        args.dest.to_string_lossy().green().bold()
    );
    print_hide_report(&report);
    Ok(())
}

/// 处理 'encode-text' 命令：把文本隐藏到图像中。
pub fn handle_encode_text(args: EncodeTextArgs) -> Result<()> {
    let report = hide_and_save(
        &args.image,
        &args.dest,
        args.message.as_bytes(),
        &args.codec,
        args.force,
    )?;

    println!(
        "The text has been successfully hidden and saved: {}",
        args.dest.to_string_lossy().green().bold()
    );
    print_hide_report(&report);
    Ok(())
}

/// 处理 'decode' 命令。
///
/// 给出输出路径时把载荷写入该文件；否则把载荷按文本打印到标准输出。
///
/// # Errors
///
/// 口令错误或数据损坏时，报告 "wrong passphrase or corrupted stream"。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let image = load_image(&args.image)?;
    let options = Options::from(&args.codec);

    let revealed = pipeline::reveal(&image, &options).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nCheck the passphrase and the --no-ecc setting.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    match &args.output {
        Some(output) => {
            write_atomically(output, &revealed.payload, args.force)?;
            println!(
                "The payload has been successfully recovered and saved: {}",
                output.to_string_lossy().green().bold()
            );
            println!("     Payload: {} bytes", revealed.payload.len());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write_payload_text(&mut stdout, &revealed.payload)
                .context("Unable to write the recovered text to stdout")?;
        }
    }

    if revealed.corrected > 0 {
        eprintln!(
            "     {} Hamming ECC corrected {} bit error(s)",
            "[RECOVERY]".yellow().bold(),
            revealed.corrected
        );
    } else if args.output.is_some() {
        println!("     {} No bit errors detected", "[CLEAN]".green().bold());
    }
    if revealed.uncorrectable > 0 {
        eprintln!(
            "     {} {} codeword(s) could not be corrected",
            "[WARNING]".red().bold(),
            revealed.uncorrectable
        );
    }

    Ok(())
}

/// 处理 'capacity' 命令。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let image = load_image(&args.image)?;

    println!(
        "Image capacity: {} bytes with error correction, {} bytes without",
        capacity_bytes(&image, true).to_string().green().bold(),
        capacity_bytes(&image, false).to_string().green().bold()
    );
    Ok(())
}

/// 处理 'info' 命令。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    let image = load_image(&args.image)?;

    let order = match image.row_order() {
        RowOrder::BottomUp => "bottom-up",
        RowOrder::TopDown => "top-down",
    };

    println!(
        "Valid {}-bit uncompressed bitmap: {}",
        image.bits_per_pixel(),
        args.image.to_string_lossy().green().bold()
    );
    println!("     Dimensions: {}x{}", image.width(), image.height());
    println!("     Row order: {order}, stride {} bytes", image.row_stride());
    let header = image.header();
    println!(
        "     Resolution: {}x{} pixels per meter",
        header.x_pixels_per_meter, header.y_pixels_per_meter
    );
    println!("     File size: {} bytes", header.file_size);
    println!("     Raw capacity: {} bits", capacity_bits(&image));
    Ok(())
}
