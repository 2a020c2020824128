use image::{ImageBuffer, Rgb, Rgba};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use thousandflicks::{
    BitmapImage, Options, StegoError,
    cli::{CapacityArgs, CodecArgs, DecodeArgs, EncodeArgs, EncodeTextArgs, InfoArgs},
    handler::{
        handle_capacity, handle_decode, handle_encode, handle_encode_text, handle_info,
        write_atomically, write_payload_text,
    },
    reveal,
};

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    let img_buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, raw_pixels).expect("Buffer size mismatch.");
    img_buf.save(path).expect("Failed to create test image.");
}

fn codec(passphrase: &str) -> CodecArgs {
    CodecArgs {
        passphrase: Some(passphrase.to_string()),
        no_ecc: false,
    }
}

/// 验证从隐藏文件到恢复文件的完整流程
#[test]
fn test_encode_and_decode_file_integration() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let hidden_image_path = dir.path().join("hidden.bmp");
    let payload_path = dir.path().join("payload.bin");
    let recovered_path = dir.path().join("recovered.bin");

    create_test_image(&original_image_path, 100, 100);
    let mut payload = vec![0u8; 1500];
    rand::rng().fill_bytes(&mut payload);
    fs::write(&payload_path, &payload)?;

    handle_encode(EncodeArgs {
        image: original_image_path.clone(),
        dest: hidden_image_path.clone(),
        payload: payload_path,
        codec: codec("correct horse"),
        force: false,
    })?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    handle_decode(DecodeArgs {
        image: hidden_image_path,
        output: Some(recovered_path.clone()),
        codec: codec("correct horse"),
        force: false,
    })?;

    assert_eq!(
        fs::read(&recovered_path)?,
        payload,
        "Recovered payload must match the original."
    );

    Ok(())
}

/// 验证文本隐藏，以及错误口令不会返回原文
#[test]
fn test_encode_text_with_passphrase() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    let hidden_path = dir.path().join("hidden.bmp");
    create_test_image(&image_path, 100, 100);

    handle_encode_text(EncodeTextArgs {
        image: image_path,
        dest: hidden_path.clone(),
        message: "HIDDEN".to_string(),
        codec: codec("abc"),
        force: false,
    })?;

    let image = BitmapImage::parse(&fs::read(&hidden_path)?)?;
    let revealed = reveal(&image, &Options::new("abc", true))?;
    assert_eq!(revealed.payload, b"HIDDEN");

    match reveal(&image, &Options::new("xyz", true)) {
        Err(StegoError::WrongPassphraseOrCorruptedStream(_)) => {}
        Ok(other) => assert_ne!(other.payload, b"HIDDEN"),
        Err(e) => panic!("Unexpected error kind: {e}"),
    }

    // 不提供输出路径时，结果打印到标准输出
    handle_decode(DecodeArgs {
        image: hidden_path.clone(),
        output: None,
        codec: codec("abc"),
        force: false,
    })?;

    let wrong = handle_decode(DecodeArgs {
        image: hidden_path,
        output: Some(dir.path().join("never.txt")),
        codec: codec("xyz"),
        force: false,
    });
    assert!(wrong.is_err(), "A wrong passphrase must not decode.");
    assert!(!dir.path().join("never.txt").exists());

    Ok(())
}

/// 验证关闭纠错时的完整流程
#[test]
fn test_round_trip_without_ecc() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    let hidden_path = dir.path().join("hidden.bmp");
    let recovered_path = dir.path().join("recovered.txt");
    create_test_image(&image_path, 40, 30);

    let raw = CodecArgs {
        passphrase: None,
        no_ecc: true,
    };
    let message = "Without error correction 没有纠错";

    handle_encode_text(EncodeTextArgs {
        image: image_path,
        dest: hidden_path.clone(),
        message: message.to_string(),
        codec: raw.clone(),
        force: false,
    })?;
    handle_decode(DecodeArgs {
        image: hidden_path,
        output: Some(recovered_path.clone()),
        codec: raw,
        force: false,
    })?;

    assert_eq!(fs::read_to_string(&recovered_path)?, message);
    Ok(())
}

/// 验证输出仍是有效的 BMP，头部不变，每个通道最多改变 1
#[test]
fn test_output_is_visually_identical_bitmap() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    let hidden_path = dir.path().join("hidden.bmp");
    create_test_image(&image_path, 64, 48);

    handle_encode_text(EncodeTextArgs {
        image: image_path.clone(),
        dest: hidden_path.clone(),
        message: "a".repeat(150),
        codec: codec("visual"),
        force: false,
    })?;

    let before = fs::read(&image_path)?;
    let after = fs::read(&hidden_path)?;
    assert_eq!(before.len(), after.len());
    assert_eq!(before[..54], after[..54], "Headers must be identical.");

    let original = image::open(&image_path)?.to_rgb8();
    let hidden = image::open(&hidden_path)?.to_rgb8();
    assert_eq!(original.dimensions(), hidden.dimensions());
    assert!(
        original
            .as_raw()
            .iter()
            .zip(hidden.as_raw())
            .all(|(&a, &b)| a.abs_diff(b) <= 1)
    );
    assert_ne!(original.as_raw(), hidden.as_raw());

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 50, 50);

    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_encode_text(EncodeTextArgs {
        image: image_path.clone(),
        dest: dest_path.clone(),
        message: "some text".to_string(),
        codec: CodecArgs::default(),
        force: false,
    });
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    let result = handle_encode_text(EncodeTextArgs {
        image: image_path,
        dest: dest_path.clone(),
        message: "some text".to_string(),
        codec: CodecArgs::default(),
        force: true,
    });
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    let content = fs::read(&dest_path)?;
    assert_ne!(content, b"this is a dummy file to be overwritten");
    assert!(BitmapImage::parse(&content).is_ok());

    Ok(())
}

/// 验证空间不足时的错误处理，且目标文件不被破坏
#[test]
fn test_encode_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("small.bmp");
    let payload_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 10, 10);
    fs::write(&payload_path, "a".repeat(5000))?;
    fs::write(&dest_path, "untouched")?;

    let result = handle_encode(EncodeArgs {
        image: image_path,
        dest: dest_path.clone(),
        payload: payload_path,
        codec: CodecArgs::default(),
        force: true,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
        assert!(matches!(
            e.downcast_ref::<StegoError>(),
            Some(StegoError::PayloadTooLarge { .. })
        ));
    }
    assert_eq!(fs::read_to_string(&dest_path)?, "untouched");

    Ok(())
}

/// 验证 32 位图像被拒绝，并指出出错的字段
#[test]
fn test_unsupported_bitmap_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("rgba.bmp");
    let img_buf: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
    img_buf.save(&image_path)?;

    let result = handle_info(InfoArgs {
        image: image_path.clone(),
    });
    let err = result.expect_err("32-bit bitmaps are unsupported");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::UnsupportedBitmapVariant { .. })
    ));
    assert!(format!("{err:#}").contains("bits per pixel"));

    let png_path = dir.path().join("not_a.bmp");
    fs::write(&png_path, b"\x89PNG\r\n\x1a\n not a bitmap at all, just some bytes")?;
    let err = handle_capacity(CapacityArgs { image: png_path }).expect_err("not a bitmap");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::InvalidBitmapFormat { .. })
    ));

    let err = handle_info(InfoArgs {
        image: dir.path().join("missing.bmp"),
    })
    .expect_err("missing file");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::Io(_))
    ));

    Ok(())
}

/// 验证 capacity 与 info 命令在有效图像上成功
#[test]
fn test_capacity_and_info() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    create_test_image(&image_path, 100, 100);

    handle_capacity(CapacityArgs {
        image: image_path.clone(),
    })?;
    handle_info(InfoArgs { image: image_path.clone() })?;

    let image = BitmapImage::parse(&fs::read(&image_path)?)?;
    assert_eq!(thousandflicks::capacity::capacity_bits(&image), 30_000);
    assert_eq!(thousandflicks::capacity::capacity_bytes(&image, true), 2_134);

    Ok(())
}

/// 验证原子写入会替换已有文件且不留下临时文件
#[test]
fn test_atomic_write_replaces_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let dest = dir.path().join("out.bin");
    fs::write(&dest, "old")?;

    write_atomically(&dest, b"new contents", true)?;
    assert_eq!(fs::read(&dest)?, b"new contents");
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}

/// 验证输出文本时只在缺少换行时补一个换行
#[test]
fn test_payload_text_newline_handling() -> anyhow::Result<()> {
    let mut out = Vec::new();
    write_payload_text(&mut out, b"HIDDEN")?;
    assert_eq!(out, b"HIDDEN\n");

    let mut out = Vec::new();
    write_payload_text(&mut out, b"line one\nline two\n")?;
    assert_eq!(out, b"line one\nline two\n");

    let mut out = Vec::new();
    write_payload_text(&mut out, b"")?;
    assert_eq!(out, b"\n");

    Ok(())
}
