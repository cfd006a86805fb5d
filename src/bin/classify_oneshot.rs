// 该文件是 Naoying （脑影） 项目的一部分。
// src/bin/classify_oneshot.rs - 单张图像推理
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use url::Url;

use naoying::{
  FromUrl,
  input::ImageFileInput,
  model::{Model, TumorClass, load_model},
  output::format_prediction,
};

/// 对单张 MRI 图像进行分类并以 JSON 输出结果
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型地址，例如 onnx:///path/to/model.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像，例如 image:///path/to/scan.png
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  info!("模型地址: {}", args.model);
  info!("输入来源: {}", args.input);

  let input_image = ImageFileInput::from_url(&args.input).context("无法读取输入图像")?;
  let model = load_model(&args.model).context("无法加载模型")?;

  info!("开始推理...");
  for tensor in input_image.into_nhwc() {
    let now = std::time::Instant::now();
    let scores = model.infer(&tensor)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    let result = format_prediction(&scores, &TumorClass::ALL)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
  }

  Ok(())
}
