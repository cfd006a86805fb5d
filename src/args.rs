// 该文件是 Naoying （脑影） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use url::Url;

use naoying::server::DEFAULT_MAX_UPLOAD_BYTES;

/// Naoying 推理服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型地址，未提供时服务照常启动但无法预测
  /// 支持格式:
  /// - ONNX: onnx:///path/to/brain_tumor_model.onnx
  /// - 固定得分: fixed:0.7,0.1,0.1,0.1
  #[arg(long, env = "NAOYING_MODEL", value_name = "MODEL")]
  pub model: Option<Url>,

  /// 监听地址
  #[arg(long, env = "NAOYING_BIND", default_value = "0.0.0.0:5000", value_name = "ADDR")]
  pub bind: SocketAddr,

  /// 静态页面目录
  #[arg(long, env = "NAOYING_STATIC_DIR", default_value = "static", value_name = "DIR")]
  pub static_dir: PathBuf,

  /// 上传文件临时目录
  #[arg(long, env = "NAOYING_UPLOAD_DIR", default_value = "uploads", value_name = "DIR")]
  pub upload_dir: PathBuf,

  /// 上传大小上限（字节）
  #[arg(long, env = "NAOYING_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES, value_name = "BYTES")]
  pub max_upload_bytes: usize,

  /// 同时进行的模型推理数量
  #[arg(long, env = "NAOYING_INFERENCE_SLOTS", default_value = "1", value_name = "COUNT")]
  pub inference_slots: usize,
}
