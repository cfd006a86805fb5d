// 该文件是 Naoying （脑影） 项目的一部分。
// src/main.rs - 推理服务主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use naoying::{
  model::{SharedModel, load_model},
  pipeline::{PredictionPipeline, sweep_stale_uploads},
  server::{ServerOptions, router},
};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = args::Args::parse();

  info!("Naoying 脑部 MRI 分类服务");
  info!("监听地址: {}", args.bind);
  info!("静态目录: {}", args.static_dir.display());
  info!("上传目录: {}", args.upload_dir.display());
  info!("上传上限: {} 字节", args.max_upload_bytes);
  info!("推理槽位: {}", args.inference_slots);

  let removed = sweep_stale_uploads(&args.upload_dir)
    .with_context(|| format!("无法准备上传目录: {}", args.upload_dir.display()))?;
  if removed > 0 {
    warn!("已清理 {} 个遗留上传文件", removed);
  }

  // 模型只在启动时加载一次，失败时服务仍然启动
  let model: Option<SharedModel> = match &args.model {
    Some(url) => {
      info!("正在加载模型: {}", url);
      match load_model(url) {
        Ok(model) => {
          info!("模型加载完成");
          Some(model)
        }
        Err(e) => {
          error!("模型加载失败: {}", e);
          None
        }
      }
    }
    None => {
      warn!("未指定模型，预测接口将返回错误");
      None
    }
  };

  let pipeline = Arc::new(PredictionPipeline::new(
    model,
    &args.upload_dir,
    args.inference_slots,
  ));
  let options = ServerOptions {
    static_dir: args.static_dir.clone(),
    max_upload_bytes: args.max_upload_bytes,
  };
  let app = router(pipeline, &options);

  let listener = tokio::net::TcpListener::bind(args.bind)
    .await
    .with_context(|| format!("无法监听地址: {}", args.bind))?;
  info!("服务已启动: http://{}", args.bind);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("服务异常退出")?;

  info!("服务已退出");
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("收到中断信号，准备退出..."),
    Err(e) => {
      error!("无法监听中断信号: {}", e);
      std::future::pending::<()>().await
    }
  }
}
