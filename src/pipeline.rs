// 该文件是 Naoying （脑影） 项目的一部分。
// src/pipeline.rs - 推理请求流水线
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{path::PathBuf, sync::Arc, time::Instant};

use tokio::{sync::Semaphore, task::JoinError};
use tracing::{debug, info, warn};

use crate::{
  error::PipelineError,
  input::normalize_file,
  model::{Model, SharedModel, TumorClass},
  output::{PredictionResult, format_prediction},
};

mod upload;

pub use self::upload::{
  UploadedFile, allowed_extension, secure_filename, stage_upload, sweep_stale_uploads,
};

/// 单个上传文件到预测结果的完整处理流程
///
/// 不保存跨请求状态；模型调用通过推理槽位限制并发数。
pub struct PredictionPipeline {
  model: Option<SharedModel>,
  upload_dir: PathBuf,
  slots: Arc<Semaphore>,
}

impl PredictionPipeline {
  pub fn new(model: Option<SharedModel>, upload_dir: impl Into<PathBuf>, slots: usize) -> Self {
    Self {
      model,
      upload_dir: upload_dir.into(),
      slots: Arc::new(Semaphore::new(slots.max(1))),
    }
  }

  pub fn model_loaded(&self) -> bool {
    self.model.is_some()
  }

  pub async fn predict_request(
    &self,
    upload: Option<UploadedFile>,
  ) -> Result<PredictionResult, PipelineError> {
    let model = self.model.clone().ok_or(PipelineError::ModelUnavailable)?;

    let upload = upload.ok_or(PipelineError::NoFile)?;
    if upload.filename.is_empty() {
      return Err(PipelineError::NoSelection);
    }
    let ext = allowed_extension(&upload.filename).ok_or(PipelineError::InvalidType)?;
    let safe_name = secure_filename(&upload.filename);
    debug!("上传文件: '{}' -> '{}'", upload.filename, safe_name);

    // 临时文件句柄在本函数内一直存活到模型调用之后，任何退出路径都会触发删除
    let upload_dir = self.upload_dir.clone();
    let (staged, tensor) = tokio::task::spawn_blocking(move || {
      let staged = stage_upload(&upload_dir, &safe_name, ext, &upload.bytes)?;
      let tensor = normalize_file(staged.path())?;
      Ok::<_, PipelineError>((staged, tensor))
    })
    .await
    .map_err(task_failed)??;

    let permit = self
      .slots
      .clone()
      .acquire_owned()
      .await
      .map_err(|e| PipelineError::Prediction(e.to_string()))?;
    let now = Instant::now();
    let scores = tokio::task::spawn_blocking(move || {
      let _permit = permit;
      model.infer(&tensor)
    })
    .await
    .map_err(task_failed)??;
    let elapsed = now.elapsed();

    let result = format_prediction(&scores, &TumorClass::ALL)?;
    info!(
      "推理完成: {} ({:.2}%), 耗时: {:.2?}",
      result.prediction,
      result.confidence * 100.0,
      elapsed
    );

    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
      warn!("无法删除临时文件 {}: {}", path.display(), e);
    }
    Ok(result)
  }
}

fn task_failed(err: JoinError) -> PipelineError {
  PipelineError::Prediction(format!("推理任务异常终止: {}", err))
}
