// 该文件是 Naoying （脑影） 项目的一部分。
// src/error.rs - 推理请求错误
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

use axum::http::StatusCode;
use thiserror::Error;

use crate::{input::NormalizeError, model::ModelError, output::ShapeMismatchError};

/// 单次推理请求可能出现的全部错误
#[derive(Error, Debug)]
pub enum PipelineError {
  #[error("No file uploaded")]
  NoFile,
  #[error("No file selected")]
  NoSelection,
  #[error("Invalid file type. Please upload JPG, JPEG, or PNG")]
  InvalidType,
  #[error("Model not loaded. Please train the model first.")]
  ModelUnavailable,
  #[error("{0}")]
  Prediction(String),
  #[error(transparent)]
  ShapeMismatch(#[from] ShapeMismatchError),
}

impl PipelineError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      PipelineError::NoFile | PipelineError::NoSelection | PipelineError::InvalidType => {
        StatusCode::BAD_REQUEST
      }
      PipelineError::ModelUnavailable
      | PipelineError::Prediction(_)
      | PipelineError::ShapeMismatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// 客户端输入错误，不属于服务端故障
  pub fn is_client_fault(&self) -> bool {
    self.status_code().is_client_error()
  }
}

impl From<NormalizeError> for PipelineError {
  fn from(err: NormalizeError) -> Self {
    PipelineError::Prediction(err.to_string())
  }
}

impl From<ModelError> for PipelineError {
  fn from(err: ModelError) -> Self {
    PipelineError::Prediction(err.to_string())
  }
}

impl From<std::io::Error> for PipelineError {
  fn from(err: std::io::Error) -> Self {
    PipelineError::Prediction(err.to_string())
  }
}
