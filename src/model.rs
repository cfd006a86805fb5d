// 该文件是 Naoying （脑影） 项目的一部分。
// src/model.rs - 模型
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{ops::Deref, sync::Arc};

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageTensor};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
}

/// 模型输出的各类别得分，下标与类别声明顺序一致
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector(pub Vec<f32>);

impl Deref for ScoreVector {
  type Target = [f32];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  InferenceError(String),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型输出长度不匹配: 期望 {expected}, 实际 {actual}")]
  OutputShapeMismatch { expected: usize, actual: usize },
}

/// 进程内共享的只读模型句柄
pub type SharedModel =
  Arc<dyn Model<Input = ImageTensor, Output = ScoreVector, Error = ModelError> + Send + Sync>;

mod fixed;
mod labels;
#[cfg(feature = "model_onnx")]
mod onnx;

pub use self::fixed::FixedScores;
pub use self::labels::{TumorClass, friendly_name_of};
#[cfg(feature = "model_onnx")]
pub use self::onnx::{OnnxClassifier, OnnxClassifierBuilder};

/// 根据 URL 方案加载模型句柄
///
/// - `onnx:///path/to/model.onnx`
/// - `fixed:0.7,0.1,0.1,0.1`
pub fn load_model(url: &Url) -> Result<SharedModel, ModelError> {
  #[cfg(feature = "model_onnx")]
  {
    if url.scheme() == OnnxClassifierBuilder::SCHEME {
      let model = OnnxClassifierBuilder::from_url(url)?.build()?;
      return Ok(Arc::new(model));
    }
  }

  if url.scheme() == FixedScores::SCHEME {
    return Ok(Arc::new(FixedScores::from_url(url)?));
  }

  Err(ModelError::ModelPathError(format!(
    "不支持的模型方案: {}",
    url.scheme()
  )))
}
