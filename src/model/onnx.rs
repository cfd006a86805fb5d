// 该文件是 Naoying （脑影） 项目的一部分。
// src/model/onnx.rs - ONNX 分类模型
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tract_onnx::prelude::*;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{ImageTensor, INPUT_HEIGHT, INPUT_WIDTH},
  input::AsNhwcTensor,
  model::{Model, ModelError, ScoreVector, TumorClass},
};

const ONNX_SCHEME: &str = "onnx";
const ONNX_CLASS_NUM: usize = TumorClass::ALL.len();

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// 以 tract 运行的 ONNX 分类模型，输入 NHWC `[1, 224, 224, 3]` f32，输出 `[1, 4]` 概率
pub struct OnnxClassifier {
  plan: OnnxPlan,
}

pub struct OnnxClassifierBuilder {
  model_path: String,
}

impl FromUrl for OnnxClassifierBuilder {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != ONNX_SCHEME {
      return Err(ModelError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        ONNX_SCHEME
      )));
    }

    Ok(OnnxClassifierBuilder {
      model_path: url.path().to_string(),
    })
  }
}

impl FromUrlWithScheme for OnnxClassifierBuilder {
  const SCHEME: &'static str = ONNX_SCHEME;
}

impl OnnxClassifierBuilder {
  pub fn build(self) -> Result<OnnxClassifier, ModelError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let input_fact = f32::fact([1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3]);
    let plan = tract_onnx::onnx()
      .model_for_read(&mut model_data.as_slice())
      .and_then(|model| model.with_input_fact(0, input_fact.into()))
      .and_then(|model| model.into_optimized())
      .and_then(|model| model.into_runnable())
      .map_err(|e| ModelError::ModelInvalid(format!("{}: {:#}", self.model_path, e)))?;

    let num_outputs = plan.model().outputs.len();
    if num_outputs != 1 {
      return Err(ModelError::ModelInvalid(format!(
        "预期模型输出数量为 1, 实际为 {}",
        num_outputs
      )));
    }

    info!("模型加载完成");
    Ok(OnnxClassifier { plan })
  }
}

impl Model for OnnxClassifier {
  type Input = ImageTensor;
  type Output = ScoreVector;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let tensor = Tensor::from_shape(&input.shape(), input.as_nhwc())
      .map_err(|e| ModelError::InferenceError(format!("{:#}", e)))?;

    debug!("执行模型推理");
    let outputs = self
      .plan
      .run(tvec!(tensor.into_tvalue()))
      .map_err(|e| ModelError::InferenceError(format!("{:#}", e)))?;

    debug!("获取模型输出");
    let scores: Vec<f32> = outputs[0]
      .to_array_view::<f32>()
      .map_err(|e| ModelError::InferenceError(format!("{:#}", e)))?
      .iter()
      .copied()
      .collect();
    debug!("模型推理结果：{:?}", scores);

    if scores.len() != ONNX_CLASS_NUM {
      return Err(ModelError::OutputShapeMismatch {
        expected: ONNX_CLASS_NUM,
        actual: scores.len(),
      });
    }

    Ok(ScoreVector(scores))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_requires_onnx_scheme() {
    let url = Url::parse("fixed:0.1").unwrap();
    assert!(matches!(
      OnnxClassifierBuilder::from_url(&url),
      Err(ModelError::ModelPathError(_))
    ));
  }

  #[test]
  fn test_missing_model_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brain_tumor_model.onnx");
    let url = Url::parse(&format!("onnx://{}", path.display())).unwrap();
    let result = OnnxClassifierBuilder::from_url(&url).unwrap().build();
    assert!(matches!(result, Err(ModelError::ModelLoadError(_))));
  }

  #[test]
  fn test_corrupt_model_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.onnx");
    std::fs::write(&path, b"not a protobuf").unwrap();
    let url = Url::parse(&format!("onnx://{}", path.display())).unwrap();
    let result = OnnxClassifierBuilder::from_url(&url).unwrap().build();
    assert!(matches!(result, Err(ModelError::ModelInvalid(_))));
  }
}
