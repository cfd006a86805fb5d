// 该文件是 Naoying （脑影） 项目的一部分。
// src/model/fixed.rs - 固定得分模型
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::ImageTensor,
  model::{Model, ModelError, ScoreVector},
};

const FIXED_SCHEME: &str = "fixed";

/// 对任意输入都返回同一组得分的模型，用于演示与测试
///
/// `fixed:0.7,0.1,0.1,0.1`
#[derive(Debug, Clone)]
pub struct FixedScores {
  scores: Vec<f32>,
}

impl FixedScores {
  pub fn new(scores: impl Into<Vec<f32>>) -> Self {
    Self {
      scores: scores.into(),
    }
  }
}

impl FromUrl for FixedScores {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != FIXED_SCHEME {
      return Err(ModelError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        FIXED_SCHEME
      )));
    }

    let scores = url
      .path()
      .split(',')
      .map(|s| s.trim().parse::<f32>())
      .collect::<Result<Vec<_>, _>>()
      .map_err(|e| ModelError::ModelPathError(format!("无法解析得分 '{}': {}", url.path(), e)))?;

    Ok(Self::new(scores))
  }
}

impl FromUrlWithScheme for FixedScores {
  const SCHEME: &'static str = FIXED_SCHEME;
}

impl Model for FixedScores {
  type Input = ImageTensor;
  type Output = ScoreVector;
  type Error = ModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("返回固定得分: {:?}", self.scores);
    Ok(ScoreVector(self.scores.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_scores_from_url() {
    let url = Url::parse("fixed:0.25, 0.25,0.25,0.25").unwrap();
    let model = FixedScores::from_url(&url).unwrap();
    assert_eq!(model.scores, vec![0.25; 4]);
  }

  #[test]
  fn test_bad_scores_rejected() {
    let url = Url::parse("fixed:0.5,abc").unwrap();
    assert!(matches!(
      FixedScores::from_url(&url),
      Err(ModelError::ModelPathError(_))
    ));
  }
}
