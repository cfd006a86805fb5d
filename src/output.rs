// 该文件是 Naoying （脑影） 项目的一部分。
// src/output.rs - 推理结果整理
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

use serde::{Serialize, Serializer, ser::SerializeMap};
use thiserror::Error;

use crate::model::{WithLabel, friendly_name_of};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("得分数量与类别数量不匹配: 类别 {expected}, 得分 {actual}")]
pub struct ShapeMismatchError {
  pub expected: usize,
  pub actual: usize,
}

/// 按得分降序排列的 (显示名称, 得分) 列表，序列化为保持顺序的 JSON 对象
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedProbabilities(pub Vec<(String, f32)>);

impl RankedProbabilities {
  pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
    self.0.iter().map(|(name, score)| (name.as_str(), *score))
  }

  pub fn names(&self) -> Vec<&str> {
    self.0.iter().map(|(name, _)| name.as_str()).collect()
  }
}

impl Serialize for RankedProbabilities {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (name, score) in &self.0 {
      map.serialize_entry(name, score)?;
    }
    map.end()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
  pub prediction: String,
  pub confidence: f32,
  pub all_probabilities: RankedProbabilities,
}

/// 最大值下标，多个最大值时取最先出现者
///
/// 空序列返回 `None`。NaN 不会被选中，除非全部为 NaN。
pub fn argmax(scores: &[f32]) -> Option<usize> {
  let mut best: Option<usize> = None;
  for (idx, &score) in scores.iter().enumerate() {
    let replace = match best {
      None => true,
      Some(b) => score > scores[b] || (scores[b].is_nan() && !score.is_nan()),
    };
    if replace {
      best = Some(idx);
    }
  }
  best
}

fn display_name<L: WithLabel>(label: &L) -> String {
  friendly_name_of(&label.to_label_str()).to_string()
}

/// 将模型得分整理为对外的预测结果
pub fn format_prediction<L: WithLabel>(
  scores: &[f32],
  labels: &[L],
) -> Result<PredictionResult, ShapeMismatchError> {
  let mismatch = ShapeMismatchError {
    expected: labels.len(),
    actual: scores.len(),
  };
  if scores.len() != labels.len() {
    return Err(mismatch);
  }
  let predicted = argmax(scores).ok_or(mismatch)?;

  let mut ranked: Vec<(String, f32)> = labels
    .iter()
    .zip(scores)
    .map(|(label, &score)| (display_name(label), score))
    .collect();
  // 稳定排序：同分时保留类别声明顺序，NaN 排在最后
  ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
    (false, false) => b.1.total_cmp(&a.1),
    (a_nan, b_nan) => a_nan.cmp(&b_nan),
  });

  Ok(PredictionResult {
    prediction: display_name(&labels[predicted]),
    confidence: scores[predicted],
    all_probabilities: RankedProbabilities(ranked),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::TumorClass;

  #[test]
  fn test_top_class_aligned_with_first_label() {
    let result = format_prediction(&[0.7, 0.1, 0.1, 0.1], &TumorClass::ALL).unwrap();
    assert_eq!(result.prediction, "Glioma Tumor");
    assert_eq!(result.confidence, 0.7);
    assert_eq!(result.all_probabilities.names()[0], "Glioma Tumor");
  }

  #[test]
  fn test_uniform_scores_pick_first_index_every_time() {
    for _ in 0..10 {
      let result = format_prediction(&[0.25; 4], &TumorClass::ALL).unwrap();
      assert_eq!(result.prediction, "Glioma Tumor");
      assert_eq!(result.confidence, 0.25);
      assert_eq!(
        result.all_probabilities.names(),
        [
          "Glioma Tumor",
          "Meningioma Tumor",
          "No Tumor Detected",
          "Pituitary Tumor"
        ]
      );
    }
  }

  #[test]
  fn test_ties_keep_declaration_order() {
    let result = format_prediction(&[0.1, 0.4, 0.4, 0.1], &TumorClass::ALL).unwrap();
    assert_eq!(result.prediction, "Meningioma Tumor");
    assert_eq!(
      result.all_probabilities.names(),
      [
        "Meningioma Tumor",
        "No Tumor Detected",
        "Glioma Tumor",
        "Pituitary Tumor"
      ]
    );
  }

  #[test]
  fn test_probabilities_sorted_descending() {
    let result = format_prediction(&[0.05, 0.15, 0.2, 0.6], &TumorClass::ALL).unwrap();
    assert_eq!(result.prediction, "Pituitary Tumor");
    let scores: Vec<f32> = result.all_probabilities.iter().map(|(_, s)| s).collect();
    assert_eq!(scores, [0.6, 0.2, 0.15, 0.05]);
  }

  #[test]
  fn test_length_mismatch_rejected() {
    let err = format_prediction(&[0.5, 0.5], &TumorClass::ALL).unwrap_err();
    assert_eq!(
      err,
      ShapeMismatchError {
        expected: 4,
        actual: 2
      }
    );
    assert!(format_prediction(&[0.2; 5], &TumorClass::ALL).is_err());
    assert!(format_prediction::<TumorClass>(&[], &[]).is_err());
  }

  #[test]
  fn test_nan_never_wins_nor_leads() {
    assert_eq!(argmax(&[f32::NAN, 0.3, 0.2]), Some(1));
    let result = format_prediction(&[f32::NAN, 0.3, 0.5, 0.2], &TumorClass::ALL).unwrap();
    assert_eq!(result.prediction, "No Tumor Detected");
    assert_eq!(result.all_probabilities.names()[3], "Glioma Tumor");
  }

  #[derive(Debug)]
  struct RawLabel(&'static str);

  impl WithLabel for RawLabel {
    fn to_label_str(&self) -> String {
      self.0.to_string()
    }
  }

  #[test]
  fn test_unmapped_labels_keep_raw_name() {
    let labels = [RawLabel("no_tumor"), RawLabel("astrocytoma")];
    let result = format_prediction(&[0.3, 0.7], &labels).unwrap();
    assert_eq!(result.prediction, "astrocytoma");
    assert_eq!(
      result.all_probabilities.names(),
      ["astrocytoma", "No Tumor Detected"]
    );
  }

  #[test]
  fn test_serialized_key_order_follows_ranking() {
    let result = format_prediction(&[0.1, 0.2, 0.3, 0.4], &TumorClass::ALL).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let pituitary = json.find("Pituitary Tumor").unwrap();
    let glioma = json.find("Glioma Tumor").unwrap();
    assert!(pituitary < glioma, "{}", json);
  }
}
