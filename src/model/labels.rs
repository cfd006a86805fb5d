// 该文件是 Naoying （脑影） 项目的一部分。
// src/model/labels.rs - 分类标签定义
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use super::WithLabel;

/// 脑部 MRI 分类类别
///
/// 声明顺序必须与训练时的类别顺序一致，模型输出第 i 个得分对应 `ALL[i]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TumorClass {
  Glioma,
  Meningioma,
  NoTumor,
  Pituitary,
}

impl TumorClass {
  pub const ALL: [TumorClass; 4] = [
    TumorClass::Glioma,
    TumorClass::Meningioma,
    TumorClass::NoTumor,
    TumorClass::Pituitary,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      TumorClass::Glioma => "glioma_tumor",
      TumorClass::Meningioma => "meningioma_tumor",
      TumorClass::NoTumor => "no_tumor",
      TumorClass::Pituitary => "pituitary_tumor",
    }
  }

  pub fn from_label_str(label: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.as_str() == label)
  }

  pub const fn friendly_name(&self) -> &'static str {
    match self {
      TumorClass::Glioma => "Glioma Tumor",
      TumorClass::Meningioma => "Meningioma Tumor",
      TumorClass::NoTumor => "No Tumor Detected",
      TumorClass::Pituitary => "Pituitary Tumor",
    }
  }
}

impl WithLabel for TumorClass {
  fn to_label_str(&self) -> String {
    self.as_str().to_string()
  }
}

/// 原始标签字符串到显示名称，未知标签原样返回
pub fn friendly_name_of(label: &str) -> &str {
  match TumorClass::from_label_str(label) {
    Some(class) => class.friendly_name(),
    None => label,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_declaration_order_matches_training_order() {
    let labels: Vec<_> = TumorClass::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(
      labels,
      ["glioma_tumor", "meningioma_tumor", "no_tumor", "pituitary_tumor"]
    );
    for class in TumorClass::ALL {
      assert_eq!(TumorClass::from_label_str(&class.to_label_str()), Some(class));
    }
  }

  #[test]
  fn test_friendly_names() {
    assert_eq!(friendly_name_of("glioma_tumor"), "Glioma Tumor");
    assert_eq!(friendly_name_of("meningioma_tumor"), "Meningioma Tumor");
    assert_eq!(friendly_name_of("no_tumor"), "No Tumor Detected");
    assert_eq!(friendly_name_of("pituitary_tumor"), "Pituitary Tumor");
  }

  #[test]
  fn test_unmapped_label_falls_back_to_raw() {
    assert_eq!(friendly_name_of("astrocytoma"), "astrocytoma");
  }
}
