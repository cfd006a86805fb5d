// 该文件是 Naoying （脑影） 项目的一部分。
// src/frame.rs - NHWC 浮点张量定义
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

use image::{RgbImage, imageops};

use crate::input::AsNhwcTensor;

const RGB_CHANNELS: usize = 3;
const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// 分类模型输入宽度
pub const INPUT_WIDTH: u32 = 224;
/// 分类模型输入高度
pub const INPUT_HEIGHT: u32 = 224;

/// 分类模型所需的输入张量，形状为 (1, 224, 224, 3)
pub type ImageTensor = RgbNhwcTensor<INPUT_WIDTH, INPUT_HEIGHT>;

/// 批大小为 1 的 NHWC 排布 RGB 浮点张量，取值范围 [0.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct RgbNhwcTensor<const W: u32, const H: u32> {
  data: Box<[f32]>,
}

impl<const W: u32, const H: u32> Default for RgbNhwcTensor<W, H> {
  fn default() -> Self {
    let size = RGB_CHANNELS * (W as usize) * (H as usize);
    let data = vec![0f32; size].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> RgbNhwcTensor<W, H> {
  /// 张量形状 [batch, height, width, channels]
  pub fn shape(&self) -> [usize; 4] {
    [1, H as usize, W as usize, RGB_CHANNELS]
  }
}

/// 非 W×H 的图像会被直接拉伸到目标尺寸（不裁剪、不补边）
impl<const W: u32, const H: u32> From<RgbImage> for RgbNhwcTensor<W, H> {
  fn from(image: RgbImage) -> Self {
    let image = if image.dimensions() == (W, H) {
      image
    } else {
      imageops::resize(&image, W, H, imageops::FilterType::Nearest)
    };

    let mut tensor = Self::default();
    let slice = tensor.as_mut();

    // RgbImage 的内存布局本身就是 HWC
    for (dst, &src) in slice.iter_mut().zip(image.as_raw().iter()) {
      *dst = src as f32 * PIXEL_SCALE;
    }
    tensor
  }
}

impl<const W: u32, const H: u32> AsMut<[f32]> for RgbNhwcTensor<W, H> {
  fn as_mut(&mut self) -> &mut [f32] {
    &mut self.data
  }
}

impl<const W: u32, const H: u32> AsNhwcTensor<W, H> for RgbNhwcTensor<W, H> {
  fn as_nhwc(&self) -> &[f32] {
    &self.data
  }
}
