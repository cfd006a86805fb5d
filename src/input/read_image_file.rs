// 该文件是 Naoying （脑影） 项目的一部分。
// src/input/read_image_file.rs - 图像文件读取与归一化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{io::Cursor, path::Path};

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageTensor};

/// 允许上传的图像扩展名（小写比较）
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum NormalizeError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("Image decoding error: {0}")]
  Decode(#[from] image::ImageError),
}

/// 读取图像文件并转换为模型输入张量
///
/// 文件格式根据内容识别，不依赖扩展名。
pub fn normalize_file<P: AsRef<Path>>(path: P) -> Result<ImageTensor, NormalizeError> {
  let path = path.as_ref();
  debug!("读取图像文件: {}", path.display());
  let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
  Ok(to_tensor(image.to_rgb8()))
}

/// 将内存中的图像字节转换为模型输入张量
pub fn normalize_bytes(bytes: &[u8]) -> Result<ImageTensor, NormalizeError> {
  let image = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()?
    .decode()?;
  Ok(to_tensor(image.to_rgb8()))
}

fn to_tensor(image: RgbImage) -> ImageTensor {
  debug!("原始图像尺寸: {}x{}", image.width(), image.height());
  ImageTensor::from(image)
}

const READ_IMAGE_FILE_SCHEME: &str = "image";

/// 单张图像文件输入源，`image:///path/to/scan.png`
pub struct ImageFileInput {
  tensor: Option<ImageTensor>,
}

impl FromUrl for ImageFileInput {
  type Error = NormalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != READ_IMAGE_FILE_SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        READ_IMAGE_FILE_SCHEME,
        url.scheme()
      );
      return Err(NormalizeError::SchemaMismatch);
    }

    let tensor = normalize_file(url.path())?;
    Ok(ImageFileInput {
      tensor: Some(tensor),
    })
  }
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = READ_IMAGE_FILE_SCHEME;
}

impl ImageFileInput {
  pub fn into_nhwc(self) -> ImageFileInputNhwc {
    ImageFileInputNhwc { inner: self }
  }
}

pub struct ImageFileInputNhwc {
  inner: ImageFileInput,
}

impl Iterator for ImageFileInputNhwc {
  type Item = ImageTensor;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.tensor.take()
  }
}
