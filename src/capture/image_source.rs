// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/capture/image_source.rs - 图片文件采集来源
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

use image::{ImageReader, RgbImage};

use super::{CaptureError, CaptureSource, SourceKind};

/// 图片文件采集来源。
///
/// 构造时解码一次，之后每次调用都给出同一帧。
pub struct ImageFileSource {
  image: RgbImage,
}

impl ImageFileSource {
  pub fn new(path: &str) -> Result<Self, CaptureError> {
    let image = ImageReader::open(path)
      .map_err(|e| CaptureError::Unavailable(format!("无法打开图片文件 {}: {}", path, e)))?
      .decode()?
      .to_rgb8();

    Ok(Self { image })
  }
}

impl CaptureSource for ImageFileSource {
  fn get_frame(&mut self) -> Result<RgbImage, CaptureError> {
    Ok(self.image.clone())
  }

  fn dimensions(&self) -> (u32, u32) {
    self.image.dimensions()
  }

  fn kind(&self) -> SourceKind {
    SourceKind::Still
  }
}
