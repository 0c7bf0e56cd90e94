// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/capture/mod.rs - 帧采集模块
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

mod image_source;
#[cfg(feature = "v4l2_input")]
mod v4l2_source;

pub use image_source::ImageFileSource;
#[cfg(feature = "v4l2_input")]
pub use v4l2_source::V4l2Capture;

use image::RgbImage;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum CaptureError {
  /// 采集设备没有给出帧（设备忙或已断开）。
  #[error("采集设备不可用: {0}")]
  Unavailable(String),
  #[error("未配置采集设备")]
  NotConfigured,
  #[error("不支持的输入来源: {0}")]
  UnsupportedSource(String),
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
}

/// 输入来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
  /// 静态图片
  Still,
  /// 摄像头
  Live,
}

/// 帧采集来源。
///
/// 每次调用给出一帧，通道顺序统一为 RGB；取不到帧时返回
/// [`CaptureError::Unavailable`]，是否重试由调用方决定。
pub trait CaptureSource {
  fn get_frame(&mut self) -> Result<RgbImage, CaptureError>;

  /// 帧尺寸 (宽, 高)
  fn dimensions(&self) -> (u32, u32);

  /// 获取输入来源类型
  fn kind(&self) -> SourceKind;
}

/// 从字符串描述创建采集来源。
///
/// 支持:
/// - V4L2 摄像头: /dev/video0 或 v4l2:///dev/video0
/// - 图片: *.jpg, *.jpeg, *.png, *.bmp, *.gif, *.webp
pub fn create_capture_source(source: &str) -> Result<Box<dyn CaptureSource>, CaptureError> {
  // 检查是否是 V4L2 设备
  if source.starts_with("/dev/video") || source.starts_with("v4l2://") {
    let device_path = if let Ok(url) = Url::parse(source) {
      urlencoding::decode(url.path())
        .map_err(|e| CaptureError::UnsupportedSource(format!("{}: {}", source, e)))?
        .into_owned()
    } else {
      source.to_string()
    };

    #[cfg(feature = "v4l2_input")]
    return Ok(Box::new(V4l2Capture::new(&device_path)?));
    #[cfg(not(feature = "v4l2_input"))]
    return Err(CaptureError::UnsupportedSource(format!(
      "{} (本构建未启用 v4l2_input 特性)",
      device_path
    )));
  }

  // 检查是否是图片文件
  let lower = source.to_lowercase();
  if lower.ends_with(".jpg")
    || lower.ends_with(".jpeg")
    || lower.ends_with(".png")
    || lower.ends_with(".bmp")
    || lower.ends_with(".gif")
    || lower.ends_with(".webp")
  {
    return Ok(Box::new(ImageFileSource::new(source)?));
  }

  Err(CaptureError::UnsupportedSource(source.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_source_is_rejected() {
    assert!(matches!(
      create_capture_source("ftp://example.com/frame"),
      Err(CaptureError::UnsupportedSource(_))
    ));
  }

  #[test]
  fn missing_image_file_is_unavailable() {
    assert!(create_capture_source("/nonexistent/frame.png").is_err());
  }
}
