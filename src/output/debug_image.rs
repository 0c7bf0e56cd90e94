// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/output/debug_image.rs - 调试图像输出
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

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::info;

use crate::geometry::BoundingBox;

/// 调试图像的固定输出路径，每次都会被覆盖。
pub const DEBUG_IMAGE_PATH: &str = "target_debug.png";

/// 神经网络粗检测框的颜色
const COARSE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// 颜色/轮廓细化框的颜色
const REFINED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// 调试图像输出。
///
/// 在帧的副本上绘制粗检测框与细化框并保存。只用于人工诊断，
/// 不影响流水线返回的数据。
pub struct DebugSink {
  path: PathBuf,
}

impl Default for DebugSink {
  fn default() -> Self {
    Self {
      path: PathBuf::from(DEBUG_IMAGE_PATH),
    }
  }
}

impl DebugSink {
  pub fn with_path(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// 绘制并保存一帧的标注图。
  pub fn record(
    &self,
    frame: &RgbImage,
    coarse: &[BoundingBox],
    refined: &[BoundingBox],
  ) -> Result<(), image::ImageError> {
    info!(
      "神经网络给出 {} 个框，颜色/轮廓处理后 {} 个框",
      coarse.len(),
      refined.len()
    );

    let mut annotated = frame.clone();
    for bbox in coarse {
      draw_box(&mut annotated, bbox, COARSE_COLOR);
    }
    for bbox in refined {
      draw_box(&mut annotated, bbox, REFINED_COLOR);
    }

    annotated.save(&self.path)
  }
}

fn draw_box(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
  if bbox.width == 0 || bbox.height == 0 {
    return;
  }
  let rect = Rect::at(bbox.x_min as i32, bbox.y_min as i32).of_size(bbox.width, bbox.height);
  draw_hollow_rect_mut(image, rect, color);
}
