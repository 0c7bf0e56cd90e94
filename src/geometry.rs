// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/geometry.rs - 边界框与坐标变换
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

use std::fmt;

use image::RgbImage;

/// 目标边界框，像素坐标。
///
/// 不变量: `x_max == x_min + width`，`y_max == y_min + height`，
/// 且 `0 <= x_min <= x_max <= 帧宽`（y 方向同理）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
  /// 左边界 x 坐标
  pub x_min: u32,
  /// 右边界 x 坐标
  pub x_max: u32,
  /// 上边界 y 坐标
  pub y_min: u32,
  /// 下边界 y 坐标
  pub y_max: u32,
  /// 框宽度
  pub width: u32,
  /// 框高度
  pub height: u32,
}

impl BoundingBox {
  /// 由检测模型的归一化输出构造边界框。
  ///
  /// `bbox` 为 `[y_min, x_min, y_max, x_max]`，各分量是帧高/帧宽的
  /// 比例，取值 [0, 1]，按帧尺寸缩放后向下取整。退化输入（零面积）
  /// 产生零宽高的框，而不是错误。
  pub fn from_normalized_detection(frame_width: u32, frame_height: u32, bbox: [f32; 4]) -> Self {
    let y_min = (bbox[0] * frame_height as f32).floor() as u32;
    let x_min = (bbox[1] * frame_width as f32).floor() as u32;
    let y_max = (bbox[2] * frame_height as f32).floor() as u32;
    let x_max = (bbox[3] * frame_width as f32).floor() as u32;

    Self {
      x_min,
      x_max: x_max.max(x_min),
      y_min,
      y_max: y_max.max(y_min),
      width: x_max.saturating_sub(x_min),
      height: y_max.saturating_sub(y_min),
    }
  }

  /// 由像素坐标的原点与宽高直接构造边界框。
  pub fn from_origin_and_extent(x_min: u32, y_min: u32, width: u32, height: u32) -> Self {
    Self {
      x_min,
      x_max: x_min + width,
      y_min,
      y_max: y_min + height,
      width,
      height,
    }
  }

  /// 裁剪出帧中被该框覆盖的像素区域 `[y_min:y_max, x_min:x_max]`。
  pub fn crop(&self, frame: &RgbImage) -> RgbImage {
    image::imageops::crop_imm(frame, self.x_min, self.y_min, self.width, self.height).to_image()
  }

  /// 框的中心坐标，相对于框自身的宽高，不是帧坐标。
  ///
  /// 调用方应把它作用在该框自己的裁剪图上。
  pub fn centre(&self) -> (u32, u32) {
    (self.width / 2, self.height / 2)
  }
}

impl fmt::Display for BoundingBox {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "x: {}-{}, y: {}-{}, width: {}, height: {}",
      self.x_min, self.x_max, self.y_min, self.y_max, self.width, self.height
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn from_normalized_detection_scales_and_floors() {
    let bbox = BoundingBox::from_normalized_detection(640, 480, [0.2, 0.3, 0.6, 0.5]);

    assert_eq!(bbox.x_min, 192);
    assert_eq!(bbox.x_max, 320);
    assert_eq!(bbox.y_min, 96);
    assert_eq!(bbox.y_max, 288);
    assert_eq!(bbox.width, 128);
    assert_eq!(bbox.height, 192);
  }

  #[test]
  fn from_normalized_detection_holds_invariants() {
    let cases = [
      [0.0, 0.0, 1.0, 1.0],
      [0.25, 0.125, 0.75, 0.875],
      [0.333, 0.111, 0.999, 0.777],
    ];
    for bbox in cases {
      let b = BoundingBox::from_normalized_detection(1600, 1200, bbox);
      assert_eq!(b.x_max - b.x_min, b.width);
      assert_eq!(b.y_max - b.y_min, b.height);
      assert!(b.x_max <= 1600);
      assert!(b.y_max <= 1200);
    }
  }

  #[test]
  fn degenerate_normalized_input_yields_zero_area() {
    let bbox = BoundingBox::from_normalized_detection(640, 480, [0.5, 0.5, 0.5, 0.5]);

    assert_eq!(bbox.width, 0);
    assert_eq!(bbox.height, 0);
    assert_eq!(bbox.x_min, bbox.x_max);
    assert_eq!(bbox.y_min, bbox.y_max);
  }

  #[test]
  fn from_origin_and_extent_holds_invariants() {
    let bbox = BoundingBox::from_origin_and_extent(192, 96, 128, 192);

    assert_eq!(bbox.x_max, 320);
    assert_eq!(bbox.y_max, 288);
    assert_eq!(bbox.x_max - bbox.x_min, bbox.width);
    assert_eq!(bbox.y_max - bbox.y_min, bbox.height);
  }

  #[test]
  fn centre_is_relative_to_own_extent() {
    let bbox = BoundingBox::from_origin_and_extent(100, 200, 50, 41);

    assert_eq!(bbox.centre(), (25, 20));
  }

  #[test]
  fn crop_covers_the_box_region() {
    let mut frame = RgbImage::from_pixel(40, 30, Rgb([0, 0, 0]));
    frame.put_pixel(10, 5, Rgb([9, 9, 9]));
    let bbox = BoundingBox::from_origin_and_extent(10, 5, 8, 6);

    let crop = bbox.crop(&frame);

    assert_eq!(crop.dimensions(), (8, 6));
    assert_eq!(*crop.get_pixel(0, 0), Rgb([9, 9, 9]));
  }

  #[test]
  fn display_is_human_readable() {
    let bbox = BoundingBox::from_origin_and_extent(1, 2, 3, 4);

    assert_eq!(format!("{}", bbox), "x: 1-4, y: 2-6, width: 3, height: 4");
  }
}
