// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/refine.rs - 颜色分割细化
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

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::point::Point;
use tracing::debug;

use crate::geometry::BoundingBox;

/// 推导颜色上下界时使用的最大通道偏差。
pub const RGB_DEVIATION: i16 = 40;

/// 单个检测框的 RGB 颜色范围，由框中心像素的颜色推导。
///
/// 上下界不截断到 [0, 255]：越界的界限在比较时自然饱和，掩膜
/// 结果与截断后一致，也不会发生回绕。
#[derive(Debug, Clone, Copy)]
struct RgbRange {
  lower: [i16; 3],
  upper: [i16; 3],
}

impl RgbRange {
  fn around(colour: Rgb<u8>, deviation: i16) -> Self {
    let mut lower = [0i16; 3];
    let mut upper = [0i16; 3];
    for c in 0..3 {
      lower[c] = colour.0[c] as i16 - deviation;
      upper[c] = colour.0[c] as i16 + deviation;
    }
    Self { lower, upper }
  }

  fn contains(&self, colour: &Rgb<u8>) -> bool {
    (0..3).all(|c| {
      let v = colour.0[c] as i16;
      self.lower[c] <= v && v <= self.upper[c]
    })
  }
}

/// 颜色细化器。
///
/// 以粗检测框中心的颜色为种子，对裁剪区域做颜色分割与轮廓提取，
/// 把粗框收紧到目标实际可见的轮廓。
pub struct ColorRefiner {
  deviation: i16,
}

impl Default for ColorRefiner {
  fn default() -> Self {
    Self::new(RGB_DEVIATION)
  }
}

impl ColorRefiner {
  pub fn new(deviation: i16) -> Self {
    Self { deviation }
  }

  /// 细化一个粗检测框。
  ///
  /// 每个粗框恰好产生一个细化框。无法细化时（零面积框，或掩膜中
  /// 找不到轮廓）原样返回粗框，这是正常结果而不是错误。
  pub fn refine(&self, frame: &RgbImage, coarse: &BoundingBox) -> BoundingBox {
    // 采集来源已把帧统一为 RGB 通道顺序，这里直接按框裁剪。
    let crop = coarse.crop(frame);
    if crop.width() == 0 || crop.height() == 0 {
      debug!("裁剪区域为空，跳过细化: {}", coarse);
      return *coarse;
    }

    // 在裁剪图自己的中心取种子颜色。
    let (cx, cy) = coarse.centre();
    let seed = *crop.get_pixel(cx.min(crop.width() - 1), cy.min(crop.height() - 1));
    let range = RgbRange::around(seed, self.deviation);

    // 三个通道都落在范围内的像素进入掩膜。
    let mask = GrayImage::from_fn(crop.width(), crop.height(), |x, y| {
      if range.contains(crop.get_pixel(x, y)) {
        Luma([255u8])
      } else {
        Luma([0u8])
      }
    });

    match largest_contour_rect(&mask) {
      Some((rx, ry, rw, rh)) => {
        // 局部矩形平移回帧坐标。
        BoundingBox::from_origin_and_extent(coarse.x_min + rx, coarse.y_min + ry, rw, rh)
      }
      None => {
        debug!("掩膜中没有轮廓，保留粗检测框: {}", coarse);
        *coarse
      }
    }
  }
}

/// 在二值掩膜中找出面积最大的轮廓，返回它在掩膜局部坐标系下的
/// 外接矩形 `(x, y, width, height)`；掩膜全空时返回 `None`。
fn largest_contour_rect(mask: &GrayImage) -> Option<(u32, u32, u32, u32)> {
  let contours = find_contours::<u32>(mask);
  let largest = contours.iter().max_by(|a, b| {
    contour_area(&a.points)
      .partial_cmp(&contour_area(&b.points))
      .unwrap_or(std::cmp::Ordering::Equal)
  })?;
  Some(bounding_rect(&largest.points))
}

/// 鞋带公式算出轮廓围成的面积。
fn contour_area(points: &[Point<u32>]) -> f64 {
  if points.len() < 3 {
    return 0.0;
  }
  let mut sum = 0i64;
  for i in 0..points.len() {
    let p = points[i];
    let q = points[(i + 1) % points.len()];
    sum += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
  }
  sum.abs() as f64 / 2.0
}

/// 轮廓点集的外接矩形，宽高按像素闭区间计。
fn bounding_rect(points: &[Point<u32>]) -> (u32, u32, u32, u32) {
  let mut min_x = u32::MAX;
  let mut min_y = u32::MAX;
  let mut max_x = 0u32;
  let mut max_y = 0u32;
  for p in points {
    min_x = min_x.min(p.x);
    min_y = min_y.min(p.y);
    max_x = max_x.max(p.x);
    max_y = max_y.max(p.y);
  }
  (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}
