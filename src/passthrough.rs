// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/passthrough.rs - 远程检测委托
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

use image::RgbImage;
use thiserror::Error;

use crate::geometry::BoundingBox;

#[derive(Error, Debug)]
#[error("远程检测委托失败: {0}")]
pub struct PassthroughError(pub String);

/// 远程检测委托客户端。
///
/// 委托模式下整条流水线的工作都转发给远端；传输协议由具体实现
/// 决定，不属于本 crate 的范围。
pub trait PassthroughClient {
  /// 建立连接，流水线构造时调用一次。
  fn connect(&mut self) -> Result<(), PassthroughError>;

  /// 把一帧转发给远端，原样返回远端的结果。
  fn get_targets(
    &mut self,
    frame: &RgbImage,
  ) -> Result<(Vec<BoundingBox>, u32), PassthroughError>;
}
