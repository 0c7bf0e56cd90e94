// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/output/record.rs - 检测记录输出
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

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use serde_json::json;

use crate::geometry::BoundingBox;

/// 检测记录输出。
///
/// 每处理一帧就追加一行 JSON，便于离线检查检测质量。
pub struct RecordWriter {
  path: PathBuf,
}

impl RecordWriter {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// 追加一帧的检测结果。
  pub fn append(&self, boxes: &[BoundingBox], frame_width: u32) -> io::Result<()> {
    let targets: Vec<_> = boxes
      .iter()
      .map(|bbox| {
        json!({
          "x_min": bbox.x_min,
          "y_min": bbox.y_min,
          "width": bbox.width,
          "height": bbox.height,
        })
      })
      .collect();

    let line = json!({
      "time": Local::now().to_rfc3339(),
      "frame_width": frame_width,
      "targets": targets,
    });

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?;
    writeln!(file, "{}", line)
  }
}
