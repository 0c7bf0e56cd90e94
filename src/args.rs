// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;

/// Xunbiao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源（图片文件或 V4L2 设备路径）
  /// 支持格式:
  /// - 图片: *.jpg, *.jpeg, *.png, *.bmp, *.gif, *.webp
  /// - V4L2: /dev/video0 或 v4l2:///dev/video0
  #[arg(long, value_name = "SOURCE")]
  pub input: String,

  /// 序列化推理图文件路径
  #[arg(long, value_name = "FILE")]
  pub model: PathBuf,

  /// 标签表文件路径
  #[arg(long, value_name = "FILE")]
  pub labels: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 颜色细化时允许的最大通道偏差
  #[arg(long, default_value = "40", value_name = "DEVIATION")]
  pub deviation: i16,

  /// 保存标注了检测框的调试图像
  #[arg(long)]
  pub debug: bool,

  /// 检测记录输出文件（JSON 行）
  #[arg(long, value_name = "FILE")]
  pub record: Option<PathBuf>,

  /// 最大处理帧数（仅对摄像头有效，0 表示无限制）
  #[arg(long, default_value = "0", value_name = "COUNT")]
  pub max_frames: u64,
}
