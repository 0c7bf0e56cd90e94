// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/detector/mod.rs - 检测模型适配
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

#[cfg(feature = "model_onnx")]
mod onnx;
mod resources;

#[cfg(feature = "model_onnx")]
pub use onnx::OnnxDetectionModel;
pub use resources::{Category, ModelLoadError, ModelResources};

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

use crate::geometry::BoundingBox;

/// 默认置信度阈值，得分低于该值的候选被丢弃。
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// 系统只关心单一目标类别。
pub const NUM_CLASSES: usize = 1;

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("推理失败: {0}")]
  Inference(String),
}

/// 模型输出的一个原始候选。
#[derive(Debug, Clone)]
pub struct RawDetection {
  /// 归一化边界框 [y_min, x_min, y_max, x_max]，取值 [0, 1]
  pub bbox: [f32; 4],
  /// 置信度
  pub score: f32,
  /// 类别编号
  pub class_id: u32,
}

/// 不透明的目标检测模型。
///
/// 推理后端对一帧图像给出候选序列即可；计算图/会话的建立应当
/// 发生在后端构造时，而不是每次调用。`&mut` 表达了会话句柄
/// 单调用方、不可并发的假设。
pub trait DetectionModel {
  fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>, DetectorError>;
}

/// 检测模型适配器。
///
/// 只负责调用模型、按置信度过滤、把归一化候选框换算成像素坐标；
/// 颜色逻辑不在这一层。
pub struct DetectorAdapter {
  model: Box<dyn DetectionModel>,
  score_threshold: f32,
}

impl DetectorAdapter {
  pub fn new(model: Box<dyn DetectionModel>) -> Self {
    Self {
      model,
      score_threshold: DEFAULT_SCORE_THRESHOLD,
    }
  }

  pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
    self.score_threshold = score_threshold;
    self
  }

  /// 对一帧运行检测，返回像素坐标的粗检测框，保持模型给出的顺序。
  ///
  /// 没有合格候选时返回空序列，这是正常结果而不是错误。
  pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<BoundingBox>, DetectorError> {
    let (width, height) = frame.dimensions();
    let raw = self.model.infer(frame)?;
    let total = raw.len();

    let boxes: Vec<BoundingBox> = raw
      .into_iter()
      .filter(|det| det.score >= self.score_threshold)
      .map(|det| BoundingBox::from_normalized_detection(width, height, det.bbox))
      .collect();

    debug!("模型给出 {} 个候选，过滤后剩余 {} 个", total, boxes.len());
    Ok(boxes)
  }
}
