// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/detector/onnx.rs - ONNX Runtime 推理后端
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
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::info;

use super::resources::{ModelLoadError, ModelResources};
use super::{DetectionModel, DetectorError, RawDetection};

const BOXES_OUTPUT: &str = "detection_boxes";
const SCORES_OUTPUT: &str = "detection_scores";
const CLASSES_OUTPUT: &str = "detection_classes";

/// 基于 ONNX Runtime 的检测模型后端。
///
/// 期望 TF 目标检测系导出的 ONNX 图：输入是 uint8 NHWC 图像张量，
/// 输出 `detection_boxes`（归一化 [y_min, x_min, y_max, x_max]）、
/// `detection_scores` 与 `detection_classes`。
pub struct OnnxDetectionModel {
  session: Session,
  input_name: String,
}

impl OnnxDetectionModel {
  /// 由已加载的模型资源建立会话；会话只在这里建立一次。
  pub fn from_resources(resources: &ModelResources) -> Result<Self, ModelLoadError> {
    let session = Session::builder()
      .and_then(|builder| builder.with_intra_threads(4))
      .and_then(|builder| builder.commit_from_memory(resources.graph()))
      .map_err(|e| ModelLoadError::Session(e.to_string()))?;

    let input_name = session
      .inputs
      .first()
      .map(|input| input.name.clone())
      .unwrap_or_else(|| "input_tensor".to_string());

    info!("ONNX 会话已建立，输入张量: {}", input_name);
    Ok(Self {
      session,
      input_name,
    })
  }
}

impl DetectionModel for OnnxDetectionModel {
  fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>, DetectorError> {
    let (width, height) = frame.dimensions();

    let mut input = Array4::<u8>::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in frame.enumerate_pixels() {
      for c in 0..3 {
        input[[0, y as usize, x as usize, c]] = pixel.0[c];
      }
    }

    let tensor =
      TensorRef::from_array_view(&input).map_err(|e| DetectorError::Inference(e.to_string()))?;
    let outputs = self
      .session
      .run(ort::inputs![self.input_name.as_str() => tensor])
      .map_err(|e| DetectorError::Inference(e.to_string()))?;

    let missing = |name: &str| DetectorError::Inference(format!("缺少输出张量 {}", name));
    let failed = |e: ort::Error| DetectorError::Inference(e.to_string());

    let (_, boxes) = outputs
      .get(BOXES_OUTPUT)
      .ok_or_else(|| missing(BOXES_OUTPUT))?
      .try_extract_tensor::<f32>()
      .map_err(failed)?;
    let (_, scores) = outputs
      .get(SCORES_OUTPUT)
      .ok_or_else(|| missing(SCORES_OUTPUT))?
      .try_extract_tensor::<f32>()
      .map_err(failed)?;
    let (_, classes) = outputs
      .get(CLASSES_OUTPUT)
      .ok_or_else(|| missing(CLASSES_OUTPUT))?
      .try_extract_tensor::<f32>()
      .map_err(failed)?;

    let count = scores.len().min(boxes.len() / 4);
    let mut detections = Vec::with_capacity(count);
    for i in 0..count {
      detections.push(RawDetection {
        bbox: [
          boxes[i * 4],
          boxes[i * 4 + 1],
          boxes[i * 4 + 2],
          boxes[i * 4 + 3],
        ],
        score: scores[i],
        class_id: classes.get(i).map(|class| *class as u32).unwrap_or(0),
      });
    }
    Ok(detections)
  }
}
