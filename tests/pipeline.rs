// 该文件是 Xunbiao （寻标） 项目的一部分。
// tests/pipeline.rs - 流水线端到端测试
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

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};

use xunbiao::capture::{CaptureError, CaptureSource, SourceKind};
use xunbiao::detector::{DetectionModel, DetectorAdapter, DetectorError, RawDetection};
use xunbiao::geometry::BoundingBox;
use xunbiao::output::DebugSink;
use xunbiao::passthrough::{PassthroughClient, PassthroughError};
use xunbiao::pipeline::{PipelineError, TargetPipeline};
use xunbiao::refine::ColorRefiner;

/// 按脚本回放固定候选的模型替身。
struct ScriptedModel {
  detections: Vec<RawDetection>,
}

impl DetectionModel for ScriptedModel {
  fn infer(&mut self, _frame: &RgbImage) -> Result<Vec<RawDetection>, DetectorError> {
    Ok(self.detections.clone())
  }
}

fn local_pipeline(detections: Vec<RawDetection>) -> TargetPipeline {
  let adapter = DetectorAdapter::new(Box::new(ScriptedModel { detections }));
  TargetPipeline::local(adapter, ColorRefiner::default())
}

fn uniform_frame(width: u32, height: u32, colour: [u8; 3]) -> RgbImage {
  RgbImage::from_pixel(width, height, Rgb(colour))
}

#[test]
fn local_mode_end_to_end() {
  let frame = uniform_frame(640, 480, [200, 20, 20]);
  let mut pipeline = local_pipeline(vec![RawDetection {
    bbox: [0.2, 0.3, 0.6, 0.5],
    score: 0.8,
    class_id: 1,
  }]);

  let (boxes, frame_width) = pipeline.get_targets(Some(&frame)).unwrap();

  assert_eq!(frame_width, 640);
  assert_eq!(boxes.len(), 1);
  // 纯色帧上轮廓覆盖整个裁剪区，细化框等于粗框的完整范围。
  assert_eq!(boxes[0], BoundingBox::from_origin_and_extent(192, 96, 128, 192));
}

#[test]
fn zero_detections_return_empty_list_not_error() {
  let frame = uniform_frame(640, 480, [50, 50, 50]);
  let mut pipeline = local_pipeline(Vec::new());

  let (boxes, frame_width) = pipeline.get_targets(Some(&frame)).unwrap();

  assert!(boxes.is_empty());
  assert_eq!(frame_width, 640);
}

#[test]
fn low_confidence_detections_are_filtered_end_to_end() {
  let frame = uniform_frame(320, 240, [120, 60, 60]);
  let scores = [0.9, 0.3, 0.5, 0.51, 0.49999];
  let detections = scores
    .iter()
    .map(|&score| RawDetection {
      bbox: [0.1, 0.1, 0.9, 0.9],
      score,
      class_id: 1,
    })
    .collect();
  let mut pipeline = local_pipeline(detections);

  let (boxes, _) = pipeline.get_targets(Some(&frame)).unwrap();

  assert_eq!(boxes.len(), 3);
}

#[test]
fn results_are_bit_identical_across_reruns() {
  let mut frame = uniform_frame(200, 160, [30, 30, 30]);
  for y in 40..90 {
    for x in 60..130 {
      frame.put_pixel(x, y, Rgb([210, 40, 50]));
    }
  }
  let detections = vec![RawDetection {
    bbox: [0.15, 0.2, 0.7, 0.8],
    score: 0.95,
    class_id: 1,
  }];
  let mut pipeline = local_pipeline(detections.clone());
  let mut again = local_pipeline(detections);

  let first = pipeline.get_targets(Some(&frame)).unwrap();
  let second = again.get_targets(Some(&frame)).unwrap();

  assert_eq!(first, second);
}

/// 原样返回固定结果的远端替身。
struct MockPassthrough {
  connects: Arc<AtomicUsize>,
  calls: Arc<AtomicUsize>,
  fail_connect: bool,
}

impl PassthroughClient for MockPassthrough {
  fn connect(&mut self) -> Result<(), PassthroughError> {
    self.connects.fetch_add(1, Ordering::SeqCst);
    if self.fail_connect {
      return Err(PassthroughError("connection refused".to_string()));
    }
    Ok(())
  }

  fn get_targets(
    &mut self,
    _frame: &RgbImage,
  ) -> Result<(Vec<BoundingBox>, u32), PassthroughError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok((vec![BoundingBox::from_origin_and_extent(5, 6, 7, 8)], 999))
  }
}

#[test]
fn delegated_mode_returns_remote_result_verbatim() {
  let connects = Arc::new(AtomicUsize::new(0));
  let calls = Arc::new(AtomicUsize::new(0));
  let client = MockPassthrough {
    connects: connects.clone(),
    calls: calls.clone(),
    fail_connect: false,
  };
  let frame = uniform_frame(64, 64, [0, 0, 0]);

  let mut pipeline = TargetPipeline::delegated(Box::new(client)).unwrap();
  assert_eq!(connects.load(Ordering::SeqCst), 1);

  let (boxes, frame_width) = pipeline.get_targets(Some(&frame)).unwrap();
  // 远端结果原样返回，帧宽也不替换为本地帧的宽度。
  assert_eq!(frame_width, 999);
  assert_eq!(boxes, vec![BoundingBox::from_origin_and_extent(5, 6, 7, 8)]);

  pipeline.get_targets(Some(&frame)).unwrap();
  assert_eq!(connects.load(Ordering::SeqCst), 1);
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn delegated_mode_connect_failure_is_fatal_at_construction() {
  let client = MockPassthrough {
    connects: Arc::new(AtomicUsize::new(0)),
    calls: Arc::new(AtomicUsize::new(0)),
    fail_connect: true,
  };

  assert!(TargetPipeline::delegated(Box::new(client)).is_err());
}

/// 每次调用都给出同一帧的采集替身。
struct MockCapture {
  frame: RgbImage,
}

impl CaptureSource for MockCapture {
  fn get_frame(&mut self) -> Result<RgbImage, CaptureError> {
    Ok(self.frame.clone())
  }

  fn dimensions(&self) -> (u32, u32) {
    self.frame.dimensions()
  }

  fn kind(&self) -> SourceKind {
    SourceKind::Live
  }
}

/// 永远取不到帧的采集替身。
struct DeadCapture;

impl CaptureSource for DeadCapture {
  fn get_frame(&mut self) -> Result<RgbImage, CaptureError> {
    Err(CaptureError::Unavailable("device busy".to_string()))
  }

  fn dimensions(&self) -> (u32, u32) {
    (0, 0)
  }

  fn kind(&self) -> SourceKind {
    SourceKind::Live
  }
}

#[test]
fn capture_collaborator_supplies_missing_frame() {
  let capture = MockCapture {
    frame: uniform_frame(320, 200, [80, 80, 80]),
  };
  let mut pipeline = local_pipeline(Vec::new()).with_capture(Box::new(capture));

  let (boxes, frame_width) = pipeline.get_targets(None).unwrap();

  assert!(boxes.is_empty());
  assert_eq!(frame_width, 320);
}

#[test]
fn capture_unavailable_propagates_without_retry() {
  let mut pipeline = local_pipeline(Vec::new()).with_capture(Box::new(DeadCapture));

  let result = pipeline.get_targets(None);

  assert!(matches!(
    result,
    Err(PipelineError::Capture(CaptureError::Unavailable(_)))
  ));
}

#[test]
fn missing_capture_collaborator_is_an_error() {
  let mut pipeline = local_pipeline(Vec::new());

  assert!(matches!(
    pipeline.get_targets(None),
    Err(PipelineError::Capture(CaptureError::NotConfigured))
  ));
}

#[test]
fn debug_sink_never_affects_returned_data() {
  let frame = uniform_frame(640, 480, [200, 20, 20]);
  let detections = vec![RawDetection {
    bbox: [0.2, 0.3, 0.6, 0.5],
    score: 0.8,
    class_id: 1,
  }];
  let path = std::env::temp_dir().join("xunbiao_pipeline_debug_test.png");

  let mut plain = local_pipeline(detections.clone());
  let mut with_sink =
    local_pipeline(detections).with_debug_sink(DebugSink::with_path(path.clone()));

  let expected = plain.get_targets(Some(&frame)).unwrap();
  let observed = with_sink.get_targets(Some(&frame)).unwrap();

  assert_eq!(observed, expected);
  assert!(path.exists());
  std::fs::remove_file(path).unwrap();
}
