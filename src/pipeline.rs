// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/pipeline.rs - 目标定位流水线
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
use tracing::{info, warn};

use crate::capture::{CaptureError, CaptureSource};
use crate::detector::{DetectorAdapter, DetectorError};
use crate::geometry::BoundingBox;
use crate::output::DebugSink;
use crate::passthrough::{PassthroughClient, PassthroughError};
use crate::refine::ColorRefiner;

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error(transparent)]
  Capture(#[from] CaptureError),
  #[error(transparent)]
  Detector(#[from] DetectorError),
  #[error(transparent)]
  Passthrough(#[from] PassthroughError),
}

/// 流水线工作模式，构造时确定，生命周期内不再变化。
enum PipelineMode {
  /// 本地检测与细化
  Local {
    adapter: DetectorAdapter,
    refiner: ColorRefiner,
  },
  /// 全部委托给远端
  Delegated { client: Box<dyn PassthroughClient> },
}

/// 目标定位流水线。
///
/// 采集（或外部供帧）→ 粗检测 → 逐框颜色细化；委托模式下把帧
/// 原样转发给远端。结果供下游运动控制客户端消费。
pub struct TargetPipeline {
  mode: PipelineMode,
  capture: Option<Box<dyn CaptureSource>>,
  debug_sink: Option<DebugSink>,
}

impl TargetPipeline {
  /// 本地模式。
  pub fn local(adapter: DetectorAdapter, refiner: ColorRefiner) -> Self {
    Self {
      mode: PipelineMode::Local { adapter, refiner },
      capture: None,
      debug_sink: None,
    }
  }

  /// 委托模式，构造时建立一次远端连接。
  pub fn delegated(mut client: Box<dyn PassthroughClient>) -> Result<Self, PipelineError> {
    client.connect()?;
    info!("远程检测委托已连接");

    Ok(Self {
      mode: PipelineMode::Delegated { client },
      capture: None,
      debug_sink: None,
    })
  }

  pub fn with_capture(mut self, capture: Box<dyn CaptureSource>) -> Self {
    self.capture = Some(capture);
    self
  }

  pub fn with_debug_sink(mut self, debug_sink: DebugSink) -> Self {
    self.debug_sink = Some(debug_sink);
    self
  }

  /// 对一帧做目标定位，返回细化后的框序列与帧的像素宽度。
  ///
  /// `frame` 为 `None` 时从采集设备取一帧；取帧失败直接上抛，
  /// 这一层不做重试。流水线不会在调用之外保留帧的引用。
  pub fn get_targets(
    &mut self,
    frame: Option<&RgbImage>,
  ) -> Result<(Vec<BoundingBox>, u32), PipelineError> {
    let captured;
    let frame = match frame {
      Some(frame) => frame,
      None => {
        let capture = self.capture.as_mut().ok_or(CaptureError::NotConfigured)?;
        captured = capture.get_frame()?;
        &captured
      }
    };

    match &mut self.mode {
      PipelineMode::Delegated { client } => Ok(client.get_targets(frame)?),
      PipelineMode::Local { adapter, refiner } => {
        let frame_width = frame.width();
        let coarse = adapter.detect(frame)?;
        let refined: Vec<BoundingBox> = coarse
          .iter()
          .map(|bbox| refiner.refine(frame, bbox))
          .collect();

        if let Some(sink) = &self.debug_sink {
          if let Err(e) = sink.record(frame, &coarse, &refined) {
            warn!("调试图像写入失败: {}", e);
          }
        }

        Ok((refined, frame_width))
      }
    }
  }
}
