// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use xunbiao::capture::{SourceKind, create_capture_source};
use xunbiao::detector::{DetectionModel, DetectorAdapter, ModelResources};
use xunbiao::output::{DebugSink, RecordWriter};
use xunbiao::pipeline::TargetPipeline;
use xunbiao::refine::ColorRefiner;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入来源: {}", args.input);
  info!("推理图路径: {}", args.model.display());
  info!("标签表路径: {}", args.labels.display());

  info!("正在加载模型资源...");
  let resources = ModelResources::load(&args.model, &args.labels)?;
  info!("模型资源加载完成: {} 个类别", resources.categories().len());

  let model = build_model(resources)?;
  let adapter = DetectorAdapter::new(model).with_score_threshold(args.confidence);
  let refiner = ColorRefiner::new(args.deviation);

  let source = create_capture_source(&args.input).context("无法打开输入来源")?;
  let kind = source.kind();
  let (width, height) = source.dimensions();
  info!("输入来源已打开: {}x{}", width, height);

  let mut pipeline = TargetPipeline::local(adapter, refiner).with_capture(source);
  if args.debug {
    pipeline = pipeline.with_debug_sink(DebugSink::default());
  }
  let record = args.record.map(RecordWriter::new);

  let (tx, rx) = std::sync::mpsc::channel();
  ctrlc::set_handler(move || {
    let _ = tx.send(());
  })
  .context("无法设置 Ctrl-C 处理器")?;

  let mut frame_count = 0u64;
  let mut total_targets = 0usize;

  loop {
    let (boxes, frame_width) = pipeline.get_targets(None)?;

    frame_count += 1;
    total_targets += boxes.len();
    info!("帧 {}: {} 个目标 (帧宽 {})", frame_count, boxes.len(), frame_width);
    for bbox in &boxes {
      info!("  - {}", bbox);
    }

    if let Some(record) = &record {
      if let Err(e) = record.append(&boxes, frame_width) {
        warn!("检测记录写入失败: {}", e);
      }
    }

    if kind == SourceKind::Still {
      break;
    }
    if args.max_frames > 0 && frame_count >= args.max_frames {
      info!("已达到最大帧数限制: {}", args.max_frames);
      break;
    }
    if rx.try_recv().is_ok() {
      warn!("收到中断信号，退出处理循环");
      break;
    }
  }

  info!("处理完成: 共 {} 帧, {} 个目标", frame_count, total_targets);
  Ok(())
}

#[cfg(feature = "model_onnx")]
fn build_model(resources: ModelResources) -> Result<Box<dyn DetectionModel>> {
  let model = xunbiao::detector::OnnxDetectionModel::from_resources(&resources)?;
  Ok(Box::new(model))
}

#[cfg(not(feature = "model_onnx"))]
fn build_model(resources: ModelResources) -> Result<Box<dyn DetectionModel>> {
  let _ = resources;
  anyhow::bail!("本构建没有启用推理后端，请使用 --features model_onnx 重新构建")
}
