// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/capture/v4l2_source.rs - V4L2 摄像头采集来源
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
use tracing::info;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

use super::{CaptureError, CaptureSource, SourceKind};

// 采集分辨率，与下游的测距标定保持一致。
const CAPTURE_WIDTH: u32 = 1600;
const CAPTURE_HEIGHT: u32 = 1200;

/// V4L2 摄像头采集来源。
///
/// 每次取帧都重新打开设备、读一帧再释放，调用之间不保持视频流。
pub struct V4l2Capture {
  device_path: String,
  width: u32,
  height: u32,
}

impl V4l2Capture {
  pub fn new(device_path: &str) -> Result<Self, CaptureError> {
    let device = open_device(device_path)?;
    let format = configure(&device)?;
    info!(
      "摄像头已打开: {} ({}x{})",
      device_path, format.width, format.height
    );

    Ok(Self {
      device_path: device_path.to_string(),
      width: format.width,
      height: format.height,
    })
  }
}

fn open_device(device_path: &str) -> Result<Device, CaptureError> {
  Device::with_path(device_path)
    .map_err(|e| CaptureError::Unavailable(format!("无法打开设备 {}: {}", device_path, e)))
}

fn configure(device: &Device) -> Result<v4l::Format, CaptureError> {
  let mut format = device
    .format()
    .map_err(|e| CaptureError::Unavailable(e.to_string()))?;
  format.width = CAPTURE_WIDTH;
  format.height = CAPTURE_HEIGHT;
  format.fourcc = FourCC::new(b"YUYV");

  // 设备可能会调整到它支持的最接近的格式。
  device
    .set_format(&format)
    .map_err(|e| CaptureError::Unavailable(e.to_string()))
}

impl CaptureSource for V4l2Capture {
  fn get_frame(&mut self) -> Result<RgbImage, CaptureError> {
    let device = open_device(&self.device_path)?;
    let format = configure(&device)?;
    self.width = format.width;
    self.height = format.height;

    let mut stream = Stream::with_buffers(&device, Type::VideoCapture, 4)
      .map_err(|e| CaptureError::Unavailable(format!("无法创建捕获流: {}", e)))?;
    let (buffer, _meta) = stream
      .next()
      .map_err(|e| CaptureError::Unavailable(format!("无法捕获帧: {}", e)))?;

    let rgb = yuyv_to_rgb(buffer);
    RgbImage::from_raw(self.width, self.height, rgb)
      .ok_or_else(|| CaptureError::Unavailable("捕获缓冲区长度不匹配".to_string()))
  }

  fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn kind(&self) -> SourceKind {
    SourceKind::Live
  }
}

/// 将 YUYV 格式转换为 RGB
fn yuyv_to_rgb(yuyv: &[u8]) -> Vec<u8> {
  let mut rgb = Vec::with_capacity(yuyv.len() / 2 * 3);

  for chunk in yuyv.chunks(4) {
    if chunk.len() < 4 {
      break;
    }

    let y0 = chunk[0] as f32;
    let u = chunk[1] as f32 - 128.0;
    let y1 = chunk[2] as f32;
    let v = chunk[3] as f32 - 128.0;

    // 第一个像素
    let r = (y0 + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y0 - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y0 + 1.772 * u).clamp(0.0, 255.0) as u8;
    rgb.extend_from_slice(&[r, g, b]);

    // 第二个像素
    let r = (y1 + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y1 - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y1 + 1.772 * u).clamp(0.0, 255.0) as u8;
    rgb.extend_from_slice(&[r, g, b]);
  }

  rgb
}
