// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/detector/resources.rs - 模型外部资源加载
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

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use super::NUM_CLASSES;

#[derive(Error, Debug)]
pub enum ModelLoadError {
  #[error("无法读取推理图 {path}: {source}")]
  Graph {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无法读取标签表 {path}: {source}")]
  LabelMap {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("标签表条目无效: {0}")]
  InvalidLabelMap(String),
  #[error("标签表中没有类别")]
  EmptyLabelMap,
  #[error("无法建立推理会话: {0}")]
  Session(String),
}

/// 标签表中的一个类别。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
  pub id: u32,
  pub name: String,
}

/// 检测模型的外部资源：序列化推理图与标签表。
///
/// 两个文件都假定存在于本地文件系统；任一加载失败都是构造期的
/// 致命错误，不会推迟到调用时。
pub struct ModelResources {
  graph: Vec<u8>,
  categories: Vec<Category>,
}

impl ModelResources {
  pub fn load(graph_path: &Path, label_map_path: &Path) -> Result<Self, ModelLoadError> {
    let graph = fs::read(graph_path).map_err(|source| ModelLoadError::Graph {
      path: graph_path.to_path_buf(),
      source,
    })?;
    let text = fs::read_to_string(label_map_path).map_err(|source| ModelLoadError::LabelMap {
      path: label_map_path.to_path_buf(),
      source,
    })?;
    let categories = parse_label_map(&text)?;
    if categories.len() > NUM_CLASSES {
      warn!(
        "标签表含 {} 个类别，系统只使用单一目标类别",
        categories.len()
      );
    }

    Ok(Self { graph, categories })
  }

  /// 序列化推理图的原始字节。
  pub fn graph(&self) -> &[u8] {
    &self.graph
  }

  pub fn categories(&self) -> &[Category] {
    &self.categories
  }
}

/// 解析 pbtxt 样式的标签表：
///
/// ```text
/// item {
///   id: 1
///   name: 'target'
/// }
/// ```
fn parse_label_map(text: &str) -> Result<Vec<Category>, ModelLoadError> {
  let mut categories = Vec::new();
  let mut id = None;
  let mut name: Option<String> = None;

  for line in text.lines() {
    let line = line.trim();
    if let Some(value) = line.strip_prefix("id:") {
      let value = value.trim();
      id = Some(
        value
          .parse::<u32>()
          .map_err(|_| ModelLoadError::InvalidLabelMap(value.to_string()))?,
      );
    } else if let Some(value) = line.strip_prefix("name:") {
      name = Some(value.trim().trim_matches(['\'', '"']).to_string());
    }

    if let (Some(item_id), Some(item_name)) = (id, name.as_ref()) {
      categories.push(Category {
        id: item_id,
        name: item_name.clone(),
      });
      id = None;
      name = None;
    }
  }

  if categories.is_empty() {
    return Err(ModelLoadError::EmptyLabelMap);
  }
  Ok(categories)
}
