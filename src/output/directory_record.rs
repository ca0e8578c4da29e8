// 该文件是 Yaogan （遥感） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Scene,
  output::{
    Render,
    draw::{Draw, Record, RecordFormat},
  },
  reply::Outcome,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// `folder:///path/to/dir?record=json&always`
///
/// 按日期分目录保存：有图像时保存标注图，同时写入文本或 JSON 记录。
/// 默认只保存回复中找到框的结果（不能绘制时坐标以文本记录），带 `always` 时全部保存。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  record: Record,
  frame_counter: AtomicU16,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let format = match uri.query_pairs().find(|(k, _)| k == "record") {
      Some((_, v)) if v == "json" => RecordFormat::Json,
      _ => RecordFormat::Text,
    };
    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      draw: Draw::default(),
      record: Record { format },
      frame_counter: AtomicU16::new(0),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl Render<Scene, Outcome> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &Scene, result: &Outcome) -> Result<(), Self::Error> {
    if !self.always && result.output.located == 0 {
      return Ok(());
    }

    let path = self.frame_path()?;
    if let Some(image) = frame.image() {
      let mut image = image.clone();
      self.draw.draw_boxes(&mut image, &result.output.coordinates);
      image.save(&path)?;
    }
    let record = self.record.record(result, &path)?;
    info!("保存记录: {}", record.display());
    Ok(())
  }
}
