// 该文件是 Yaogan （遥感） 项目的一部分。
// src/output/save_image_file.rs - 保存标注后的图像文件
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

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Scene,
  output::{Render, draw::Draw},
  reply::Outcome,
};

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("参数 {0} 无效: {1}")]
  InvalidParameter(String, String),
  #[error("没有可标注的图像")]
  MissingImage,
}

/// `image:///path/to/overlay.png?stroke=3&opacity=0.15`
pub struct SaveImageFileOutput {
  path: String,
  draw: Draw,
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let mut draw = Draw::default();
    for (k, v) in uri.query_pairs() {
      let invalid = || SaveImageFileError::InvalidParameter(k.to_string(), v.to_string());
      match k.as_ref() {
        "stroke" => draw = draw.with_stroke_width(v.parse().map_err(|_| invalid())?),
        "opacity" => draw = draw.with_fill_opacity(v.parse().map_err(|_| invalid())?),
        _ => debug!("忽略未知参数: {}={}", k, v),
      }
    }

    Ok(SaveImageFileOutput {
      path: uri.path().to_string(),
      draw,
    })
  }
}

impl SaveImageFileOutput {
  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(SaveImageFileError::IoError)?;
    }

    image
      .save(&self.path)
      .map_err(SaveImageFileError::ImageError)?;

    warn!("保存图像到文件: {}", self.path);

    Ok(())
  }
}

impl Render<Scene, Outcome> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &Scene, result: &Outcome) -> Result<(), Self::Error> {
    let mut image = frame
      .image()
      .cloned()
      .ok_or(SaveImageFileError::MissingImage)?;
    let drawn = self.draw.draw_boxes(&mut image, &result.output.coordinates);
    debug!("绘制 {} 个框", drawn);
    self.save_image(image)
  }
}
