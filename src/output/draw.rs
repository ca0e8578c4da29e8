// 该文件是 Yaogan （遥感） 项目的一部分。
// src/output/draw.rs - 定位结果可视化与记录
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

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
  drawing::{draw_hollow_polygon_mut, draw_polygon_mut},
  point::Point,
};
use tracing::debug;

use crate::{
  grounding::{COORDINATES_HEADER, append_coordinates},
  history::SavedResponse,
  quad::QuadBox,
  reply::Outcome,
};

// 多边形样式
const POLYGON_COLOR: [u8; 3] = [0x00, 0xEE, 0x2C];
const FILL_OPACITY: f32 = 0.15;
const STROKE_WIDTH: u32 = 3;

pub struct Draw {
  stroke_color: Rgb<u8>,
  fill_color: Rgb<u8>,
  fill_opacity: f32,
  stroke_width: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      stroke_color: Rgb(POLYGON_COLOR),
      fill_color: Rgb(POLYGON_COLOR),
      fill_opacity: FILL_OPACITY,
      stroke_width: STROKE_WIDTH,
    }
  }
}

/// 去掉相邻重复的顶点，不足三个不同顶点时返回 None
fn distinct_vertices<T: PartialEq + Copy>(points: &[T]) -> Option<Vec<T>> {
  let mut vertices: Vec<T> = Vec::with_capacity(points.len());
  for &point in points {
    if vertices.last() != Some(&point) {
      vertices.push(point);
    }
  }
  while vertices.len() > 1 && vertices.first() == vertices.last() {
    vertices.pop();
  }
  (vertices.len() >= 3).then_some(vertices)
}

/// 顶点限制在图像四周各扩展一倍宽高的窗口内
fn clamp_to_canvas(pixels: [(f32, f32); 4], width: u32, height: u32) -> [(f32, f32); 4] {
  let (w, h) = (width as f32, height as f32);
  pixels.map(|(x, y)| (x.clamp(-w, 2.0 * w), y.clamp(-h, 2.0 * h)))
}

impl Draw {
  pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
    self.stroke_width = stroke_width;
    self
  }

  pub fn with_fill_opacity(mut self, fill_opacity: f32) -> Self {
    self.fill_opacity = fill_opacity.clamp(0.0, 1.0);
    self
  }

  /// 在图像上绘制所有可渲染的框，返回实际绘制的数量
  pub fn draw_boxes(&self, image: &mut RgbImage, boxes: &[QuadBox]) -> usize {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
      return 0;
    }

    let mut mask = GrayImage::new(width, height);
    let mut outlines = Vec::with_capacity(boxes.len());

    for quad in boxes {
      let Some(pixels) = quad.to_pixels(width, height) else {
        continue;
      };
      let pixels = clamp_to_canvas(pixels, width, height);

      let filled: Vec<Point<i32>> = pixels
        .iter()
        .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
      let Some(filled) = distinct_vertices(&filled) else {
        debug!("跳过退化的多边形: {:?}", pixels);
        continue;
      };
      draw_polygon_mut(&mut mask, &filled, Luma([u8::MAX]));

      let outline: Vec<Point<f32>> = pixels.iter().map(|&(x, y)| Point::new(x, y)).collect();
      if let Some(outline) = distinct_vertices(&outline) {
        outlines.push(outline);
      }
    }

    self.blend_fill(image, &mask);
    for outline in &outlines {
      self.stroke(image, outline);
    }
    outlines.len()
  }

  fn blend_fill(&self, image: &mut RgbImage, mask: &GrayImage) {
    let alpha = self.fill_opacity;
    for (pixel, covered) in image.pixels_mut().zip(mask.pixels()) {
      if covered[0] == 0 {
        continue;
      }
      for (channel, fill) in pixel.0.iter_mut().zip(self.fill_color.0) {
        *channel = ((1.0 - alpha) * (*channel as f32) + alpha * (fill as f32)).round() as u8;
      }
    }
  }

  // 以轮廓为中心平移多次来加粗线条
  fn stroke(&self, image: &mut RgbImage, outline: &[Point<f32>]) {
    let half = (self.stroke_width / 2) as i32;
    for offset in -half..=half {
      let offset = offset as f32;
      for (dx, dy) in [(offset, 0.0), (0.0, offset)] {
        let shifted: Vec<Point<f32>> = outline
          .iter()
          .map(|p| Point::new(p.x + dx, p.y + dy))
          .collect();
        draw_hollow_polygon_mut(image, &shifted, self.stroke_color);
      }
    }
  }
}

/// 记录格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
  /// 叙述文本加坐标列表
  Text,
  /// 回写数据库的 JSON
  Json,
}

pub struct Record {
  pub format: RecordFormat,
}

impl Record {
  pub fn extension(&self) -> &'static str {
    match self.format {
      RecordFormat::Text => "txt",
      RecordFormat::Json => "json",
    }
  }

  pub fn render(&self, outcome: &Outcome) -> Result<String, serde_json::Error> {
    match self.format {
      RecordFormat::Text => {
        let output = &outcome.output;
        if output.display_text.contains(COORDINATES_HEADER) {
          Ok(output.display_text.clone())
        } else {
          Ok(append_coordinates(&output.display_text, &output.coordinates))
        }
      }
      RecordFormat::Json => serde_json::to_string_pretty(&SavedResponse::from_outcome(outcome)),
    }
  }

  /// 写入与 `path` 同名、扩展名为记录格式的文件
  pub fn record(&self, outcome: &Outcome, path: &Path) -> Result<PathBuf, std::io::Error> {
    let content = self.render(outcome).map_err(std::io::Error::other)?;
    let target = path.with_extension(self.extension());
    std::fs::write(&target, content)?;
    Ok(target)
  }
}
