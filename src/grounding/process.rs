// 该文件是 Yaogan （遥感） 项目的一部分。
// src/grounding/process.rs - 定位回复处理流程
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

use serde::Serialize;
use tracing::debug;

use super::{extract, is_renderable, normalize, strip};
use crate::quad::{QuadBox, RawBox};

pub const COORDINATES_HEADER: &str = "Coordinates:";

/// 处理结果。`can_render` 为假时 `coordinates` 总是空的。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingOutput {
  pub display_text: String,
  pub coordinates: Vec<QuadBox>,
  /// 回复中找到的框数，`coordinates` 被清空后仍保留
  #[serde(skip)]
  pub located: usize,
}

impl GroundingOutput {
  pub fn text(display_text: impl Into<String>) -> Self {
    Self {
      display_text: display_text.into(),
      coordinates: Vec::new(),
      located: 0,
    }
  }
}

/// 坐标的可读文本，形如 `Box 1: [x, y] → [x, y] → [x, y] → [x, y]`，每行一个框
pub fn format_coordinates(boxes: &[QuadBox]) -> String {
  boxes
    .iter()
    .enumerate()
    .map(|(index, quad)| {
      let corners = quad
        .corners()
        .iter()
        .map(|p| format!("[{:.4}, {:.4}]", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" → ");
      format!("Box {}: {}", index + 1, corners)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// 在叙述文本后追加坐标列表，空列表时原样返回
pub fn append_coordinates(display_text: &str, boxes: &[QuadBox]) -> String {
  if boxes.is_empty() {
    return display_text.to_string();
  }
  format!(
    "{}\n\n{}\n{}",
    display_text,
    COORDINATES_HEADER,
    format_coordinates(boxes)
  )
}

pub fn process(raw_response: &str, existing: &[RawBox], can_render: bool) -> GroundingOutput {
  let mut coordinates = normalize(existing);
  if coordinates.is_empty() {
    coordinates = extract(raw_response);
  }

  let located = coordinates.len();
  let mut display_text = strip(raw_response);
  let valid = is_renderable(&coordinates);
  debug!(
    "定位结果: {} 个框, 可渲染: {}, 校验通过: {}",
    coordinates.len(),
    can_render,
    valid
  );

  if !can_render || !valid {
    display_text = append_coordinates(&display_text, &coordinates);
    if !can_render {
      coordinates.clear();
    }
  }

  GroundingOutput {
    display_text,
    coordinates,
    located,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quad::Point;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  const RAW: &str = "Two aircraft on the apron. Coordinates: \
                     [[[[0.1,0.2],[0.3,0.2],[0.3,0.4],[0.1,0.4]], [[0.5,0.5],[0.6,0.5],[0.6,0.7],[0.5,0.7]]]]";

  #[test]
  fn renders_extracted_boxes() {
    let output = process(RAW, &[], true);
    assert_eq!(output.display_text, "Two aircraft on the apron.");
    assert_eq!(output.coordinates, extract(RAW));
    assert_eq!(output.coordinates.len(), 2);
  }

  #[test]
  fn without_renderer_appends_listing_and_drops_boxes() {
    let output = process(RAW, &[], false);
    assert_eq!(
      output.display_text,
      "Two aircraft on the apron.\n\nCoordinates:\n\
       Box 1: [0.1000, 0.2000] → [0.3000, 0.2000] → [0.3000, 0.4000] → [0.1000, 0.4000]\n\
       Box 2: [0.5000, 0.5000] → [0.6000, 0.5000] → [0.6000, 0.7000] → [0.5000, 0.7000]"
    );
    assert!(output.coordinates.is_empty());
    assert_eq!(output.located, 2);
  }

  #[test]
  fn existing_coordinates_take_precedence() {
    let existing: Vec<RawBox> =
      serde_json::from_value(json!([[[10, 20], [30, 20], [30, 40], [10, 40]]])).unwrap();
    let output = process(RAW, &existing, true);
    assert_eq!(output.coordinates.len(), 1);
    assert_eq!(output.coordinates[0].c0, Point::new(10.0, 20.0));
    assert_eq!(output.display_text, "Two aircraft on the apron.");
  }

  #[test]
  fn invalid_boxes_are_listed_and_kept() {
    let existing: Vec<RawBox> =
      serde_json::from_value(json!([[[1, 2], [3, "x"], [5, 6], [7, 8]]])).unwrap();
    let output = process("Nothing else", &existing, true);
    assert_eq!(output.coordinates.len(), 1);
    assert_eq!(
      output.display_text,
      "Nothing else\n\nCoordinates:\n\
       Box 1: [1.0000, 2.0000] → [3.0000, NaN] → [5.0000, 6.0000] → [7.0000, 8.0000]"
    );
  }

  #[test]
  fn plain_text_passes_through() {
    let output = process("No targets found.", &[], true);
    assert_eq!(output, GroundingOutput::text("No targets found."));

    let output = process("No targets found.", &[], false);
    assert_eq!(output, GroundingOutput::text("No targets found."));
  }

  #[test]
  fn serializes_camel_case() {
    let value = serde_json::to_value(GroundingOutput::text("hi")).unwrap();
    assert_eq!(value, json!({"displayText": "hi", "coordinates": []}));
  }
}
