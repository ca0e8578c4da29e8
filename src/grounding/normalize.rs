// 该文件是 Yaogan （遥感） 项目的一部分。
// src/grounding/normalize.rs - 统一已有坐标的表示
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

use tracing::debug;

use crate::quad::{QuadBox, RawBox};

/// 将上游给出的坐标统一为 `QuadBox` 列表。
///
/// 首个元素已是 `{C0..C3}` 形式时整批原样返回，批内其余形式的元素记为全缺失框，
/// 交由校验环节整体拒绝。否则按数组形式处理，只保留 4 元素数组，其余静默丢弃。
pub fn normalize(existing: &[RawBox]) -> Vec<QuadBox> {
  let Some(first) = existing.first() else {
    return Vec::new();
  };

  if first.is_tagged() {
    return existing
      .iter()
      .map(|raw| match raw {
        RawBox::Tagged(quad) => *quad,
        _ => QuadBox::MISSING,
      })
      .collect();
  }

  let quads: Vec<QuadBox> = existing
    .iter()
    .filter_map(|raw| match raw {
      RawBox::Points(points) => QuadBox::from_points_lenient(points),
      _ => None,
    })
    .collect();

  if quads.len() != existing.len() {
    debug!("丢弃 {} 个非数组形式的坐标", existing.len() - quads.len());
  }
  quads
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grounding::extract;
  use crate::quad::Point;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  fn raw(value: serde_json::Value) -> Vec<RawBox> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn empty_input() {
    assert!(normalize(&[]).is_empty());
  }

  #[test]
  fn array_form_maps_positionally() {
    let quads = normalize(&raw(json!([
      [[1, 2], [3, 4], [5, 6], [7, 8]],
      [[1, 2], [3, 4]],
      "junk"
    ])));
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0].c3, Point::new(7.0, 8.0));
  }

  #[test]
  fn tagged_form_passes_through() {
    let extracted = extract("[[[[0.1,0.2],[0.3,0.2],[0.3,0.4],[0.1,0.4]]]]");
    let tagged = raw(serde_json::to_value(&extracted).unwrap());
    assert_eq!(normalize(&tagged), extracted);
  }

  #[test]
  fn mixed_tagged_batch_is_kept_but_unrenderable() {
    let quads = normalize(&raw(json!([
      {"C0": {"x": 1, "y": 1}, "C1": {"x": 2, "y": 1}, "C2": {"x": 2, "y": 2}, "C3": {"x": 1, "y": 2}},
      [[1, 2], [3, 4], [5, 6], [7, 8]]
    ])));
    assert_eq!(quads.len(), 2);
    assert!(quads[0].is_renderable());
    assert!(!quads[1].is_renderable());
  }

  #[test]
  fn array_box_with_bad_point_is_kept() {
    let quads = normalize(&raw(json!([[[1, 2], 3, [5, 6], [7, 8]]])));
    assert_eq!(quads.len(), 1);
    assert!(!quads[0].c1.is_finite());
  }
}
