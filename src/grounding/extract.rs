// 该文件是 Yaogan （遥感） 项目的一部分。
// src/grounding/extract.rs - 从模型回复文本中提取坐标
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

use std::ops::Range;

use serde_json::Value;
use tracing::{debug, warn};

use crate::quad::QuadBox;

const LITERAL_MARKER: &str = "[[[";

/// 定位文本中第一个 `[[[ ... ]]]` 字面量的字节范围。
///
/// 从标记处开始按 `[` +1、`]` -1 计数，深度首次回到 0 的位置即为结束。
/// 括号都是 ASCII，因此返回的范围总在字符边界上。深度始终不归零时返回 None。
pub fn find_literal_span(text: &str) -> Option<Range<usize>> {
  let start = text.find(LITERAL_MARKER)?;
  let mut depth = 0usize;
  for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
    match byte {
      b'[' => depth += 1,
      b']' => {
        depth -= 1;
        if depth == 0 {
          return Some(start..start + offset + 1);
        }
      }
      _ => {}
    }
  }
  debug!("坐标字面量括号不匹配，起始位置: {}", start);
  None
}

/// 从文本中提取四边形框列表，任何异常都退化为空列表
pub fn extract(text: &str) -> Vec<QuadBox> {
  let Some(span) = find_literal_span(text) else {
    return Vec::new();
  };

  let parsed: Value = match serde_json::from_str(&text[span]) {
    Ok(value) => value,
    Err(e) => {
      warn!("坐标 JSON 解析失败: {}", e);
      return Vec::new();
    }
  };

  let Value::Array(mut boxes) = parsed else {
    return Vec::new();
  };

  // 模型有时多包一层，如 `[[[[x, y], ...]]]`
  while boxes.len() == 1 && is_wrapper(&boxes[0]) {
    let Some(Value::Array(inner)) = boxes.pop() else {
      break;
    };
    boxes = inner;
  }

  let total = boxes.len();
  let quads: Vec<QuadBox> = boxes
    .iter()
    .filter_map(|raw| match raw {
      Value::Array(points) => QuadBox::from_points(points),
      _ => None,
    })
    .collect();

  if quads.len() != total {
    debug!("丢弃 {} 个形状不符的框", total - quads.len());
  }
  quads
}

/// 由数组组成、自身又不是框的单元素包装层
fn is_wrapper(value: &Value) -> bool {
  match value {
    Value::Array(items) => {
      !items.is_empty()
        && items.iter().all(Value::is_array)
        && QuadBox::from_points(items).is_none()
    }
    _ => false,
  }
}

/// 回复字段可能不是字符串，非字符串一律视为没有坐标
pub fn extract_value(value: Option<&Value>) -> Vec<QuadBox> {
  match value {
    Some(Value::String(text)) => extract(text),
    _ => Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quad::Point;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[test]
  fn empty_and_non_string_inputs() {
    assert!(extract("").is_empty());
    assert!(extract_value(None).is_empty());
    assert!(extract_value(Some(&Value::Null)).is_empty());
    assert!(extract_value(Some(&json!(42))).is_empty());
    assert!(extract("no brackets here").is_empty());
  }

  #[test]
  fn extracts_single_box_from_prose() {
    let quads = extract("prefix [[[[1,2],[3,4],[5,6],[7,8]]]] suffix");
    assert_eq!(
      quads,
      vec![QuadBox::new([
        Point::new(1.0, 2.0),
        Point::new(3.0, 4.0),
        Point::new(5.0, 6.0),
        Point::new(7.0, 8.0),
      ])]
    );
  }

  #[test]
  fn list_of_boxes_and_wrapped_list_agree() {
    let bare = extract("[[[1,2],[3,4],[5,6],[7,8]]]");
    let wrapped = extract("[[[[1,2],[3,4],[5,6],[7,8]]]]");
    assert_eq!(bare.len(), 1);
    assert_eq!(bare, wrapped);
  }

  #[test]
  fn three_point_box_is_dropped() {
    assert!(extract("[[[1,2],[3,4],[5,6]]]").is_empty());
  }

  #[test]
  fn only_malformed_box_is_dropped() {
    let text = "Found: [[[0.1,0.1],[0.2,0.1],[0.2,0.2],[0.1,0.2]], [[1,1],[2,2]], \
                [[0.5,0.5],[0.6,0.5],[0.6,0.6],[0.5,0.6]]]";
    let quads = extract(text);
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[1].c0, Point::new(0.5, 0.5));
  }

  #[test]
  fn malformed_json_degrades_to_empty() {
    assert!(extract("see [[[1,2],[3,4] oops ]]] end").is_empty());
  }

  #[test]
  fn unbalanced_literal_has_no_span() {
    assert_eq!(find_literal_span("open [[[1,2],[3,4]"), None);
    assert!(extract("open [[[1,2],[3,4]").is_empty());
  }

  #[test]
  fn span_stops_at_first_balance() {
    let text = "a [[[1,2],[3,4],[5,6],[7,8]]] b [[[9,9]]]";
    let span = find_literal_span(text).unwrap();
    assert_eq!(&text[span], "[[[1,2],[3,4],[5,6],[7,8]]]");
  }

  #[test]
  fn span_survives_multibyte_prose() {
    let text = "检测到目标 [[[[1,2],[3,4],[5,6],[7,8]]]] 完成";
    assert_eq!(extract(text).len(), 1);
  }
}
