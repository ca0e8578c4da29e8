// 该文件是 Yaogan （遥感） 项目的一部分。
// src/quad.rs - 四边形框与坐标点定义
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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CORNER_KEYS: [&str; 4] = ["C0", "C1", "C2", "C3"];

/// 坐标点，可能是归一化坐标 (0-1) 也可能是像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  /// 缺失或非数值的角点
  pub const MISSING: Point = Point {
    x: f64::NAN,
    y: f64::NAN,
  };

  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }

  /// `[x, y]` 形式，非数值分量记为 NaN
  fn from_pair(pair: &[Value]) -> Self {
    Self {
      x: pair.first().and_then(Value::as_f64).unwrap_or(f64::NAN),
      y: pair.get(1).and_then(Value::as_f64).unwrap_or(f64::NAN),
    }
  }

  /// `{x, y}` 形式
  fn from_object(value: Option<&Value>) -> Self {
    match value {
      Some(Value::Object(map)) => Self {
        x: map.get("x").and_then(Value::as_f64).unwrap_or(f64::NAN),
        y: map.get("y").and_then(Value::as_f64).unwrap_or(f64::NAN),
      },
      _ => Self::MISSING,
    }
  }
}

/// 有向四边形框，角点顺序与上游模型输出一致，不做重排
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct QuadBox {
  #[serde(rename = "C0")]
  pub c0: Point,
  #[serde(rename = "C1")]
  pub c1: Point,
  #[serde(rename = "C2")]
  pub c2: Point,
  #[serde(rename = "C3")]
  pub c3: Point,
}

impl QuadBox {
  /// 全部角点缺失的框，校验时必然失败
  pub const MISSING: QuadBox = QuadBox {
    c0: Point::MISSING,
    c1: Point::MISSING,
    c2: Point::MISSING,
    c3: Point::MISSING,
  };

  pub fn new(corners: [Point; 4]) -> Self {
    let [c0, c1, c2, c3] = corners;
    Self { c0, c1, c2, c3 }
  }

  pub fn corners(&self) -> [Point; 4] {
    [self.c0, self.c1, self.c2, self.c3]
  }

  /// 严格的数组形式：恰好 4 个元素，每个都是 2 元素数组
  pub fn from_points(points: &[Value]) -> Option<Self> {
    if points.len() != 4 {
      return None;
    }
    let mut corners = [Point::MISSING; 4];
    for (corner, point) in corners.iter_mut().zip(points) {
      match point {
        Value::Array(pair) if pair.len() == 2 => *corner = Point::from_pair(pair),
        _ => return None,
      }
    }
    Some(Self::new(corners))
  }

  /// 宽松的数组形式：只要求 4 个元素，形状不对的角点记为缺失
  pub fn from_points_lenient(points: &[Value]) -> Option<Self> {
    if points.len() != 4 {
      return None;
    }
    let mut corners = [Point::MISSING; 4];
    for (corner, point) in corners.iter_mut().zip(points) {
      if let Value::Array(pair) = point {
        *corner = Point::from_pair(pair);
      }
    }
    Some(Self::new(corners))
  }

  /// `{C0..C3}` 形式，缺失的角点记为 NaN
  pub fn from_tagged(map: &Map<String, Value>) -> Self {
    let mut corners = [Point::MISSING; 4];
    for (corner, key) in corners.iter_mut().zip(CORNER_KEYS) {
      *corner = Point::from_object(map.get(key));
    }
    Self::new(corners)
  }

  /// 四个角点的坐标都是有限数值
  pub fn is_renderable(&self) -> bool {
    self.corners().iter().all(Point::is_finite)
  }

  /// 将角点投影到像素坐标系；框不可渲染时返回 None
  pub fn to_pixels(&self, width: u32, height: u32) -> Option<[(f32, f32); 4]> {
    if !self.is_renderable() {
      return None;
    }
    let (sx, sy) = match Extent::of(self) {
      Extent::Normalized => (width as f64, height as f64),
      Extent::Absolute => (1.0, 1.0),
    };
    Some(self.corners().map(|p| ((p.x * sx) as f32, (p.y * sy) as f32)))
  }
}

impl From<Value> for QuadBox {
  fn from(value: Value) -> Self {
    match &value {
      Value::Object(map) => Self::from_tagged(map),
      Value::Array(points) => Self::from_points_lenient(points).unwrap_or(Self::MISSING),
      _ => Self::MISSING,
    }
  }
}

/// 坐标系判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
  /// 相对于图像宽高的 0-1 坐标
  Normalized,
  /// 像素坐标
  Absolute,
}

impl Extent {
  /// 任一角点满足 `x <= 1 && y <= 1` 即视为归一化坐标。
  /// 0 或 1 像素处的绝对坐标会被误判，上游模型的坐标约定尚未确认。
  pub fn of(quad: &QuadBox) -> Self {
    if quad.corners().iter().any(|p| p.x <= 1.0 && p.y <= 1.0) {
      Extent::Normalized
    } else {
      Extent::Absolute
    }
  }
}

/// 边界上的原始框表示，只在反序列化时判别一次
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawBox {
  /// `[[x, y], [x, y], [x, y], [x, y]]`
  Points(Vec<Value>),
  /// `{C0: {x, y}, ..., C3: {x, y}}`
  Tagged(QuadBox),
  Other(Value),
}

impl RawBox {
  pub fn is_tagged(&self) -> bool {
    matches!(self, RawBox::Tagged(_))
  }
}

impl From<Value> for RawBox {
  fn from(value: Value) -> Self {
    match value {
      Value::Array(points) => RawBox::Points(points),
      Value::Object(map) if map.get("C0").is_some_and(|c0| !c0.is_null()) => {
        RawBox::Tagged(QuadBox::from_tagged(&map))
      }
      other => RawBox::Other(other),
    }
  }
}

impl From<QuadBox> for RawBox {
  fn from(quad: QuadBox) -> Self {
    RawBox::Tagged(quad)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> QuadBox {
    QuadBox::new([
      Point::new(x0, y0),
      Point::new(x1, y0),
      Point::new(x1, y1),
      Point::new(x0, y1),
    ])
  }

  #[test]
  fn strict_points_require_pairs() {
    let ok = json!([[1, 2], [3, 4], [5, 6], [7, 8]]);
    let quad = QuadBox::from_points(ok.as_array().unwrap()).unwrap();
    assert_eq!(quad.c2, Point::new(5.0, 6.0));

    let bad = json!([[1, 2], [3, 4], [5], [7, 8]]);
    assert!(QuadBox::from_points(bad.as_array().unwrap()).is_none());

    let short = json!([[1, 2], [3, 4], [5, 6]]);
    assert!(QuadBox::from_points(short.as_array().unwrap()).is_none());
  }

  #[test]
  fn non_numeric_pair_becomes_nan() {
    let value = json!([["a", 2], [3, 4], [5, 6], [7, 8]]);
    let quad = QuadBox::from_points(value.as_array().unwrap()).unwrap();
    assert!(quad.c0.x.is_nan());
    assert!(!quad.is_renderable());
  }

  #[test]
  fn tagged_deserialize_tolerates_missing_corner() {
    let quad: QuadBox = serde_json::from_value(json!({
      "C0": {"x": 0.1, "y": 0.2},
      "C1": {"x": 0.3, "y": 0.2},
      "C2": {"x": 0.3, "y": 0.4}
    }))
    .unwrap();
    assert_eq!(quad.c1, Point::new(0.3, 0.2));
    assert!(!quad.c3.is_finite());
  }

  #[test]
  fn serializes_to_at_rest_shape() {
    let quad = square(0.0, 0.0, 1.0, 1.0);
    let value = serde_json::to_value(quad).unwrap();
    assert_eq!(value["C2"], json!({"x": 1.0, "y": 1.0}));
    assert_eq!(value.as_object().unwrap().len(), 4);
  }

  #[test]
  fn raw_box_discriminates_once() {
    let raw: Vec<RawBox> = serde_json::from_value(json!([
      [[1, 2], [3, 4], [5, 6], [7, 8]],
      {"C0": {"x": 1, "y": 2}},
      {"C0": null},
      "noise"
    ]))
    .unwrap();
    assert!(matches!(raw[0], RawBox::Points(_)));
    assert!(raw[1].is_tagged());
    assert!(matches!(raw[2], RawBox::Other(_)));
    assert!(matches!(raw[3], RawBox::Other(_)));
  }

  #[test]
  fn extent_heuristic() {
    assert_eq!(Extent::of(&square(0.1, 0.1, 0.5, 0.5)), Extent::Normalized);
    assert_eq!(Extent::of(&square(10.0, 10.0, 50.0, 50.0)), Extent::Absolute);
    // 原点处的像素坐标会被当作归一化坐标
    assert_eq!(Extent::of(&square(0.0, 0.0, 50.0, 50.0)), Extent::Normalized);
  }

  #[test]
  fn projects_normalized_to_pixels() {
    let pixels = square(0.25, 0.5, 0.75, 1.0).to_pixels(200, 100).unwrap();
    assert_eq!(pixels[0], (50.0, 50.0));
    assert_eq!(pixels[2], (150.0, 100.0));

    let absolute = square(10.0, 20.0, 30.0, 40.0).to_pixels(200, 100).unwrap();
    assert_eq!(absolute[1], (30.0, 20.0));

    assert!(QuadBox::MISSING.to_pixels(200, 100).is_none());
  }
}
