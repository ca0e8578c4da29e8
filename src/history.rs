// 该文件是 Yaogan （遥感） 项目的一部分。
// src/history.rs - 会话记录的读取与回写
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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  grounding::{COORDINATES_HEADER, append_coordinates, extract, is_renderable, strip},
  quad::QuadBox,
  reply::{Outcome, TaskKind},
};

#[derive(Error, Debug)]
pub enum HistoryError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("会话记录格式错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("会话接口返回失败: {0}")]
  Rejected(String),
}

/// 数据库中保存的会话
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub cropped_url: Option<String>,
  pub responses: Vec<ResponseEntry>,
}

impl ChatRecord {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
    let path = path.as_ref();
    info!("读取会话记录: {}", path.display());
    let data = std::fs::read(path)?;
    Self::from_value(serde_json::from_slice(&data)?)
  }

  /// 接受会话文档本身，或会话接口返回的 `{success, chats}` 包装
  pub fn from_value(value: Value) -> Result<Self, HistoryError> {
    let value = match value {
      Value::Object(mut map) if map.contains_key("success") => {
        if map.get("success") != Some(&Value::Bool(true)) {
          let message = map
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("未知错误")
            .to_string();
          return Err(HistoryError::Rejected(message));
        }
        map.remove("chats").unwrap_or(Value::Null)
      }
      other => other,
    };
    Ok(serde_json::from_value(value)?)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEntry {
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(default)]
  pub prompt: String,
  #[serde(default)]
  pub response: Value,
  #[serde(default)]
  pub coordinates: Vec<QuadBox>,
  #[serde(default)]
  pub timestamp: Option<DateTime<Utc>>,
}

impl ResponseEntry {
  pub fn task_kind(&self) -> Option<TaskKind> {
    self.kind.parse().ok()
  }

  /// 字符串原样返回，其余 JSON 美化输出
  pub fn response_text(&self) -> String {
    match &self.response {
      Value::String(text) => text.clone(),
      other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
  }
}

/// 界面上的一条历史消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryMessage {
  pub query: String,
  pub response: String,
  pub category: &'static str,
  pub timestamp: DateTime<Utc>,
  pub coordinates: Vec<QuadBox>,
}

pub fn format_entry(entry: &ResponseEntry, can_render: bool) -> HistoryMessage {
  let text = entry.response_text();
  let kind = entry.task_kind();
  if kind.is_none() {
    warn!("未知的回复类型 '{}'，按 Captioning 显示", entry.kind);
  }

  let (response, coordinates) = if kind == Some(TaskKind::Grounding) {
    let (mut display, mut coordinates) = if entry.coordinates.is_empty() {
      (strip(&text), extract(&text))
    } else {
      (text, entry.coordinates.clone())
    };
    if (!can_render || !is_renderable(&coordinates)) && !display.contains(COORDINATES_HEADER) {
      display = append_coordinates(&display, &coordinates);
    }
    if !can_render {
      coordinates.clear();
    }
    (display, coordinates)
  } else {
    (text, Vec::new())
  };

  HistoryMessage {
    query: entry.prompt.clone(),
    response,
    category: kind.unwrap_or(TaskKind::Captioning).label(),
    timestamp: entry.timestamp.unwrap_or_else(Utc::now),
    coordinates,
  }
}

/// 将数据库中的回复列表整理为界面消息
pub fn format_history(entries: &[ResponseEntry], can_render: bool) -> Vec<HistoryMessage> {
  entries
    .iter()
    .map(|entry| format_entry(entry, can_render))
    .collect()
}

/// 保存时写回数据库的回复
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResponse {
  #[serde(rename = "type")]
  pub kind: TaskKind,
  pub prompt: String,
  pub response: String,
  pub coordinates: Vec<QuadBox>,
}

impl SavedResponse {
  pub fn from_outcome(outcome: &Outcome) -> Self {
    Self {
      kind: outcome.kind,
      prompt: outcome.prompt.clone(),
      response: strip(&outcome.output.display_text),
      coordinates: outcome.output.coordinates.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grounding::GroundingOutput;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  fn entry(value: Value) -> ResponseEntry {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn stored_coordinates_are_used_as_is() {
    let message = format_entry(
      &entry(json!({
        "type": "grounding",
        "prompt": "find planes",
        "response": "Two planes.",
        "coordinates": [{
          "C0": {"x": 0.1, "y": 0.1}, "C1": {"x": 0.2, "y": 0.1},
          "C2": {"x": 0.2, "y": 0.2}, "C3": {"x": 0.1, "y": 0.2}
        }],
        "timestamp": "2026-01-02T03:04:05Z"
      })),
      true,
    );
    assert_eq!(message.response, "Two planes.");
    assert_eq!(message.category, "Grounding");
    assert_eq!(message.coordinates.len(), 1);
    assert_eq!(message.timestamp.to_rfc3339(), "2026-01-02T03:04:05+00:00");
  }

  #[test]
  fn literal_in_text_is_extracted() {
    let message = format_entry(
      &entry(json!({
        "type": "Grounding",
        "prompt": "find planes",
        "response": "Planes [[[[1,2],[3,4],[5,6],[7,8]]]]"
      })),
      true,
    );
    assert_eq!(message.response, "Planes");
    assert_eq!(message.coordinates.len(), 1);
  }

  #[test]
  fn listing_is_not_appended_twice() {
    let saved = "Planes\n\nCoordinates:\nBox 1: [1.0000, 2.0000] → [3.0000, 4.0000] → [5.0000, 6.0000] → [7.0000, 8.0000]";
    let message = format_entry(
      &entry(json!({
        "type": "grounding",
        "response": saved,
        "coordinates": [{"C0": {"x": 1, "y": 2}, "C1": {"x": 3, "y": 4}, "C2": {"x": 5, "y": 6}, "C3": {"x": 7, "y": 8}}]
      })),
      false,
    );
    assert_eq!(message.response, saved);
    assert!(message.coordinates.is_empty());
  }

  #[test]
  fn non_string_response_and_unknown_type() {
    let message = format_entry(
      &entry(json!({"type": "ocr", "prompt": "read", "response": {"text": "A1"}})),
      true,
    );
    assert_eq!(message.category, "Captioning");
    assert_eq!(message.response, "{\n  \"text\": \"A1\"\n}");
    assert!(message.coordinates.is_empty());
  }

  #[test]
  fn chat_record_defaults() {
    let record = ChatRecord::from_value(json!({
      "title": "Harbour",
      "imageUrl": "https://example.org/harbour.png",
      "responses": []
    }))
    .unwrap();
    assert!(record.responses.is_empty());
    assert_eq!(record.cropped_url, None);
    assert!(format_history(&record.responses, true).is_empty());
  }

  #[test]
  fn chat_record_requires_responses() {
    let err = ChatRecord::from_value(json!({"title": "Harbour"})).unwrap_err();
    assert!(matches!(err, HistoryError::JsonError(_)));
  }

  #[test]
  fn chat_record_from_envelope() {
    let record = ChatRecord::from_value(json!({
      "success": true,
      "chats": {
        "title": "Harbour",
        "imageUrl": "/uploads/harbour.png",
        "croppedUrl": "/uploads/harbour-crop.png",
        "responses": [{"type": "vqa", "prompt": "how many?", "response": "Two."}]
      }
    }))
    .unwrap();
    assert_eq!(record.title, "Harbour");
    assert_eq!(record.cropped_url.as_deref(), Some("/uploads/harbour-crop.png"));
    assert_eq!(record.responses.len(), 1);

    let err = ChatRecord::from_value(json!({"success": false, "error": "Chat not found"})).unwrap_err();
    assert!(matches!(err, HistoryError::Rejected(ref message) if message == "Chat not found"));

    let err = ChatRecord::from_value(json!({"success": true})).unwrap_err();
    assert!(matches!(err, HistoryError::JsonError(_)));
  }

  #[test]
  fn saved_response_strips_literal() {
    let outcome = Outcome {
      kind: TaskKind::Grounding,
      prompt: "find".into(),
      output: GroundingOutput::text("Ships [[[[1,2],[3,4],[5,6],[7,8]]]]"),
    };
    let value = serde_json::to_value(SavedResponse::from_outcome(&outcome)).unwrap();
    assert_eq!(
      value,
      json!({"type": "grounding", "prompt": "find", "response": "Ships", "coordinates": []})
    );
  }
}
