// 该文件是 Yaogan （遥感） 项目的一部分。
// src/reply.rs - 推理服务请求与回复
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

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
  grounding::{GroundingOutput, Interpret, process},
  quad::RawBox,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
  Vqa,
  Grounding,
  Captioning,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("未知任务类型: {0}")]
pub struct UnknownTaskKind(pub String);

impl TaskKind {
  /// 界面显示名
  pub fn label(&self) -> &'static str {
    match self {
      TaskKind::Vqa => "VQA",
      TaskKind::Grounding => "Grounding",
      TaskKind::Captioning => "Captioning",
    }
  }

  /// 回复中按优先级查找正文的字段
  fn text_fields(&self) -> [&'static str; 2] {
    match self {
      TaskKind::Vqa => ["answer", "response"],
      TaskKind::Grounding => ["description", "response"],
      TaskKind::Captioning => ["caption", "response"],
    }
  }
}

impl FromStr for TaskKind {
  type Err = UnknownTaskKind;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "vqa" => Ok(TaskKind::Vqa),
      "grounding" => Ok(TaskKind::Grounding),
      "captioning" => Ok(TaskKind::Captioning),
      _ => Err(UnknownTaskKind(s.to_string())),
    }
  }
}

impl fmt::Display for TaskKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// 推理服务的回复，字段不固定
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct InferenceReply(pub Value);

impl InferenceReply {
  /// 按任务类型选择正文：首个非空字符串字段，找不到时退回整个回复的 JSON
  pub fn text_for(&self, kind: TaskKind) -> String {
    kind
      .text_fields()
      .iter()
      .find_map(|field| match self.0.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
      })
      .unwrap_or_else(|| self.0.to_string())
  }

  /// `coordinates` 字段，缺失或不是数组时为空
  pub fn coordinates(&self) -> Vec<RawBox> {
    match self.0.get("coordinates") {
      Some(Value::Array(items)) => items.iter().cloned().map(RawBox::from).collect(),
      _ => Vec::new(),
    }
  }
}

impl From<Value> for InferenceReply {
  fn from(value: Value) -> Self {
    Self(value)
  }
}

/// 一次提问与回复
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
  pub kind: TaskKind,
  pub prompt: String,
  pub reply: InferenceReply,
}

/// 解析后的一次问答
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
  pub kind: TaskKind,
  pub prompt: String,
  pub output: GroundingOutput,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplyInterpreter {
  can_render: bool,
}

impl Default for ReplyInterpreter {
  fn default() -> Self {
    Self { can_render: true }
  }
}

impl ReplyInterpreter {
  pub fn with_can_render(mut self, can_render: bool) -> Self {
    self.can_render = can_render;
    self
  }

  pub fn can_render(&self) -> bool {
    self.can_render
  }

  pub fn interpret_reply(&self, kind: TaskKind, reply: &InferenceReply) -> GroundingOutput {
    let text = reply.text_for(kind);
    match kind {
      TaskKind::Grounding => process(&text, &reply.coordinates(), self.can_render),
      TaskKind::Vqa | TaskKind::Captioning => {
        debug!("{} 回复不含坐标", kind);
        GroundingOutput::text(text)
      }
    }
  }
}

impl Interpret for ReplyInterpreter {
  type Input = Exchange;
  type Output = Outcome;
  type Error = Infallible;

  fn interpret(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(Outcome {
      kind: input.kind,
      prompt: input.prompt.clone(),
      output: self.interpret_reply(input.kind, &input.reply),
    })
  }
}
