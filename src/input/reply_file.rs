// 该文件是 Yaogan （遥感） 项目的一部分。
// src/input/reply_file.rs - 推理回复文件输入
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

use std::collections::VecDeque;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  reply::{Exchange, InferenceReply, TaskKind, UnknownTaskKind},
};

#[derive(Error, Debug)]
pub enum ReplyFileInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("回复 JSON 解析错误 (第 {line} 行): {source}")]
  JsonError {
    line: usize,
    #[source]
    source: serde_json::Error,
  },
  #[error(transparent)]
  UnknownTaskKind(#[from] UnknownTaskKind),
}

/// `reply:///path/to/reply.json?kind=grounding&prompt=...`
///
/// 文件可以是单个 JSON 回复、回复数组，或每行一个回复的 JSON Lines。
/// 未指定 `kind` 时按 grounding 处理。
#[derive(Debug)]
pub struct ReplyFileInput {
  exchanges: VecDeque<Exchange>,
}

impl FromUrlWithScheme for ReplyFileInput {
  const SCHEME: &'static str = "reply";
}

impl FromUrl for ReplyFileInput {
  type Error = ReplyFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplyFileInputError::SchemeMismatch);
    }

    let (kind, prompt) = exchange_options(url)?;
    let content = std::fs::read_to_string(url.path())?;
    let input = Self::parse(&content, kind, &prompt)?;
    info!("读取 {} 条推理回复: {}", input.len(), url.path());
    Ok(input)
  }
}

/// 查询参数中的任务类型与提问
fn exchange_options(url: &Url) -> Result<(TaskKind, String), ReplyFileInputError> {
  let mut kind = TaskKind::Grounding;
  let mut prompt = String::new();
  for (k, v) in url.query_pairs() {
    match k.as_ref() {
      "kind" => kind = v.parse()?,
      "prompt" => prompt = v.into_owned(),
      _ => debug!("忽略未知参数: {}={}", k, v),
    }
  }
  Ok((kind, prompt))
}

impl ReplyFileInput {
  /// `stdin:?kind=...`，从标准输入读取回复
  pub fn from_stdin(url: &Url) -> Result<Self, ReplyFileInputError> {
    let (kind, prompt) = exchange_options(url)?;
    let content = std::io::read_to_string(std::io::stdin())?;
    let input = Self::parse(&content, kind, &prompt)?;
    info!("从标准输入读取 {} 条推理回复", input.len());
    Ok(input)
  }

  pub fn parse(content: &str, kind: TaskKind, prompt: &str) -> Result<Self, ReplyFileInputError> {
    let replies = match serde_json::from_str::<Value>(content) {
      Ok(Value::Array(items)) => items,
      Ok(single) => vec![single],
      Err(_) => Self::parse_lines(content)?,
    };

    let exchanges = replies
      .into_iter()
      .map(|reply| Exchange {
        kind,
        prompt: prompt.to_string(),
        reply: InferenceReply(reply),
      })
      .collect();
    Ok(Self { exchanges })
  }

  fn parse_lines(content: &str) -> Result<Vec<Value>, ReplyFileInputError> {
    content
      .lines()
      .enumerate()
      .filter(|(_, line)| !line.trim().is_empty())
      .map(|(index, line)| {
        serde_json::from_str(line).map_err(|source| ReplyFileInputError::JsonError {
          line: index + 1,
          source,
        })
      })
      .collect()
  }

  pub fn len(&self) -> usize {
    self.exchanges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.exchanges.is_empty()
  }
}

impl Iterator for ReplyFileInput {
  type Item = Exchange;

  fn next(&mut self) -> Option<Self::Item> {
    self.exchanges.pop_front()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn single_object() {
    let input = ReplyFileInput::parse(r#"{"response": "ok"}"#, TaskKind::Vqa, "q").unwrap();
    let exchanges: Vec<_> = input.collect();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].kind, TaskKind::Vqa);
    assert_eq!(exchanges[0].prompt, "q");
  }

  #[test]
  fn json_array_and_lines() {
    let array = ReplyFileInput::parse(r#"[{"a": 1}, {"a": 2}]"#, TaskKind::Grounding, "").unwrap();
    assert_eq!(array.len(), 2);

    let lines =
      ReplyFileInput::parse("{\"a\": 1}\n\n{\"a\": 2}\n{\"a\": 3}\n", TaskKind::Grounding, "")
        .unwrap();
    assert_eq!(lines.len(), 3);
  }

  #[test]
  fn bad_line_reports_position() {
    let err = ReplyFileInput::parse("{\"a\": 1}\n{oops\n", TaskKind::Grounding, "").unwrap_err();
    assert!(matches!(err, ReplyFileInputError::JsonError { line: 2, .. }));
  }

  #[test]
  fn from_url_reads_query() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"caption": "a harbour"}}"#).unwrap();
    let url = Url::parse(&format!(
      "reply://{}?kind=captioning&prompt=describe",
      file.path().display()
    ))
    .unwrap();

    let mut input = ReplyFileInput::from_url(&url).unwrap();
    let exchange = input.next().unwrap();
    assert_eq!(exchange.kind, TaskKind::Captioning);
    assert_eq!(exchange.prompt, "describe");
    assert!(input.next().is_none());
  }

  #[test]
  fn rejects_other_scheme() {
    let url = Url::parse("image:///tmp/a.png").unwrap();
    assert!(matches!(
      ReplyFileInput::from_url(&url),
      Err(ReplyFileInputError::SchemeMismatch)
    ));
  }
}
