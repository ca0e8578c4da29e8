// 该文件是 Yaogan （遥感） 项目的一部分。
// src/output/stdout.rs - 标准输出
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

use std::io::Write;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::Scene, history::SavedResponse, output::Render,
  reply::Outcome,
};

#[derive(Error, Debug)]
pub enum StdoutOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// `stdout:` 打印界面结果；`stdout:?saved` 打印回写数据库的内容。每条一行 JSON。
pub struct StdoutOutput {
  saved: bool,
}

impl FromUrlWithScheme for StdoutOutput {
  const SCHEME: &'static str = "stdout";
}

impl FromUrl for StdoutOutput {
  type Error = StdoutOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(StdoutOutputError::SchemeMismatch);
    }
    Ok(StdoutOutput {
      saved: uri.query_pairs().any(|(k, _)| k == "saved"),
    })
  }
}

impl StdoutOutput {
  pub fn to_line(&self, result: &Outcome) -> Result<String, serde_json::Error> {
    if self.saved {
      serde_json::to_string(&SavedResponse::from_outcome(result))
    } else {
      serde_json::to_string(&result.output)
    }
  }
}

impl Render<Scene, Outcome> for StdoutOutput {
  type Error = StdoutOutputError;

  fn render_result(&self, _frame: &Scene, result: &Outcome) -> Result<(), Self::Error> {
    let line = self.to_line(result)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    Ok(())
  }
}
