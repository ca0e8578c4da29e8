// 该文件是 Yaogan （遥感） 项目的一部分。
// src/bin/history.rs - 整理已保存的会话记录
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use yaogan::history::{ChatRecord, format_history};

/// 将数据库导出的会话记录整理为界面消息
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 会话记录 JSON 文件
  #[arg(long, value_name = "FILE")]
  pub chat: PathBuf,
  /// 界面无法绘制标注框
  #[arg(long)]
  pub no_render: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  let record = ChatRecord::load(&args.chat)?;
  info!(
    "会话 '{}' ({}): {} 条回复",
    record.title,
    record.image_url,
    record.responses.len()
  );

  let messages = format_history(&record.responses, !args.no_render);
  println!("{}", serde_json::to_string_pretty(&messages)?);

  Ok(())
}
