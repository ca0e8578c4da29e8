// 该文件是 Yaogan （遥感） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use yaogan::{
  FromUrl,
  frame::Scene,
  input::{ImageFileInput, InputWrapper},
  output::OutputWrapper,
  reply::ReplyInterpreter,
  task::{ContinuousTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("回复来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("可绘制标注框: {}", !args.no_render);

  let scene = match &args.image {
    Some(url) => {
      info!("图像: {}", url);
      ImageFileInput::from_url(url)?.into_scene()
    }
    None => Scene::empty(),
  };

  let input = InputWrapper::from_url(&args.input)?;
  let interpreter = ReplyInterpreter::default().with_can_render(!args.no_render);
  let output = OutputWrapper::from_url(&args.output)?;

  let count = ContinuousTask::default()
    .with_limit(args.limit)
    .run_task(&scene, input, interpreter, output)?;
  info!("共处理 {} 条回复", count);

  Ok(())
}
