// 该文件是 Yaogan （遥感） 项目的一部分。
// src/task.rs - 任务调度
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

use tracing::info;

use crate::{frame::Scene, grounding::Interpret, output::Render};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, scene: &Scene, input: I, model: M, output: O) -> Result<usize, Self::Error>;
}

/// 只处理第一条回复
pub struct OneShotTask;

impl<
  E,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = E>,
  M: Interpret<Input = E, Output = D, Error = ME>,
  O: Render<Scene, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, scene: &Scene, mut input: I, model: M, output: O) -> Result<usize, Self::Error> {
    info!("开始任务...");
    let exchange = input.next().ok_or_else(|| anyhow::anyhow!("没有输入回复"))?;
    let result = model.interpret(&exchange)?;
    output.render_result(scene, &result)?;
    info!("处理完成");
    Ok(1)
  }
}

/// 依次处理全部回复，可限制条数
#[derive(Default, Debug)]
pub struct ContinuousTask {
  limit: Option<usize>,
}

impl ContinuousTask {
  pub fn with_limit(mut self, limit: Option<usize>) -> Self {
    self.limit = limit;
    self
  }
}

impl<
  E,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = E>,
  M: Interpret<Input = E, Output = D, Error = ME>,
  O: Render<Scene, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, scene: &Scene, input: I, model: M, output: O) -> Result<usize, Self::Error> {
    info!("开始任务...");
    let mut count = 0;
    for exchange in input {
      if self.limit.is_some_and(|n| count >= n) {
        info!("达到指定条数 {}, 退出任务循环", count);
        break;
      }
      count += 1;
      info!("处理第 {} 条回复", count);
      let now = std::time::Instant::now();
      let result = model.interpret(&exchange)?;
      output.render_result(scene, &result)?;
      info!("完成，耗时: {:.2?}", now.elapsed());
    }

    info!("任务完成，共处理 {} 条", count);
    Ok(count)
  }
}
