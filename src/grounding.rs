// 该文件是 Yaogan （遥感） 项目的一部分。
// src/grounding.rs - 定位回复的坐标提取与整理
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

//! 所有函数都是纯函数：不做 I/O，不持有状态，异常输入只会退化为空结果或原样返回。

pub trait Interpret {
  type Input;
  type Output;
  type Error;

  fn interpret(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

mod clean;
mod extract;
mod normalize;
mod process;
mod validate;

pub use self::clean::strip;
pub use self::extract::{extract, extract_value, find_literal_span};
pub use self::normalize::normalize;
pub use self::process::{
  COORDINATES_HEADER, GroundingOutput, append_coordinates, format_coordinates, process,
};
pub use self::validate::is_renderable;
