// 该文件是 Yaogan （遥感） 项目的一部分。
// src/input.rs - 推理回复与图像输入
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

use thiserror::Error;

use crate::{FromUrl, FromUrlWithScheme, reply::Exchange};

mod read_image_file;
mod reply_file;

pub use self::read_image_file::{ImageFileInput, ImageFileInputError};
pub use self::reply_file::{ReplyFileInput, ReplyFileInputError};

const STDIN_SCHEME: &str = "stdin";

#[derive(Error, Debug)]
pub enum InputError {
  #[error("回复文件输入错误: {0}")]
  ReplyFileInputError(#[from] ReplyFileInputError),
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum InputWrapper {
  ReplyFile(ReplyFileInput),
  Stdin(ReplyFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ReplyFileInput::SCHEME => Ok(InputWrapper::ReplyFile(ReplyFileInput::from_url(url)?)),
      STDIN_SCHEME => Ok(InputWrapper::Stdin(ReplyFileInput::from_stdin(url)?)),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Exchange;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReplyFile(input) | InputWrapper::Stdin(input) => input.next(),
    }
  }
}
