// 该文件是 Yaogan （遥感） 项目的一部分。
// src/grounding/clean.rs - 去除回复文本中的坐标字面量
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

use once_cell::sync::Lazy;
use regex::Regex;

use super::extract::find_literal_span;

// 只去掉一个结尾标签
static TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\s*(?:bounding\s*boxes?|boxes?|coordinates?)\s*:?\s*$")
    .expect("结尾标签正则无效")
});

/// 去掉坐标字面量及其前导标签词，结果为空时返回原文
pub fn strip(text: &str) -> String {
  let Some(span) = find_literal_span(text) else {
    return text.to_string();
  };

  let before = text[..span.start].trim();
  let after = text[span.end..].trim();
  let joined = format!("{} {}", before, after);
  let cleaned = TRAILING_LABEL.replace(joined.trim(), "");
  let cleaned = cleaned.trim();

  if cleaned.is_empty() {
    text.to_string()
  } else {
    cleaned.to_string()
  }
}
