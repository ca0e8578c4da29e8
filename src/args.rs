// 该文件是 Yaogan （遥感） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

/// Yaogan 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理回复来源
  /// 支持格式:
  /// - 文件: reply:///path/to/reply.json?kind=grounding&prompt=...
  /// - 标准输入: stdin:?kind=vqa
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 被分析的图像，绘制标注时需要
  /// 格式: image:///path/to/scene.png
  #[arg(long, value_name = "IMAGE")]
  pub image: Option<Url>,

  /// 输出路径
  /// 支持格式:
  /// - 标准输出: stdout:  或 stdout:?saved
  /// - 标注图像: image:///path/to/overlay.png?stroke=3&opacity=0.15
  /// - 目录记录: folder:///path/to/dir?record=json&always
  #[arg(long, value_name = "OUTPUT", default_value = "stdout:")]
  pub output: Url,

  /// 界面无法绘制标注框，坐标以文本形式附在回复后
  #[arg(long)]
  pub no_render: bool,

  /// 最多处理的回复条数（不指定表示全部）
  #[arg(long, value_name = "COUNT")]
  pub limit: Option<usize>,
}
