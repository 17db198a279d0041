//! ラベル検出器
//!
//! 検出モデル本体は外部プロセスとして扱い、このモジュールはその呼び出し口だけを持つ。

mod process;

pub use process::CommandDetector;

use crate::error::Result;
use label_check_common::Detection;
use std::path::Path;

/// 画像からラベル領域を検出する
///
/// 1ワーカーにつき1インスタンスを生成し、使い回す前提（`&mut self`）。
pub trait LabelDetector {
    fn detect(&mut self, image_path: &Path) -> Result<Vec<Detection>>;
}
