//! 標本画像ラベル照合ツール
//!
//! 検出モデルでラベル領域を見つけ、OCRで読み取った学名をカタログと照合する。

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod imaging;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod worker;
