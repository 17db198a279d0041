mod tesseract;

pub use tesseract::TesseractCli;

use crate::error::Result;
use image::DynamicImage;

/// OCRエンジンの抽象化
pub trait OcrEngine: Send + Sync {
    /// 画像から文字列を読み取る
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}
