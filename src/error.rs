use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("パスが見つかりません: {0}")]
    PathNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("検出器エラー: {0}")]
    Detector(String),

    #[error("ラベルが検出されませんでした: {0}")]
    NoDetection(String),

    #[error("切り出し領域が空です: {0}")]
    EmptyCrop(String),

    #[error("OCRエラー: {0}")]
    Ocr(String),

    #[error("可視化画像の保存に失敗: {0}")]
    Visualization(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] label_check_common::Error),
}

pub type Result<T> = std::result::Result<T, LabelCheckError>;
