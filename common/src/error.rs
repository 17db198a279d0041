//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("カタログに必須列がありません: {0}")]
    MissingColumn(String),

    #[error("カタログに該当ファイルがありません: {0}")]
    NotInCatalog(String),

    #[error("カタログに同一ファイルの行が複数あります: {file_name} ({count}行)")]
    DuplicateCatalogEntry { file_name: String, count: usize },

    #[error("Detector error: {0}")]
    Detector(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
