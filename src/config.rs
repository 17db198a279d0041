use crate::error::{LabelCheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 画像カタログCSV
    pub catalog_path: PathBuf,
    /// 検出器プロセスの実行ファイル
    pub detector_program: String,
    /// 検出器プロセスへの追加引数
    pub detector_args: Vec<String>,
    /// モデル設定ファイル
    pub model_config: PathBuf,
    /// モデル重みファイル
    pub model_weights: PathBuf,
    /// 検出スコアの閾値
    pub score_threshold: f32,
    pub ocr_program: String,
    pub ocr_lang: String,
    /// tesseract のページ分割モード（未指定ならtesseractの既定値）
    pub ocr_psm: Option<u8>,
    /// ワーカー数
    pub workers: usize,
    /// 結果JSONの出力先
    pub output_path: PathBuf,
    /// 可視化画像の出力先ディレクトリ
    pub visualization_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("datasets/image_metadata.csv"),
            detector_program: "label-detector".into(),
            detector_args: Vec::new(),
            model_config: PathBuf::from("config/mask_rcnn_R_50_FPN_3x.yaml"),
            model_weights: PathBuf::from("output/model_final.pth"),
            score_threshold: 0.3,
            ocr_program: "tesseract".into(),
            ocr_lang: "eng".into(),
            ocr_psm: None,
            workers: 4,
            output_path: PathBuf::from("check_labels.json"),
            visualization_dir: PathBuf::from("images"),
        }
    }
}

/// CLIから上書きする設定値
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub detector_program: Option<String>,
    pub model_config: Option<PathBuf>,
    pub model_weights: Option<PathBuf>,
    pub score_threshold: Option<f32>,
    pub ocr_lang: Option<String>,
    pub workers: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub visualization_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LabelCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("label-check").join("config.json"))
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.catalog_path {
            self.catalog_path = v;
        }
        if let Some(v) = overrides.detector_program {
            self.detector_program = v;
        }
        if let Some(v) = overrides.model_config {
            self.model_config = v;
        }
        if let Some(v) = overrides.model_weights {
            self.model_weights = v;
        }
        if let Some(v) = overrides.score_threshold {
            self.score_threshold = v;
        }
        if let Some(v) = overrides.ocr_lang {
            self.ocr_lang = v;
        }
        if let Some(v) = overrides.workers {
            self.workers = v;
        }
        if let Some(v) = overrides.output_path {
            self.output_path = v;
        }
        if let Some(v) = overrides.visualization_dir {
            self.visualization_dir = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(LabelCheckError::Config("ワーカー数は1以上を指定してください".into()));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(LabelCheckError::Config(format!(
                "検出スコア閾値は0.0〜1.0で指定してください: {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.score_threshold, 0.3);
        assert_eq!(config.output_path, PathBuf::from("check_labels.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/label-check/config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"workers": 2, "ocr_psm": 6}"#).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.ocr_psm, Some(6));
        assert_eq!(config.ocr_program, "tesseract");
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("label-check-test-config");
        let path = dir.join("config.json");
        let mut config = Config::default();
        config.detector_program = "python3".into();
        config.detector_args = vec!["detect.py".into()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            workers: Some(8),
            catalog_path: Some(PathBuf::from("meta.csv")),
            ..Default::default()
        });
        assert_eq!(config.workers, 8);
        assert_eq!(config.catalog_path, PathBuf::from("meta.csv"));
        assert_eq!(config.ocr_lang, "eng");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.workers = 0;
        assert!(matches!(config.validate(), Err(LabelCheckError::Config(_))));

        let mut config = Config::default();
        config.score_threshold = 1.5;
        assert!(config.validate().is_err());
    }
}
