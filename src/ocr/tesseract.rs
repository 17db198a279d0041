use super::OcrEngine;
use crate::config::Config;
use crate::error::{LabelCheckError, Result};
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

/// tesseract CLI を呼び出すOCRエンジン
///
/// 画像はPNGにエンコードして標準入力から渡す（一時ファイルなし）。
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    lang: String,
    psm: Option<u8>,
}

impl TesseractCli {
    pub fn new(program: impl Into<String>, lang: impl Into<String>, psm: Option<u8>) -> Self {
        Self {
            program: program.into(),
            lang: lang.into(),
            psm,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ocr_program, &config.ocr_lang, config.ocr_psm)
    }

    fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let mut png: Vec<u8> = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| LabelCheckError::Ocr(format!("画像のエンコードに失敗: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(self.command_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LabelCheckError::Ocr(format!("{} の実行に失敗: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .map_err(|e| LabelCheckError::Ocr(format!("画像の送信に失敗: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| LabelCheckError::Ocr(format!("{} の待機に失敗: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LabelCheckError::Ocr(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
