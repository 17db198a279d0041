use super::LabelDetector;
use crate::config::Config;
use crate::error::{LabelCheckError, Result};
use label_check_common::{parse_detector_response, Detection};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::debug;

/// 常駐型の検出器プロセス
///
/// 起動時に一度だけモデルを読み込ませ、以降は標準入力に画像パスを1行ずつ送り、
/// 標準出力からJSONを1行ずつ受け取る。
pub struct CommandDetector {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl CommandDetector {
    pub fn spawn(config: &Config) -> Result<Self> {
        let mut child = Command::new(&config.detector_program)
            .args(&config.detector_args)
            .arg("--config")
            .arg(&config.model_config)
            .arg("--weights")
            .arg(&config.model_weights)
            .arg("--score-threshold")
            .arg(config.score_threshold.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                LabelCheckError::Detector(format!(
                    "検出器の起動に失敗 ({}): {}",
                    config.detector_program, e
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(LabelCheckError::Detector("検出器の標準入出力を取得できません".into()));
        };

        debug!(pid = child.id(), program = %config.detector_program, "検出器プロセスを起動");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl LabelDetector for CommandDetector {
    fn detect(&mut self, image_path: &Path) -> Result<Vec<Detection>> {
        let path = image_path.display().to_string();
        if path.contains('\n') {
            return Err(LabelCheckError::Detector(format!("改行を含むパスは送れません: {:?}", path)));
        }

        writeln!(self.stdin, "{}", path)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| LabelCheckError::Detector(format!("検出器への送信に失敗: {}", e)))?;

        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| LabelCheckError::Detector(format!("検出器からの受信に失敗: {}", e)))?;

        if read == 0 {
            let status = self.child.try_wait().ok().flatten();
            return Err(LabelCheckError::Detector(format!(
                "検出器プロセスが終了しました (status: {:?})",
                status
            )));
        }

        Ok(parse_detector_response(&line)?)
    }
}

impl Drop for CommandDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell_config(script: &str) -> Config {
        Config {
            detector_program: "sh".into(),
            detector_args: vec!["-c".into(), script.into(), "label-detector".into()],
            ..Config::default()
        }
    }

    #[test]
    fn test_detect_reads_one_line_per_image() {
        let config = shell_config(
            r#"while read path; do echo "{\"detections\":[{\"bbox\":[1,2,30,40],\"score\":0.9,\"class\":\"label\"}]}"; done"#,
        );
        let mut detector = CommandDetector::spawn(&config).unwrap();

        for _ in 0..3 {
            let detections = detector.detect(Path::new("/data/IMG_0001.jpg")).unwrap();
            assert_eq!(detections.len(), 1);
            assert_eq!(detections[0].bbox, [1.0, 2.0, 30.0, 40.0]);
        }
    }

    #[test]
    fn test_detect_receives_model_arguments() {
        // $1.. に --config 以降が渡る
        let config = shell_config(
            r#"read path; if [ "$1" = "--config" ] && [ "$5" = "--score-threshold" ]; then echo '{"detections":[]}'; else echo '{"error":"bad args"}'; fi"#,
        );
        let mut detector = CommandDetector::spawn(&config).unwrap();
        assert!(detector.detect(Path::new("a.jpg")).unwrap().is_empty());
    }

    #[test]
    fn test_detect_reports_process_exit() {
        let config = shell_config("exit 0");
        let mut detector = CommandDetector::spawn(&config).unwrap();
        let err = detector.detect(Path::new("a.jpg")).unwrap_err();
        assert!(matches!(err, LabelCheckError::Detector(_)));
    }

    #[test]
    fn test_detect_reports_detector_error() {
        let config = shell_config(r#"read path; echo '{"error":"cannot read image"}'"#);
        let mut detector = CommandDetector::spawn(&config).unwrap();
        let err = detector.detect(Path::new("a.jpg")).unwrap_err();
        assert!(err.to_string().contains("cannot read image"));
    }

    #[test]
    fn test_spawn_missing_program() {
        let config = Config {
            detector_program: "/nonexistent/label-detector".into(),
            ..Config::default()
        };
        assert!(matches!(
            CommandDetector::spawn(&config),
            Err(LabelCheckError::Detector(_))
        ));
    }
}
