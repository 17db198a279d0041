//! 1画像分のラベル照合処理
//!
//! 画像読み込み → 検出 → 代表検出の選択 → 可視化 → 切り出し → OCR → 照合

use crate::detector::LabelDetector;
use crate::error::{LabelCheckError, Result};
use crate::imaging;
use crate::ocr::OcrEngine;
use crate::report::ReportMap;
use crate::scanner::ImageInfo;
use label_check_common::{
    match_label, select_primary, Catalog, LabelReport, MatchResult, NameCorpus, Roi,
};
use std::path::PathBuf;
use tracing::{debug, warn};

/// 照合ジョブ（期待学名は投入前に解決済み）
#[derive(Debug, Clone)]
pub struct Job {
    pub image: ImageInfo,
    pub expected_name: String,
}

/// 全ワーカーで共有する設定
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub corpus: NameCorpus,
    /// None なら可視化画像を出力しない
    pub visualization_dir: Option<PathBuf>,
}

/// カタログから期待学名を解決してジョブを作る
///
/// 解決できなかった画像はジョブにせず、エラー記録として返す。
pub fn prepare_jobs(images: Vec<ImageInfo>, catalog: &Catalog) -> (Vec<Job>, ReportMap) {
    let mut jobs = Vec::with_capacity(images.len());
    let mut rejected = ReportMap::new();

    for image in images {
        match catalog.expected_name(&image.file_name) {
            Ok(name) => {
                let expected_name = name.to_string();
                jobs.push(Job { image, expected_name });
            }
            Err(e) => {
                let e = LabelCheckError::from(e);
                warn!(file = %image.file_name, error = %e, "カタログ照会に失敗");
                rejected.insert(image.file_name, LabelReport::errored(e.to_string()));
            }
        }
    }

    (jobs, rejected)
}

pub fn check_image(
    detector: &mut dyn LabelDetector,
    ocr: &dyn OcrEngine,
    ctx: &PipelineContext,
    job: &Job,
) -> Result<MatchResult> {
    let file_name = job.image.file_name.as_str();
    let image = imaging::load_image(&job.image.path)?;

    let detections = detector.detect(&job.image.path)?;
    let primary = select_primary(&detections)
        .ok_or_else(|| LabelCheckError::NoDetection(file_name.to_string()))?;
    debug!(file = file_name, detections = detections.len(), score = primary.score, "ラベル検出");

    if let Some(dir) = &ctx.visualization_dir {
        let canvas = imaging::draw_detections(&image, &detections, Some(primary));
        // 可視化は副産物なので失敗しても照合は続ける
        if let Err(e) = imaging::save_visualization(dir, file_name, &canvas) {
            warn!(file = file_name, error = %e, "可視化画像の保存に失敗");
        }
    }

    let roi = Roi::from_bbox(&primary.bbox, image.width(), image.height()).ok_or_else(|| {
        LabelCheckError::EmptyCrop(format!("{} {:?}", file_name, primary.bbox))
    })?;
    let label = imaging::crop(&image, &roi);
    debug!(
        file = file_name,
        region = ?(roi.x, roi.y, roi.x2(), roi.y2()),
        area = roi.area(),
        "ラベル切り出し"
    );

    let text = ocr.recognize(&label)?;
    debug!(file = file_name, chars = text.len(), "OCR完了");

    let result = match_label(&text, &job.expected_name, &ctx.corpus);
    debug!(
        file = file_name,
        matched = result.matched,
        stage = ?result.stage,
        distance = ?result.edit_distance,
        "照合完了"
    );

    Ok(result)
}

/// 失敗をエラー記録に変換する版（バッチ処理はこちらを使う）
pub fn check_image_guarded(
    detector: &mut dyn LabelDetector,
    ocr: &dyn OcrEngine,
    ctx: &PipelineContext,
    job: &Job,
) -> LabelReport {
    match check_image(detector, ocr, ctx, job) {
        Ok(result) => result.into(),
        Err(e) => {
            warn!(file = %job.image.file_name, error = %e, "ラベル照合に失敗");
            LabelReport::errored(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use label_check_common::{Detection, MatchStage};
    use std::path::Path;
    use tempfile::tempdir;

    struct FixedDetector(Vec<Detection>);

    impl LabelDetector for FixedDetector {
        fn detect(&mut self, _image_path: &Path) -> Result<Vec<Detection>> {
            Ok(self.0.clone())
        }
    }

    /// 切り出し画像のサイズを記録して固定文字列を返す
    struct FixedOcr {
        text: String,
        expected_size: (u32, u32),
    }

    impl OcrEngine for FixedOcr {
        fn recognize(&self, image: &DynamicImage) -> Result<String> {
            assert_eq!((image.width(), image.height()), self.expected_size);
            Ok(self.text.clone())
        }
    }

    fn write_image(dir: &Path, name: &str) -> ImageInfo {
        let path = dir.join(name);
        RgbImage::from_pixel(200, 100, Rgb([240, 240, 240]))
            .save(&path)
            .unwrap();
        ImageInfo::from_path(&path)
    }

    fn label_box(score: f64) -> Detection {
        Detection {
            bbox: [20.0, 10.0, 120.0, 60.0],
            score,
            class_name: "label".to_string(),
        }
    }

    fn context(vis: Option<PathBuf>) -> PipelineContext {
        PipelineContext {
            corpus: NameCorpus::new(["Panthera leo", "Canis lupus"]),
            visualization_dir: vis,
        }
    }

    #[test]
    fn test_prepare_jobs_rejects_unknown_files() {
        let catalog = Catalog::from_csv_str(
            "oldFileName,ScientificName\nIMG_0001.jpg,Panthera leo\nIMG_0002.jpg,Canis lupus\n",
        )
        .unwrap();
        let images = vec![
            ImageInfo::from_path(Path::new("/data/IMG_0001.jpg")),
            ImageInfo::from_path(Path::new("/data/IMG_0099.jpg")),
        ];

        let (jobs, rejected) = prepare_jobs(images, &catalog);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].expected_name, "Panthera leo");
        assert!(rejected["IMG_0099.jpg"].is_errored());
    }

    #[test]
    fn test_check_image_matches_label() {
        let dir = tempdir().unwrap();
        let vis_dir = dir.path().join("images");
        let job = Job {
            image: write_image(dir.path(), "IMG_0001.png"),
            expected_name: "Panthera leo".to_string(),
        };
        let mut detector = FixedDetector(vec![label_box(0.4), label_box(0.95)]);
        let ocr = FixedOcr {
            text: "PANTHERA LEO\nSpecimen #123\n".to_string(),
            expected_size: (100, 50),
        };

        let result = check_image(&mut detector, &ocr, &context(Some(vis_dir.clone())), &job).unwrap();
        assert!(result.matched);
        assert_eq!(result.stage, MatchStage::Exact);
        assert!(imaging::visualization_path(&vis_dir, "IMG_0001.png").exists());
    }

    #[test]
    fn test_check_image_no_detection() {
        let dir = tempdir().unwrap();
        let job = Job {
            image: write_image(dir.path(), "IMG_0002.png"),
            expected_name: "Canis lupus".to_string(),
        };
        let mut detector = FixedDetector(Vec::new());
        let ocr = FixedOcr {
            text: String::new(),
            expected_size: (0, 0),
        };

        let err = check_image(&mut detector, &ocr, &context(None), &job).unwrap_err();
        assert!(matches!(err, LabelCheckError::NoDetection(_)));
    }

    #[test]
    fn test_check_image_box_outside_image() {
        let dir = tempdir().unwrap();
        let job = Job {
            image: write_image(dir.path(), "IMG_0003.png"),
            expected_name: "Canis lupus".to_string(),
        };
        let mut detector = FixedDetector(vec![Detection {
            bbox: [300.0, 10.0, 400.0, 60.0],
            score: 0.9,
            class_name: "label".to_string(),
        }]);
        let ocr = FixedOcr {
            text: String::new(),
            expected_size: (0, 0),
        };

        let err = check_image(&mut detector, &ocr, &context(None), &job).unwrap_err();
        assert!(matches!(err, LabelCheckError::EmptyCrop(_)));
    }

    #[test]
    fn test_guarded_records_unreadable_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        let job = Job {
            image: ImageInfo::from_path(&path),
            expected_name: "Canis lupus".to_string(),
        };
        let mut detector = FixedDetector(vec![label_box(0.9)]);
        let ocr = FixedOcr {
            text: String::new(),
            expected_size: (100, 50),
        };

        let report = check_image_guarded(&mut detector, &ocr, &context(None), &job);
        match report {
            LabelReport::Errored(record) => {
                assert!(record.errored);
                assert!(record.error.contains("画像読み込みエラー"));
            }
            other => panic!("Expected errored report, got {:?}", other),
        }
    }
}
