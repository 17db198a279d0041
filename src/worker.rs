//! 固定数ワーカーによるバッチ処理
//!
//! 各ワーカーは起動時に検出器を1度だけ生成し、共有キューからジョブを取り出して処理する。
//! 結果は別チャネルで呼び出し元スレッドに返し、全件揃うまで待つ。

use crate::detector::LabelDetector;
use crate::error::Result;
use crate::ocr::OcrEngine;
use crate::pipeline::{check_image_guarded, Job, PipelineContext};
use crate::report::ReportMap;
use label_check_common::LabelReport;
use std::sync::mpsc;
use std::sync::Mutex;
use tracing::{error, info};

/// ジョブを `workers` 個のワーカーで処理する
///
/// # Arguments
/// * `jobs` - 照合ジョブ
/// * `workers` - ワーカー数（1未満は1として扱う）
/// * `make_detector` - ワーカー番号を受け取り検出器を生成する
/// * `ocr` - 全ワーカーで共有するOCRエンジン
/// * `ctx` - 共有設定
/// * `on_result` - 結果1件ごとに呼び出し元スレッドで呼ばれる
///
/// 検出器の生成に失敗したワーカーは終了する。全ワーカーが終了した時点で
/// 未処理のジョブは生成エラーを理由にエラー記録とする。
pub fn run_jobs<D, F, O, C>(
    jobs: Vec<Job>,
    workers: usize,
    make_detector: F,
    ocr: &O,
    ctx: &PipelineContext,
    mut on_result: C,
) -> ReportMap
where
    D: LabelDetector,
    F: Fn(usize) -> Result<D> + Sync,
    O: OcrEngine,
    C: FnMut(&str, &LabelReport),
{
    let mut reports = ReportMap::new();
    if jobs.is_empty() {
        return reports;
    }

    let workers = workers.max(1).min(jobs.len());
    let (job_tx, job_rx) = mpsc::channel::<Job>();
    for job in jobs {
        // 受信側はまだ生きているので送信は失敗しない
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let job_rx = Mutex::new(job_rx);
    let init_errors: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let (result_tx, result_rx) = mpsc::channel::<(String, LabelReport)>();

    std::thread::scope(|scope| {
        for id in 0..workers {
            let result_tx = result_tx.clone();
            let job_rx = &job_rx;
            let init_errors = &init_errors;
            let make_detector = &make_detector;

            scope.spawn(move || {
                let mut detector = match make_detector(id) {
                    Ok(detector) => detector,
                    Err(e) => {
                        error!(worker = id, error = %e, "検出器の初期化に失敗");
                        if let Ok(mut errors) = init_errors.lock() {
                            errors.push(e.to_string());
                        }
                        return;
                    }
                };
                info!(worker = id, "ワーカー起動");

                let mut processed = 0usize;
                loop {
                    let next = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(job) = next else {
                        break;
                    };

                    let report = check_image_guarded(&mut detector, ocr, ctx, &job);
                    processed += 1;
                    if result_tx.send((job.image.file_name, report)).is_err() {
                        break;
                    }
                }

                info!(worker = id, processed, "ワーカー終了");
            });
        }
        drop(result_tx);

        for (file_name, report) in result_rx {
            on_result(&file_name, &report);
            reports.insert(file_name, report);
        }
    });

    // 全ワーカーが初期化に失敗した場合の残り
    let init_error = init_errors
        .into_inner()
        .ok()
        .and_then(|errors| errors.into_iter().next())
        .unwrap_or_else(|| "ワーカーが利用できません".to_string());

    if let Ok(rx) = job_rx.into_inner() {
        for job in rx.try_iter() {
            let report = LabelReport::errored(format!("検出器の初期化に失敗: {}", init_error));
            on_result(&job.image.file_name, &report);
            reports.insert(job.image.file_name, report);
        }
    }

    reports
}
