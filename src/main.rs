use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use label_check_common::{BatchSummary, Catalog};
use specimen_label_check::cli::Cli;
use specimen_label_check::config::Config;
use specimen_label_check::detector::CommandDetector;
use specimen_label_check::error::LabelCheckError;
use specimen_label_check::ocr::TesseractCli;
use specimen_label_check::pipeline::{self, PipelineContext};
use specimen_label_check::report::{self, ReportDestination};
use specimen_label_check::{scanner, worker};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("設定ファイルの読み込みに失敗")?;
    config.apply_overrides(cli.overrides());
    config.validate()?;

    if cli.save_config {
        let path = Config::config_path()?;
        config.save_to(&path)?;
        println!("✔ 設定を保存: {}", path.display());
    }

    if cli.show_config {
        println!("設定:");
        println!("  カタログ: {}", config.catalog_path.display());
        println!("  検出器: {} {}", config.detector_program, config.detector_args.join(" "));
        println!("  モデル設定: {}", config.model_config.display());
        println!("  モデル重み: {}", config.model_weights.display());
        println!("  スコア閾値: {}", config.score_threshold);
        println!("  OCR: {} (-l {})", config.ocr_program, config.ocr_lang);
        println!("  ワーカー数: {}", config.workers);
        println!("  出力: {}", config.output_path.display());
        println!("  可視化: {}", config.visualization_dir.display());
    }

    let Some(input) = cli.path.as_deref() else {
        return Ok(());
    };

    println!("🔎 label-check - ラベル照合\n");

    // 1. 画像スキャン
    println!("[1/4] 画像をスキャン中...");
    let images = scanner::collect_inputs(input, cli.limit)?;
    if images.is_empty() {
        return Err(LabelCheckError::NoImagesFound(input.display().to_string()).into());
    }
    println!("✔ {}枚の画像を検出\n", images.len());

    // 2. カタログ照会
    println!("[2/4] カタログを読み込み中...");
    let catalog = Catalog::from_csv(&config.catalog_path)
        .with_context(|| format!("カタログの読み込みに失敗: {}", config.catalog_path.display()))?;
    let ctx = PipelineContext {
        corpus: catalog.candidate_names(),
        visualization_dir: (!cli.no_vis).then(|| config.visualization_dir.clone()),
    };
    let (jobs, mut reports) = pipeline::prepare_jobs(images, &catalog);
    println!(
        "✔ {}件の学名候補 / 照合対象 {}枚\n",
        ctx.corpus.len(),
        jobs.len()
    );

    // 3. 検出・OCR・照合
    println!("[3/4] ラベルを照合中... (ワーカー{})", config.workers);
    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let ocr = TesseractCli::from_config(&config);
    let checked = worker::run_jobs(
        jobs,
        config.workers,
        |_| CommandDetector::spawn(&config),
        &ocr,
        &ctx,
        |file_name, _| {
            pb.set_message(file_name.to_string());
            pb.inc(1);
        },
    );
    pb.finish_and_clear();
    reports.extend(checked);
    println!("✔ 照合完了\n");

    // 4. 結果出力
    println!("[4/4] 結果を出力中...");
    match report::write_reports(&reports, &config.output_path)? {
        ReportDestination::File(path) => println!("✔ 結果を保存: {}", path.display()),
        ReportDestination::Stdout => {}
    }

    let summary = BatchSummary::from_reports(reports.values());
    println!(
        "\n✅ 完了: {}枚 (一致 {} / 不一致 {} / エラー {})",
        summary.total, summary.matched, summary.unmatched, summary.errored
    );

    Ok(())
}
