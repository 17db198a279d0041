use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "label-check")]
#[command(about = "標本画像のラベル学名をカタログと照合する", long_about = None)]
pub struct Cli {
    /// 画像ファイルまたは画像フォルダのパス
    #[arg(required_unless_present_any = ["show_config", "save_config"])]
    pub path: Option<PathBuf>,

    /// フォルダ指定時に処理する最大枚数（ファイル名順の先頭から）
    pub limit: Option<usize>,

    /// 画像カタログCSV（oldFileName, ScientificName 列）
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// 検出モデルの設定ファイル
    #[arg(long)]
    pub model_config: Option<PathBuf>,

    /// 検出モデルの重みファイル
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// 検出器プロセスの実行ファイル
    #[arg(long)]
    pub detector: Option<String>,

    /// 検出スコアの閾値 (0.0-1.0)
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// OCR言語 (tesseract の -l)
    #[arg(long)]
    pub ocr_lang: Option<String>,

    /// ワーカー数
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// 出力JSONファイル（2枚以上のとき）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 可視化画像の出力先
    #[arg(long)]
    pub vis_dir: Option<PathBuf>,

    /// 可視化画像を出力しない
    #[arg(long)]
    pub no_vis: bool,

    /// 現在の設定を表示
    #[arg(long)]
    pub show_config: bool,

    /// コマンドライン指定を反映した設定を設定ファイルに保存
    #[arg(long)]
    pub save_config: bool,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            catalog_path: self.catalog.clone(),
            detector_program: self.detector.clone(),
            model_config: self.model_config.clone(),
            model_weights: self.weights.clone(),
            score_threshold: self.score_threshold,
            ocr_lang: self.ocr_lang.clone(),
            workers: self.workers,
            output_path: self.output.clone(),
            visualization_dir: self.vis_dir.clone(),
        }
    }
}
