//! 照合結果の出力

use crate::error::Result;
use label_check_common::LabelReport;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// ファイル名 → 照合結果
pub type ReportMap = BTreeMap<String, LabelReport>;

/// 結果の出力先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    File(PathBuf),
    Stdout,
}

/// 出力先を決める（2件以上ならファイル、1件以下なら標準出力）
pub fn destination_for(reports: &ReportMap, output_path: &Path) -> ReportDestination {
    if reports.len() > 1 {
        ReportDestination::File(output_path.to_path_buf())
    } else {
        ReportDestination::Stdout
    }
}

pub fn render(reports: &ReportMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

pub fn write_reports(reports: &ReportMap, output_path: &Path) -> Result<ReportDestination> {
    let destination = destination_for(reports, output_path);
    let json = render(reports)?;

    match &destination {
        ReportDestination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
        }
        ReportDestination::Stdout => println!("{}", json),
    }

    Ok(destination)
}
