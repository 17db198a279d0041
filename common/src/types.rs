//! 照合結果の型定義
//!
//! CLIとライブラリで共有される型:
//! - MatchResult: 1枚分のラベル照合結果
//! - LabelReport: 照合結果またはエラー記録（JSON出力の単位）
//! - BatchSummary: バッチ全体の集計

use serde::{Deserialize, Serialize};

/// どの段階で判定が確定したか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// 期待学名がOCR文字列にそのまま含まれていた
    Exact,
    /// 編集距離1以下の行があった
    NearExact,
    /// コーパス全体の最近傍が期待学名だった
    Corpus,
    /// いずれの段階でも一致しなかった
    Unmatched,
}

/// ラベル照合結果
///
/// 不一致の場合も診断用に各フィールドを埋めて返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,

    pub stage: MatchStage,

    /// 最も近かったOCR行（完全包含の場合は期待学名を含む行をトリムしたもの）
    pub extracted_line: String,

    /// 最も近かった候補学名（候補が見つからなければ null）
    pub best_candidate_name: Option<String>,

    /// 最良の編集距離（比較対象の行がなければ null）
    pub edit_distance: Option<usize>,

    /// カタログ上の期待学名（小文字化済み）
    pub expected_name: String,
}

/// 画像単位のエラー記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub errored: bool,
    pub error: String,
}

/// 出力JSONの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelReport {
    Checked(MatchResult),
    Errored(ErrorRecord),
}

impl LabelReport {
    pub fn errored(message: impl Into<String>) -> Self {
        LabelReport::Errored(ErrorRecord {
            errored: true,
            error: message.into(),
        })
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, LabelReport::Checked(r) if r.matched)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, LabelReport::Errored(_))
    }
}

impl From<MatchResult> for LabelReport {
    fn from(result: MatchResult) -> Self {
        LabelReport::Checked(result)
    }
}

/// バッチ全体の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn from_reports<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = &'a LabelReport>,
    {
        let mut summary = Self::default();
        for report in reports {
            summary.total += 1;
            match report {
                LabelReport::Checked(r) if r.matched => summary.matched += 1,
                LabelReport::Checked(_) => summary.unmatched += 1,
                LabelReport::Errored(_) => summary.errored += 1,
            }
        }
        summary
    }
}
