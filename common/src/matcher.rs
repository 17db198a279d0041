//! ラベル文字列照合モジュール
//!
//! OCRで読み取ったラベルの文字列を、カタログ上の学名と照合する。
//!
//! ## 照合フロー
//! 1. 完全包含: 期待学名がOCR文字列に含まれていれば一致
//! 2. 行単位の近似一致: 期待学名との編集距離が1以下の行があれば一致
//! 3. コーパス全体の最近傍探索: 最も近い候補学名が期待学名と同じなら一致
//!
//! 比較はすべて小文字化した上で行う。同距離の場合は先に見つかった方を残す。

use crate::edit_distance::levenshtein;
use crate::types::{MatchResult, MatchStage};
use std::collections::HashSet;

/// この文字数以下の行はノイズとして扱う
pub const NOISE_LINE_MAX_LEN: usize = 9;

/// 近似一致とみなす編集距離（未満）
pub const NEAR_EXACT_DISTANCE: usize = 2;

/// 候補学名のコーパス
///
/// 重複を除き（先勝ち）、2語以上の学名のみ保持する。
#[derive(Debug, Clone, Default)]
pub struct NameCorpus {
    names: Vec<String>,
}

impl NameCorpus {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for name in names {
            let name = name.as_ref().trim().to_lowercase();
            if !is_binomial(&name) {
                continue;
            }
            if seen.insert(name.clone()) {
                unique.push(name);
            }
        }

        Self { names: unique }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.names.iter().any(|n| *n == name)
    }
}

fn is_binomial(name: &str) -> bool {
    name.contains(' ')
}

/// OCR文字列から照合対象の行を取り出す
///
/// 英字と空白以外を除去してトリムし、ノイズ長以下の行を捨てる。
/// 入力は小文字化済みであること。
pub fn candidate_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.chars()
                .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|line| line.chars().count() > NOISE_LINE_MAX_LEN)
        .collect()
}

/// 行長に対する許容距離（切り捨て）
fn tolerance(line: &str, numerator: usize, denominator: usize) -> usize {
    line.chars().count() * numerator / denominator
}

/// OCR文字列と期待学名を照合する
///
/// # Arguments
/// * `ocr_text` - OCRで抽出した生の文字列
/// * `expected_name` - カタログ上の学名
/// * `corpus` - 候補学名のコーパス
///
/// # Returns
/// 照合結果。不一致でも最良の行・候補・距離を含む。
pub fn match_label(ocr_text: &str, expected_name: &str, corpus: &NameCorpus) -> MatchResult {
    let text = ocr_text.to_lowercase();
    let expected = expected_name.trim().to_lowercase();

    // 1. 完全包含
    if !expected.is_empty() {
        if let Some(line) = text.split('\n').find(|line| line.contains(expected.as_str())) {
            return MatchResult {
                matched: true,
                stage: MatchStage::Exact,
                extracted_line: line.trim().to_string(),
                best_candidate_name: Some(expected.clone()),
                edit_distance: Some(0),
                expected_name: expected,
            };
        }
    }

    let lines = candidate_lines(&text);

    // 2. 行単位の近似一致
    let mut best_line: Option<(&str, usize)> = None;
    for line in &lines {
        let distance = levenshtein(&expected, line);
        let improves = best_line.map_or(true, |(_, best)| distance < best);
        if improves && distance <= tolerance(line, 3, 4) {
            best_line = Some((line.as_str(), distance));
        }
    }

    if let Some((line, distance)) = best_line {
        if distance < NEAR_EXACT_DISTANCE {
            return MatchResult {
                matched: true,
                stage: MatchStage::NearExact,
                extracted_line: line.to_string(),
                best_candidate_name: Some(expected.clone()),
                edit_distance: Some(distance),
                expected_name: expected,
            };
        }
    }

    // 3. コーパス全体の最近傍探索
    let mut best_pair: Option<(&str, &str, usize)> = None;
    for name in corpus.names() {
        for line in &lines {
            let distance = levenshtein(line, name);
            let improves = best_pair.map_or(true, |(_, _, best)| distance < best);
            if improves && distance <= tolerance(line, 1, 2) {
                best_pair = Some((name.as_str(), line.as_str(), distance));
            }
        }
    }

    match best_pair {
        Some((name, line, distance)) => {
            let matched = name == expected;
            MatchResult {
                matched,
                stage: if matched { MatchStage::Corpus } else { MatchStage::Unmatched },
                extracted_line: line.to_string(),
                best_candidate_name: Some(name.to_string()),
                edit_distance: Some(distance),
                expected_name: expected,
            }
        }
        None => MatchResult {
            matched: false,
            stage: MatchStage::Unmatched,
            extracted_line: best_line.map(|(line, _)| line.to_string()).unwrap_or_default(),
            best_candidate_name: None,
            edit_distance: best_line.map(|(_, distance)| distance),
            expected_name: expected,
        },
    }
}
