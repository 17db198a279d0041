//! 標本画像カタログモジュール
//!
//! 画像ファイル名と学名の対応表（CSV）を読み込み、
//! 画像ごとの期待学名と候補学名コーパスを提供する。

use crate::error::{Error, Result};
use crate::matcher::NameCorpus;
use std::collections::HashMap;
use std::path::Path;

/// ファイル名の列名
pub const FILE_NAME_COLUMN: &str = "oldFileName";
/// 学名の列名
pub const SCIENTIFIC_NAME_COLUMN: &str = "ScientificName";

/// カタログの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub file_name: String,
    pub scientific_name: String,
}

/// カタログ全体
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// 全行データ（CSVの順序を保持）
    rows: Vec<CatalogRow>,
    /// ファイル名→行番号のインデックス
    by_file_name: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// CSVファイルから読み込み
    pub fn from_csv(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    /// CSV文字列から読み込み
    ///
    /// 1行目をヘッダーとして扱い、必須列を名前で探す。列の順序は問わない。
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let mut lines = content.lines().filter(|line| !line.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| Error::Catalog("カタログが空です".into()))?;
        let columns = parse_csv_line(header);
        let file_col = column_index(&columns, FILE_NAME_COLUMN)?;
        let name_col = column_index(&columns, SCIENTIFIC_NAME_COLUMN)?;

        let mut catalog = Self::default();

        for line in lines {
            let fields = parse_csv_line(line);
            let (Some(file_name), Some(scientific_name)) = (fields.get(file_col), fields.get(name_col))
            else {
                continue;
            };

            catalog.push(CatalogRow {
                file_name: file_name.trim().to_string(),
                scientific_name: scientific_name.trim().to_string(),
            });
        }

        Ok(catalog)
    }

    fn push(&mut self, row: CatalogRow) {
        self.by_file_name
            .entry(row.file_name.clone())
            .or_default()
            .push(self.rows.len());
        self.rows.push(row);
    }

    /// ファイル名から期待学名を取得
    ///
    /// 該当行がない場合、または複数行ある場合はエラー。
    pub fn expected_name(&self, file_name: &str) -> Result<&str> {
        match self.by_file_name.get(file_name).map(Vec::as_slice) {
            None | Some([]) => Err(Error::NotInCatalog(file_name.to_string())),
            Some([index]) => Ok(self.rows[*index].scientific_name.as_str()),
            Some(indices) => Err(Error::DuplicateCatalogEntry {
                file_name: file_name.to_string(),
                count: indices.len(),
            }),
        }
    }

    /// 候補学名コーパスを構築
    pub fn candidate_names(&self) -> NameCorpus {
        NameCorpus::new(self.rows.iter().map(|row| row.scientific_name.as_str()))
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn column_index(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.trim() == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

/// CSV行をパース（ダブルクォート対応）
///
/// クォート内のカンマと `""` エスケープを扱う。複数行にまたがるフィールドは非対応。
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}
