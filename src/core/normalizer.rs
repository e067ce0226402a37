use crate::core::aggregator::percent;
use crate::domain::model::{CandidateRow, RowError, RowRejection, ServiceLine};
use serde::{Deserialize, Serialize};

/// 語意欄位對應到的欄位位置。上游沒有標題列，欄位順序是唯一穩定的契約。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: usize,
    pub name: usize,
    pub total_homes: usize,
    pub active_homes: usize,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: 2,
            name: 5,
            total_homes: 6,
            active_homes: 7,
        }
    }
}

impl ColumnMapping {
    pub fn offsets(&self) -> [(&'static str, usize); 4] {
        [
            ("id", self.id),
            ("name", self.name),
            ("total_homes", self.total_homes),
            ("active_homes", self.active_homes),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowNormalizer {
    mapping: ColumnMapping,
}

impl RowNormalizer {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// 把候選行轉成 `ServiceLine`。數字欄位解析失敗時整行捨棄，不會補零。
    pub fn normalize(&self, row: &CandidateRow) -> Result<ServiceLine, RowError> {
        let id = self.text_field(row, "id", self.mapping.id)?;
        let name = self.text_field(row, "name", self.mapping.name)?;
        let total_homes = self.count_field(row, "total_homes", self.mapping.total_homes)?;
        let active_homes = self.count_field(row, "active_homes", self.mapping.active_homes)?;

        // active > total 是上游資料的異常，照實保留
        Ok(ServiceLine {
            id,
            name,
            total_homes,
            active_homes,
            active_percent: percent(active_homes, total_homes),
        })
    }

    /// 依序正規化，保留輸入順序並收集被捨棄的行
    pub fn normalize_all<I>(&self, rows: I) -> (Vec<ServiceLine>, Vec<RowRejection>)
    where
        I: IntoIterator<Item = CandidateRow>,
    {
        let mut lines = Vec::new();
        let mut rejections = Vec::new();

        for row in rows {
            match self.normalize(&row) {
                Ok(line) => lines.push(line),
                Err(reason) => {
                    tracing::debug!("Dropping line {}: {}", row.line, reason);
                    rejections.push(RowRejection {
                        line: row.line,
                        reason,
                    });
                }
            }
        }

        (lines, rejections)
    }

    fn text_field(
        &self,
        row: &CandidateRow,
        field: &str,
        index: usize,
    ) -> Result<String, RowError> {
        row.field(index)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| RowError::MissingField {
                field: field.to_string(),
                index,
            })
    }

    fn count_field(&self, row: &CandidateRow, field: &str, index: usize) -> Result<u64, RowError> {
        let raw = self.text_field(row, field, index)?;
        raw.parse::<u64>().map_err(|_| RowError::InvalidNumber {
            field: field.to_string(),
            value: raw,
        })
    }
}
