use crate::domain::model::CandidateRow;

pub const DELIMITER: char = ',';

/// 將原始文字拆成候選資料行。
///
/// 每個非空白行產生一個 `CandidateRow`，欄位數不固定。上游是人工維護的文字檔，
/// 像 `(65.3%)` 這種欄位裡多出來的逗號會讓欄位數變動，這裡一律不報錯，交給驗證階段處理。
/// 引號沒有特殊意義，`"` 只是一般字元。
pub fn parse_records(text: &str) -> impl Iterator<Item = CandidateRow> + '_ {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| CandidateRow {
            fields: line.split(DELIMITER).map(str::to_string).collect(),
            line: index as u64 + 1,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ragged_rows() {
        let text = "a,b,c\n1,2\n1,2,3,4,5,(29.9%)\n";
        let rows: Vec<CandidateRow> = parse_records(text).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fields, vec!["a", "b", "c"]);
        assert_eq!(rows[1].fields.len(), 2);
        assert_eq!(rows[2].fields.len(), 6);
        assert_eq!(rows[2].field(5), Some("(29.9%)"));
    }

    #[test]
    fn test_blank_lines_skipped_and_line_numbers_kept() {
        let text = "\nfirst,row\n   \n\t\nsecond,row\n";
        let rows: Vec<CandidateRow> = parse_records(text).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 5);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rows: Vec<CandidateRow> = parse_records("x,1\r\ny,2\r\n").collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["x", "1"]);
        assert_eq!(rows[1].fields, vec!["y", "2"]);
    }

    #[test]
    fn test_quotes_are_plain_characters() {
        let rows: Vec<CandidateRow> = parse_records("\"a,b\",c").collect();

        assert_eq!(rows[0].fields, vec!["\"a", "b\"", "c"]);
    }

    #[test]
    fn test_leading_bom_removed() {
        let rows: Vec<CandidateRow> = parse_records("\u{feff}056,x").collect();

        assert_eq!(rows[0].field(0), Some("056"));
    }

    #[test]
    fn test_empty_fields_preserved() {
        let rows: Vec<CandidateRow> = parse_records(",,x,").collect();

        assert_eq!(rows[0].fields, vec!["", "", "x", ""]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_records("").count(), 0);
        assert_eq!(parse_records("\n\n\r\n").count(), 0);
    }
}
