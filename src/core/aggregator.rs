use crate::domain::model::{ReportSummary, ServiceLine};

/// 四捨五入到小數第二位
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`，`whole` 為 0 時回傳 0
pub fn percent(part: u64, whole: u64) -> f64 {
    ratio_percent(part as f64, whole as f64)
}

fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

/// 超出 u64 時記錄警告並回傳 `u64::MAX`
fn narrow_total(field: &str, total: u128) -> u64 {
    u64::try_from(total).unwrap_or_else(|_| {
        tracing::warn!(
            "⚠️ {} overflowed u64 ({}), reporting {}",
            field,
            total,
            u64::MAX
        );
        u64::MAX
    })
}

pub fn summarize(lines: &[ServiceLine]) -> ReportSummary {
    // 以 u128 累加，u64 範圍內的列數不可能溢位
    let (passed, active) = lines.iter().fold((0u128, 0u128), |(passed, active), line| {
        (
            passed + u128::from(line.total_homes),
            active + u128::from(line.active_homes),
        )
    });

    ReportSummary {
        total_homes_passed: narrow_total("total_homes_passed", passed),
        total_active_homes: narrow_total("total_active_homes", active),
        overall_penetration: ratio_percent(active as f64, passed as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, total: u64, active: u64) -> ServiceLine {
        ServiceLine {
            id: id.to_string(),
            name: format!("Segment {}", id),
            total_homes: total,
            active_homes: active,
            active_percent: percent(active, total),
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(470, 1570), 29.94);
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(5, 5), 100.0);
        assert_eq!(percent(0, 10), 0.0);
    }

    #[test]
    fn test_percent_zero_whole() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(42, 0), 0.0);
    }

    #[test]
    fn test_percent_matches_formula_exactly() {
        for (active, total) in [(470u64, 1570u64), (13, 17), (999, 1000), (1, 7), (250, 100)] {
            let expected = ((active as f64 / total as f64 * 100.0) * 100.0).round() / 100.0;
            assert_eq!(percent(active, total), expected);
        }
    }

    #[test]
    fn test_summarize_sums_and_penetration() {
        let lines = vec![line("a", 1570, 470), line("b", 430, 30), line("c", 0, 0)];
        let summary = summarize(&lines);

        assert_eq!(summary.total_homes_passed, 2000);
        assert_eq!(summary.total_active_homes, 500);
        assert_eq!(summary.overall_penetration, 25.0);
    }

    #[test]
    fn test_summarize_is_order_independent() {
        let mut lines = vec![line("a", 1570, 470), line("b", 13, 7), line("c", 999, 998)];
        let forward = summarize(&lines);
        lines.reverse();
        let backward = summarize(&lines);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_summarize_overflowing_totals() {
        let lines = vec![line("a", u64::MAX, u64::MAX), line("b", u64::MAX, 0)];
        let summary = summarize(&lines);

        assert_eq!(summary.total_homes_passed, u64::MAX);
        assert_eq!(summary.total_active_homes, u64::MAX);
        // 百分比以完整的總和計算
        assert_eq!(summary.overall_penetration, 50.0);
    }

    #[test]
    fn test_summarize_empty_and_zero_passed() {
        assert_eq!(summarize(&[]), ReportSummary::default());

        let summary = summarize(&[line("x", 0, 0), line("y", 0, 0)]);
        assert_eq!(summary.total_homes_passed, 0);
        assert_eq!(summary.overall_penetration, 0.0);
    }
}
