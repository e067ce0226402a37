use homes_report::core::normalizer::{ColumnMapping, RowNormalizer};
use homes_report::{AppConfig, RawSubmission, ReportBuilder, ReportSummary, Session};

/// 模擬上游人工維護的報表：有空白行、百分比括號、欄位數不一
const SUBMISSION: &str = "\
R1,2024-05,056,FTTH,North,FTTH-Calais,1570,470,(29.9%)
R2,2024-05,057,FTTH,North,FTTH-Dover,430,30,(7.0%)

R3,2024-05,058,FTTH,South,New build,0,0,(0.0%)
R4,2024-05,059,FTTH,South,Lille (65,3%),abc,12,(3.1%)
R5,2024-05,060,FTTH,South,Short row
R6,2024-05,061,FTTH,South,Overbooked,100,150,(150.0%),extra,columns,here
";

#[test]
fn test_default_layout_end_to_end() {
    let report = ReportBuilder::default().build(SUBMISSION);

    let ids: Vec<&str> = report.lines.iter().map(|line| line.id.as_str()).collect();
    assert_eq!(ids, vec!["056", "057", "058", "061"]);

    assert_eq!(report.lines[0].name, "FTTH-Calais");
    assert_eq!(report.lines[0].active_percent, 29.94);
    assert_eq!(report.lines[2].active_percent, 0.0);
    assert_eq!(report.lines[3].active_homes, 150);

    assert_eq!(report.dropped_rows(), 2);
    let dropped_lines: Vec<u64> = report.rejections.iter().map(|r| r.line).collect();
    assert_eq!(dropped_lines, vec![5, 6]);

    assert_eq!(report.summary.total_homes_passed, 2100);
    assert_eq!(report.summary.total_active_homes, 650);
    assert_eq!(report.summary.overall_penetration, 30.95);
}

#[test]
fn test_summary_independent_of_line_order() {
    let builder = ReportBuilder::default();
    let forward = builder.build(SUBMISSION);

    let mut reversed_lines: Vec<&str> = SUBMISSION.lines().collect();
    reversed_lines.reverse();
    let backward = builder.build(&reversed_lines.join("\n"));

    assert_eq!(forward.summary, backward.summary);
    assert_eq!(forward.lines.len(), backward.lines.len());
}

#[test]
fn test_sums_match_surviving_lines() {
    let report = ReportBuilder::default().build(SUBMISSION);

    let passed: u64 = report.lines.iter().map(|line| line.total_homes).sum();
    let active: u64 = report.lines.iter().map(|line| line.active_homes).sum();
    assert_eq!(report.summary.total_homes_passed, passed);
    assert_eq!(report.summary.total_active_homes, active);

    for line in &report.lines {
        if line.total_homes == 0 {
            assert_eq!(line.active_percent, 0.0);
        } else {
            let expected =
                ((line.active_homes as f64 / line.total_homes as f64 * 100.0) * 100.0).round()
                    / 100.0;
            assert_eq!(line.active_percent, expected);
        }
    }
}

#[test]
fn test_calais_row_with_compact_mapping() {
    let builder = ReportBuilder::new(RowNormalizer::new(ColumnMapping {
        id: 0,
        name: 1,
        total_homes: 2,
        active_homes: 3,
    }));
    let report = builder.build("056,FTTH-Calais,1570,470,(29.9%),749,470,(29.9%)");

    assert_eq!(report.lines.len(), 1);
    let line = &report.lines[0];
    assert_eq!(line.id, "056");
    assert_eq!(line.name, "FTTH-Calais");
    assert_eq!(line.total_homes, 1570);
    assert_eq!(line.active_homes, 470);
    assert_eq!(line.active_percent, 29.94);
}

#[test]
fn test_every_row_malformed() {
    let report = ReportBuilder::default().build("xx,xx,abc,470,...\nfoo\n,,,,,,,\n");

    assert!(report.is_empty());
    assert_eq!(report.summary, ReportSummary::default());
    assert_eq!(report.summary.overall_penetration, 0.0);
    assert_eq!(report.dropped_rows(), 3);
}

#[test]
fn test_zero_homes_passed_overall_zero() {
    let report = ReportBuilder::default().build("a,b,1,c,d,Empty,0,0\na,b,2,c,d,Odd,0,5\n");

    assert_eq!(report.summary.total_homes_passed, 0);
    assert_eq!(report.summary.total_active_homes, 5);
    assert_eq!(report.summary.overall_penetration, 0.0);
}

#[test]
fn test_mapping_from_config_file_content() {
    let config = AppConfig::from_toml_str(
        "[report.columns]\nid = 0\nname = 1\ntotal_homes = 2\nactive_homes = 3\n",
    )
    .unwrap();

    let mut session = Session::new(config.report_builder());
    session.upload(RawSubmission::new("056,FTTH-Calais,1570,470", "report.txt"));

    let report = session.report().unwrap();
    assert_eq!(report.summary.total_homes_passed, 1570);
    assert_eq!(report.summary.overall_penetration, 29.94);
}
