use crate::domain::model::ReportView;
use crate::domain::ports::ReportPresenter;
use crate::utils::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const HEADERS: [&str; 5] = ["id", "name", "total_homes", "active_homes", "active_percent"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn presenter(self) -> Box<dyn ReportPresenter> {
        match self {
            OutputFormat::Table => Box::new(TablePresenter),
            OutputFormat::Csv => Box::new(DelimitedPresenter::csv()),
            OutputFormat::Tsv => Box::new(DelimitedPresenter::tsv()),
            OutputFormat::Json => Box::new(JsonPresenter),
        }
    }
}

/// 給終端機看的表格與摘要
pub struct TablePresenter;

impl ReportPresenter for TablePresenter {
    fn present(&self, view: &ReportView<'_>) -> Result<String> {
        let rows: Vec<[String; 5]> = view
            .lines
            .iter()
            .map(|line| {
                [
                    line.id.clone(),
                    line.name.clone(),
                    line.total_homes.to_string(),
                    line.active_homes.to_string(),
                    format!("{:.2}%", line.active_percent),
                ]
            })
            .collect();

        let titles = ["ID", "Name", "Homes Passed", "Active Homes", "Active %"];
        let mut widths = titles.map(|title| title.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let render = |out: &mut String, cells: [&str; 5]| -> std::fmt::Result {
            // 前兩欄靠左，數字欄靠右
            writeln!(
                out,
                "{:<w0$}  {:<w1$}  {:>w2$}  {:>w3$}  {:>w4$}",
                cells[0],
                cells[1],
                cells[2],
                cells[3],
                cells[4],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
                w4 = widths[4],
            )
        };

        let separator = widths.map(|w| "-".repeat(w));
        render(&mut out, titles).map_err(fmt_error)?;
        render(&mut out, separator.each_ref().map(String::as_str)).map_err(fmt_error)?;
        for row in &rows {
            render(&mut out, row.each_ref().map(String::as_str)).map_err(fmt_error)?;
        }
        if rows.is_empty() {
            out.push_str("(no usable rows)\n");
        }

        let summary = view.summary;
        writeln!(out).map_err(fmt_error)?;
        writeln!(out, "Total homes passed:  {}", summary.total_homes_passed).map_err(fmt_error)?;
        writeln!(out, "Total active homes:  {}", summary.total_active_homes).map_err(fmt_error)?;
        writeln!(out, "Overall penetration: {:.2}%", summary.overall_penetration)
            .map_err(fmt_error)?;
        if view.dropped_rows > 0 {
            writeln!(out, "Dropped rows:        {}", view.dropped_rows).map_err(fmt_error)?;
        }

        Ok(out)
    }
}

fn fmt_error(e: std::fmt::Error) -> ReportError {
    ReportError::ConfigError {
        message: format!("Failed to render table: {}", e),
    }
}

/// CSV / TSV 輸出，只包含正規化後的資料行
pub struct DelimitedPresenter {
    delimiter: u8,
}

impl DelimitedPresenter {
    pub fn csv() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl ReportPresenter for DelimitedPresenter {
    fn present(&self, view: &ReportView<'_>) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(Vec::new());

        // 空表也要有標題列
        writer.write_record(HEADERS)?;
        for line in view.lines {
            writer.serialize(line)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| {
            ReportError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

pub struct JsonPresenter;

impl ReportPresenter for JsonPresenter {
    fn present(&self, view: &ReportView<'_>) -> Result<String> {
        Ok(serde_json::to_string_pretty(view)?)
    }
}
