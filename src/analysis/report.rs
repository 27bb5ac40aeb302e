use std::{cmp::Ordering, path::Path};

use color_eyre::{eyre::WrapErr, Result};

use crate::netlist::eng_format;

use super::delay::CellDelaySummary;

trait TableCell: PartialOrd {
    fn fmt(&self) -> String;
}

#[derive(PartialEq, PartialOrd)]
struct DelayCell(f64);
impl TableCell for DelayCell {
    fn fmt(&self) -> String {
        format!("{}s", eng_format(self.0))
    }
}

#[derive(PartialEq, PartialOrd)]
struct TextCell(String);
impl TableCell for TextCell {
    fn fmt(&self) -> String {
        self.0.clone()
    }
}

struct TableRow {
    cell: TextCell,
    min: DelayCell,
    max: DelayCell,
    mean: DelayCell,
    samples: usize,
}

fn by_delay(key: fn(&TableRow) -> f64) -> impl Fn(&TableRow, &TableRow) -> Ordering {
    move |a: &TableRow, b: &TableRow| key(a).total_cmp(&key(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Cell,
    Min,
    Max,
    Mean,
}

/// Per-cell propagation delays, printable as a text table or CSV.
pub struct DelayReport(Vec<TableRow>);

impl DelayReport {
    pub fn new(summaries: &[CellDelaySummary]) -> Self {
        DelayReport(
            summaries
                .iter()
                .map(|s| TableRow {
                    cell: TextCell(s.cell.clone()),
                    min: DelayCell(s.min),
                    max: DelayCell(s.max),
                    mean: DelayCell(s.mean),
                    samples: s.samples,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sort(&mut self, column: SortColumn) {
        match column {
            SortColumn::Cell => self.0.sort_by(|a, b| a.cell.0.cmp(&b.cell.0)),
            SortColumn::Min => self.0.sort_by(by_delay(|r| r.min.0)),
            SortColumn::Max => self.0.sort_by(by_delay(|r| r.max.0)),
            SortColumn::Mean => self.0.sort_by(by_delay(|r| r.mean.0)),
        };
    }

    pub fn cells(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.cell.0.as_str()).collect()
    }

    /// Column-aligned text table.
    pub fn render(&self) -> String {
        let header = ["cell", "min", "max", "mean", "n"];
        let rows: Vec<[String; 5]> = self
            .0
            .iter()
            .map(|r| {
                [
                    r.cell.fmt(),
                    r.min.fmt(),
                    r.max.fmt(),
                    r.mean.fmt(),
                    r.samples.to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (w, field) in widths.iter_mut().zip(row) {
                *w = (*w).max(field.len());
            }
        }

        let line = |fields: [&str; 5]| {
            let mut text = format!("{:<w$}", fields[0], w = widths[0]);
            for (field, w) in fields.iter().zip(widths).skip(1) {
                text.push_str(&format!("  {field:>w$}"));
            }
            text
        };

        let mut out = line(header);
        out.push('\n');
        for row in &rows {
            out.push_str(&line([&row[0], &row[1], &row[2], &row[3], &row[4]]));
            out.push('\n');
        }
        out
    }

    /// Writes `cell,min_delay,max_delay,mean_delay,samples` with delays in
    /// seconds.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .wrap_err_with(|| format!("cannot create {}", path.display()))?;
        writer.write_record(["cell", "min_delay", "max_delay", "mean_delay", "samples"])?;
        for r in &self.0 {
            writer.write_record([
                r.cell.0.clone(),
                format!("{:e}", r.min.0),
                format!("{:e}", r.max.0),
                format!("{:e}", r.mean.0),
                r.samples.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
