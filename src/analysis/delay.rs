use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::AnalysisConfig;

use super::{waveform::WaveformTable, AnalysisError};

/// Propagation delay statistics over all simulated vectors of one cell.
/// Rising and falling transitions are pooled.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDelaySummary {
    pub cell: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub samples: usize,
}

impl CellDelaySummary {
    pub fn from_delays(cell: &str, delays: &[f64]) -> Option<Self> {
        if delays.is_empty() {
            return None;
        }
        let min = delays.iter().copied().fold(f64::INFINITY, f64::min);
        let max = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = delays.iter().sum::<f64>() / delays.len() as f64;
        Some(CellDelaySummary {
            cell: cell.to_string(),
            min,
            max,
            mean,
            samples: delays.len(),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// The stimulated input: the first one- or two-character column (other than
/// time and the output) whose average over the first samples differs from
/// its average over the last samples. `None` if every pin is held.
pub fn identify_switching_pin<'a>(
    table: &'a WaveformTable,
    settings: &AnalysisConfig,
) -> Option<&'a str> {
    let n = settings.edge_samples.min(table.len()).max(1);
    if table.is_empty() {
        return None;
    }

    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let len = name.chars().count();
            (len == 1 || len == 2)
                && **name != settings.time_column
                && **name != settings.output_column
        })
        .find(|(j, _)| {
            let trace = table.column_at(*j);
            let head = mean(&trace[..n]);
            let tail = mean(&trace[trace.len() - n..]);
            (head - tail).abs() > settings.tolerance
        })
        .map(|(_, name)| name.as_str())
}

/// Index of the sample closest to `threshold`; the earliest one on ties.
fn nearest_sample(trace: &[f64], threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in trace.iter().enumerate() {
        let distance = (value - threshold).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// Time between `input` and `output` passing half of the input's peak,
/// using the nearest sample on each trace.
pub fn transition_delay(
    table: &WaveformTable,
    time_column: &str,
    output: &str,
    input: &str,
) -> Result<f64, AnalysisError> {
    let time = table.column(time_column)?;
    let sig_out = table.column(output)?;
    let sig_in = table.column(input)?;

    let peak = sig_in.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold_point = 0.5 * peak;

    let out_idx = nearest_sample(&sig_out, threshold_point).ok_or(AnalysisError::Empty)?;
    let in_idx = nearest_sample(&sig_in, threshold_point).ok_or(AnalysisError::Empty)?;

    Ok(time[out_idx] - time[in_idx])
}

/// Finds the switching pin of one run and measures its delay to the output.
pub fn analyze_waveform(
    table: &WaveformTable,
    settings: &AnalysisConfig,
) -> Result<(String, f64), AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::Empty);
    }
    let pin = identify_switching_pin(table, settings).ok_or(AnalysisError::NoSwitchingPin)?;
    let delay = transition_delay(table, &settings.time_column, &settings.output_column, pin)?;
    Ok((pin.to_string(), delay))
}

/// Cell name of a `{cell}_{index}` result file.
pub fn cell_name(file_stem: &str) -> &str {
    file_stem
        .rsplit_once('_')
        .map_or(file_stem, |(cell, _)| cell)
}

fn summarize_cell(cell: &str, files: &[PathBuf], settings: &AnalysisConfig) -> Option<CellDelaySummary> {
    let mut transitions = Vec::with_capacity(files.len());
    for file in files {
        let analyzed = WaveformTable::load(file)
            .and_then(|table| analyze_waveform(&table, settings).map_err(Into::into));
        match analyzed {
            Ok((pin, delay)) => {
                debug!("{}: {pin} -> {} {delay:e}", file.display(), settings.output_column);
                transitions.push(delay);
            }
            Err(err) => warn!("skipping {}: {err:#}", file.display()),
        }
    }

    let summary = CellDelaySummary::from_delays(cell, &transitions);
    if summary.is_none() {
        warn!("no usable waveforms for cell {cell}");
    }
    summary
}

/// Reduces every `{cell}_{index}.{ext}` waveform in `dir` to per-cell delay
/// statistics, sorted by cell name.
pub fn read_results(dir: &Path, settings: &AnalysisConfig) -> Result<Vec<CellDelaySummary>> {
    let mut cells: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for entry in fs::read_dir(dir).wrap_err_with(|| format!("cannot list {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(settings.extension.as_str())
        {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            cells
                .entry(cell_name(stem).to_string())
                .or_default()
                .push(path.clone());
        }
    }
    for files in cells.values_mut() {
        files.sort();
    }
    info!("analyzing {} cells from {}", cells.len(), dir.display());

    let summaries: Vec<CellDelaySummary> = cells
        .par_iter()
        .filter_map(|(cell, files)| summarize_cell(cell, files, settings))
        .collect();

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `A` ramps 0 -> 1.8 V over `ramp` samples starting at `start`; `Q`
    /// follows `shift` samples later. Samples every `step` seconds.
    fn ramp_table(start: usize, ramp: usize, shift: usize, step: f64) -> WaveformTable {
        let level = |i: usize, begin: usize| {
            if i < begin {
                0.0
            } else if i >= begin + ramp {
                1.8
            } else {
                1.8 * (i - begin) as f64 / ramp as f64
            }
        };
        let rows: Vec<Vec<f64>> = (0..200)
            .map(|i| {
                vec![
                    i as f64 * step,
                    level(i, start),
                    0.0,
                    level(i, start + shift),
                    1.8,
                ]
            })
            .collect();
        WaveformTable::new(
            ["time", "A", "B", "Q", "vdd!"].iter().map(|s| s.to_string()).collect(),
            &rows,
        )
        .unwrap()
    }

    #[test]
    fn test_identify_switching_pin() {
        let table = ramp_table(20, 10, 15, 1e-11);
        let settings = AnalysisConfig::default();
        assert_eq!(identify_switching_pin(&table, &settings), Some("A"));
    }

    #[test]
    fn test_no_switching_pin() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 0.0, 1.8]).collect();
        let table =
            WaveformTable::new(vec!["time".into(), "A".into(), "Q".into()], &rows).unwrap();
        let settings = AnalysisConfig::default();
        assert_eq!(identify_switching_pin(&table, &settings), None);
        assert_eq!(
            analyze_waveform(&table, &settings),
            Err(AnalysisError::NoSwitchingPin)
        );
    }

    #[test]
    fn test_delay_matches_shift() {
        let step = 1e-11;
        for shift in [0, 3, 15, 40] {
            let table = ramp_table(20, 10, shift, step);
            let (pin, delay) = analyze_waveform(&table, &AnalysisConfig::default()).unwrap();
            assert_eq!(pin, "A");
            let expected = shift as f64 * step;
            assert!(
                (delay - expected).abs() <= step,
                "shift {shift}: {delay:e} vs {expected:e}"
            );
        }
    }

    #[test]
    fn test_nearest_sample_prefers_first() {
        assert_eq!(nearest_sample(&[0.0, 0.9, 0.9, 1.8], 0.9), Some(1));
        assert_eq!(nearest_sample(&[], 0.9), None);
    }

    #[test]
    fn test_cell_name() {
        assert_eq!(cell_name("INVX1_3"), "INVX1");
        assert_eq!(cell_name("sky130_fd_sc_hd__inv_1_12"), "sky130_fd_sc_hd__inv_1");
        assert_eq!(cell_name("plain"), "plain");
    }

    #[test]
    fn test_summary() {
        let summary = CellDelaySummary::from_delays("X", &[2e-11, 1e-11, 3e-11]).unwrap();
        assert_eq!(summary.min, 1e-11);
        assert_eq!(summary.max, 3e-11);
        assert!((summary.mean - 2e-11).abs() < 1e-20);
        assert_eq!(summary.samples, 3);
        assert!(CellDelaySummary::from_delays("X", &[]).is_none());
    }

    #[test]
    fn test_read_results() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let write = |name: &str, shift: usize| -> Result<()> {
            let table = ramp_table(20, 10, shift, 1e-11);
            let mut text = table.columns().join(",");
            text.push('\n');
            for i in 0..table.len() {
                let row: Vec<String> = (0..table.columns().len())
                    .map(|j| table.column_at(j)[i].to_string())
                    .collect();
                text.push_str(&row.join(","));
                text.push('\n');
            }
            fs::write(dir.path().join(name), text)?;
            Ok(())
        };
        write("INVX1_0.csv", 5)?;
        write("INVX1_1.csv", 9)?;
        write("AND2X1_0.csv", 12)?;
        fs::write(dir.path().join("AND2X1_1.csv"), "time,A,Q\n0,0,0\n1,0,0\n")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let summaries = read_results(dir.path(), &AnalysisConfig::default())?;

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].cell, "AND2X1");
        assert_eq!(summaries[0].samples, 1);
        assert_eq!(summaries[1].cell, "INVX1");
        assert_eq!(summaries[1].samples, 2);
        assert!((summaries[1].min - 5e-11).abs() <= 1e-11);
        assert!((summaries[1].max - 9e-11).abs() <= 1e-11);

        Ok(())
    }
}
