mod delay;
mod report;
mod waveform;

pub use delay::{
    analyze_waveform, cell_name, identify_switching_pin, read_results, transition_delay,
    CellDelaySummary,
};
pub use report::{DelayReport, SortColumn};
pub use waveform::WaveformTable;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("waveform has no column {0:?}")]
    MissingColumn(String),
    /// Every candidate input is at the same level at both ends of the run.
    #[error("no input pin switches during the run")]
    NoSwitchingPin,
    #[error("waveform has no samples")]
    Empty,
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}
