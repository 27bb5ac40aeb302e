use std::{fs, io, path::Path};

use bytesize::ByteSize;
use color_eyre::{eyre::WrapErr, Result};
use faer::Mat;
use log::debug;

use super::AnalysisError;

/// Sampled node voltages of one transient run. Rows are time points,
/// columns are signals.
#[derive(Debug, Clone)]
pub struct WaveformTable {
    columns: Vec<String>,
    samples: Mat<f64>,
}

impl WaveformTable {
    pub fn new(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, AnalysisError> {
        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(AnalysisError::RaggedRow {
                    row,
                    found: values.len(),
                    expected: columns.len(),
                });
            }
        }

        let samples = Mat::from_fn(rows.len(), columns.len(), |i, j| rows[i][j]);
        Ok(WaveformTable { columns, samples })
    }

    /// Reads a CSV export: one header row of signal names, then one row per
    /// time point.
    pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| field.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .wrap_err_with(|| format!("non-numeric sample in data row {}", i + 1))?;
            rows.push(row);
        }

        Ok(Self::new(columns, &rows)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)
            .wrap_err_with(|| format!("cannot stat {}", path.display()))?
            .len();
        debug!("reading {} ({})", path.display(), ByteSize(size));

        let file =
            fs::File::open(path).wrap_err_with(|| format!("cannot open {}", path.display()))?;
        Self::from_csv(io::BufReader::new(file))
            .wrap_err_with(|| format!("while reading {}", path.display()))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Result<Vec<f64>, AnalysisError> {
        let j = self
            .column_index(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))?;
        Ok(self.column_at(j))
    }

    pub(super) fn column_at(&self, j: usize) -> Vec<f64> {
        (0..self.samples.nrows())
            .map(|i| self.samples.read(i, j))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv() {
        let data = "time, A, Q\n0, 0, 1.8\n1e-9, 0.9, 1.8\n2e-9, 1.8, 0\n";
        let table = WaveformTable::from_csv(data.as_bytes()).unwrap();

        assert_eq!(table.columns(), ["time", "A", "Q"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("A").unwrap(), vec![0.0, 0.9, 1.8]);
        assert_eq!(
            table.column("B"),
            Err(AnalysisError::MissingColumn("B".into()))
        );
    }

    #[test]
    fn test_from_csv_rejects_bad_rows() {
        assert!(WaveformTable::from_csv("time,A\n0,x\n".as_bytes()).is_err());
        assert!(WaveformTable::from_csv("time,A\n0,1,2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_ragged_rows() {
        let err = WaveformTable::new(
            vec!["time".into(), "A".into()],
            &[vec![0.0, 1.0], vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::RaggedRow {
                row: 1,
                found: 1,
                expected: 2
            }
        );
    }
}
