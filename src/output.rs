use std::fs::File;
use std::io::{self, Write};
use std::iter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sampling::SampleRecord;
use crate::{Error, Result};

pub const TIME_COLUMN: &str = "Time(s)";

/// CSV destination for sample rows.
///
/// The file starts with one `#` metadata line, written before the csv
/// writer takes over, then the header, then one row per sample. Every
/// write is flushed so an interrupted run keeps all completed rows.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    path: PathBuf,
    rows: u64,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path` and writes the metadata line.
    pub fn create(path: impl AsRef<Path>, interval: Duration) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::OutputSink {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file, path, interval)
    }
}

impl<W: Write> CsvSink<W> {
    /// Writes the `#` metadata line to `inner`, then hands it to the csv
    /// writer. `path` only labels errors.
    pub fn new(mut inner: W, path: impl Into<PathBuf>, interval: Duration) -> Result<Self> {
        let path = path.into();
        let meta = format!(
            "# counter columns are per-interval deltas: events counted during each {}s window, \
             reset at the start of every window, not running totals\n",
            interval.as_secs()
        );
        if let Err(source) = inner.write_all(meta.as_bytes()) {
            return Err(Error::OutputSink { path, source });
        }

        Ok(Self {
            writer: csv::WriterBuilder::new().flexible(false).from_writer(inner),
            path,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    fn fail(&self, source: impl Into<io::Error>) -> Error {
        Error::OutputSink {
            path: self.path.clone(),
            source: source.into(),
        }
    }

    pub fn write_header(&mut self, names: &[&str]) -> Result<()> {
        let header = iter::once(TIME_COLUMN).chain(names.iter().copied());
        self.writer.write_record(header).map_err(|e| self.fail(e))?;
        self.writer.flush().map_err(|e| self.fail(e))
    }

    pub fn write_record(&mut self, record: &SampleRecord) -> Result<()> {
        let time = record.elapsed.as_secs().to_string();
        let values = record.values.iter().map(|(_, value)| value.to_string());
        self.writer
            .write_record(iter::once(time).chain(values))
            .map_err(|e| self.fail(e))?;
        self.writer.flush().map_err(|e| self.fail(e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        let path = self.path;
        self.writer
            .into_inner()
            .map_err(|e| Error::OutputSink {
                path,
                source: e.into_error(),
            })
    }
}
