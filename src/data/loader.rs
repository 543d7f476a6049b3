use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::SampleSeries;
use super::tdms::TdmsFile;

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Read access to a file of named groups holding named channels.
pub trait WaveformSource {
    /// Label for series read from this source (usually the file name).
    fn label(&self) -> &str;

    /// Group names in file order.
    fn group_names(&self) -> Vec<String>;

    /// Channel names of `group` in file order.
    fn channel_names(&self, group: &str) -> Result<Vec<String>>;

    /// Samples, spacing and properties of one channel.
    fn read_channel(&self, group: &str, channel: &str) -> Result<SampleSeries>;
}

impl WaveformSource for TdmsFile {
    fn label(&self) -> &str {
        &self.name
    }

    fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    fn channel_names(&self, group: &str) -> Result<Vec<String>> {
        Ok(self
            .group(group)?
            .channels
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    fn read_channel(&self, group: &str, channel: &str) -> Result<SampleSeries> {
        Ok(self.read_series(group, channel)?)
    }
}

/// Opens sources by path. The UI state machine only talks to this trait.
pub trait SourceLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn WaveformSource>>;
}

/// Production loader backed by files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl SourceLoader for FileLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn WaveformSource>> {
        open_source(path)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Open a waveform file.  Dispatch by extension.
///
/// Supported formats:
/// * `.tdms` – National Instruments TDMS (groups of channels with properties)
pub fn open_source(path: &Path) -> Result<Box<dyn WaveformSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "tdms" => {
            let file = TdmsFile::open(path)
                .with_context(|| format!("reading TDMS file {}", path.display()))?;
            log::debug!(
                "opened {} with {} groups",
                path.display(),
                file.groups.len()
            );
            Ok(Box::new(file))
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::writer::TdmsWriter;

    #[test]
    fn opens_tdms_through_trait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.TDMS");
        TdmsWriter::single_channel("g", "c", &[1.0, 2.0], 0.1)
            .write(&path)
            .unwrap();

        let source = FileLoader.open(&path).unwrap();
        assert_eq!(source.label(), "run.TDMS");
        assert_eq!(source.group_names(), ["g"]);
        assert_eq!(source.channel_names("g").unwrap(), ["c"]);
        assert_eq!(source.read_channel("g", "c").unwrap().values, [1.0, 2.0]);
        assert!(source.channel_names("missing").is_err());
    }

    #[test]
    fn rejects_other_extensions_and_missing_files() {
        let err = open_source(Path::new("data.csv")).err().unwrap();
        assert!(err.to_string().contains("Unsupported file extension"));

        let err = open_source(Path::new("/definitely/not/here.tdms")).err().unwrap();
        assert!(format!("{err:#}").contains("here.tdms"));
    }
}
