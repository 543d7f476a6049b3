use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::data::assemble::{assemble, AssembledSeries};
use crate::data::loader::{SourceLoader, WaveformSource};
use crate::data::spectrum::{amplitude_spectral_density, Spectrum};

// ---------------------------------------------------------------------------
// Axis scales (spectrum plot only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    pub fn toggled(self) -> Self {
        match self {
            AxisScale::Linear => AxisScale::Log,
            AxisScale::Log => AxisScale::Linear,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AxisScale::Linear => "linear",
            AxisScale::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisScales {
    pub x: AxisScale,
    pub y: AxisScale,
}

impl AxisScales {
    pub fn toggled(self, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self {
                x: self.x.toggled(),
                ..self
            },
            Axis::Vertical => Self {
                y: self.y.toggled(),
                ..self
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Selection stages
// ---------------------------------------------------------------------------

/// Files picked by the user; the first one is kept open for group/channel listing.
pub struct FileSet {
    pub paths: Vec<PathBuf>,
    pub groups: Vec<String>,
    first: Arc<dyn WaveformSource>,
}

impl fmt::Debug for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSet")
            .field("paths", &self.paths)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl FileSet {
    /// Paths joined for the file field.
    pub fn display(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug)]
pub struct GroupChoice {
    pub group: String,
    pub channels: Vec<String>,
}

#[derive(Debug)]
pub struct PlottedChannel {
    pub channel: String,
    pub series: AssembledSeries,
    /// Present while the FFT view is shown and the estimate succeeded.
    pub spectrum: Option<Arc<Spectrum>>,
}

#[derive(Debug, Clone, Default)]
pub enum Stage {
    #[default]
    NoFile,
    FileLoaded {
        files: Arc<FileSet>,
    },
    GroupChosen {
        files: Arc<FileSet>,
        group: Arc<GroupChoice>,
    },
    ChannelPlotted {
        files: Arc<FileSet>,
        group: Arc<GroupChoice>,
        plot: Arc<PlottedChannel>,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::NoFile => "NoFile",
            Stage::FileLoaded { .. } => "FileLoaded",
            Stage::GroupChosen { .. } => "GroupChosen",
            Stage::ChannelPlotted { .. } => "ChannelPlotted",
        }
    }

    pub fn files(&self) -> Option<&Arc<FileSet>> {
        match self {
            Stage::NoFile => None,
            Stage::FileLoaded { files }
            | Stage::GroupChosen { files, .. }
            | Stage::ChannelPlotted { files, .. } => Some(files),
        }
    }

    pub fn group(&self) -> Option<&Arc<GroupChoice>> {
        match self {
            Stage::GroupChosen { group, .. } | Stage::ChannelPlotted { group, .. } => Some(group),
            _ => None,
        }
    }

    pub fn plot(&self) -> Option<&Arc<PlottedChannel>> {
        match self {
            Stage::ChannelPlotted { plot, .. } => Some(plot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FftDisplay {
    #[default]
    Hidden,
    Shown,
}

// ---------------------------------------------------------------------------
// Actions and the state snapshot
// ---------------------------------------------------------------------------

/// Everything the user can do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenFiles(Vec<PathBuf>),
    ChooseGroup(String),
    PlotChannel(String),
    SetFft(bool),
    ToggleSpectrumAxis(Axis),
}

/// Immutable UI state. [`ViewState::apply`] returns the next snapshot.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub stage: Stage,
    pub fft: FftDisplay,
    pub spectrum_axes: AxisScales,
    /// Status / error message shown in the UI.
    pub status: Option<String>,
    /// Bumped whenever a plot must re-fit its view.
    pub time_view: u64,
    pub spectrum_view: u64,
}

impl ViewState {
    pub fn fft_shown(&self) -> bool {
        self.fft == FftDisplay::Shown
    }

    /// Compute the state after `action`. Failures keep the current stage and set `status`.
    pub fn apply(&self, action: Action, loader: &dyn SourceLoader) -> ViewState {
        let result = match action {
            Action::OpenFiles(paths) => self.open_files(paths, loader),
            Action::ChooseGroup(group) => self.choose_group(group),
            Action::PlotChannel(channel) => self.plot_channel(channel, loader),
            Action::SetFft(on) => Ok(self.set_fft(on)),
            Action::ToggleSpectrumAxis(axis) => Ok(self.toggle_axis(axis)),
        };
        match result {
            Ok(next) => {
                log::debug!("stage {} -> {}", self.stage.name(), next.stage.name());
                next
            }
            Err(e) => {
                log::error!("{e:#}");
                ViewState {
                    status: Some(format!("Error: {e:#}")),
                    ..self.clone()
                }
            }
        }
    }

    fn open_files(&self, paths: Vec<PathBuf>, loader: &dyn SourceLoader) -> Result<ViewState> {
        let Some(first_path) = paths.first() else {
            return Ok(self.clone());
        };
        let first: Arc<dyn WaveformSource> = Arc::from(loader.open(first_path)?);
        let groups = first.group_names();
        if groups.is_empty() {
            bail!("{} contains no groups", first_path.display());
        }
        log::info!(
            "Opened {} file(s), groups {:?}",
            paths.len(),
            groups
        );
        Ok(ViewState {
            stage: Stage::FileLoaded {
                files: Arc::new(FileSet {
                    paths,
                    groups,
                    first,
                }),
            },
            status: None,
            ..self.clone()
        })
    }

    fn choose_group(&self, group: String) -> Result<ViewState> {
        let files = self.stage.files().context("no file opened")?;
        let channels = files
            .first
            .channel_names(&group)
            .with_context(|| format!("listing channels of {}", files.first.label()))?;
        if channels.is_empty() {
            bail!("group {group:?} has no channels");
        }
        Ok(ViewState {
            stage: Stage::GroupChosen {
                files: files.clone(),
                group: Arc::new(GroupChoice { group, channels }),
            },
            status: None,
            ..self.clone()
        })
    }

    fn plot_channel(&self, channel: String, loader: &dyn SourceLoader) -> Result<ViewState> {
        let (files, group) = match (self.stage.files(), self.stage.group()) {
            (Some(f), Some(g)) => (f, g),
            _ => bail!("no group chosen"),
        };

        let mut series = Vec::with_capacity(files.paths.len());
        for (i, path) in files.paths.iter().enumerate() {
            let read = |source: &dyn WaveformSource| {
                source
                    .read_channel(&group.group, &channel)
                    .with_context(|| format!("reading {}", path.display()))
            };
            if i == 0 {
                series.push(read(files.first.as_ref())?);
            } else {
                series.push(read(loader.open(path)?.as_ref())?);
            }
        }
        let series = assemble(&series)?;
        log::info!(
            "Plotted {}/{}: {} samples from {} file(s)",
            group.group,
            channel,
            series.len(),
            series.segments.len()
        );

        let mut next = ViewState {
            stage: Stage::ChannelPlotted {
                files: files.clone(),
                group: group.clone(),
                plot: Arc::new(PlottedChannel {
                    channel,
                    series,
                    spectrum: None,
                }),
            },
            status: None,
            time_view: self.time_view + 1,
            spectrum_view: self.spectrum_view + u64::from(self.fft_shown()),
            ..self.clone()
        };
        if next.fft_shown() {
            next = next.with_spectrum();
        }
        Ok(next)
    }

    fn set_fft(&self, on: bool) -> ViewState {
        match (self.fft, on) {
            (FftDisplay::Hidden, true) => ViewState {
                fft: FftDisplay::Shown,
                spectrum_axes: AxisScales::default(),
                spectrum_view: self.spectrum_view + 1,
                status: None,
                ..self.clone()
            }
            .with_spectrum(),
            (FftDisplay::Shown, false) => ViewState {
                fft: FftDisplay::Hidden,
                stage: self.stage.without_spectrum(),
                status: None,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    fn toggle_axis(&self, axis: Axis) -> ViewState {
        if !self.fft_shown() {
            return self.clone();
        }
        let spectrum_axes = self.spectrum_axes.toggled(axis);
        log::debug!(
            "spectrum axes: x {}, y {}",
            spectrum_axes.x.label(),
            spectrum_axes.y.label()
        );
        ViewState {
            spectrum_axes,
            spectrum_view: self.spectrum_view + 1,
            status: None,
            ..self.clone()
        }
    }

    /// Compute the spectrum of the plotted series, if any. An estimator error
    /// leaves the time plot in place and is reported in `status`.
    fn with_spectrum(self) -> ViewState {
        let Stage::ChannelPlotted { files, group, plot } = &self.stage else {
            return self;
        };
        match amplitude_spectral_density(&plot.series.values, plot.series.spacing) {
            Ok(spectrum) => {
                let stage = Stage::ChannelPlotted {
                    files: files.clone(),
                    group: group.clone(),
                    plot: Arc::new(PlottedChannel {
                        channel: plot.channel.clone(),
                        series: plot.series.clone(),
                        spectrum: Some(Arc::new(spectrum)),
                    }),
                };
                ViewState { stage, ..self }
            }
            Err(e) => {
                log::error!("spectrum of {}: {e}", plot.channel);
                let status = Some(format!("Error: spectrum of {}: {e}", plot.channel));
                ViewState { status, ..self }
            }
        }
    }
}

impl Stage {
    fn without_spectrum(&self) -> Stage {
        match self {
            Stage::ChannelPlotted { files, group, plot } if plot.spectrum.is_some() => {
                Stage::ChannelPlotted {
                    files: files.clone(),
                    group: group.clone(),
                    plot: Arc::new(PlottedChannel {
                        channel: plot.channel.clone(),
                        series: plot.series.clone(),
                        spectrum: None,
                    }),
                }
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Properties, PropertyValue, SAMPLE_SPACING_PROPERTY};
    use crate::data::tdms::TdmsFile;
    use crate::data::writer::TdmsWriter;
    use std::collections::HashMap;
    use std::path::Path;

    /// Serves in-memory TDMS images by path.
    #[derive(Default)]
    struct MemoryLoader {
        files: HashMap<PathBuf, Vec<u8>>,
    }

    impl MemoryLoader {
        fn with(mut self, path: &str, writer: TdmsWriter) -> Self {
            self.files.insert(PathBuf::from(path), writer.to_bytes());
            self
        }
    }

    impl SourceLoader for MemoryLoader {
        fn open(&self, path: &Path) -> Result<Box<dyn WaveformSource>> {
            let bytes = self
                .files
                .get(path)
                .with_context(|| format!("{} not found", path.display()))?;
            let mut file = TdmsFile::from_bytes(bytes)?;
            file.name = path.display().to_string();
            Ok(Box::new(file))
        }
    }

    fn acquisition(values: &[f64]) -> TdmsWriter {
        let mut props = Properties::new();
        props.insert(SAMPLE_SPACING_PROPERTY.into(), PropertyValue::Float(1.0));
        let mut w = TdmsWriter::new();
        w.add_channel("Measurements", "Voltage", values, props.clone());
        w.add_channel("Measurements", "Current", values, props);
        w.add_channel("Text", "Empty", &[], Properties::new());
        w
    }

    fn loader() -> MemoryLoader {
        MemoryLoader::default()
            .with("a.tdms", acquisition(&[1.0, 2.0, 3.0, 4.0]))
            .with("b.tdms", acquisition(&[1.0, 2.0, 3.0, 4.0]))
            .with("other.tdms", TdmsWriter::single_channel("Elsewhere", "X", &[1.0], 1.0))
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn plotted(names: &[&str], loader: &MemoryLoader) -> ViewState {
        ViewState::default()
            .apply(Action::OpenFiles(paths(names)), loader)
            .apply(Action::ChooseGroup("Measurements".into()), loader)
            .apply(Action::PlotChannel("Voltage".into()), loader)
    }

    #[test]
    fn full_selection_flow() {
        let loader = loader();
        let s0 = ViewState::default();
        assert_eq!(s0.stage.name(), "NoFile");

        let s1 = s0.apply(Action::OpenFiles(paths(&["a.tdms", "b.tdms"])), &loader);
        assert_eq!(s1.stage.name(), "FileLoaded");
        let files = s1.stage.files().unwrap();
        assert_eq!(files.groups, ["Measurements", "Text"]);
        assert_eq!(files.display(), "a.tdms, b.tdms");

        let s2 = s1.apply(Action::ChooseGroup("Measurements".into()), &loader);
        assert_eq!(s2.stage.name(), "GroupChosen");
        assert_eq!(s2.stage.group().unwrap().channels, ["Voltage", "Current"]);

        let s3 = s2.apply(Action::PlotChannel("Voltage".into()), &loader);
        assert_eq!(s3.stage.name(), "ChannelPlotted");
        let plot = s3.stage.plot().unwrap();
        assert_eq!(plot.series.values, [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(plot.series.time, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!(plot.spectrum.is_none());
        assert_eq!(s3.time_view, 1);

        // Earlier snapshots are untouched.
        assert_eq!(s1.stage.name(), "FileLoaded");
        assert_eq!(s2.stage.name(), "GroupChosen");
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let loader = loader();
        let s = ViewState::default().apply(Action::OpenFiles(Vec::new()), &loader);
        assert_eq!(s.stage.name(), "NoFile");
        assert!(s.status.is_none());
    }

    #[test]
    fn read_failure_keeps_previous_state() {
        let loader = loader();
        let s1 = ViewState::default().apply(Action::OpenFiles(paths(&["a.tdms"])), &loader);
        let s2 = s1.apply(Action::OpenFiles(paths(&["missing.tdms"])), &loader);
        assert_eq!(s2.stage.name(), "FileLoaded");
        assert!(s2.status.as_deref().unwrap().contains("missing.tdms"));
    }

    #[test]
    fn channel_missing_from_later_file_is_reported() {
        let loader = loader();
        let s = plotted(&["a.tdms", "other.tdms"], &loader);
        assert_eq!(s.stage.name(), "GroupChosen");
        let status = s.status.unwrap();
        assert!(status.contains("other.tdms"), "{status}");
        assert!(status.contains("Measurements"), "{status}");
    }

    #[test]
    fn group_without_channels_is_rejected() {
        let loader = MemoryLoader::default().with("e.tdms", {
            let mut w = TdmsWriter::new();
            w.set_group_property("Bare", "note", PropertyValue::String("x".into()));
            w
        });
        let s = ViewState::default()
            .apply(Action::OpenFiles(paths(&["e.tdms"])), &loader)
            .apply(Action::ChooseGroup("Bare".into()), &loader);
        assert_eq!(s.stage.name(), "FileLoaded");
        assert!(s.status.unwrap().contains("no channels"));
    }

    #[test]
    fn fft_toggle_computes_and_drops_spectrum() {
        let loader = loader();
        let s = plotted(&["a.tdms"], &loader);

        let shown = s.apply(Action::SetFft(true), &loader);
        let spectrum = shown.stage.plot().unwrap().spectrum.clone().unwrap();
        assert_eq!(spectrum.len(), 2);

        // Plotting another channel while shown recomputes the spectrum.
        let replot = shown.apply(Action::PlotChannel("Current".into()), &loader);
        assert!(replot.stage.plot().unwrap().spectrum.is_some());

        let hidden = replot.apply(Action::SetFft(false), &loader);
        assert!(!hidden.fft_shown());
        assert!(hidden.stage.plot().unwrap().spectrum.is_none());
    }

    #[test]
    fn fft_before_plot_waits_for_channel() {
        let loader = loader();
        let s = ViewState::default()
            .apply(Action::SetFft(true), &loader)
            .apply(Action::OpenFiles(paths(&["a.tdms"])), &loader)
            .apply(Action::ChooseGroup("Measurements".into()), &loader)
            .apply(Action::PlotChannel("Voltage".into()), &loader);
        assert!(s.stage.plot().unwrap().spectrum.is_some());
    }

    #[test]
    fn empty_channel_plots_but_reports_spectrum_error() {
        let mut w = TdmsWriter::new();
        let mut props = Properties::new();
        props.insert(SAMPLE_SPACING_PROPERTY.into(), PropertyValue::Float(1.0));
        w.add_channel("g", "empty", &[], props);
        let loader = MemoryLoader::default().with("z.tdms", w);

        let s = ViewState::default()
            .apply(Action::SetFft(true), &loader)
            .apply(Action::OpenFiles(paths(&["z.tdms"])), &loader)
            .apply(Action::ChooseGroup("g".into()), &loader)
            .apply(Action::PlotChannel("empty".into()), &loader);
        assert_eq!(s.stage.name(), "ChannelPlotted");
        assert!(s.stage.plot().unwrap().spectrum.is_none());
        assert!(s.status.unwrap().contains("empty series"));
    }

    #[test]
    fn horizontal_toggle_flips_x_only_and_back() {
        let loader = loader();
        let s = plotted(&["a.tdms"], &loader).apply(Action::SetFft(true), &loader);
        assert_eq!(s.spectrum_axes, AxisScales::default());

        let once = s.apply(Action::ToggleSpectrumAxis(Axis::Horizontal), &loader);
        assert_eq!(once.spectrum_axes.x, AxisScale::Log);
        assert_eq!(once.spectrum_axes.y, AxisScale::Linear);
        assert!(once.spectrum_view > s.spectrum_view);

        let twice = once.apply(Action::ToggleSpectrumAxis(Axis::Horizontal), &loader);
        assert_eq!(twice.spectrum_axes.x, AxisScale::Linear);
        assert_eq!(twice.spectrum_axes.y, AxisScale::Linear);
    }

    #[test]
    fn axis_toggle_needs_visible_spectrum_and_resets_on_reshow() {
        let loader = loader();
        let hidden = plotted(&["a.tdms"], &loader)
            .apply(Action::ToggleSpectrumAxis(Axis::Vertical), &loader);
        assert_eq!(hidden.spectrum_axes, AxisScales::default());

        let logged = hidden
            .apply(Action::SetFft(true), &loader)
            .apply(Action::ToggleSpectrumAxis(Axis::Vertical), &loader);
        assert_eq!(logged.spectrum_axes.y, AxisScale::Log);

        let reshown = logged
            .apply(Action::SetFft(false), &loader)
            .apply(Action::SetFft(true), &loader);
        assert_eq!(reshown.spectrum_axes, AxisScales::default());
    }

    #[test]
    fn axis_scales_survive_replot() {
        let loader = loader();
        let s = plotted(&["a.tdms"], &loader)
            .apply(Action::SetFft(true), &loader)
            .apply(Action::ToggleSpectrumAxis(Axis::Vertical), &loader)
            .apply(Action::PlotChannel("Current".into()), &loader);
        assert_eq!(s.spectrum_axes.y, AxisScale::Log);
    }

    #[test]
    fn replot_refits_visible_spectrum_only() {
        let loader = loader();
        let hidden = plotted(&["a.tdms"], &loader);
        let replot = hidden.apply(Action::PlotChannel("Current".into()), &loader);
        assert_eq!(replot.spectrum_view, hidden.spectrum_view);

        let shown = replot.apply(Action::SetFft(true), &loader);
        let replot = shown.apply(Action::PlotChannel("Voltage".into()), &loader);
        assert!(replot.spectrum_view > shown.spectrum_view);
        assert!(replot.time_view > shown.time_view);
    }

    #[test]
    fn later_successful_actions_clear_error() {
        let loader = loader();
        let failed = plotted(&["a.tdms"], &loader)
            .apply(Action::PlotChannel("Nope".into()), &loader);
        assert!(failed.status.is_some());

        let shown = failed.apply(Action::SetFft(true), &loader);
        assert!(shown.status.is_none(), "{:?}", shown.status);

        let failed = shown.apply(Action::PlotChannel("Nope".into()), &loader);
        let toggled = failed.apply(Action::ToggleSpectrumAxis(Axis::Vertical), &loader);
        assert!(toggled.status.is_none());

        let failed = toggled.apply(Action::PlotChannel("Nope".into()), &loader);
        let hidden = failed.apply(Action::SetFft(false), &loader);
        assert!(hidden.status.is_none());
    }
}
