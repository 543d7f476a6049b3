//! Quick viewer for TDMS waveform files.
//!
//! [`data`] reads TDMS files, joins consecutive acquisitions and estimates
//! amplitude spectral densities; [`state`] is the selection state machine the
//! egui front-end in [`app`] and [`ui`] drives.

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
