/// Data layer: file reading, assembly, and spectral estimation.
///
/// Architecture:
/// ```text
///   a.tdms  b.tdms  ...
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  open file → dyn WaveformSource (tdms parser)
///   └──────────┘
///        │  SampleSeries per file
///        ▼
///   ┌──────────┐
///   │ assemble  │  concatenate, shift time axes → AssembledSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ spectrum  │  Hann window + FFT → one-sided ASD
///   └──────────┘
/// ```

pub mod assemble;
pub mod loader;
pub mod model;
pub mod spectrum;
pub mod tdms;
pub mod writer;
