use std::ops::Range;

use thiserror::Error;

use super::model::{Properties, SampleSeries};

#[derive(Debug, Error, PartialEq)]
pub enum AssembleError {
    #[error("no series to assemble")]
    NoSeries,
}

/// The part of an assembled series that came from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub range: Range<usize>,
}

/// Several acquisitions joined into one continuous series.
#[derive(Debug, Clone)]
pub struct AssembledSeries {
    pub values: Vec<f64>,
    /// Same length as `values`, strictly increasing.
    pub time: Vec<f64>,
    /// Spacing of the first series; used for the spectrum.
    pub spacing: f64,
    /// Properties of the first series.
    pub properties: Properties,
    pub segments: Vec<Segment>,
}

impl AssembledSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `[t, value]` pairs of one segment, ready for plotting.
    pub fn segment_points(&self, segment: &Segment) -> Vec<[f64; 2]> {
        self.time[segment.range.clone()]
            .iter()
            .zip(&self.values[segment.range.clone()])
            .map(|(&t, &v)| [t, v])
            .collect()
    }
}

/// Concatenate per-file series in order.
///
/// Each later file's local time axis is shifted by `last_time + spacing_0`,
/// where `spacing_0` is the first file's spacing, so it starts one sample
/// after the previous file ended.
pub fn assemble(series: &[SampleSeries]) -> Result<AssembledSeries, AssembleError> {
    let first = series.first().ok_or(AssembleError::NoSeries)?;
    let spacing = first.spacing;

    let total: usize = series.iter().map(SampleSeries::len).sum();
    let mut values = Vec::with_capacity(total);
    let mut time = Vec::with_capacity(total);
    let mut segments = Vec::with_capacity(series.len());

    values.extend_from_slice(&first.values);
    time.extend(first.time_track());
    segments.push(Segment {
        label: first.label.clone(),
        range: 0..first.len(),
    });
    // An empty first file leaves the next one starting at t = 0.
    let mut last_time = time.last().copied().unwrap_or(-spacing);

    for s in &series[1..] {
        if s.spacing != spacing {
            log::warn!(
                "{} has sample spacing {} but the first file has {}; time axis uses {}",
                s.label,
                s.spacing,
                spacing,
                spacing
            );
        }
        let offset = last_time + spacing;
        let start = values.len();
        values.extend_from_slice(&s.values);
        time.extend(s.time_track().into_iter().map(|t| t + offset));
        segments.push(Segment {
            label: s.label.clone(),
            range: start..values.len(),
        });
        if let Some(&t) = time.last() {
            last_time = t;
        }
    }

    Ok(AssembledSeries {
        values,
        time,
        spacing,
        properties: first.properties.clone(),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, values: &[f64], spacing: f64) -> SampleSeries {
        SampleSeries {
            label: label.into(),
            values: values.to_vec(),
            spacing,
            properties: Properties::new(),
        }
    }

    #[test]
    fn single_file_is_unchanged() {
        let a = series("a", &[3.0, -1.0, 2.5], 0.25);
        let out = assemble(std::slice::from_ref(&a)).unwrap();
        assert_eq!(out.values, a.values);
        assert_eq!(out.time, a.time_track());
        assert_eq!(out.spacing, 0.25);
        assert_eq!(out.segments, vec![Segment { label: "a".into(), range: 0..3 }]);
    }

    #[test]
    fn two_files_join_seamlessly() {
        let dt = 0.1;
        let a = series("a", &[0.0; 5], dt);
        let b = series("b", &[1.0; 7], dt);
        let out = assemble(&[a, b]).unwrap();

        assert_eq!(out.time.len(), 12);
        assert_eq!(out.values.len(), 12);
        assert!(out.time.windows(2).all(|w| w[1] > w[0]));
        assert!((out.time[5] - out.time[4] - dt).abs() < 1e-12);
        assert_eq!(out.segments[1].range, 5..12);
    }

    #[test]
    fn repeated_acquisition_continues_time_axis() {
        let a = series("a", &[1.0, 2.0, 3.0, 4.0], 1.0);
        let b = series("b", &[1.0, 2.0, 3.0, 4.0], 1.0);
        let out = assemble(&[a, b]).unwrap();
        assert_eq!(out.values, [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out.time, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(
            out.segment_points(&out.segments[1]),
            vec![[4.0, 1.0], [5.0, 2.0], [6.0, 3.0], [7.0, 4.0]]
        );
    }

    #[test]
    fn later_files_are_offset_with_first_spacing() {
        let a = series("a", &[0.0, 0.0], 1.0);
        let b = series("b", &[0.0, 0.0], 0.5);
        let out = assemble(&[a, b]).unwrap();
        assert_eq!(out.time, [0.0, 1.0, 2.0, 2.5]);
        assert_eq!(out.spacing, 1.0);
    }

    #[test]
    fn empty_first_file_starts_next_at_zero() {
        let a = series("a", &[], 2.0);
        let b = series("b", &[5.0, 6.0], 2.0);
        let out = assemble(&[a, b]).unwrap();
        assert_eq!(out.time, [0.0, 2.0]);
    }

    #[test]
    fn no_series_is_an_error() {
        assert_eq!(assemble(&[]).err(), Some(AssembleError::NoSeries));
    }
}
