use std::ops::RangeInclusive;

use eframe::egui::{Pos2, PointerButton, Rect, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::color::{segment_colors, TRACE_COLOR};
use crate::state::{Action, Axis, AxisScale, AxisScales, ViewState};

// ---------------------------------------------------------------------------
// Time-domain plot (central panel)
// ---------------------------------------------------------------------------

/// Render the assembled series, one coloured line per source file.
pub fn time_plot(ui: &mut Ui, state: &ViewState) {
    let Some(plot) = state.stage.plot() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open TDMS files, choose a group and plot a channel");
        });
        return;
    };

    let series = &plot.series;
    let colors = segment_colors(series.segments.len());
    let multi = series.segments.len() > 1;

    let mut time_plot = Plot::new(("time_plot", state.time_view))
        .x_axis_label("Time [s]")
        .y_axis_label("Amplitude [V]")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if multi {
        time_plot = time_plot.legend(Legend::default());
    }

    time_plot.show(ui, |plot_ui| {
        for (segment, color) in series.segments.iter().zip(colors) {
            let points: PlotPoints = series.segment_points(segment).into();
            let mut line = Line::new(points).color(color).width(1.5);
            if multi {
                line = line.name(&segment.label);
            }
            plot_ui.line(line);
        }
    });
}

// ---------------------------------------------------------------------------
// Spectrum plot (bottom panel)
// ---------------------------------------------------------------------------

/// Render the spectrum. A secondary click in the axis margin queues an axis toggle.
pub fn spectrum_plot(ui: &mut Ui, state: &ViewState, actions: &mut Vec<Action>) {
    let Some(spectrum) = state.stage.plot().and_then(|p| p.spectrum.clone()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Plot a channel to see its spectrum");
        });
        return;
    };

    let scales = state.spectrum_axes;
    let points: Vec<[f64; 2]> = spectrum
        .points()
        .filter_map(|p| to_plot_point(p, scales))
        .collect();

    let inner = ui.scope(|ui: &mut Ui| {
        Plot::new(("spectrum_plot", state.spectrum_view))
            .x_axis_label(axis_label("Frequency [Hz]", scales.x))
            .y_axis_label(axis_label("Amplitude [V/√Hz]", scales.y))
            .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                format_tick(mark.value, scales.x)
            })
            .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                format_tick(mark.value, scales.y)
            })
            .label_formatter(move |_name: &str, p: &PlotPoint| {
                format!(
                    "f = {} Hz\nA = {}",
                    format_tick(p.x, scales.x),
                    format_tick(p.y, scales.y)
                )
            })
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(points)).color(TRACE_COLOR).width(1.5));
            })
    });

    let outer = inner.response.rect;
    let data_area = *inner.inner.transform.frame();
    let click = ui.input(|i| {
        if i.pointer.button_clicked(PointerButton::Secondary) {
            i.pointer.interact_pos()
        } else {
            None
        }
    });
    if let Some(axis) = click.and_then(|pos| margin_click_axis(pos, outer, data_area)) {
        log::debug!("axis toggle click in spectrum margin: {axis:?}");
        actions.push(Action::ToggleSpectrumAxis(axis));
    }
}

/// Which axis a click at `pos` toggles, if it lies in the margin (inside
/// `outer` but outside `data_area`).
///
/// Offsets are measured from the bottom-left corner of `outer`: a click
/// further right than up belongs to the horizontal axis.
pub fn margin_click_axis(pos: Pos2, outer: Rect, data_area: Rect) -> Option<Axis> {
    if !outer.contains(pos) || data_area.contains(pos) {
        return None;
    }
    let x = pos.x - outer.left();
    let y = outer.bottom() - pos.y;
    Some(if x > y { Axis::Horizontal } else { Axis::Vertical })
}

/// Map a spectrum point into plot space; log axes drop non-positive values.
pub fn to_plot_point([x, y]: [f64; 2], scales: AxisScales) -> Option<[f64; 2]> {
    Some([to_plot(x, scales.x)?, to_plot(y, scales.y)?])
}

fn to_plot(v: f64, scale: AxisScale) -> Option<f64> {
    match scale {
        AxisScale::Linear => Some(v),
        AxisScale::Log if v > 0.0 => Some(v.log10()),
        AxisScale::Log => None,
    }
}

fn format_tick(v: f64, scale: AxisScale) -> String {
    match scale {
        AxisScale::Linear => format!("{v}"),
        AxisScale::Log => format!("{:.3e}", 10f64.powf(v)),
    }
}

fn axis_label(label: &str, scale: AxisScale) -> String {
    match scale {
        AxisScale::Linear => label.to_string(),
        AxisScale::Log => format!("{label} (log)"),
    }
}
