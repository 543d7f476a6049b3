use eframe::egui;

use crate::data::loader::FileLoader;
use crate::state::{Action, ViewState};
use crate::ui::panels::{self, Picks};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct QuickPlotApp {
    pub state: ViewState,
    picks: Picks,
    loader: FileLoader,
}

impl QuickPlotApp {
    /// Replace the state snapshot with the result of `action`.
    fn dispatch(&mut self, action: Action) {
        let picks = self.picks.after(&action);
        let next = self.state.apply(action, &self.loader);
        if next.status.is_none() {
            self.picks = picks;
        }
        self.state = next;
    }
}

impl eframe::App for QuickPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &mut actions);
        });

        // ---- Top panel: file / group / channel selection ----
        egui::TopBottomPanel::top("choose_data").show(ctx, |ui| {
            panels::choose_data(ui, &self.state, &mut self.picks, &mut actions);
        });

        // ---- Left side panel: channel properties ----
        egui::SidePanel::left("properties_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::properties_panel(ui, &self.state);
            });

        // ---- Bottom panel: spectrum ----
        if self.state.fft_shown() {
            egui::TopBottomPanel::bottom("fft_panel")
                .resizable(true)
                .default_height(320.0)
                .show(ctx, |ui| {
                    ui.strong("FFT Plot");
                    plot::spectrum_plot(ui, &self.state, &mut actions);
                });
        }

        // ---- Central panel: time plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.strong("Data Plot");
            plot::time_plot(ui, &self.state);
        });

        for action in actions {
            self.dispatch(action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Shutting down, releasing plotted data");
        self.state = ViewState::default();
        self.picks = Picks::default();
    }
}
