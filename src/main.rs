use eframe::egui;
use quick_plot_tdms::app::QuickPlotApp;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Quick Plot TDMS")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Quick Plot TDMS",
        options,
        Box::new(|_cc| Ok(Box::new(QuickPlotApp::default()))),
    )
}
