use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{Action, ViewState};

// ---------------------------------------------------------------------------
// Combo-box selections not yet confirmed with a button
// ---------------------------------------------------------------------------

/// Pending group / channel picks. `None` means "first entry".
#[derive(Debug, Clone, Default)]
pub struct Picks {
    pub group: Option<String>,
    pub channel: Option<String>,
}

impl Picks {
    /// Picks to keep once `action` has been applied successfully.
    pub fn after(&self, action: &Action) -> Picks {
        match action {
            Action::OpenFiles(_) => Picks::default(),
            Action::ChooseGroup(group) => Picks {
                group: Some(group.clone()),
                channel: None,
            },
            _ => self.clone(),
        }
    }
}

/// The picked entry if it is still offered, otherwise the first one.
fn pick_or_first<'a>(pick: &Option<String>, options: &'a [String]) -> Option<&'a String> {
    pick.as_ref()
        .and_then(|p| options.iter().find(|o| *o == p))
        .or_else(|| options.first())
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &ViewState, actions: &mut Vec<Action>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                actions.extend(open_file_dialog());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(plot) = state.stage.plot() {
            ui.label(format!(
                "{} samples from {} file(s), dt = {} s",
                plot.series.len(),
                plot.series.segments.len(),
                plot.series.spacing
            ));
        }

        if let Some(msg) = &state.status {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Data selection
// ---------------------------------------------------------------------------

/// File / group / channel rows and the FFT checkbox.
pub fn choose_data(ui: &mut Ui, state: &ViewState, picks: &mut Picks, actions: &mut Vec<Action>) {
    ui.strong("Choose Data");

    let files = state.stage.files();
    let groups: &[String] = files.map(|f| f.groups.as_slice()).unwrap_or_default();
    let channels: &[String] = state
        .stage
        .group()
        .map(|g| g.channels.as_slice())
        .unwrap_or_default();

    egui::Grid::new("choose_data")
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            // ---- Files ----
            ui.label("TDMS File");
            let display = files.map(|f| f.display()).unwrap_or_default();
            ui.add(
                egui::TextEdit::singleline(&mut display.as_str())
                    .desired_width(480.0)
                    .hint_text("no file selected"),
            );
            if ui.button("Open").clicked() {
                actions.extend(open_file_dialog());
            }
            ui.end_row();

            // ---- Group ----
            ui.label("TDMS Group");
            let current_group = pick_or_first(&picks.group, groups).cloned();
            ui.add_enabled_ui(!groups.is_empty(), |ui: &mut Ui| {
                combo(ui, "group_combo", current_group.as_deref(), groups, &mut picks.group);
            });
            if ui
                .add_enabled(current_group.is_some(), egui::Button::new("Open"))
                .clicked()
            {
                if let Some(group) = current_group {
                    actions.push(Action::ChooseGroup(group));
                }
            }
            ui.end_row();

            // ---- Channel ----
            ui.label("TDMS Channel");
            let current_channel = pick_or_first(&picks.channel, channels).cloned();
            ui.add_enabled_ui(!channels.is_empty(), |ui: &mut Ui| {
                combo(
                    ui,
                    "channel_combo",
                    current_channel.as_deref(),
                    channels,
                    &mut picks.channel,
                );
            });
            if ui
                .add_enabled(current_channel.is_some(), egui::Button::new("Plot"))
                .clicked()
            {
                if let Some(channel) = current_channel {
                    actions.push(Action::PlotChannel(channel));
                }
            }

            let mut fft = state.fft_shown();
            if ui.checkbox(&mut fft, "Plot FFT").changed() {
                actions.push(Action::SetFft(fft));
            }
            ui.end_row();
        });
}

fn combo(ui: &mut Ui, id: &str, current: Option<&str>, options: &[String], pick: &mut Option<String>) {
    egui::ComboBox::from_id_salt(id)
        .width(240.0)
        .selected_text(current.unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui
                    .selectable_label(current == Some(option.as_str()), option)
                    .clicked()
                {
                    *pick = Some(option.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Left side panel – channel properties
// ---------------------------------------------------------------------------

/// Properties of the plotted channel (taken from the first file).
pub fn properties_panel(ui: &mut Ui, state: &ViewState) {
    ui.heading("Properties");
    ui.separator();

    let Some(plot) = state.stage.plot() else {
        ui.label("No channel plotted.");
        return;
    };
    let properties = &plot.series.properties;

    ui.label(RichText::new(&plot.channel).strong());
    if ui.small_button("Copy as JSON").clicked() {
        match serde_json::to_string_pretty(properties) {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("Failed to serialize properties: {e}"),
        }
    }
    ui.add_space(4.0);

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().resizable(true))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Name");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("Value");
                });
            })
            .body(|mut body| {
                for (name, value) in properties {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(name);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for one or more TDMS files. Cancelling yields no action.
pub fn open_file_dialog() -> Option<Action> {
    let files: Vec<PathBuf> = rfd::FileDialog::new()
        .set_title("Open TDMS files")
        .add_filter("TDMS File", &["tdms"])
        .pick_files()?;
    if files.is_empty() {
        return None;
    }
    Some(Action::OpenFiles(files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_falls_back_to_first_option() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pick_or_first(&None, &options), Some(&options[0]));
        assert_eq!(pick_or_first(&Some("b".into()), &options), Some(&options[1]));
        assert_eq!(pick_or_first(&Some("gone".into()), &options), Some(&options[0]));
        assert_eq!(pick_or_first(&None, &[]), None);
    }

    #[test]
    fn chosen_group_stays_selected() {
        let groups = vec!["A".to_string(), "B".to_string()];
        let picks = Picks {
            group: Some("B".into()),
            channel: Some("old".into()),
        };

        let picks = picks.after(&Action::ChooseGroup("B".into()));
        assert_eq!(pick_or_first(&picks.group, &groups).map(String::as_str), Some("B"));
        assert_eq!(picks.channel, None);

        let kept = picks.after(&Action::SetFft(true));
        assert_eq!(kept.group.as_deref(), Some("B"));

        let reset = kept.after(&Action::OpenFiles(vec![PathBuf::from("x.tdms")]));
        assert_eq!(pick_or_first(&reset.group, &groups).map(String::as_str), Some("A"));
    }
}
