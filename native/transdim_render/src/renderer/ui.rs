//! Path: native/transdim_render/src/renderer/ui.rs
//! Summary: egui による HUD（操作案内・設置メッセージ・案内テキスト・フェード・完了画面）

use transdim_core::snapshot::HudData;
use transdim_core::world::WorldId;
use transdim_core::Phase;

const TEXT_DIM: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 128);
const TEXT_FAINT: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 51);

pub fn build_hud_ui(ctx: &egui::Context, hud: &HudData, fps: f32) {
    match hud.phase {
        Phase::Loading       => build_banner_ui(ctx, "Loading"),
        Phase::Playing       => build_playing_ui(ctx, hud),
        Phase::LevelComplete => build_banner_ui(ctx, "Loading next level"),
        Phase::Completed     => build_completed_ui(ctx),
    }
    build_fade_ui(ctx, hud.fade_opacity);
    build_fps_ui(ctx, fps);
}

/// 黒背景に中央寄せの大きな文字
fn build_banner_ui(ctx: &egui::Context, text: &str) {
    egui::Area::new(egui::Id::new("banner"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
        .order(egui::Order::Background)
        .show(ctx, |ui| {
            let rect = ui.ctx().screen_rect();
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, egui::Color32::BLACK);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(50.0),
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 204),
            );
        });
}

fn build_playing_ui(ctx: &egui::Context, hud: &HudData) {
    egui::Area::new(egui::Id::new("hud_text"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            let rect = ui.ctx().screen_rect();
            let painter = ui.painter();

            // "?" マーカー
            for &(x, y) in &hud.markers {
                painter.text(
                    egui::pos2(x, y),
                    egui::Align2::CENTER_CENTER,
                    "?",
                    egui::FontId::proportional(50.0),
                    TEXT_FAINT,
                );
            }

            if hud.show_hud {
                painter.text(
                    egui::pos2(rect.right() - 150.0, 64.0),
                    egui::Align2::RIGHT_CENTER,
                    "Press [space] to switch worlds",
                    egui::FontId::proportional(17.0),
                    TEXT_DIM,
                );
            }

            if hud.carrying && hud.world == WorldId::B {
                painter.text(
                    egui::pos2(128.0, 64.0),
                    egui::Align2::LEFT_CENTER,
                    "Use [left] or [right] to place the block",
                    egui::FontId::proportional(17.0),
                    TEXT_DIM,
                );
            }

            if let Some(msg) = &hud.place_message {
                painter.text(
                    egui::pos2(rect.center().x, 96.0),
                    egui::Align2::CENTER_TOP,
                    msg,
                    egui::FontId::proportional(20.0),
                    TEXT_FAINT,
                );
            }

            if let Some(hint) = &hud.hint {
                painter.text(
                    rect.center() - egui::vec2(0.0, 50.0),
                    egui::Align2::CENTER_CENTER,
                    hint,
                    egui::FontId::proportional(20.0),
                    TEXT_DIM,
                );
            }
        });
}

fn build_completed_ui(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("completed"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(5, 5, 20, 230))
                .inner_margin(egui::Margin::symmetric(60, 40))
                .corner_radius(16.0)
                .stroke(egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 160, 255)))
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(
                            egui::RichText::new("Thanks for playing!")
                                .color(egui::Color32::from_rgb(120, 200, 255))
                                .size(36.0)
                                .strong(),
                        );
                        ui.add_space(8.0);
                        ui.label(
                            egui::RichText::new("Esc: Quit")
                                .color(egui::Color32::from_rgb(150, 170, 190))
                                .size(14.0),
                        );
                    });
                });
        });
}

/// 世界切り替え中の暗転（HUD ごと覆う）
fn build_fade_ui(ctx: &egui::Context, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    egui::Area::new(egui::Id::new("fade"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            let rect = ui.ctx().screen_rect();
            ui.painter().rect_filled(rect, 0.0, egui::Color32::from_rgba_unmultiplied(50, 50, 50, alpha));
        });
}

fn build_fps_ui(ctx: &egui::Context, fps: f32) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    egui::Area::new(egui::Id::new("fps"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(7.0, 3.0))
        .order(egui::Order::Debug)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {fps:.0}"))
                    .monospace()
                    .color(egui::Color32::BLACK),
            );
        });
}
