//! UI overlay: status line, staged controls and key help.

use bevy::prelude::*;

use crate::controls::{ControlPanel, SLIDERS};
use crate::model_runner::{DashboardView, Playback};

/// Plugin for UI overlay rendering.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_overlay)
            .add_systems(Update, update_overlay_text);
    }
}

/// Component for the status text.
#[derive(Component)]
pub struct StatusText;

/// Component for the controls text.
#[derive(Component)]
pub struct ControlsText;

const KEY_HELP: &str = concat!(
    "Space play/pause | N step | R reset | S scheduler | ",
    "1-4 slider | Up/Down adjust | +/- speed"
);

fn setup_overlay(mut commands: Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(8.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
            background_color: Color::srgba(0.0, 0.0, 0.0, 0.6).into(),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 16.0,
                        color: Color::srgb(0.95, 0.95, 0.95),
                        ..default()
                    },
                ),
                StatusText,
            ));
            parent.spawn((
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 13.0,
                        color: Color::srgb(0.8, 0.8, 0.8),
                        ..default()
                    },
                ),
                ControlsText,
            ));
            parent.spawn(TextBundle::from_section(
                KEY_HELP,
                TextStyle {
                    font_size: 12.0,
                    color: Color::srgb(0.6, 0.6, 0.6),
                    ..default()
                },
            ));
        });
}

/// Status line for the current model
pub fn status_line(view: &DashboardView, playback: &Playback) -> String {
    let state = if view.halted() {
        "halted"
    } else if playback.playing {
        "playing"
    } else {
        "paused"
    };
    let counts = view
        .history
        .last()
        .map(|vars| {
            format!(
                " | C {} D {} | {:.1}% cooperating",
                vars.cooperating, vars.defecting, vars.proportion
            )
        })
        .unwrap_or_default();
    let schedule = view
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.schedule_type.to_string())
        .unwrap_or_default();
    format!(
        "Step {} | {} | {} | {:.1} steps/s | seed {}{}",
        view.current_step(),
        state,
        schedule,
        playback.steps_per_second(),
        view.seed,
        counts
    )
}

/// Staged control values, the selected slider marked
pub fn controls_lines(panel: &ControlPanel) -> String {
    let mut lines = vec![format!("Scheduler: {} (on reset)", panel.schedule_type)];
    for (index, (spec, value)) in SLIDERS.iter().zip(panel.rewards).enumerate() {
        let marker = if index == panel.selected { '>' } else { ' ' };
        lines.push(format!("{} {} {}: {}", marker, index + 1, spec.label, value));
    }
    lines.join("\n")
}

fn update_overlay_text(
    view: Res<DashboardView>,
    playback: Res<Playback>,
    panel: Res<ControlPanel>,
    mut status: Query<&mut Text, (With<StatusText>, Without<ControlsText>)>,
    mut controls: Query<&mut Text, (With<ControlsText>, Without<StatusText>)>,
) {
    if view.is_changed() || playback.is_changed() {
        for mut text in status.iter_mut() {
            text.sections[0].value = status_line(&view, &playback);
        }
    }
    if panel.is_changed() {
        for mut text in controls.iter_mut() {
            text.sections[0].value = controls_lines(&panel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_before_model() {
        let view = DashboardView::default();
        let playback = Playback::new(4.0, false);
        assert_eq!(status_line(&view, &playback), "Step 0 | paused |  | 4.0 steps/s | seed 0");
    }

    #[test]
    fn test_controls_mark_selection() {
        let mut panel = ControlPanel::default();
        panel.select(1);
        let text = controls_lines(&panel);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Scheduler: Random (on reset)");
        assert_eq!(lines[1], "  1 Cooperation Reward: 1");
        assert_eq!(lines[2], "> 2 Defected Reward: 1");
        assert_eq!(lines.len(), 5);
    }
}
