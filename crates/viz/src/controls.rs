//! Parameter controls: scheduler choice and reward sliders.
//!
//! Edits are staged here and only reach the model on reset.

use bevy::prelude::*;

use pd_records::{ModelParams, ScheduleType};

/// Grid side length used by the dashboard
pub const GRID_SIZE: u32 = 50;

/// Plugin for the parameter controls.
pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlPanel>()
            .add_systems(Update, handle_control_input);
    }
}

/// Bounds and resolution of one slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

pub const SLIDERS: [SliderSpec; 4] = [
    SliderSpec {
        label: "Cooperation Reward",
        min: -5.0,
        max: 5.0,
        step: 1.0,
        default: 1.0,
    },
    SliderSpec {
        label: "Defected Reward",
        min: -5.0,
        max: 5.0,
        step: 1.0,
        default: 1.0,
    },
    SliderSpec {
        label: "Defection Reward",
        min: -5.0,
        max: 5.0,
        step: 1.0,
        default: 1.0,
    },
    SliderSpec {
        label: "Mutual Defection Reward",
        min: -5.0,
        max: 5.0,
        step: 1.0,
        default: 1.0,
    },
];

/// Staged control values.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ControlPanel {
    pub schedule_type: ScheduleType,
    /// Values of `SLIDERS`, same order
    pub rewards: [f64; 4],
    /// Slider the arrow keys adjust
    pub selected: usize,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            schedule_type: ScheduleType::Random,
            rewards: SLIDERS.map(|slider| slider.default),
            selected: 0,
        }
    }
}

impl ControlPanel {
    pub fn select(&mut self, index: usize) {
        if index < SLIDERS.len() {
            self.selected = index;
        }
    }

    /// Move the selected slider by `notches` steps, clamped to its range
    pub fn adjust(&mut self, notches: i32) {
        let spec = SLIDERS[self.selected];
        let value = self.rewards[self.selected] + notches as f64 * spec.step;
        self.rewards[self.selected] = value.clamp(spec.min, spec.max);
    }

    pub fn cycle_schedule(&mut self) {
        self.schedule_type = self.schedule_type.cycle();
    }

    pub fn selected_slider(&self) -> (SliderSpec, f64) {
        (SLIDERS[self.selected], self.rewards[self.selected])
    }

    /// Model parameters for the next reset
    pub fn params(&self, seed: Option<u64>) -> ModelParams {
        let [cooperation, defected, defection, mutual_defection] = self.rewards;
        ModelParams {
            width: GRID_SIZE,
            height: GRID_SIZE,
            schedule_type: self.schedule_type,
            cooperation_reward: cooperation,
            defected_reward: defected,
            defection_reward: defection,
            mutual_defection_reward: mutual_defection,
            seed,
            ..ModelParams::default()
        }
    }
}

const SLIDER_KEYS: [KeyCode; 4] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
];

/// System: S cycles the scheduler, 1-4 pick a slider, Up/Down move it.
fn handle_control_input(keyboard: Res<ButtonInput<KeyCode>>, mut panel: ResMut<ControlPanel>) {
    if keyboard.just_pressed(KeyCode::KeyS) {
        panel.cycle_schedule();
        tracing::info!("Scheduler: {} (applies on reset)", panel.schedule_type);
    }

    for (index, key) in SLIDER_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            panel.select(index);
        }
    }

    let notches = match (
        keyboard.just_pressed(KeyCode::ArrowUp),
        keyboard.just_pressed(KeyCode::ArrowDown),
    ) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    };
    if notches != 0 {
        panel.adjust(notches);
        let (spec, value) = panel.selected_slider();
        tracing::info!("{}: {} (applies on reset)", spec.label, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel() {
        let panel = ControlPanel::default();
        assert_eq!(panel.schedule_type, ScheduleType::Random);
        assert_eq!(panel.rewards, [1.0; 4]);
    }

    #[test]
    fn test_adjust_clamps_to_range() {
        let mut panel = ControlPanel::default();
        panel.select(2);
        panel.adjust(10);
        assert_eq!(panel.rewards[2], 5.0);
        panel.adjust(-3);
        assert_eq!(panel.rewards[2], 2.0);
        panel.adjust(-20);
        assert_eq!(panel.rewards[2], -5.0);
        assert_eq!(panel.rewards[0], 1.0);
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut panel = ControlPanel::default();
        panel.select(3);
        panel.select(4);
        assert_eq!(panel.selected, 3);
    }

    #[test]
    fn test_params_carry_staged_values() {
        let mut panel = ControlPanel::default();
        panel.cycle_schedule();
        panel.select(3);
        panel.adjust(-2);

        let params = panel.params(Some(9));
        assert_eq!(params.width, 50);
        assert_eq!(params.height, 50);
        assert_eq!(params.schedule_type, ScheduleType::Random.cycle());
        assert_eq!(params.mutual_defection_reward, -1.0);
        assert_eq!(params.cooperation_reward, 1.0);
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.survival_threshold, None);
    }
}
