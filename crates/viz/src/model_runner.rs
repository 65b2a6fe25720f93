//! Model runner: owns the live model and drives playback.
//!
//! The model lives in a non-send resource on the main thread. After every
//! step or reset a fresh snapshot and the reporter history are published
//! in `DashboardView` and a `ModelRefreshed` event is sent.

use bevy::prelude::*;
use std::time::Duration;

use pd_core::PdGrid;
use pd_records::{GridSnapshot, ModelVars};

use crate::controls::ControlPanel;

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 60.0;

/// Plugin for the live model and its playback.
pub struct ModelRunnerPlugin;

impl Plugin for ModelRunnerPlugin {
    fn build(&self, app: &mut App) {
        // DashboardConfig is normally inserted by main.rs
        if !app.world().contains_resource::<DashboardConfig>() {
            app.init_resource::<DashboardConfig>();
        }
        if !app.world().contains_resource::<ControlPanel>() {
            app.init_resource::<ControlPanel>();
        }

        let config = app.world().resource::<DashboardConfig>().clone();
        app.insert_resource(Playback::new(config.steps_per_second, config.auto_start))
            .init_resource::<DashboardView>()
            .add_event::<ModelRefreshed>()
            .add_systems(Startup, start_model)
            .add_systems(Update, (handle_playback_input, advance_playback).chain());
    }
}

/// Launch options for the dashboard.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Seed reused by every reset; fresh entropy when absent
    pub seed: Option<u64>,
    pub steps_per_second: f32,
    pub auto_start: bool,
    /// Playback pauses at this step; 0 never pauses
    pub max_steps: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed: None,
            steps_per_second: 4.0,
            auto_start: false,
            max_steps: 0,
        }
    }
}

/// The running model.
pub struct LiveModel(pub PdGrid);

/// Playback clock.
#[derive(Resource, Debug)]
pub struct Playback {
    pub playing: bool,
    steps_per_second: f32,
    timer: Timer,
}

impl Playback {
    pub fn new(steps_per_second: f32, playing: bool) -> Self {
        let steps_per_second = steps_per_second.clamp(MIN_SPEED, MAX_SPEED);
        Self {
            playing,
            steps_per_second,
            timer: Timer::from_seconds(1.0 / steps_per_second, TimerMode::Repeating),
        }
    }

    pub fn steps_per_second(&self) -> f32 {
        self.steps_per_second
    }

    pub fn set_speed(&mut self, steps_per_second: f32) {
        self.steps_per_second = steps_per_second.clamp(MIN_SPEED, MAX_SPEED);
        self.timer
            .set_duration(Duration::from_secs_f32(1.0 / self.steps_per_second));
    }

    pub fn faster(&mut self) {
        self.set_speed(self.steps_per_second * 2.0);
    }

    pub fn slower(&mut self) {
        self.set_speed(self.steps_per_second / 2.0);
    }

    /// Steps due after `delta` of wall time
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if !self.playing {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

/// What the canvas, charts and overlay draw.
#[derive(Resource, Debug, Default)]
pub struct DashboardView {
    pub snapshot: Option<GridSnapshot>,
    /// Reporter rows from step 0 onwards
    pub history: Vec<ModelVars>,
    pub seed: u64,
}

impl DashboardView {
    pub fn refresh(&mut self, model: &mut PdGrid) {
        self.snapshot = Some(model.snapshot());
        self.history = model.model_vars().to_vec();
        self.seed = model.seed();
    }

    pub fn current_step(&self) -> u64 {
        self.snapshot.as_ref().map_or(0, |snapshot| snapshot.step)
    }

    pub fn halted(&self) -> bool {
        self.snapshot.as_ref().map_or(false, |snapshot| !snapshot.running)
    }
}

/// Event emitted whenever `DashboardView` changes.
#[derive(Event, Debug, Clone, Copy)]
pub struct ModelRefreshed;

/// True once playback has reached its step limit
pub fn reached_limit(step: u64, max_steps: u64) -> bool {
    max_steps > 0 && step >= max_steps
}

fn build_model(panel: &ControlPanel, config: &DashboardConfig) -> Option<PdGrid> {
    match PdGrid::new(panel.params(config.seed)) {
        Ok(model) => {
            tracing::info!(
                "Model ready: {}, seed {}",
                panel.schedule_type,
                model.seed()
            );
            Some(model)
        }
        Err(e) => {
            tracing::error!("Could not build model: {}", e);
            None
        }
    }
}

/// Startup system: build the first model from the control panel.
pub fn start_model(world: &mut World) {
    let config = world.resource::<DashboardConfig>().clone();
    let panel = world.resource::<ControlPanel>().clone();
    let Some(mut model) = build_model(&panel, &config) else {
        return;
    };

    world.resource_mut::<DashboardView>().refresh(&mut model);
    world.insert_non_send_resource(LiveModel(model));
    world.send_event(ModelRefreshed);
}

/// Advance the model once, unless it has halted or hit the step limit
fn step_once(live: &mut LiveModel, config: &DashboardConfig) -> bool {
    let model = &mut live.0;
    if !model.running() || reached_limit(model.current_step(), config.max_steps) {
        return false;
    }
    model.step();
    true
}

/// System: Space play/pause, N or Right step, R reset, +/- speed.
fn handle_playback_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<DashboardConfig>,
    panel: Res<ControlPanel>,
    mut playback: ResMut<Playback>,
    mut view: ResMut<DashboardView>,
    mut refreshed: EventWriter<ModelRefreshed>,
    live: Option<NonSendMut<LiveModel>>,
) {
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        playback.faster();
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        playback.slower();
    }

    let Some(mut live) = live else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Space) {
        playback.playing = !playback.playing;
        let status = if playback.playing { "playing" } else { "paused" };
        tracing::info!("Playback {}", status);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        if let Some(model) = build_model(&panel, &config) {
            live.0 = model;
            view.refresh(&mut live.0);
            refreshed.send(ModelRefreshed);
        }
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyN) || keyboard.just_pressed(KeyCode::ArrowRight) {
        playback.playing = false;
        if step_once(&mut live, &config) {
            view.refresh(&mut live.0);
            refreshed.send(ModelRefreshed);
        }
    }
}

/// System: step the model at the playback rate.
fn advance_playback(
    time: Res<Time>,
    config: Res<DashboardConfig>,
    mut playback: ResMut<Playback>,
    mut view: ResMut<DashboardView>,
    mut refreshed: EventWriter<ModelRefreshed>,
    live: Option<NonSendMut<LiveModel>>,
) {
    let Some(mut live) = live else {
        return;
    };

    let due = playback.tick(time.delta());
    let mut stepped = false;
    for _ in 0..due {
        if !step_once(&mut live, &config) {
            playback.playing = false;
            tracing::info!(step = live.0.current_step(), "Playback stopped");
            break;
        }
        stepped = true;
    }

    if stepped {
        view.refresh(&mut live.0);
        refreshed.send(ModelRefreshed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reached_limit() {
        assert!(!reached_limit(100, 0));
        assert!(!reached_limit(9, 10));
        assert!(reached_limit(10, 10));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut playback = Playback::new(100.0, false);
        assert_eq!(playback.steps_per_second(), MAX_SPEED);
        playback.set_speed(0.01);
        assert_eq!(playback.steps_per_second(), MIN_SPEED);
        playback.faster();
        assert_eq!(playback.steps_per_second(), 1.0);
    }

    #[test]
    fn test_paused_playback_never_steps() {
        let mut playback = Playback::new(10.0, false);
        assert_eq!(playback.tick(Duration::from_secs(5)), 0);
        playback.playing = true;
        assert_eq!(playback.tick(Duration::from_millis(250)), 2);
    }

    #[test]
    fn test_view_tracks_model() {
        let mut model = PdGrid::new(ControlPanel::default().params(Some(3))).unwrap();
        model.run(2);
        let mut view = DashboardView::default();
        view.refresh(&mut model);

        assert_eq!(view.current_step(), 2);
        assert_eq!(view.history.len(), 3);
        assert_eq!(view.seed, 3);
        assert!(!view.halted());
        assert_eq!(view.snapshot.map(|s| s.cells.len()), Some(2500));
    }
}
