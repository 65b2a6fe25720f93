//! Integration tests for the dashboard model loop.
//!
//! Runs the model and control plugins headless and drives them with
//! synthetic key presses.

use bevy::prelude::*;
use viz::controls::ControlsPlugin;
use viz::model_runner::{DashboardConfig, DashboardView, ModelRunnerPlugin, Playback};

fn headless_app(config: DashboardConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<ButtonInput<KeyCode>>()
        .insert_resource(config)
        .add_plugins((ControlsPlugin, ModelRunnerPlugin));
    app.update();
    app
}

fn tap(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(key);
    app.update();
    let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keyboard.release(key);
    keyboard.clear();
}

fn view_step(app: &App) -> u64 {
    app.world().resource::<DashboardView>().current_step()
}

#[test]
fn test_model_starts_at_step_zero() {
    let app = headless_app(DashboardConfig {
        seed: Some(1),
        ..DashboardConfig::default()
    });
    let view = app.world().resource::<DashboardView>();
    assert_eq!(view.current_step(), 0);
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.snapshot.as_ref().map(|s| s.cells.len()), Some(2500));
    assert!(!app.world().resource::<Playback>().playing);
}

#[test]
fn test_step_and_reset_keys() {
    let mut app = headless_app(DashboardConfig {
        seed: Some(2),
        ..DashboardConfig::default()
    });

    tap(&mut app, KeyCode::KeyN);
    assert_eq!(view_step(&app), 1);
    tap(&mut app, KeyCode::ArrowRight);
    assert_eq!(view_step(&app), 2);

    tap(&mut app, KeyCode::KeyR);
    assert_eq!(view_step(&app), 0);
    assert_eq!(app.world().resource::<DashboardView>().seed, 2);
}

#[test]
fn test_step_limit_blocks_manual_steps() {
    let mut app = headless_app(DashboardConfig {
        seed: Some(3),
        max_steps: 1,
        ..DashboardConfig::default()
    });

    tap(&mut app, KeyCode::KeyN);
    tap(&mut app, KeyCode::KeyN);
    assert_eq!(view_step(&app), 1);
}

#[test]
fn test_schedule_change_applies_on_reset() {
    let mut app = headless_app(DashboardConfig {
        seed: Some(4),
        ..DashboardConfig::default()
    });
    let schedule = |app: &App| {
        app.world()
            .resource::<DashboardView>()
            .snapshot
            .as_ref()
            .map(|s| s.schedule_type)
    };
    let before = schedule(&app);

    tap(&mut app, KeyCode::KeyS);
    assert_eq!(schedule(&app), before);

    tap(&mut app, KeyCode::KeyR);
    assert_ne!(schedule(&app), before);
}

#[test]
fn test_space_toggles_playback() {
    let mut app = headless_app(DashboardConfig::default());
    tap(&mut app, KeyCode::Space);
    assert!(app.world().resource::<Playback>().playing);
    tap(&mut app, KeyCode::Space);
    assert!(!app.world().resource::<Playback>().playing);
}
