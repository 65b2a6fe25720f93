//! Main dashboard plugin that ties all systems together.

use bevy::prelude::*;

use crate::canvas::CanvasPlugin;
use crate::charts::ChartsPlugin;
use crate::controls::ControlsPlugin;
use crate::model_runner::ModelRunnerPlugin;
use crate::overlay::OverlayPlugin;

/// Main plugin for the dashboard.
///
/// Sets up the window and camera, then adds the model, canvas, chart,
/// control and overlay plugins.
pub struct DashboardPlugin;

impl Plugin for DashboardPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Prisoner's Dilemma".into(),
                        resolution: (1280., 720.).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
        .add_systems(Startup, setup_camera)
        .add_plugins((
            ControlsPlugin,
            ModelRunnerPlugin,
            CanvasPlugin,
            ChartsPlugin,
            OverlayPlugin,
        ));
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}
