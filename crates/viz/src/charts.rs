//! Line charts of the reporter history, drawn with gizmos.

use bevy::prelude::*;

use pd_records::ModelVars;

use crate::model_runner::DashboardView;

/// Plugin for the history charts.
pub struct ChartsPlugin;

impl Plugin for ChartsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_chart_labels)
            .add_systems(Update, draw_charts);
    }
}

/// Screen rectangle a chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    /// Bottom-left corner in world coordinates
    pub origin: Vec2,
    pub size: Vec2,
}

impl ChartArea {
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    fn corners(&self) -> [Vec2; 5] {
        let o = self.origin;
        let s = self.size;
        [
            o,
            o + Vec2::new(s.x, 0.0),
            o + s,
            o + Vec2::new(0.0, s.y),
            o,
        ]
    }
}

pub const COUNTS_CHART: ChartArea =
    ChartArea::new(Vec2::new(-40.0, 30.0), Vec2::new(620.0, 220.0));
pub const PROPORTION_CHART: ChartArea =
    ChartArea::new(Vec2::new(-40.0, -250.0), Vec2::new(620.0, 220.0));

/// Map a series onto a chart; x spans the series, y spans 0..=`y_max`
pub fn series_points(values: &[f64], area: &ChartArea, y_max: f64) -> Vec<Vec2> {
    let span = values.len().saturating_sub(1).max(1) as f32;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let fraction = (value / y_max).clamp(0.0, 1.0) as f32;
            area.origin + Vec2::new(i as f32 / span * area.size.x, fraction * area.size.y)
        })
        .collect()
}

fn column(history: &[ModelVars], pick: impl Fn(&ModelVars) -> f64) -> Vec<f64> {
    history.iter().map(pick).collect()
}

fn spawn_chart_labels(mut commands: Commands) {
    let labels = [
        ("Cooperating", COUNTS_CHART, 0.0, Color::srgb(0.2, 0.4, 0.9)),
        ("Defecting", COUNTS_CHART, 130.0, Color::srgb(0.9, 0.2, 0.2)),
        ("Proportion", PROPORTION_CHART, 0.0, Color::srgb(0.2, 0.8, 0.3)),
    ];
    for (label, area, offset, color) in labels {
        let position = area.origin + Vec2::new(offset, area.size.y + 12.0);
        commands.spawn(Text2dBundle {
            text: Text::from_section(
                label,
                TextStyle {
                    font_size: 16.0,
                    color,
                    ..default()
                },
            ),
            text_anchor: bevy::sprite::Anchor::CenterLeft,
            transform: Transform::from_xyz(position.x, position.y, 1.0),
            ..default()
        });
    }
}

/// System to redraw both charts every frame.
fn draw_charts(mut gizmos: Gizmos, view: Res<DashboardView>) {
    let frame = Color::srgb(0.4, 0.4, 0.45);
    gizmos.linestrip_2d(COUNTS_CHART.corners(), frame);
    gizmos.linestrip_2d(PROPORTION_CHART.corners(), frame);

    if view.history.len() < 2 {
        return;
    }

    let population = view
        .snapshot
        .as_ref()
        .map_or(1.0, |snapshot| snapshot.cells.len() as f64);
    let cooperating = column(&view.history, |vars| vars.cooperating as f64);
    let defecting = column(&view.history, |vars| vars.defecting as f64);
    let proportion = column(&view.history, |vars| vars.proportion);

    gizmos.linestrip_2d(
        series_points(&cooperating, &COUNTS_CHART, population),
        Color::srgb(0.2, 0.4, 0.9),
    );
    gizmos.linestrip_2d(
        series_points(&defecting, &COUNTS_CHART, population),
        Color::srgb(0.9, 0.2, 0.2),
    );
    gizmos.linestrip_2d(
        series_points(&proportion, &PROPORTION_CHART, 100.0),
        Color::srgb(0.2, 0.8, 0.3),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: ChartArea = ChartArea::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0));

    #[test]
    fn test_series_spans_chart() {
        let points = series_points(&[0.0, 50.0, 100.0], &AREA, 100.0);
        assert_eq!(
            points,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(50.0, 25.0),
                Vec2::new(100.0, 50.0)
            ]
        );
    }

    #[test]
    fn test_series_clamps_out_of_range() {
        let points = series_points(&[-10.0, 500.0], &AREA, 100.0);
        assert_eq!(points[0].y, 0.0);
        assert_eq!(points[1].y, 50.0);
    }

    #[test]
    fn test_single_point_and_empty() {
        assert_eq!(series_points(&[20.0], &AREA, 0.0), vec![Vec2::new(0.0, 50.0)]);
        assert!(series_points(&[], &AREA, 10.0).is_empty());
    }

    #[test]
    fn test_frame_is_closed() {
        let corners = AREA.corners();
        assert_eq!(corners[0], corners[4]);
        assert_eq!(corners[2], Vec2::new(100.0, 50.0));
    }
}
