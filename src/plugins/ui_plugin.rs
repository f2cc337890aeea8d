use bevy::prelude::*;

use crate::game::aim::{AimController, AimState};
use crate::game::components::Archer;
use crate::game::events::GameEvent;
use crate::game::projectile::{FlightState, Projectile};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HitCount>();
        app.add_systems(Startup, setup_ui);
        app.add_systems(Update, (count_hits, update_aim_display, update_score_display));
    }
}

/// Arrows that landed in an obstacle since startup, and where the last one stuck.
#[derive(Resource, Default, Debug)]
pub struct HitCount {
    pub total: u32,
    pub last: Option<(String, Vec2)>,
}

#[derive(Component)]
struct AimText;

#[derive(Component)]
struct ScoreText;

fn setup_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(6.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                AimText,
                Text::new("Idle"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent.spawn((
                ScoreText,
                Text::new("In flight: 0  Hits: 0"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.2)),
            ));

            parent.spawn((
                Text::new("Drag to draw, release to shoot. F5 reloads tuning."),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.6)),
            ));
        });
}

fn count_hits(
    mut events: MessageReader<GameEvent>,
    names: Query<&Name>,
    mut hits: ResMut<HitCount>,
) {
    for event in events.read() {
        if let GameEvent::ProjectileImpacted { obstacle, position } = event {
            let name = names
                .get(*obstacle)
                .map_or_else(|_| "obstacle".to_string(), |n| n.as_str().to_string());
            hits.total += 1;
            hits.last = Some((name, *position));
        }
    }
}

fn score_line(in_flight: usize, hits: &HitCount) -> String {
    match &hits.last {
        Some((name, at)) => format!(
            "In flight: {in_flight}  Hits: {}  last: {name} ({:.1}, {:.1})",
            hits.total, at.x, at.y
        ),
        None => format!("In flight: {in_flight}  Hits: {}", hits.total),
    }
}

/// Pull strength as a percentage of the ceiling.
fn pull_percent(length: f32, max: f32) -> f32 {
    if max > 0.0 { (length / max * 100.0).min(100.0) } else { 0.0 }
}

fn update_aim_display(
    archers: Query<&AimController, With<Archer>>,
    mut text_query: Query<&mut Text, With<AimText>>,
) {
    let Ok(controller) = archers.single() else {
        return;
    };
    let line = match controller.state() {
        AimState::Idle => "Idle".to_string(),
        AimState::Aiming => {
            let pull = controller.pull();
            format!(
                "Aiming  pull:{:.0}%  angle:{:.0}°",
                pull_percent(pull.length(), controller.settings().max_pull_distance),
                pull.angle().to_degrees(),
            )
        }
    };
    for mut text in &mut text_query {
        if **text != line {
            **text = line.clone();
        }
    }
}

fn update_score_display(
    hits: Res<HitCount>,
    projectiles: Query<&Projectile>,
    mut text_query: Query<&mut Text, With<ScoreText>>,
) {
    let in_flight = projectiles
        .iter()
        .filter(|p| p.state() == FlightState::Flying)
        .count();
    let line = score_line(in_flight, &hits);
    for mut text in &mut text_query {
        if **text != line {
            **text = line.clone();
        }
    }
}
