use crate::content::{Lane, LaneSide, StaticObject};

use super::{Aabb, Vec2};

/// Per-step tunables. Units are lane pixels per step; y grows downward, so
/// jumps use a negative speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub jump_speed: f32,
    pub move_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            jump_speed: -10.0,
            move_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// -1 left, 0 idle, 1 right.
    pub horizontal: i8,
    pub jump: bool,
}

/// `position` is the player's feet: x is the left edge, y the bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub side: LaneSide,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub support: Support,
}

impl Player {
    pub fn spawn_in(side: LaneSide, lane: &Lane) -> Self {
        Self {
            side,
            position: lane.spawn,
            velocity: Vec2::ZERO,
            size: lane.player_size,
            support: Support::Airborne,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.support == Support::Grounded
    }

    pub fn bounds(&self) -> Aabb {
        bounds_at(self.position, self.size)
    }

    fn land(&mut self, surface_y: f32) {
        self.position.y = surface_y;
        self.velocity.y = 0.0;
        self.support = Support::Grounded;
    }

    fn jump(&mut self, jump_speed: f32) {
        self.velocity.y = jump_speed;
        self.support = Support::Airborne;
    }

    fn leave_ground(&mut self) {
        self.support = Support::Airborne;
    }
}

fn bounds_at(feet: Vec2, size: Vec2) -> Aabb {
    Aabb::new(feet.x, feet.y - size.y, size.x, size.y)
}

/// Advances one player by a single fixed step against the lane geometry.
pub fn step_player(
    player: &mut Player,
    intent: PlayerIntent,
    params: &PhysicsParams,
    objects: &[StaticObject],
    lane_bounds: Aabb,
) {
    player.velocity.x = f32::from(intent.horizontal.signum()) * params.move_speed;
    if !player.is_grounded() {
        player.velocity.y += params.gravity;
    }

    move_horizontally(player, objects, lane_bounds);
    move_vertically(player, objects);

    if player.is_grounded() && intent.jump {
        player.jump(params.jump_speed);
    }
}

fn move_horizontally(player: &mut Player, objects: &[StaticObject], lane_bounds: Aabb) {
    let dx = player.velocity.x;
    player.position.x += dx;

    let max_x = (lane_bounds.right() - player.size.x).max(lane_bounds.left());
    player.position.x = player.position.x.clamp(lane_bounds.left(), max_x);

    if dx == 0.0 {
        return;
    }
    for object in objects {
        let bounds = player.bounds();
        if !bounds.overlaps(&object.rect) {
            continue;
        }
        if dx > 0.0 {
            player.position.x = object.rect.left() - player.size.x;
        } else {
            player.position.x = object.rect.right();
        }
    }
}

fn move_vertically(player: &mut Player, objects: &[StaticObject]) {
    let previous = player.bounds();
    let dy = player.velocity.y;
    player.position.y += dy;
    let current = player.bounds();

    if dy >= 0.0 {
        let landing = objects
            .iter()
            .filter(|object| current.overlaps_horizontally(&object.rect))
            .filter(|object| {
                previous.bottom() <= object.rect.top() && current.bottom() >= object.rect.top()
            })
            .map(|object| object.rect.top())
            .reduce(f32::min);
        match landing {
            Some(surface_y) => player.land(surface_y),
            None => player.leave_ground(),
        }
        return;
    }

    let ceiling = objects
        .iter()
        .filter(|object| current.overlaps_horizontally(&object.rect))
        .filter(|object| {
            previous.top() >= object.rect.bottom() && current.top() < object.rect.bottom()
        })
        .map(|object| object.rect.bottom())
        .reduce(f32::max);
    if let Some(underside_y) = ceiling {
        player.position.y = underside_y + player.size.y;
        player.velocity.y = 0.0;
    }
    player.leave_ground();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str, x: f32, y: f32, width: f32, height: f32) -> StaticObject {
        StaticObject {
            id: id.to_string(),
            rect: Aabb::new(x, y, width, height),
            color: [128, 128, 128, 255],
            gimmick: None,
        }
    }

    fn lane_bounds() -> Aabb {
        Aabb::new(0.0, 0.0, 1000.0, 400.0)
    }

    fn player_at(x: f32, y: f32, support: Support) -> Player {
        Player {
            side: LaneSide::Top,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: Vec2::new(20.0, 30.0),
            support,
        }
    }

    fn floor_at_300() -> Vec<StaticObject> {
        vec![object("floor", 0.0, 300.0, 1000.0, 50.0)]
    }

    #[test]
    fn grounded_player_at_rest_keeps_height() {
        let objects = floor_at_300();
        let params = PhysicsParams {
            gravity: 0.5,
            ..PhysicsParams::default()
        };
        let mut player = player_at(100.0, 300.0, Support::Grounded);

        for _ in 0..10 {
            step_player(
                &mut player,
                PlayerIntent::default(),
                &params,
                &objects,
                lane_bounds(),
            );
            assert_eq!(player.position.y, 300.0);
            assert_eq!(player.velocity.y, 0.0);
            assert!(player.is_grounded());
        }
    }

    #[test]
    fn falling_onto_object_lands_on_top() {
        let objects = floor_at_300();
        let mut player = player_at(100.0, 298.0, Support::Airborne);
        player.velocity.y = 4.0;

        step_player(
            &mut player,
            PlayerIntent::default(),
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.y, 300.0);
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.support, Support::Grounded);
    }

    #[test]
    fn jump_sets_speed_and_leaves_ground() {
        let objects = floor_at_300();
        let params = PhysicsParams {
            jump_speed: -10.0,
            ..PhysicsParams::default()
        };
        let mut player = player_at(100.0, 300.0, Support::Grounded);

        step_player(
            &mut player,
            PlayerIntent {
                horizontal: 0,
                jump: true,
            },
            &params,
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.velocity.y, -10.0);
        assert_eq!(player.support, Support::Airborne);
    }

    #[test]
    fn airborne_player_cannot_jump() {
        let mut player = player_at(100.0, 100.0, Support::Airborne);
        step_player(
            &mut player,
            PlayerIntent {
                horizontal: 0,
                jump: true,
            },
            &PhysicsParams::default(),
            &[],
            lane_bounds(),
        );
        assert_eq!(player.velocity.y, 0.5);
        assert_eq!(player.position.y, 100.5);
    }

    #[test]
    fn gravity_accumulates_while_airborne() {
        let mut player = player_at(100.0, 100.0, Support::Airborne);
        for _ in 0..4 {
            step_player(
                &mut player,
                PlayerIntent::default(),
                &PhysicsParams::default(),
                &[],
                lane_bounds(),
            );
        }
        assert_eq!(player.velocity.y, 2.0);
        assert_eq!(player.position.y, 105.0);
    }

    #[test]
    fn walking_off_a_ledge_becomes_airborne() {
        let objects = vec![object("ledge", 0.0, 300.0, 100.0, 20.0)];
        let mut player = player_at(97.0, 300.0, Support::Grounded);

        step_player(
            &mut player,
            PlayerIntent {
                horizontal: 1,
                jump: false,
            },
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.x, 101.0);
        assert_eq!(player.support, Support::Airborne);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn wall_clamps_to_left_edge_when_moving_right() {
        let mut objects = floor_at_300();
        objects.push(object("wall", 122.0, 200.0, 20.0, 100.0));
        let mut player = player_at(100.0, 300.0, Support::Grounded);

        step_player(
            &mut player,
            PlayerIntent {
                horizontal: 1,
                jump: false,
            },
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.x, 102.0);
        assert!(player.is_grounded());
    }

    #[test]
    fn wall_clamps_to_right_edge_when_moving_left() {
        let mut objects = floor_at_300();
        objects.push(object("wall", 60.0, 200.0, 20.0, 100.0));
        let mut player = player_at(82.0, 300.0, Support::Grounded);

        step_player(
            &mut player,
            PlayerIntent {
                horizontal: -1,
                jump: false,
            },
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.x, 80.0);
    }

    #[test]
    fn lane_edges_clamp_horizontal_position() {
        let mut player = player_at(2.0, 300.0, Support::Grounded);
        step_player(
            &mut player,
            PlayerIntent {
                horizontal: -1,
                jump: false,
            },
            &PhysicsParams::default(),
            &floor_at_300(),
            lane_bounds(),
        );
        assert_eq!(player.position.x, 0.0);
    }

    #[test]
    fn rising_into_ceiling_stops_at_underside() {
        let objects = vec![object("ceiling", 0.0, 150.0, 1000.0, 20.0)];
        let mut player = player_at(100.0, 205.0, Support::Airborne);
        player.velocity.y = -10.0;

        step_player(
            &mut player,
            PlayerIntent::default(),
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.y, 200.0);
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.support, Support::Airborne);
    }

    #[test]
    fn landing_picks_highest_crossed_surface() {
        let objects = vec![
            object("low", 0.0, 310.0, 1000.0, 20.0),
            object("high", 0.0, 305.0, 1000.0, 5.0),
        ];
        let mut player = player_at(100.0, 300.0, Support::Airborne);
        player.velocity.y = 12.0;

        step_player(
            &mut player,
            PlayerIntent::default(),
            &PhysicsParams::default(),
            &objects,
            lane_bounds(),
        );

        assert_eq!(player.position.y, 305.0);
    }
}
