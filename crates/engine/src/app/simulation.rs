use tracing::info;

use crate::content::{LaneSide, Stage, StaticObject};

use super::{step_player, InputLatch, KeyBindings, Player};

/// How far below a lane's floor a player may fall before the stage reloads.
pub const FALL_MARGIN: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    ReturnToTitle,
    Reload,
}

/// At most one navigation request is outstanding; later requests are
/// dropped until the first one is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Navigation {
    #[default]
    Idle,
    Requested(NavigationRequest),
}

impl Navigation {
    pub fn request(&mut self, request: NavigationRequest) -> bool {
        match self {
            Navigation::Idle => {
                *self = Navigation::Requested(request);
                true
            }
            Navigation::Requested(_) => false,
        }
    }

    pub fn pending(&self) -> Option<NavigationRequest> {
        match self {
            Navigation::Idle => None,
            Navigation::Requested(request) => Some(*request),
        }
    }

    pub fn take(&mut self) -> Option<NavigationRequest> {
        let pending = self.pending();
        *self = Navigation::Idle;
        pending
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    stage: Stage,
    players: [Player; 2],
    navigation: Navigation,
    step_count: u64,
}

impl Simulation {
    pub fn new(stage: Stage) -> Self {
        let players = LaneSide::ALL.map(|side| Player::spawn_in(side, stage.lane(side)));
        Self {
            stage,
            players,
            navigation: Navigation::Idle,
            step_count: 0,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, side: LaneSide) -> &Player {
        &self.players[side.index()]
    }

    pub fn object_by_id(&self, side: LaneSide, id: &str) -> Option<&StaticObject> {
        self.stage.find_object(side, id)
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    pub fn request_navigation(&mut self, request: NavigationRequest) -> bool {
        let accepted = self.navigation.request(request);
        if accepted {
            info!(
                stage = self.stage.name.as_str(),
                request = ?request,
                "navigation_requested"
            );
        }
        accepted
    }

    pub fn take_navigation(&mut self) -> Option<NavigationRequest> {
        self.navigation.take()
    }

    pub fn step(&mut self, latch: &InputLatch, bindings: &KeyBindings) {
        for side in LaneSide::ALL {
            let intent = bindings.controls(side).intent(latch);
            let lane = self.stage.lane(side);
            let player = &mut self.players[side.index()];
            step_player(
                player,
                intent,
                &self.stage.physics,
                &lane.objects,
                lane.bounds(),
            );
        }
        self.step_count = self.step_count.saturating_add(1);

        if let Some(fallen) = LaneSide::ALL.into_iter().find(|side| self.has_fallen(*side)) {
            if self.navigation.request(NavigationRequest::Reload) {
                info!(
                    stage = self.stage.name.as_str(),
                    side = fallen.label(),
                    step = self.step_count,
                    "player_fell_out"
                );
            }
        }
    }

    fn has_fallen(&self, side: LaneSide) -> bool {
        let player = self.player(side);
        player.bounds().top() > self.stage.lane(side).height + FALL_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Aabb, KeyName, PhysicsParams, Support, Vec2};
    use crate::content::Lane;

    fn lane(objects: Vec<StaticObject>) -> Lane {
        Lane {
            width: 600.0,
            height: 300.0,
            spawn: Vec2::new(40.0, 260.0),
            player_size: Vec2::new(20.0, 30.0),
            background: [0, 0, 0, 255],
            player_color: [255, 255, 255, 255],
            sprite: None,
            objects,
        }
    }

    fn floor() -> StaticObject {
        StaticObject {
            id: "floor".to_string(),
            rect: Aabb::new(0.0, 260.0, 600.0, 40.0),
            color: [90, 90, 90, 255],
            gimmick: None,
        }
    }

    fn stage_with_floors() -> Stage {
        Stage::new(
            "test",
            PhysicsParams::default(),
            lane(vec![floor()]),
            lane(vec![floor()]),
        )
    }

    #[test]
    fn players_spawn_at_lane_spawn_points() {
        let sim = Simulation::new(stage_with_floors());
        for side in LaneSide::ALL {
            assert_eq!(sim.player(side).position, Vec2::new(40.0, 260.0));
            assert_eq!(sim.player(side).side, side);
        }
    }

    #[test]
    fn spawned_players_settle_on_floor() {
        let mut sim = Simulation::new(stage_with_floors());
        sim.step(&InputLatch::default(), &KeyBindings::default());

        for side in LaneSide::ALL {
            assert_eq!(sim.player(side).support, Support::Grounded);
            assert_eq!(sim.player(side).position.y, 260.0);
        }
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn each_player_follows_its_own_controls() {
        let mut sim = Simulation::new(stage_with_floors());
        let bindings = KeyBindings::default();
        let mut latch = InputLatch::default();
        sim.step(&latch, &bindings);

        latch.press(&KeyName::new("d"));
        sim.step(&latch, &bindings);

        assert_eq!(sim.player(LaneSide::Top).position.x, 44.0);
        assert_eq!(sim.player(LaneSide::Bottom).position.x, 40.0);
    }

    #[test]
    fn falling_out_requests_a_single_reload() {
        let stage = Stage::new(
            "pit",
            PhysicsParams::default(),
            lane(Vec::new()),
            lane(vec![floor()]),
        );
        let mut sim = Simulation::new(stage);
        let bindings = KeyBindings::default();
        let latch = InputLatch::default();
        for _ in 0..200 {
            sim.step(&latch, &bindings);
        }

        assert_eq!(sim.navigation(), Navigation::Requested(NavigationRequest::Reload));
        assert!(!sim.request_navigation(NavigationRequest::ReturnToTitle));
        assert_eq!(sim.take_navigation(), Some(NavigationRequest::Reload));
        assert_eq!(sim.navigation(), Navigation::Idle);
    }

    #[test]
    fn object_lookup_degrades_to_none() {
        let sim = Simulation::new(stage_with_floors());
        assert!(sim.object_by_id(LaneSide::Top, "floor").is_some());
        assert!(sim.object_by_id(LaneSide::Top, "ghost").is_none());
    }

    #[test]
    fn navigation_keeps_first_request() {
        let mut navigation = Navigation::default();
        assert!(navigation.request(NavigationRequest::ReturnToTitle));
        assert!(!navigation.request(NavigationRequest::Reload));
        assert_eq!(navigation.take(), Some(NavigationRequest::ReturnToTitle));
        assert_eq!(navigation.take(), None);
    }
}
