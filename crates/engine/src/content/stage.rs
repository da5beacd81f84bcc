use std::collections::HashSet;

use serde::Deserialize;

use crate::app::{Aabb, PhysicsParams, Vec2};

pub type Rgba = [u8; 4];

const DEFAULT_BACKGROUND: Rgba = [22, 26, 34, 255];
const DEFAULT_PLAYER_COLOR: Rgba = [240, 196, 64, 255];
const DEFAULT_PLAYER_SIZE: [f32; 2] = [20.0, 30.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneSide {
    Top,
    Bottom,
}

impl LaneSide {
    pub const ALL: [LaneSide; 2] = [LaneSide::Top, LaneSide::Bottom];

    pub fn label(self) -> &'static str {
        match self {
            LaneSide::Top => "top",
            LaneSide::Bottom => "bottom",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            LaneSide::Top => 0,
            LaneSide::Bottom => 1,
        }
    }
}

/// Opaque behaviour tag on a level object. Carried as data only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gimmick {
    Push,
    Move,
    Button,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticObject {
    pub id: String,
    pub rect: Aabb,
    pub color: Rgba,
    pub gimmick: Option<Gimmick>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub width: f32,
    pub height: f32,
    pub spawn: Vec2,
    pub player_size: Vec2,
    pub background: Rgba,
    pub player_color: Rgba,
    pub sprite: Option<String>,
    pub objects: Vec<StaticObject>,
}

impl Lane {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(0.0, 0.0, self.width, self.height)
    }

    pub fn find_object(&self, id: &str) -> Option<&StaticObject> {
        self.objects.iter().find(|object| object.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub physics: PhysicsParams,
    lanes: [Lane; 2],
}

impl Stage {
    pub fn new(name: impl Into<String>, physics: PhysicsParams, top: Lane, bottom: Lane) -> Self {
        Self {
            name: name.into(),
            physics,
            lanes: [top, bottom],
        }
    }

    pub fn lane(&self, side: LaneSide) -> &Lane {
        &self.lanes[side.index()]
    }

    pub fn find_object(&self, side: LaneSide, id: &str) -> Option<&StaticObject> {
        self.lane(side).find_object(id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StageDef {
    pub name: String,
    #[serde(default)]
    pub physics: PhysicsDef,
    pub top: LaneDef,
    pub bottom: LaneDef,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PhysicsDef {
    pub gravity: f32,
    pub jump_speed: f32,
    pub move_speed: f32,
}

impl Default for PhysicsDef {
    fn default() -> Self {
        let params = PhysicsParams::default();
        Self {
            gravity: params.gravity,
            jump_speed: params.jump_speed,
            move_speed: params.move_speed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LaneDef {
    pub width: f32,
    pub height: f32,
    pub spawn: [f32; 2],
    #[serde(default)]
    pub player_size: Option<[f32; 2]>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub player_color: Option<String>,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObjectDef {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    #[serde(default)]
    pub gimmick: Option<Gimmick>,
}

impl StageDef {
    /// Converts the raw file shape, reporting the first problem as
    /// `(path, message)`.
    pub(crate) fn into_stage(self) -> Result<Stage, (String, String)> {
        if self.name.trim().is_empty() {
            return Err(("name".to_string(), "must not be empty".to_string()));
        }
        let physics = self.physics.into_params()?;
        let top = self.top.into_lane(LaneSide::Top)?;
        let bottom = self.bottom.into_lane(LaneSide::Bottom)?;
        Ok(Stage::new(self.name, physics, top, bottom))
    }
}

impl PhysicsDef {
    fn into_params(self) -> Result<PhysicsParams, (String, String)> {
        for (field, value) in [
            ("physics.gravity", self.gravity),
            ("physics.jump_speed", self.jump_speed),
            ("physics.move_speed", self.move_speed),
        ] {
            if !value.is_finite() {
                return Err((field.to_string(), "must be a finite number".to_string()));
            }
        }
        if self.jump_speed > 0.0 {
            return Err((
                "physics.jump_speed".to_string(),
                format!("expected a negative (upward) speed, got {}", self.jump_speed),
            ));
        }
        Ok(PhysicsParams {
            gravity: self.gravity,
            jump_speed: self.jump_speed,
            move_speed: self.move_speed,
        })
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl LaneDef {
    fn into_lane(self, side: LaneSide) -> Result<Lane, (String, String)> {
        let prefix = side.label();
        let err = |field: &str, message: String| (format!("{prefix}.{field}"), message);

        if !(is_positive_finite(self.width) && is_positive_finite(self.height)) {
            return Err(err(
                "width",
                format!(
                    "lane size must be positive and finite, got {}x{}",
                    self.width, self.height
                ),
            ));
        }
        let [player_w, player_h] = self.player_size.unwrap_or(DEFAULT_PLAYER_SIZE);
        if !(is_positive_finite(player_w) && is_positive_finite(player_h)) {
            return Err(err(
                "player_size",
                format!("must be positive and finite, got {player_w}x{player_h}"),
            ));
        }
        let spawn = Vec2::new(self.spawn[0], self.spawn[1]);
        if !(spawn.x.is_finite() && spawn.y.is_finite()) {
            return Err(err(
                "spawn",
                format!("must be finite, got ({}, {})", spawn.x, spawn.y),
            ));
        }
        if !Aabb::new(0.0, 0.0, self.width, self.height).contains(spawn) {
            return Err(err(
                "spawn",
                format!(
                    "({}, {}) lies outside the {}x{} lane",
                    spawn.x, spawn.y, self.width, self.height
                ),
            ));
        }
        let background = resolve_optional_color(self.background, DEFAULT_BACKGROUND)
            .map_err(|message| err("background", message))?;
        let player_color = resolve_optional_color(self.player_color, DEFAULT_PLAYER_COLOR)
            .map_err(|message| err("player_color", message))?;

        let mut seen_ids = HashSet::new();
        let mut objects = Vec::with_capacity(self.objects.len());
        for (index, object) in self.objects.into_iter().enumerate() {
            let field = |name: &str| format!("objects[{index}].{name}");
            if object.id.trim().is_empty() {
                return Err(err(&field("id"), "must not be empty".to_string()));
            }
            if !seen_ids.insert(object.id.clone()) {
                return Err(err(
                    &field("id"),
                    format!("duplicate object id '{}'", object.id),
                ));
            }
            if !(object.x.is_finite() && object.y.is_finite()) {
                return Err(err(
                    &field("x"),
                    format!(
                        "object position must be finite, got ({}, {})",
                        object.x, object.y
                    ),
                ));
            }
            if !(is_positive_finite(object.width) && is_positive_finite(object.height)) {
                return Err(err(
                    &field("width"),
                    format!(
                        "object size must be positive and finite, got {}x{}",
                        object.width, object.height
                    ),
                ));
            }
            let color = parse_color(&object.color)
                .ok_or_else(|| err(&field("color"), unknown_color_message(&object.color)))?;
            objects.push(StaticObject {
                id: object.id,
                rect: Aabb::new(object.x, object.y, object.width, object.height),
                color,
                gimmick: object.gimmick,
            });
        }

        Ok(Lane {
            width: self.width,
            height: self.height,
            spawn,
            player_size: Vec2::new(player_w, player_h),
            background,
            player_color,
            sprite: self.sprite.filter(|key| !key.trim().is_empty()),
            objects,
        })
    }
}

fn resolve_optional_color(raw: Option<String>, fallback: Rgba) -> Result<Rgba, String> {
    match raw {
        Some(text) => parse_color(&text).ok_or_else(|| unknown_color_message(&text)),
        None => Ok(fallback),
    }
}

fn unknown_color_message(raw: &str) -> String {
    format!("unrecognized color '{raw}' (expected #rrggbb, #rrggbbaa or a color name)")
}

pub fn parse_color(raw: &str) -> Option<Rgba> {
    let text = raw.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    let named: Rgba = match text.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0, 255],
        "white" => [255, 255, 255, 255],
        "gray" | "grey" => [128, 128, 128, 255],
        "red" => [220, 60, 60, 255],
        "green" => [70, 170, 80, 255],
        "blue" => [70, 110, 220, 255],
        "yellow" => [240, 210, 70, 255],
        "orange" => [240, 150, 50, 255],
        "brown" => [130, 90, 60, 255],
        "purple" => [150, 90, 200, 255],
        _ => return None,
    };
    Some(named)
}

fn parse_hex_color(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let channel = |start: usize| u8::from_str_radix(&hex[start..start + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn lane_json() -> serde_json::Value {
        json!({
            "width": 800.0,
            "height": 300.0,
            "spawn": [40.0, 260.0],
            "objects": [
                { "id": "floor", "x": 0.0, "y": 260.0, "width": 800.0, "height": 40.0, "color": "#556070" },
                { "id": "crate", "x": 300.0, "y": 220.0, "width": 40.0, "height": 40.0, "color": "brown", "gimmick": "push" }
            ]
        })
    }

    fn stage_def(top: serde_json::Value) -> StageDef {
        serde_json::from_value(json!({
            "name": "test",
            "top": top,
            "bottom": lane_json(),
        }))
        .expect("stage def")
    }

    #[test]
    fn hex_and_named_colors_parse() {
        assert_eq!(parse_color("#556070"), Some([0x55, 0x60, 0x70, 255]));
        assert_eq!(parse_color("#11223380"), Some([0x11, 0x22, 0x33, 0x80]));
        assert_eq!(parse_color(" Grey "), Some([128, 128, 128, 255]));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color("mauve"), None);
    }

    #[test]
    fn valid_definition_converts_with_defaults() {
        let stage = stage_def(lane_json()).into_stage().expect("stage");
        let top = stage.lane(LaneSide::Top);

        assert_eq!(stage.physics, PhysicsParams::default());
        assert_eq!(top.player_size, Vec2::new(20.0, 30.0));
        assert_eq!(top.background, DEFAULT_BACKGROUND);
        assert_eq!(top.objects.len(), 2);
        assert_eq!(
            stage.find_object(LaneSide::Top, "crate").and_then(|o| o.gimmick),
            Some(Gimmick::Push)
        );
    }

    #[test]
    fn unknown_object_id_is_none() {
        let stage = stage_def(lane_json()).into_stage().expect("stage");
        assert!(stage.find_object(LaneSide::Bottom, "missing").is_none());
    }

    #[test]
    fn duplicate_object_ids_are_rejected() {
        let mut top = lane_json();
        top["objects"][1]["id"] = json!("floor");
        let (path, message) = stage_def(top).into_stage().expect_err("duplicate");
        assert_eq!(path, "top.objects[1].id");
        assert!(message.contains("duplicate"));
    }

    #[test]
    fn spawn_outside_lane_is_rejected() {
        let mut top = lane_json();
        top["spawn"] = json!([900.0, 10.0]);
        let (path, _) = stage_def(top).into_stage().expect_err("spawn");
        assert_eq!(path, "top.spawn");
    }

    #[test]
    fn non_finite_lane_geometry_is_rejected() {
        let mut def = stage_def(lane_json());
        def.top.width = f32::INFINITY;
        let (path, _) = def.into_stage().expect_err("infinite width");
        assert_eq!(path, "top.width");

        let mut def = stage_def(lane_json());
        def.bottom.objects[1].height = f32::INFINITY;
        let (path, message) = def.into_stage().expect_err("infinite object");
        assert_eq!(path, "bottom.objects[1].width");
        assert!(message.contains("finite"));

        let mut def = stage_def(lane_json());
        def.top.objects[0].x = f32::NAN;
        let (path, _) = def.into_stage().expect_err("nan position");
        assert_eq!(path, "top.objects[0].x");
    }

    #[test]
    fn out_of_range_number_in_file_is_rejected() {
        let text = r#"{
            "name": "test",
            "top": { "width": 1e39, "height": 300.0, "spawn": [40.0, 260.0] },
            "bottom": { "width": 800.0, "height": 300.0, "spawn": [40.0, 260.0] }
        }"#;
        let def: StageDef = serde_json::from_str(text).expect("stage def");
        let (path, _) = def.into_stage().expect_err("overflowing width");
        assert_eq!(path, "top.width");
    }

    #[test]
    fn bad_object_color_reports_field() {
        let mut top = lane_json();
        top["objects"][0]["color"] = json!("plaid");
        let (path, message) = stage_def(top).into_stage().expect_err("color");
        assert_eq!(path, "top.objects[0].color");
        assert!(message.contains("plaid"));
    }

    #[test]
    fn downward_jump_speed_is_rejected() {
        let def: StageDef = serde_json::from_value(json!({
            "name": "test",
            "physics": { "jump_speed": 10.0 },
            "top": lane_json(),
            "bottom": lane_json(),
        }))
        .expect("stage def");
        let (path, _) = def.into_stage().expect_err("jump speed");
        assert_eq!(path, "physics.jump_speed");
    }
}
