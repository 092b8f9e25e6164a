use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{Scene, SceneHook, SceneKind, SceneManager};
use crate::error::SceneError;
use crate::exploration::{ExplorationMap, MapData};
use crate::game::GameContext;

pub const KNOWN_SCENE_TYPES: [&str; 5] = ["narrative", "choice", "combat", "rest", "merchant"];

/// One entry of a scenario file's `scenes` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub kind: SceneKind,
}

impl SceneRecord {
    /// Reject unknown `type` values before serde sees the record.
    pub fn from_value(value: Value) -> Result<Self, SceneError> {
        let id = value.get("id").and_then(Value::as_str).unwrap_or("<unnamed>").to_string();
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SceneError::Malformed(format!("scene '{id}' has no type")))?;
        if !KNOWN_SCENE_TYPES.contains(&kind) {
            return Err(SceneError::UnknownType { id, kind: kind.to_string() });
        }
        serde_json::from_value(value)
            .map_err(|e| SceneError::Malformed(format!("scene '{id}': {e}")))
    }

    pub fn into_scene(self) -> Scene {
        Scene {
            id: self.id,
            title: self.title,
            location: self.location,
            kind: self.kind,
            on_enter: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    scenes: Vec<Value>,
    #[serde(default)]
    map: Option<MapData>,
}

/// A playable scene graph plus its optional map.
#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub manager: SceneManager,
    pub map: Option<ExplorationMap>,
}

impl Scenario {
    /// Build from parsed JSON or YAML. The start scene is `start` when given,
    /// otherwise the first scene listed.
    pub fn from_value(value: Value) -> Result<Self, SceneError> {
        let file: ScenarioFile =
            serde_json::from_value(value).map_err(|e| SceneError::Malformed(e.to_string()))?;
        let mut manager = SceneManager::new();
        for raw in file.scenes {
            let record = SceneRecord::from_value(raw)?;
            let mut scene = record.into_scene();
            if let Some(location) = scene.location.clone() {
                scene.on_enter = Some(visit_hook(location));
            }
            manager.add_scene(scene);
        }
        if let Some(start) = &file.start {
            manager.set_start(start)?;
        }
        manager.validate()?;

        let map = file.map.map(ExplorationMap::from_data);
        Ok(Self { name: file.name.unwrap_or_else(|| "untitled".to_string()), manager, map })
    }

    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SceneError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }
}

/// Marks the scene's location visited on the map when one is loaded.
fn visit_hook(location: String) -> SceneHook {
    Box::new(move |ctx: &mut GameContext<'_>| {
        let Some(map) = ctx.map.as_mut() else {
            return;
        };
        if map.location(&location).is_none() {
            warn!(location = %location, "scene location is not on the map");
            return;
        }
        if map.visit(&location) {
            ctx.state.add("locations_visited", 1);
            let name = map.location(&location).map_or(location.as_str(), |l| l.name.as_str());
            ctx.ui.show(&format!("[MAP] arrived at {name}"));
        }
    })
}
