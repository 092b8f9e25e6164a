//! Scenario graph: named scenes that each run once and name their successor.
//!
//! Cycles are legal (hub scenes, shop loops). A scenario ends when a scene
//! hands back no successor.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SceneError;
use crate::game::{GameContext, GameState};

mod execute;
mod interface;
mod loader;

pub use interface::{Interface, ScriptedInterface};
pub use loader::{Scenario, SceneRecord, KNOWN_SCENE_TYPES};

/// Side effect run when the machine enters a scene, before it executes.
pub type SceneHook = Box<dyn Fn(&mut GameContext<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestType {
    Short,
    #[default]
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub next_scene: Option<String>,
    /// Signed deltas applied to game-state counters.
    #[serde(default)]
    pub effects: IndexMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneKind {
    Narrative {
        #[serde(default)]
        text: String,
        #[serde(default)]
        next_scene: Option<String>,
    },
    Choice {
        #[serde(default)]
        description: String,
        #[serde(default)]
        choices: Vec<Choice>,
    },
    Combat {
        #[serde(default)]
        description: String,
        #[serde(default)]
        monsters: Vec<String>,
        #[serde(default)]
        on_victory: Option<String>,
        #[serde(default)]
        on_defeat: Option<String>,
    },
    Rest {
        #[serde(default)]
        rest_type: RestType,
        #[serde(default)]
        next_scene: Option<String>,
    },
    Merchant {
        #[serde(default = "default_merchant")]
        merchant_id: String,
        #[serde(default)]
        next_scene: Option<String>,
    },
}

fn default_merchant() -> String {
    "village".to_string()
}

impl SceneKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SceneKind::Narrative { .. } => "narrative",
            SceneKind::Choice { .. } => "choice",
            SceneKind::Combat { .. } => "combat",
            SceneKind::Rest { .. } => "rest",
            SceneKind::Merchant { .. } => "merchant",
        }
    }

    /// Every scene id this scene can hand control to.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            SceneKind::Narrative { next_scene, .. }
            | SceneKind::Rest { next_scene, .. }
            | SceneKind::Merchant { next_scene, .. } => next_scene.as_deref().into_iter().collect(),
            SceneKind::Choice { choices, .. } => {
                choices.iter().filter_map(|c| c.next_scene.as_deref()).collect()
            }
            SceneKind::Combat { on_victory, on_defeat, .. } => {
                on_victory.as_deref().into_iter().chain(on_defeat.as_deref()).collect()
            }
        }
    }
}

pub struct Scene {
    pub id: String,
    pub title: String,
    /// Exploration-map location entered with this scene.
    pub location: Option<String>,
    pub kind: SceneKind,
    pub on_enter: Option<SceneHook>,
}

impl Scene {
    pub fn new(id: &str, title: &str, kind: SceneKind) -> Self {
        Self { id: id.to_string(), title: title.to_string(), location: None, kind, on_enter: None }
    }

    pub fn narrative(id: &str, title: &str, text: &str, next_scene: Option<&str>) -> Self {
        Self::new(
            id,
            title,
            SceneKind::Narrative {
                text: text.to_string(),
                next_scene: next_scene.map(str::to_string),
            },
        )
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_on_enter(mut self, hook: SceneHook) -> Self {
        self.on_enter = Some(hook);
        self
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("location", &self.location)
            .field("kind", &self.kind)
            .field("on_enter", &self.on_enter.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Scene ids in the order they ran, repeats included.
    pub path: Vec<String>,
    pub state: GameState,
    pub survivors: Vec<String>,
    pub fallen: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SceneManager {
    scenes: IndexMap<String, Scene>,
    start: Option<String>,
    current: Option<String>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first scene added becomes the start scene. A later scene with the
    /// same id replaces the earlier one.
    pub fn add_scene(&mut self, scene: Scene) {
        if self.start.is_none() {
            self.start = Some(scene.id.clone());
        }
        self.scenes.insert(scene.id.clone(), scene);
    }

    pub fn set_start(&mut self, id: &str) -> Result<(), SceneError> {
        if !self.scenes.contains_key(id) {
            return Err(SceneError::UnknownScene(id.to_string()));
        }
        self.start = Some(id.to_string());
        Ok(())
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set_current(&mut self, id: Option<&str>) {
        self.current = id.map(str::to_string);
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// The start scene exists and every successor reference resolves.
    pub fn validate(&self) -> Result<(), SceneError> {
        let start = self.start.as_deref().ok_or(SceneError::NoStart)?;
        if !self.scenes.contains_key(start) {
            return Err(SceneError::UnknownScene(start.to_string()));
        }
        for scene in self.scenes.values() {
            let mut successors = scene.kind.successors().into_iter();
            if let Some(missing) = successors.find(|to| !self.scenes.contains_key(*to)) {
                return Err(SceneError::DanglingReference {
                    from: scene.id.clone(),
                    to: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Run one scene: its enter hook, then its behaviour. Returns the next
    /// scene id, `None` when the scenario is over.
    pub fn execute(
        &self,
        id: &str,
        ctx: &mut GameContext<'_>,
    ) -> Result<Option<String>, SceneError> {
        let scene = self.scenes.get(id).ok_or_else(|| SceneError::UnknownScene(id.to_string()))?;
        debug!(scene = id, kind = scene.kind.type_name(), "enter scene");
        if let Some(hook) = &scene.on_enter {
            hook(ctx);
        }
        Ok(execute::run_scene(scene, ctx))
    }

    /// Execute the current scene and move the pointer to its successor.
    pub fn step(&mut self, ctx: &mut GameContext<'_>) -> Result<Option<String>, SceneError> {
        let Some(id) = self.current.clone() else {
            return Ok(None);
        };
        let next = self.execute(&id, ctx)?;
        self.current = next.clone();
        Ok(next)
    }

    /// Play from the start scene until some scene ends the scenario.
    pub fn run(&mut self, ctx: &mut GameContext<'_>) -> Result<RunSummary, SceneError> {
        let start = self.start.clone().ok_or(SceneError::NoStart)?;
        info!(start = %start, scenes = self.scenes.len(), "scenario start");
        self.current = Some(start);
        let mut path = Vec::new();
        while let Some(id) = self.current.clone() {
            path.push(id);
            self.step(ctx)?;
        }
        let summary = RunSummary {
            path,
            state: ctx.state.clone(),
            survivors: ctx.party.iter().filter(|c| c.is_alive()).map(|c| c.name.clone()).collect(),
            fallen: ctx.party.iter().filter(|c| !c.is_alive()).map(|c| c.name.clone()).collect(),
        };
        info!(
            scenes_played = summary.path.len(),
            survivors = summary.survivors.len(),
            "scenario finished"
        );
        Ok(summary)
    }
}
