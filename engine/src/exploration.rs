use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    /// Free-form terrain tag such as `village`, `forest` or `dungeon`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub connections: Vec<String>,
}

/// The optional `map` section of a scenario file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Tracks which locations the party has seen and walked through.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationMap {
    locations: IndexMap<String, Location>,
    current: Option<String>,
    discovered: IndexSet<String>,
    visited: IndexSet<String>,
}

impl ExplorationMap {
    /// The start location (or the first one listed) is discovered up front.
    pub fn from_data(data: MapData) -> Self {
        let start = data.start.clone().or_else(|| data.locations.first().map(|l| l.id.clone()));
        let locations = data.locations.into_iter().map(|l| (l.id.clone(), l)).collect();
        let mut map = Self {
            locations,
            current: None,
            discovered: IndexSet::new(),
            visited: IndexSet::new(),
        };
        if let Some(start) = start {
            if map.discover(&start) {
                map.current = Some(start);
            }
        }
        map
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_deref().and_then(|id| self.locations.get(id))
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovered.contains(id)
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Reveal a location and its neighbours. False for unknown ids.
    pub fn discover(&mut self, id: &str) -> bool {
        let Some(loc) = self.locations.get(id) else {
            return false;
        };
        self.discovered.insert(id.to_string());
        for next in &loc.connections {
            if self.locations.contains_key(next) {
                self.discovered.insert(next.clone());
            }
        }
        true
    }

    /// Move the party here. Returns true on the first visit only.
    pub fn visit(&mut self, id: &str) -> bool {
        if !self.discover(id) {
            return false;
        }
        self.current = Some(id.to_string());
        self.visited.insert(id.to_string())
    }

    /// (visited, total, percent explored)
    pub fn progress(&self) -> (usize, usize, u32) {
        let total = self.locations.len();
        let visited = self.visited.len();
        let percent = if total == 0 { 0 } else { (visited * 100 / total) as u32 };
        (visited, total, percent)
    }

    fn marker(&self, id: &str) -> &'static str {
        if self.current.as_deref() == Some(id) {
            "[@]"
        } else if self.visited.contains(id) {
            "[x]"
        } else {
            "[?]"
        }
    }

    /// Grid of discovered locations followed by a legend. Empty rows and
    /// columns between far-apart locations are collapsed.
    pub fn ascii(&self) -> String {
        if self.locations.is_empty() {
            return "no map available".to_string();
        }
        // occupied rows and columns only
        let xs: BTreeSet<i32> = self.locations.values().map(|l| l.x).collect();
        let ys: BTreeSet<i32> = self.locations.values().map(|l| l.y).collect();

        let mut lines = Vec::new();
        for &y in &ys {
            let row: String = xs
                .iter()
                .map(|&x| {
                    self.locations
                        .values()
                        .find(|l| l.x == x && l.y == y && self.discovered.contains(&l.id))
                        .map_or_else(
                            || "    ".to_string(),
                            |l| format!("{} ", self.marker(&l.id)),
                        )
                })
                .collect();
            lines.push(row.trim_end().to_string());
        }
        lines.push(String::new());
        for loc in self.locations.values().filter(|l| self.discovered.contains(&l.id)) {
            lines.push(format!("{} {} ({})", self.marker(&loc.id), loc.name, loc.kind));
        }
        let (visited, total, percent) = self.progress();
        lines.push(format!("explored {visited}/{total} ({percent}%)"));
        lines.join("\n")
    }
}
