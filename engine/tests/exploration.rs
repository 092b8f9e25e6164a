use delve_engine::exploration::{ExplorationMap, Location, MapData};

fn place(id: &str, name: &str, x: i32, y: i32, connections: &[&str]) -> Location {
    Location {
        id: id.to_string(),
        name: name.to_string(),
        x,
        y,
        kind: "road".to_string(),
        description: String::new(),
        connections: connections.iter().map(|c| c.to_string()).collect(),
    }
}

fn road() -> ExplorationMap {
    ExplorationMap::from_data(MapData {
        start: Some("inn".to_string()),
        locations: vec![
            place("inn", "Inn", 0, 0, &["bridge"]),
            place("bridge", "Bridge", 1, 0, &["inn", "tower"]),
            place("tower", "Tower", 1, 1, &["bridge"]),
        ],
    })
}

#[test]
fn start_and_its_neighbours_are_discovered() {
    let map = road();
    assert_eq!(map.current().map(|l| l.id.as_str()), Some("inn"));
    assert!(map.is_discovered("inn"));
    assert!(map.is_discovered("bridge"));
    assert!(!map.is_discovered("tower"));
    assert!(!map.is_visited("inn"));
}

#[test]
fn first_visit_counts_once() {
    let mut map = road();
    assert!(map.visit("bridge"));
    assert!(!map.visit("bridge"));
    assert!(map.is_discovered("tower"));
    assert!(!map.visit("moon"));
    assert_eq!(map.progress(), (1, 3, 33));
}

#[test]
fn missing_start_falls_back_to_the_first_location() {
    let map = ExplorationMap::from_data(MapData {
        start: None,
        locations: vec![place("a", "A", 0, 0, &[])],
    });
    assert_eq!(map.current().map(|l| l.name.as_str()), Some("A"));
}

#[test]
fn ascii_shows_only_what_is_discovered() {
    let mut map = road();
    map.visit("inn");
    let expected =
        ["[@] [?]", "", "", "[@] Inn (road)", "[?] Bridge (road)", "explored 1/3 (33%)"]
            .join("\n");
    assert_eq!(map.ascii(), expected);

    map.visit("bridge");
    map.visit("tower");
    assert!(map.ascii().ends_with("explored 3/3 (100%)"));
    assert!(map.ascii().contains("[x] Inn (road)"));
}

#[test]
fn empty_map_has_a_placeholder() {
    assert_eq!(ExplorationMap::from_data(MapData::default()).ascii(), "no map available");
}

#[test]
fn far_apart_locations_render_without_the_empty_space_between() {
    let mut map = ExplorationMap::from_data(MapData {
        start: Some("west".to_string()),
        locations: vec![
            place("west", "West Gate", -1_000_000, 5, &["east"]),
            place("east", "East Gate", 1_000_000, i32::MAX, &["west"]),
        ],
    });
    map.visit("west");
    let ascii = map.ascii();
    let rows: Vec<&str> = ascii.lines().take(3).collect();
    assert_eq!(rows, ["[@]", "    [?]", ""]);
    assert!(ascii.ends_with("explored 1/2 (50%)"));
}
