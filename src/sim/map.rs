//! Map descriptors and the built-in maps
//!
//! The engine treats a map as static data: walls, spawn regions, objective
//! regions, resource spawn points and checkpoints.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::segment_circle_extreme_points;
use super::resource::{Resource, ResourceKind};
use super::wall::Wall;
use crate::error::ConfigError;

/// Axis-aligned integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Inclusive on all edges
    pub fn contains(&self, p: DVec2) -> bool {
        let (l, t) = (f64::from(self.left), f64::from(self.top));
        let (r, b) = (l + f64::from(self.width), t + f64::from(self.height));
        p.x >= l && p.x <= r && p.y >= t && p.y <= b
    }

    fn corners(&self) -> [DVec2; 4] {
        let (l, t) = (f64::from(self.left), f64::from(self.top));
        let (r, b) = (l + f64::from(self.width), t + f64::from(self.height));
        [
            DVec2::new(l, t),
            DVec2::new(l, b),
            DVec2::new(r, b),
            DVec2::new(r, t),
        ]
    }
}

/// Rectangle fighters are spawned in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRegion {
    pub rect: Rect,
    /// Only used when populating a fresh episode, never for top-ups
    pub initial_spawn_only: bool,
}

impl SpawnRegion {
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            initial_spawn_only: false,
        }
    }

    pub const fn initial_only(rect: Rect) -> Self {
        Self {
            rect,
            initial_spawn_only: true,
        }
    }

    /// Uniform integer point in `[left, left+width) x [top, top+height)`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        let pick = |rng: &mut R, start: i32, extent: i32| {
            if extent > 0 {
                rng.random_range(start..start + extent)
            } else {
                start
            }
        };
        let x = pick(rng, self.rect.left, self.rect.width);
        let y = pick(rng, self.rect.top, self.rect.height);
        DVec2::new(f64::from(x), f64::from(y))
    }
}

/// Goal region (the safehouse)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    Rect(Rect),
    Circle { center: DVec2, radius: f64 },
}

impl Objective {
    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            Objective::Rect(rect) => rect.contains(p),
            Objective::Circle { center, radius } => center.distance(p) < *radius,
        }
    }

    /// Points where the segment `start-end` meets the region boundary
    pub fn collide(&self, start: DVec2, end: DVec2) -> Vec<DVec2> {
        match self {
            Objective::Rect(rect) => {
                let c = rect.corners();
                (0..4)
                    .filter_map(|i| Wall::new(c[i], c[(i + 1) % 4], 1.0).collide(start, end))
                    .collect()
            }
            Objective::Circle { center, radius } => {
                let (a, b) = segment_circle_extreme_points(start, end, *center, *radius);
                a.into_iter().chain(b).collect()
            }
        }
    }
}

/// Point where a medical or ammo resource may appear at reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpawn {
    pub pos: DVec2,
    pub radius: f64,
    pub medical_probability: f64,
    pub medical_life: f64,
    pub ammo_probability: f64,
    pub ammo_life: f64,
}

impl ResourceSpawn {
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Resource> {
        let p: f64 = rng.random();
        let (kind, life) = if p <= self.medical_probability {
            (ResourceKind::Medical, self.medical_life)
        } else if p <= self.medical_probability + self.ammo_probability {
            (ResourceKind::Ammo, self.ammo_life)
        } else {
            return None;
        };
        Some(Resource {
            kind,
            pos: self.pos,
            radius: self.radius,
            life,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSpec {
    pub pos: DVec2,
    pub radius: f64,
}

/// Static description of one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub size: (u32, u32),
    pub walls: Vec<Wall>,
    pub player_spawns: Vec<SpawnRegion>,
    pub zombie_spawns: Vec<SpawnRegion>,
    pub objectives: Vec<Objective>,
    pub resource_spawns: Vec<ResourceSpawn>,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointSpec>,
}

impl MapDescriptor {
    /// A walled room with no features; everything spawns anywhere inside.
    /// Sizes must fit in `i32`, which config validation enforces.
    pub fn open(w: u32, h: u32) -> Self {
        let (wi, hi) = (w as i32, h as i32);
        let inside = Rect::new(1, 1, wi - 2, hi - 2);
        Self {
            size: (w, h),
            walls: outer_walls(wi, hi),
            player_spawns: vec![SpawnRegion::new(inside)],
            zombie_spawns: vec![SpawnRegion::new(inside)],
            objectives: Vec::new(),
            resource_spawns: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    pub fn size_f64(&self) -> (f64, f64) {
        (f64::from(self.size.0), f64::from(self.size.1))
    }
}

/// Built-in maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapId {
    Demo,
    OpenRoom,
    EasyExit,
    SimpleHallway,
}

impl MapId {
    pub const ALL: [MapId; 4] = [
        MapId::Demo,
        MapId::OpenRoom,
        MapId::EasyExit,
        MapId::SimpleHallway,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MapId::Demo => "demo",
            MapId::OpenRoom => "open_room",
            MapId::EasyExit => "easy_exit",
            MapId::SimpleHallway => "simple_hallway",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MapId::Demo => "three partition walls, safehouse on the left edge",
            MapId::OpenRoom => "empty room, zombies all around the start, four exits",
            MapId::EasyExit => "empty room, safehouses in every corner",
            MapId::SimpleHallway => "long hallway with a zombie nest near the exit",
        }
    }

    /// Sizes must fit in `i32`
    pub fn build(self, w: u32, h: u32) -> MapDescriptor {
        let (w, h) = (w as i32, h as i32);
        match self {
            MapId::Demo => demo_map(w, h),
            MapId::OpenRoom => open_room_map(w, h),
            MapId::EasyExit => easy_exit_map(w, h),
            MapId::SimpleHallway => simple_hallway_map(w, h),
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMap(s.to_string()))
    }
}

fn wall(x0: i32, y0: i32, x1: i32, y1: i32) -> Wall {
    Wall::from_coords(x0, y0, x1, y1, 1.0)
}

fn outer_walls(w: i32, h: i32) -> Vec<Wall> {
    vec![
        wall(0, 0, 0, h - 1),
        wall(0, h - 1, w - 1, h - 1),
        wall(w - 1, h - 1, w - 1, 0),
        wall(w - 1, 0, 0, 0),
    ]
}

fn resource_spawn(x: i32, y: i32, medical: (f64, f64), ammo: (f64, f64)) -> ResourceSpawn {
    ResourceSpawn {
        pos: DVec2::new(f64::from(x), f64::from(y)),
        radius: 10.0,
        medical_probability: medical.0,
        medical_life: medical.1,
        ammo_probability: ammo.0,
        ammo_life: ammo.1,
    }
}

fn demo_map(w: i32, h: i32) -> MapDescriptor {
    let mut walls = vec![
        wall(0, 0, w, 0),
        wall(0, h - 1, w - 1, h - 1),
        wall(0, 0, 0, h - 1),
        wall(w - 1, 0, w - 1, h - 1),
    ];
    let partition = |x0: i32, y0: i32, x1: i32, y1: i32| Wall::from_coords(x0, y0, x1, y1, 2.0);
    walls.extend([
        partition(w / 2, h / 3, w / 2, h * 2 / 3),
        partition(w / 5, h / 5, w / 5, h * 4 / 5),
        partition(w * 4 / 5, h / 5, w * 4 / 5, h * 4 / 5),
    ]);

    let spawn_points = [
        (w / 2, h / 6),
        (w / 2, 5 * h / 6),
        (w / 5, h / 10),
        (w / 5, 9 * h / 10),
        (4 * w / 5, h / 10),
        (4 * w / 5, 9 * h / 10),
    ];

    MapDescriptor {
        size: (w as u32, h as u32),
        walls,
        player_spawns: vec![SpawnRegion::new(Rect::new(w - w / 5, h / 3, w / 5, h / 3))],
        zombie_spawns: vec![
            SpawnRegion::new(Rect::new(w / 5, h * 2 / 5, w / 2 - w / 5, h / 5)),
            SpawnRegion::initial_only(Rect::new(w / 2, h * 2 / 5, 4 * w / 5 - w / 2, h / 5)),
        ],
        objectives: vec![Objective::Rect(Rect::new(0, h / 3, w / 5, h / 3))],
        resource_spawns: spawn_points
            .into_iter()
            .map(|(x, y)| resource_spawn(x, y, (0.25, 100.0), (0.75, 2.0)))
            .collect(),
        checkpoints: Vec::new(),
    }
}

/// Fifth-of-the-map cells around the centre
fn cross_regions(w: i32, h: i32) -> [Rect; 4] {
    [
        Rect::new(w * 2 / 5, 0, w / 5, h / 5),
        Rect::new(w * 2 / 5, h * 4 / 5, w / 5, h / 5),
        Rect::new(0, h * 2 / 5, w / 5, h / 5),
        Rect::new(w * 4 / 5, h * 2 / 5, w / 5, h / 5),
    ]
}

fn open_room_map(w: i32, h: i32) -> MapDescriptor {
    MapDescriptor {
        size: (w as u32, h as u32),
        walls: outer_walls(w, h),
        player_spawns: vec![SpawnRegion::new(Rect::new(2 * w / 5, 2 * h / 5, w / 5, h / 5))],
        zombie_spawns: vec![
            SpawnRegion::new(Rect::new(w * 2 / 5, h / 5, w / 5, h / 5)),
            SpawnRegion::new(Rect::new(w * 2 / 5, h * 3 / 5, w / 5, h / 5)),
            SpawnRegion::new(Rect::new(w / 5, h * 2 / 5, w / 5, h / 5)),
            SpawnRegion::new(Rect::new(w * 3 / 5, h * 2 / 5, w / 5, h / 5)),
        ],
        objectives: cross_regions(w, h).into_iter().map(Objective::Rect).collect(),
        resource_spawns: [(w / 10, h / 5), (w / 10, h * 4 / 5), (w * 9 / 10, h / 5), (w * 9 / 10, h * 4 / 5)]
            .into_iter()
            .map(|(x, y)| resource_spawn(x, y, (0.5, 200.0), (0.5, 2.0)))
            .collect(),
        checkpoints: Vec::new(),
    }
}

fn easy_exit_map(w: i32, h: i32) -> MapDescriptor {
    let mut resource_spawns = Vec::new();
    for i in 0..5 {
        for j in 1..5 {
            resource_spawns.push(resource_spawn(
                w * (1 + 2 * i) / 10,
                h * j / 5,
                (0.5, 200.0),
                (0.5, 2.0),
            ));
        }
    }

    MapDescriptor {
        size: (w as u32, h as u32),
        walls: outer_walls(w, h),
        player_spawns: vec![SpawnRegion::new(Rect::new(2 * w / 5, 2 * h / 5, w / 5, h / 5))],
        zombie_spawns: cross_regions(w, h).into_iter().map(SpawnRegion::new).collect(),
        objectives: vec![
            Objective::Rect(Rect::new(0, 0, w / 5, h / 5)),
            Objective::Rect(Rect::new(0, h * 4 / 5, w / 5, h / 5)),
            Objective::Rect(Rect::new(w * 4 / 5, 0, w / 5, h / 5)),
            Objective::Rect(Rect::new(w * 4 / 5, h * 4 / 5, w / 5, h / 5)),
        ],
        resource_spawns,
        checkpoints: Vec::new(),
    }
}

fn simple_hallway_map(w: i32, h: i32) -> MapDescriptor {
    let mut walls = outer_walls(w, h);
    walls.push(wall(0, h * 2 / 5, w - 1, h * 2 / 5));
    walls.push(wall(0, h * 3 / 5, w - 1, h * 3 / 5));

    MapDescriptor {
        size: (w as u32, h as u32),
        walls,
        player_spawns: vec![SpawnRegion::new(Rect::new(w / 5, h * 2 / 5, w / 5, h / 5))],
        zombie_spawns: vec![
            SpawnRegion::new(Rect::new(0, h * 2 / 5, w / 5, h / 5)),
            SpawnRegion::initial_only(Rect::new(w * 3 / 5, h * 2 / 5, w / 5, h / 5)),
        ],
        objectives: vec![Objective::Rect(Rect::new(w * 4 / 5, h * 2 / 5, w / 5, h / 5))],
        resource_spawns: (2..4)
            .map(|i| resource_spawn(w * (1 + 2 * i) / 10, h * 5 / 10, (0.5, 200.0), (0.5, 2.0)))
            .collect(),
        checkpoints: Vec::new(),
    }
}
