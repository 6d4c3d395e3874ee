//! Plain-data hull model — rooms, openings, doors, water.
//!
//! The propagation core only reads this model. Whatever owns the live hull
//! (game simulation, editor, test fixture) builds a `Structure` and mutates
//! door/water state between queries.
//!
//! Topology edits (`add_room`, `add_opening`, `link`) bump the structure's
//! generation so cached connectivity graphs know to rebuild. Door and water
//! state edits do not: they are read fresh by every search.

use crate::geometry::{OpeningAxis, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Horizontal width of one water wave column.
pub const WAVE_COLUMN_WIDTH: f32 = 32.0;

/// Surface height used for rooms with no water at all.
pub const NO_WATER_SURFACE: f32 = -1.0e9;

/// Surface height used for the flooded exterior of the hull.
pub const FLOODED_EXTERIOR_SURFACE: f32 = 1.0e9;

/// Door tag marking a duct blocker.
pub const DUCT_BLOCK_TAG: &str = "ductblock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpeningId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureId(pub u32);

/// Door state as seen by the propagation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    /// Locally simulated closed flag.
    pub is_closed: bool,
    pub is_broken: bool,
    /// Network-predicted open state, when a prediction exists.
    #[serde(default)]
    pub predicted_open: Option<bool>,
    /// Opening progress (0.0 = shut, 1.0 = fully open).
    pub open_state: f32,
    /// Item condition; a door at 0 condition no longer seals.
    pub condition: f32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Door {
    pub fn closed() -> Self {
        Self {
            is_closed: true,
            is_broken: false,
            predicted_open: None,
            open_state: 0.0,
            condition: 100.0,
            tags: Vec::new(),
        }
    }

    pub fn open() -> Self {
        Self {
            is_closed: false,
            open_state: 1.0,
            ..Self::closed()
        }
    }

    pub fn is_fully_open(&self) -> bool {
        self.open_state >= 1.0
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// A doorway, hatch or breach between two rooms, or between a room and the exterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: OpeningId,
    pub rect: Rect,
    pub axis: OpeningAxis,
    /// Open-ness fraction (0.0 = sealed, 1.0 = fully open).
    pub open: f32,
    #[serde(default)]
    pub door: Option<Door>,
    /// Linked rooms. `None` in the second slot means the exterior.
    pub rooms: [Option<RoomId>; 2],
}

impl Opening {
    pub fn position(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn links(&self, room: RoomId) -> bool {
        self.rooms.contains(&Some(room))
    }

    pub fn linked_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.iter().flatten().copied()
    }

    pub fn is_hull_breach(&self) -> bool {
        self.rooms.iter().filter(|r| r.is_some()).count() < 2
    }
}

/// Water in a room: a flat surface plus optional per-column wave offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterState {
    pub surface: f32,
    #[serde(default)]
    pub wave_offsets: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub rect: Rect,
    #[serde(default)]
    pub openings: Vec<OpeningId>,
    #[serde(default)]
    pub water: Option<WaterState>,
}

impl Room {
    pub fn new(id: u32, rect: Rect) -> Self {
        Self {
            id: RoomId(id),
            rect,
            openings: Vec::new(),
            water: None,
        }
    }

    /// Local water surface height at world x.
    pub fn surface_at(&self, x: f32) -> f32 {
        let Some(water) = &self.water else {
            return NO_WATER_SURFACE;
        };
        if water.wave_offsets.is_empty() {
            return water.surface;
        }
        let column = ((x - self.rect.min_x()) / WAVE_COLUMN_WIDTH).floor();
        let last = water.wave_offsets.len() - 1;
        let index = if column.is_finite() && column > 0.0 {
            (column as usize).min(last)
        } else {
            0
        };
        water.surface + water.wave_offsets[index]
    }

    /// Fill the room to the brim.
    pub fn flood(&mut self) {
        self.water = Some(WaterState {
            surface: self.rect.max_y(),
            wave_offsets: Vec::new(),
        });
    }
}

/// A whole hull: the rooms and the openings between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: StructureId,
    #[serde(default)]
    generation: u64,
    /// Whether the exterior side of a hull breach counts as water.
    #[serde(default = "default_exterior_submerged")]
    pub exterior_submerged: bool,
    rooms: Vec<Room>,
    openings: Vec<Opening>,
    #[serde(skip)]
    room_index: HashMap<RoomId, usize>,
    #[serde(skip)]
    opening_index: HashMap<OpeningId, usize>,
}

fn default_exterior_submerged() -> bool {
    true
}

impl Structure {
    pub fn new(id: u32) -> Self {
        Self {
            id: StructureId(id),
            generation: 0,
            exterior_submerged: true,
            rooms: Vec::new(),
            openings: Vec::new(),
            room_index: HashMap::new(),
            opening_index: HashMap::new(),
        }
    }

    /// Build from pre-assembled rooms and openings. Room opening lists are
    /// taken as given.
    pub fn from_parts(id: u32, rooms: Vec<Room>, openings: Vec<Opening>) -> Self {
        let mut s = Self::new(id);
        s.rooms = rooms;
        s.openings = openings;
        s.reindex();
        s
    }

    /// Parse a structure from JSON and rebuild its lookup tables.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut s: Structure = serde_json::from_str(json)?;
        s.reindex();
        Ok(s)
    }

    fn reindex(&mut self) {
        self.room_index = self
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
        self.opening_index = self
            .openings
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id, i))
            .collect();
    }

    /// Topology generation; changes whenever rooms or openings are added or relinked.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Force cached graphs to rebuild, e.g. after moving openings.
    pub fn mark_modified(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn add_room(&mut self, room: Room) -> RoomId {
        let id = room.id;
        self.room_index.insert(id, self.rooms.len());
        self.rooms.push(room);
        self.mark_modified();
        id
    }

    /// Add an opening and register it with the rooms it names.
    pub fn add_opening(&mut self, opening: Opening) -> OpeningId {
        let id = opening.id;
        for room_id in opening.linked_rooms() {
            if let Some(&i) = self.room_index.get(&room_id) {
                if !self.rooms[i].openings.contains(&id) {
                    self.rooms[i].openings.push(id);
                }
            }
        }
        self.opening_index.insert(id, self.openings.len());
        self.openings.push(opening);
        self.mark_modified();
        id
    }

    /// Attach an existing opening to an extra room's opening list.
    pub fn link(&mut self, room: RoomId, opening: OpeningId) {
        if let Some(&i) = self.room_index.get(&room) {
            if !self.rooms[i].openings.contains(&opening) {
                self.rooms[i].openings.push(opening);
                self.mark_modified();
            }
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.room_index.get(&id).map(|&i| &self.rooms[i])
    }

    pub fn opening(&self, id: OpeningId) -> Option<&Opening> {
        self.opening_index.get(&id).map(|&i| &self.openings[i])
    }

    /// Mutable room access for water changes. Does not bump the generation.
    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.room_index.get(&id).map(|&i| &mut self.rooms[i])
    }

    /// Mutable opening access for door/open-ness changes. Does not bump the generation.
    pub fn opening_mut(&mut self, id: OpeningId) -> Option<&mut Opening> {
        self.opening_index.get(&id).map(|&i| &mut self.openings[i])
    }

    /// Openings of a room that actually exist in this structure.
    pub fn room_openings(&self, id: RoomId) -> impl Iterator<Item = &Opening> + '_ {
        self.room(id)
            .map(|r| r.openings.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |oid| self.opening(*oid))
    }

    /// Water surface on one side of an opening. `None` is the exterior.
    pub fn surface_at(&self, room: Option<RoomId>, x: f32) -> f32 {
        match room.and_then(|id| self.room(id)) {
            Some(r) => r.surface_at(x),
            None if room.is_none() && self.exterior_submerged => FLOODED_EXTERIOR_SURFACE,
            None => NO_WATER_SURFACE,
        }
    }
}
