//! Path detail — true geometry and obstruction counts for a found route.
//!
//! The search ranks routes by opening-center distances plus penalties.
//! Consumers that scale effects off distance or door counts need the
//! real thing: the polyline that threads each opening's physical extent,
//! and crossings recounted along that exact route.

use serde::{Deserialize, Serialize};

use crate::config::PropagationConfig;
use crate::cost::{crosses_water_surface, is_door_closed};
use crate::geometry::{clip_through_opening, Vec2};
use crate::structure::{OpeningId, Structure};

/// Measured properties of one route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathDetail {
    /// Polyline length from source through every opening to the listener.
    pub raw_distance: f32,
    /// Last point where the route passed an opening (the source if none).
    pub last_intersection: Vec2,
    pub closed_doors: u32,
    pub water_crossings: u32,
}

/// Measure the route `source → path[0] → … → path[n-1] → listener`.
///
/// Each opening is crossed where the line from the previous crossing point
/// toward the listener meets the opening's plane, clamped to its extent.
/// Closed doors are not counted when the sound is itself a door sound.
/// Ids that no longer resolve are skipped.
pub fn path_detail(
    path: &[OpeningId],
    source_pos: Vec2,
    listener_pos: Vec2,
    structure: &Structure,
    config: &PropagationConfig,
    is_door_sound: bool,
) -> PathDetail {
    let mut current = source_pos;
    let mut raw_distance = 0.0;
    let mut closed_doors = 0;
    let mut water_crossings = 0;

    for opening in path.iter().filter_map(|&id| structure.opening(id)) {
        let hit = clip_through_opening(current, listener_pos, &opening.rect, opening.axis);
        raw_distance += current.distance(hit);
        current = hit;

        if !is_door_sound {
            if let Some(door) = &opening.door {
                if is_door_closed(door, config) {
                    closed_doors += 1;
                }
            }
        }
        if crosses_water_surface(opening, structure) {
            water_crossings += 1;
        }
    }

    raw_distance += current.distance(listener_pos);

    PathDetail {
        raw_distance,
        last_intersection: current,
        closed_doors,
        water_crossings,
    }
}
