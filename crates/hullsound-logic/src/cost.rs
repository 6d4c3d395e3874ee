//! Traversal cost model — what it costs sound to pass one opening.
//!
//! Penalties are additive on top of geometric distance:
//! - a closed door adds `closed_door_penalty`
//! - passing between air and water adds `water_surface_penalty`
//! - a door-less opening that is barely open is a wall (`Blocked`)
//! - a duct blocker is a wall unless the config allows traversing them

use crate::config::PropagationConfig;
use crate::geometry::OpeningAxis;
use crate::structure::{Door, Opening, Structure, DUCT_BLOCK_TAG};

/// Cost of passing an opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraversalCost {
    /// Passable, with this extra penalty (≥ 0).
    Penalty(f32),
    /// Sound cannot pass at all.
    Blocked,
}

impl TraversalCost {
    pub const FREE: TraversalCost = TraversalCost::Penalty(0.0);
}

/// Penalty for sound passing through `opening`.
pub fn edge_penalty(
    opening: &Opening,
    structure: &Structure,
    config: &PropagationConfig,
) -> TraversalCost {
    let mut penalty = 0.0;

    match &opening.door {
        Some(door) => {
            if !config.traverse_duct_blocks && door.has_tag(DUCT_BLOCK_TAG) {
                return TraversalCost::Blocked;
            }
            if is_door_closed(door, config) {
                penalty += config.closed_door_penalty;
            }
        }
        None => {
            // NaN open-ness counts as sealed
            if !(opening.open >= config.open_wall_threshold) {
                return TraversalCost::Blocked;
            }
        }
    }

    if crosses_water_surface(opening, structure) {
        penalty += config.water_surface_penalty;
    }

    TraversalCost::Penalty(penalty)
}

/// Whether a door currently blocks sound as a closed door.
///
/// Either the prediction or the local flag saying closed is enough.
pub fn is_door_closed(door: &Door, config: &PropagationConfig) -> bool {
    if door.is_broken || door.is_fully_open() || door.condition <= 0.0 {
        return false;
    }
    let says_closed = door.predicted_open == Some(false) || door.is_closed;
    says_closed && door.open_state < config.open_door_threshold
}

/// Whether passing `opening` moves between air and water.
///
/// Exactly one side must have its local surface above the opening's center.
/// A floor or ceiling hatch sits on the room boundary, so a surface level
/// with it (a room flooded to the ceiling) counts as submerged.
pub fn crosses_water_surface(opening: &Opening, structure: &Structure) -> bool {
    let pos = opening.position();
    let submerged = |side: usize| {
        let surface = structure.surface_at(opening.rooms[side], pos.x);
        match opening.axis {
            OpeningAxis::Horizontal => surface >= pos.y,
            OpeningAxis::Vertical => surface > pos.y,
        }
    };
    submerged(0) != submerged(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::structure::{OpeningId, Room, RoomId, WaterState};

    fn make_hull(door: Option<Door>, open: f32) -> Structure {
        let mut s = Structure::new(1);
        s.add_room(Room::new(1, Rect::new(0.0, 0.0, 100.0, 100.0)));
        s.add_room(Room::new(2, Rect::new(100.0, 0.0, 100.0, 100.0)));
        s.add_opening(Opening {
            id: OpeningId(1),
            rect: Rect::new(50.0, 0.0, 2.0, 40.0),
            axis: OpeningAxis::Vertical,
            open,
            door,
            rooms: [Some(RoomId(1)), Some(RoomId(2))],
        });
        s
    }

    fn penalty_of(s: &Structure, config: &PropagationConfig) -> TraversalCost {
        edge_penalty(s.opening(OpeningId(1)).unwrap(), s, config)
    }

    #[test]
    fn test_open_doorway_is_free() {
        let s = make_hull(None, 1.0);
        assert_eq!(penalty_of(&s, &PropagationConfig::default()), TraversalCost::FREE);
    }

    #[test]
    fn test_closed_door_penalty() {
        let s = make_hull(Some(Door::closed()), 1.0);
        let config = PropagationConfig::default();
        assert_eq!(
            penalty_of(&s, &config),
            TraversalCost::Penalty(config.closed_door_penalty)
        );
    }

    #[test]
    fn test_open_door_is_free() {
        let s = make_hull(Some(Door::open()), 1.0);
        assert_eq!(penalty_of(&s, &PropagationConfig::default()), TraversalCost::FREE);
    }

    #[test]
    fn test_sealed_wall_is_blocked() {
        let s = make_hull(None, 0.0);
        assert_eq!(penalty_of(&s, &PropagationConfig::default()), TraversalCost::Blocked);
        let s = make_hull(None, f32::NAN);
        assert_eq!(penalty_of(&s, &PropagationConfig::default()), TraversalCost::Blocked);
    }

    #[test]
    fn test_door_overrides_wall_threshold() {
        // A door frame reports zero open-ness but is still a door, not a wall
        let s = make_hull(Some(Door::closed()), 0.0);
        assert_ne!(penalty_of(&s, &PropagationConfig::default()), TraversalCost::Blocked);
    }

    #[test]
    fn test_duct_block_respects_config() {
        let mut door = Door::open();
        door.tags.push(DUCT_BLOCK_TAG.into());
        let s = make_hull(Some(door), 1.0);
        let mut config = PropagationConfig::default();
        assert_eq!(penalty_of(&s, &config), TraversalCost::Blocked);
        config.traverse_duct_blocks = true;
        assert_eq!(penalty_of(&s, &config), TraversalCost::FREE);
    }

    #[test]
    fn test_door_closed_rules() {
        let config = PropagationConfig::default();
        let mut door = Door::closed();
        assert!(is_door_closed(&door, &config));

        door.is_broken = true;
        assert!(!is_door_closed(&door, &config));

        let mut door = Door::closed();
        door.condition = 0.0;
        assert!(!is_door_closed(&door, &config));

        // Half-way open passes the threshold
        let mut door = Door::closed();
        door.open_state = 0.6;
        assert!(!is_door_closed(&door, &config));

        // Prediction says closed even though the local flag says open
        let mut door = Door::open();
        door.open_state = 0.0;
        door.predicted_open = Some(false);
        assert!(is_door_closed(&door, &config));

        // Neither prediction nor local flag says closed
        door.predicted_open = Some(true);
        assert!(!is_door_closed(&door, &config));
    }

    #[test]
    fn test_water_crossing() {
        let mut s = make_hull(None, 1.0);
        assert!(!crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));

        s.room_mut(RoomId(1)).unwrap().flood();
        assert!(crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));

        let config = PropagationConfig::default();
        assert_eq!(
            penalty_of(&s, &config),
            TraversalCost::Penalty(config.water_surface_penalty)
        );

        // Both sides flooded: no interface
        s.room_mut(RoomId(2)).unwrap().flood();
        assert!(!crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));
    }

    #[test]
    fn test_water_below_opening_is_not_crossing() {
        let mut s = make_hull(None, 1.0);
        s.room_mut(RoomId(1)).unwrap().water = Some(WaterState {
            surface: -30.0,
            wave_offsets: vec![],
        });
        assert!(!crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));
    }

    #[test]
    fn test_hatch_above_brim_full_room_is_crossing() {
        // Room 1 flooded to its ceiling at y=50, dry room 2 above
        let mut s = Structure::new(1);
        s.add_room(Room::new(1, Rect::new(0.0, 0.0, 100.0, 100.0)));
        s.add_room(Room::new(2, Rect::new(0.0, 100.0, 100.0, 100.0)));
        s.add_opening(Opening {
            id: OpeningId(1),
            rect: Rect::new(0.0, 50.0, 40.0, 2.0),
            axis: OpeningAxis::Horizontal,
            open: 1.0,
            door: None,
            rooms: [Some(RoomId(1)), Some(RoomId(2))],
        });
        s.room_mut(RoomId(1)).unwrap().flood();
        assert!(crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));

        s.room_mut(RoomId(2)).unwrap().flood();
        assert!(!crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));
    }

    #[test]
    fn test_penalties_stack() {
        let mut s = make_hull(Some(Door::closed()), 1.0);
        s.room_mut(RoomId(2)).unwrap().flood();
        let config = PropagationConfig::default();
        assert_eq!(
            penalty_of(&s, &config),
            TraversalCost::Penalty(config.closed_door_penalty + config.water_surface_penalty)
        );
    }

    #[test]
    fn test_hull_breach_to_flooded_exterior() {
        let mut s = Structure::new(1);
        s.add_room(Room::new(1, Rect::new(0.0, 0.0, 100.0, 100.0)));
        s.add_opening(Opening {
            id: OpeningId(1),
            rect: Rect::new(50.0, 0.0, 2.0, 40.0),
            axis: OpeningAxis::Vertical,
            open: 1.0,
            door: None,
            rooms: [Some(RoomId(1)), None],
        });
        assert!(crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));
        s.exterior_submerged = false;
        assert!(!crosses_water_surface(s.opening(OpeningId(1)).unwrap(), &s));
    }
}
