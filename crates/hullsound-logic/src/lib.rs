//! Pure sound propagation logic for HullSound.
//!
//! Given a hull made of rooms joined by doors, hatches and breaches, this
//! crate finds the routes sound takes from a source to a listener so the
//! audio layer can muffle by topology instead of straight-line distance.
//! Functions take plain data and return results; there is no audio,
//! engine or database dependency.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Penalties, thresholds and range limits (JSON-loadable) |
//! | [`cost`] | Per-opening traversal penalty: closed doors, water surfaces, walls |
//! | [`detail`] | True polyline length and crossing counts for a found route |
//! | [`error`] | Config validation and loading errors |
//! | [`geometry`] | Points, rectangles, line-vs-opening clipping |
//! | [`graph`] | Cached opening connectivity graph with dense indices |
//! | [`propagator`] | Graph + config owner for the current hull |
//! | [`solver`] | Multi-path A* search from sound to listener |
//! | [`structure`] | Rooms, openings, doors, water — the hull data model |
//! | [`validation`] | Hull layout checks (dangling references, degenerate extents) |

pub mod config;
pub mod cost;
pub mod detail;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod propagator;
pub mod solver;
pub mod structure;
pub mod validation;

pub use config::PropagationConfig;
pub use geometry::{OpeningAxis, Rect, Vec2};
pub use graph::ConnectivityGraph;
pub use propagator::SoundPropagator;
pub use solver::{find_shortest_paths, PathQuery, PathfindingResult};
pub use structure::{Door, Opening, OpeningId, Room, RoomId, Structure, WaterState};
