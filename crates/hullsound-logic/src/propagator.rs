//! Owner of the connectivity graph for "the current hull".
//!
//! Holds the graph and config together so callers evaluating many sounds
//! per frame only pass the live structure and positions. Not thread-safe:
//! rebuilds and searches must happen on the same thread.

use crate::config::PropagationConfig;
use crate::geometry::Vec2;
use crate::graph::ConnectivityGraph;
use crate::solver::{find_shortest_paths, PathQuery, PathfindingResult};
use crate::structure::{RoomId, Structure};

pub struct SoundPropagator {
    graph: ConnectivityGraph,
    config: PropagationConfig,
}

impl SoundPropagator {
    pub fn new(config: PropagationConfig) -> Self {
        Self {
            graph: ConnectivityGraph::new(),
            config,
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Routes from a sound to the listener using the configured path count
    /// and range.
    pub fn propagate(
        &mut self,
        structure: &Structure,
        source_pos: Vec2,
        source_room: RoomId,
        listener_pos: Vec2,
        listener_room: RoomId,
        is_door_sound: bool,
    ) -> Vec<PathfindingResult> {
        let query = PathQuery {
            source_pos,
            source_room,
            listener_pos,
            listener_room,
            max_paths: self.config.max_paths,
            max_raw_distance: self.config.max_raw_distance,
            is_door_sound,
        };
        self.find_paths(structure, &query)
    }

    pub fn find_paths(&mut self, structure: &Structure, query: &PathQuery) -> Vec<PathfindingResult> {
        find_shortest_paths(&mut self.graph, structure, &self.config, query)
    }

    /// Best route only, or a not-found result.
    pub fn best_path(&mut self, structure: &Structure, query: &PathQuery) -> PathfindingResult {
        let single = PathQuery {
            max_paths: 1,
            ..*query
        };
        self.find_paths(structure, &single)
            .into_iter()
            .next()
            .unwrap_or_else(PathfindingResult::not_found)
    }

    /// Drop the cached graph, e.g. when switching to a different hull.
    pub fn invalidate(&mut self) {
        self.graph.clear();
    }
}

impl Default for SoundPropagator {
    fn default() -> Self {
        Self::new(PropagationConfig::default())
    }
}
