//! Opening connectivity graph.
//!
//! Nodes are openings; an edge joins every two openings that share a room,
//! weighted by the straight-line distance between their centers. Each
//! opening gets a dense index at build time so searches can keep their
//! scratch state in flat vectors.
//!
//! The graph is owned by whoever manages the current structure and is
//! rebuilt wholesale when that structure's identity or generation changes.

use log::debug;
use std::collections::HashMap;

use crate::structure::{OpeningId, Structure, StructureId};

/// Cached adjacency of openings within shared rooms.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityGraph {
    /// Structure + generation the graph was built from.
    token: Option<(StructureId, u64)>,
    /// dense index → opening id
    nodes: Vec<OpeningId>,
    index: HashMap<OpeningId, usize>,
    /// dense index → list of (neighbor index, distance)
    adj: Vec<Vec<(usize, f32)>>,
}

impl ConnectivityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph for `structure` right away.
    pub fn build(structure: &Structure) -> Self {
        let mut graph = Self::new();
        graph.rebuild(structure);
        graph
    }

    /// Make sure the graph matches `structure`, rebuilding it if needed.
    ///
    /// A graph that is empty is always rebuilt. Returns whether a rebuild
    /// happened.
    pub fn ensure(&mut self, structure: &Structure) -> bool {
        let token = (structure.id, structure.generation());
        if self.token == Some(token) && !self.is_empty() {
            return false;
        }
        self.rebuild(structure);
        true
    }

    fn rebuild(&mut self, structure: &Structure) {
        self.clear();
        self.token = Some((structure.id, structure.generation()));

        for room in structure.rooms() {
            // Skip ids that don't resolve to an opening
            let members: Vec<usize> = room
                .openings
                .iter()
                .filter_map(|&oid| structure.opening(oid).map(|o| (oid, o.position())))
                .filter(|(_, pos)| pos.is_finite())
                .map(|(oid, _)| self.intern(oid))
                .collect();

            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i], members[j]);
                    if a == b {
                        continue;
                    }
                    let (Some(oa), Some(ob)) = (
                        structure.opening(self.nodes[a]),
                        structure.opening(self.nodes[b]),
                    ) else {
                        continue;
                    };
                    let dist = oa.position().distance(ob.position());
                    self.adj[a].push((b, dist));
                    self.adj[b].push((a, dist));
                }
            }
        }

        debug!(
            "Rebuilt connectivity graph for structure {:?} gen {}: {} openings, {} edges",
            structure.id,
            structure.generation(),
            self.len(),
            self.edge_count()
        );
    }

    fn intern(&mut self, id: OpeningId) -> usize {
        if let Some(&i) = self.index.get(&id) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(id);
        self.index.insert(id, i);
        self.adj.push(Vec::new());
        i
    }

    /// Drop all cached state; the next `ensure` rebuilds.
    pub fn clear(&mut self) {
        self.token = None;
        self.nodes.clear();
        self.index.clear();
        self.adj.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of openings in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn index_of(&self, id: OpeningId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn opening_id(&self, index: usize) -> OpeningId {
        self.nodes[index]
    }

    pub fn neighbors(&self, index: usize) -> &[(usize, f32)] {
        self.adj.get(index).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether the graph was built from this exact structure state.
    pub fn is_current_for(&self, structure: &Structure) -> bool {
        self.token == Some((structure.id, structure.generation()))
    }
}
