//! Multi-path sound propagation search.
//!
//! Finds up to N ranked routes from a sound to a listener through the
//! opening graph. This is a single-source A* relaxation over openings
//! followed by extraction of one route per opening in the listener's room.
//!
//! Two metrics run side by side:
//! - **cost** = geometry + penalties (closed doors, water surfaces). Drives
//!   the priority queue and ranking.
//! - **raw distance** = geometry only. A hard range cutoff: sound that has
//!   to travel further than `max_raw_distance` is inaudible no matter how
//!   cheap the route is otherwise.
//!
//! Penalty accounting: each opening on a route is charged exactly once.
//! Interior openings are charged when the search expands out of them; the
//! terminal opening is charged when candidates are ranked, since the final
//! leg to the listener passes through it. Seeds are not charged on entry.

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::PropagationConfig;
use crate::cost::{edge_penalty, TraversalCost};
use crate::detail::path_detail;
use crate::geometry::Vec2;
use crate::graph::ConnectivityGraph;
use crate::structure::{OpeningId, RoomId, Structure};

/// Everything a single propagation query needs to know.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathQuery {
    pub source_pos: Vec2,
    pub source_room: RoomId,
    pub listener_pos: Vec2,
    pub listener_room: RoomId,
    /// Maximum number of routes to return.
    pub max_paths: usize,
    /// Routes longer than this (geometry only) are dropped.
    pub max_raw_distance: f32,
    /// The sound is a door opening or closing; its own door costs nothing.
    pub is_door_sound: bool,
}

/// One route from a sound to the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfindingResult {
    pub found: bool,
    /// True polyline length through the openings, ignoring penalties.
    pub raw_distance: f32,
    pub closed_doors: u32,
    pub water_crossings: u32,
    /// Last opening before the listener; `None` for a same-room result.
    pub terminal: Option<OpeningId>,
    /// Where the route last passed an opening (the source for same-room results).
    pub last_intersection: Vec2,
    /// Ranking cost: center-to-center geometry plus every penalty on the route.
    pub approximate_cost: f32,
    /// Openings on the route, source side first.
    pub path: Vec<OpeningId>,
}

impl PathfindingResult {
    /// A result that says "no line of influence".
    pub fn not_found() -> Self {
        Self {
            found: false,
            raw_distance: f32::INFINITY,
            closed_doors: 0,
            water_crossings: 0,
            terminal: None,
            last_intersection: Vec2::ZERO,
            approximate_cost: f32::INFINITY,
            path: Vec::new(),
        }
    }

    fn direct(source_pos: Vec2, distance: f32) -> Self {
        Self {
            found: true,
            raw_distance: distance,
            closed_doors: 0,
            water_crossings: 0,
            terminal: None,
            last_intersection: source_pos,
            approximate_cost: distance,
            path: Vec::new(),
        }
    }
}

/// Priority-queue entry (min-heap on priority).
#[derive(Clone, Copy, Debug)]
struct SearchState {
    priority: f32,
    node: usize,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; node index breaks ties deterministically
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-query scratch state, indexed by dense opening index.
struct Search<'a> {
    graph: &'a ConnectivityGraph,
    structure: &'a Structure,
    config: &'a PropagationConfig,
    listener_pos: Vec2,
    max_raw: f32,
    ignored: Option<usize>,
    positions: Vec<Vec2>,
    cost: Vec<f32>,
    raw: Vec<f32>,
    priority: Vec<f32>,
    pred: Vec<Option<usize>>,
    penalties: Vec<Option<TraversalCost>>,
    open: BinaryHeap<SearchState>,
}

impl<'a> Search<'a> {
    fn new(
        graph: &'a ConnectivityGraph,
        structure: &'a Structure,
        config: &'a PropagationConfig,
        listener_pos: Vec2,
        max_raw: f32,
        ignored: Option<usize>,
    ) -> Self {
        let n = graph.len();
        let positions = (0..n)
            .map(|i| {
                structure
                    .opening(graph.opening_id(i))
                    .map(|o| o.position())
                    .unwrap_or(Vec2::new(f32::NAN, f32::NAN))
            })
            .collect();
        Self {
            graph,
            structure,
            config,
            listener_pos,
            max_raw,
            ignored,
            positions,
            cost: vec![f32::INFINITY; n],
            raw: vec![f32::INFINITY; n],
            priority: vec![f32::INFINITY; n],
            pred: vec![None; n],
            penalties: vec![None; n],
            open: BinaryHeap::new(),
        }
    }

    fn heuristic(&self, node: usize) -> f32 {
        self.positions[node].distance(self.listener_pos)
    }

    /// Penalty for passing `node`, computed once per search.
    fn penalty(&mut self, node: usize) -> TraversalCost {
        if self.ignored == Some(node) {
            return TraversalCost::FREE;
        }
        if let Some(p) = self.penalties[node] {
            return p;
        }
        let p = self
            .structure
            .opening(self.graph.opening_id(node))
            .map(|o| edge_penalty(o, self.structure, self.config))
            .unwrap_or(TraversalCost::Blocked);
        self.penalties[node] = Some(p);
        p
    }

    fn seed(&mut self, node: usize, source_pos: Vec2) {
        let raw = source_pos.distance(self.positions[node]);
        // Comparison also rejects NaN
        if !(raw <= self.max_raw) || raw >= self.cost[node] {
            return;
        }
        self.raw[node] = raw;
        self.cost[node] = raw;
        self.priority[node] = raw + self.heuristic(node);
        self.open.push(SearchState {
            priority: self.priority[node],
            node,
        });
    }

    fn relax(&mut self, from: usize, to: usize, step: f32, penalty: f32) {
        let raw = self.raw[from] + step;
        if !(raw <= self.max_raw) {
            return;
        }
        let cost = self.cost[from] + penalty + step;
        if cost < self.cost[to] {
            self.cost[to] = cost;
            self.raw[to] = raw;
            self.priority[to] = cost + self.heuristic(to);
            self.pred[to] = Some(from);
            self.open.push(SearchState {
                priority: self.priority[to],
                node: to,
            });
        }
    }

    fn run(&mut self) {
        let graph = self.graph;
        let structure = self.structure;

        while let Some(SearchState { priority, node: cur }) = self.open.pop() {
            if !self.cost[cur].is_finite() || priority > self.priority[cur] {
                continue; // unreachable or stale
            }
            let penalty = match self.penalty(cur) {
                TraversalCost::Blocked => continue,
                TraversalCost::Penalty(p) => p,
            };

            // Openings sharing a room with `cur`
            for &(next, base) in graph.neighbors(cur) {
                self.relax(cur, next, base, penalty);
            }

            // Step through `cur` into each room it links
            let Some(opening) = structure.opening(graph.opening_id(cur)) else {
                continue;
            };
            let cur_pos = self.positions[cur];
            for room in opening.linked_rooms() {
                for next_opening in structure.room_openings(room) {
                    let Some(next) = graph.index_of(next_opening.id) else {
                        continue;
                    };
                    if next == cur {
                        continue;
                    }
                    let step = cur_pos.distance(self.positions[next]);
                    self.relax(cur, next, step, penalty);
                }
            }
        }
    }

    /// Walk predecessors back from `terminal`. `None` if the chain does not
    /// terminate within the iteration bound.
    fn reconstruct(&self, terminal: usize) -> Option<Vec<usize>> {
        let limit = 2 * self.graph.len();
        let mut chain = vec![terminal];
        let mut cur = terminal;
        while let Some(prev) = self.pred[cur] {
            if chain.len() > limit {
                return None;
            }
            chain.push(prev);
            cur = prev;
        }
        chain.reverse();
        Some(chain)
    }
}

/// The opening in `room` whose door is closest to `pos`.
pub fn closest_door_opening(structure: &Structure, room: RoomId, pos: Vec2) -> Option<OpeningId> {
    structure
        .room_openings(room)
        .filter(|o| o.door.is_some())
        .map(|o| (o.id, o.position().distance(pos)))
        .filter(|(_, d)| d.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Find up to `query.max_paths` distinct routes from sound to listener,
/// best first.
///
/// The graph is brought up to date with `structure` first. An empty result
/// means the listener is out of range or fully blocked; malformed queries
/// (zero paths, non-positive range, unknown rooms) also return empty.
pub fn find_shortest_paths(
    graph: &mut ConnectivityGraph,
    structure: &Structure,
    config: &PropagationConfig,
    query: &PathQuery,
) -> Vec<PathfindingResult> {
    let max_raw = config.effective_max_raw_distance(query.max_raw_distance);
    // NaN fails both comparisons
    if query.max_paths == 0 || !(query.max_raw_distance > 0.0) || !(max_raw > 0.0) {
        return Vec::new();
    }
    if !query.source_pos.is_finite() || !query.listener_pos.is_finite() {
        return Vec::new();
    }
    if structure.room(query.source_room).is_none() || structure.room(query.listener_room).is_none()
    {
        return Vec::new();
    }

    if query.source_room == query.listener_room {
        let distance = query.source_pos.distance(query.listener_pos);
        return if distance <= max_raw {
            vec![PathfindingResult::direct(query.source_pos, distance)]
        } else {
            Vec::new()
        };
    }

    graph.ensure(structure);
    if graph.is_empty() {
        return Vec::new();
    }
    let graph: &ConnectivityGraph = graph;

    let ignored = if query.is_door_sound {
        closest_door_opening(structure, query.source_room, query.source_pos)
            .and_then(|id| graph.index_of(id))
    } else {
        None
    };

    let mut search = Search::new(
        graph,
        structure,
        config,
        query.listener_pos,
        max_raw,
        ignored,
    );
    for opening in structure.room_openings(query.source_room) {
        if let Some(node) = graph.index_of(opening.id) {
            search.seed(node, query.source_pos);
        }
    }
    search.run();

    // Rank every reachable opening of the listener's room
    let mut candidates: Vec<(usize, f32)> = Vec::new();
    for opening in structure.room_openings(query.listener_room) {
        let Some(node) = graph.index_of(opening.id) else {
            continue;
        };
        if !search.cost[node].is_finite() || candidates.iter().any(|&(n, _)| n == node) {
            continue;
        }
        let TraversalCost::Penalty(penalty) = search.penalty(node) else {
            continue;
        };
        let total = search.cost[node] + penalty + search.positions[node].distance(query.listener_pos);
        candidates.push((node, total));
    }
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut results = Vec::new();
    for (terminal, approximate_cost) in candidates {
        if results.len() >= query.max_paths {
            break;
        }
        let Some(chain) = search.reconstruct(terminal) else {
            warn!(
                "Predecessor chain from opening {:?} did not terminate; skipping candidate",
                graph.opening_id(terminal)
            );
            continue;
        };
        let path: Vec<OpeningId> = chain.iter().map(|&i| graph.opening_id(i)).collect();
        let detail = path_detail(
            &path,
            query.source_pos,
            query.listener_pos,
            structure,
            config,
            query.is_door_sound,
        );
        if !(detail.raw_distance <= max_raw) {
            continue;
        }
        results.push(PathfindingResult {
            found: true,
            raw_distance: detail.raw_distance,
            closed_doors: detail.closed_doors,
            water_crossings: detail.water_crossings,
            terminal: Some(graph.opening_id(terminal)),
            last_intersection: detail.last_intersection,
            approximate_cost,
            path,
        });
    }

    trace!(
        "Propagation {:?} -> {:?}: {} route(s), best cost {:?}",
        query.source_room,
        query.listener_room,
        results.len(),
        results.first().map(|r| r.approximate_cost)
    );

    results
}
