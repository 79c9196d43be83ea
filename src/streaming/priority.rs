//! Focus-scored eviction queue
//!
//! Cached and pooled coordinates carry a priority equal to the negative
//! squared distance to the current focus chunk, so the farthest coordinate
//! pops first when capacity forces an eviction.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::voxel::chunk::ChunkCoord;

#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    coord: ChunkCoord,
    score: i64,
}

impl QueueEntry {
    fn key(&self) -> (i64, i32, i32, i32) {
        (self.score, self.coord.x, self.coord.y, self.coord.z)
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and the lowest score (the
        // farthest coordinate) must pop first.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of coordinates scored against a movable focus.
///
/// Rescoring rebuilds the heap. Removals are lazy: the live score map is
/// authoritative and stale heap entries are skipped on pop.
#[derive(Debug, Default)]
pub struct FocusQueue {
    heap: BinaryHeap<QueueEntry>,
    scores: HashMap<ChunkCoord, i64>,
}

impl FocusQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.scores.contains_key(&coord)
    }

    /// Score of a coordinate: negative squared distance to `focus`.
    pub fn score(coord: ChunkCoord, focus: ChunkCoord) -> i64 {
        -coord.distance_squared(focus)
    }

    /// Enqueue a coordinate at its score relative to `focus`.
    pub fn push(&mut self, coord: ChunkCoord, focus: ChunkCoord) {
        let score = Self::score(coord, focus);
        self.scores.insert(coord, score);
        self.heap.push(QueueEntry { coord, score });
    }

    /// Re-score every queued coordinate against a new focus.
    pub fn rescore(&mut self, focus: ChunkCoord) {
        for (coord, score) in self.scores.iter_mut() {
            *score = Self::score(*coord, focus);
        }
        self.heap = self
            .scores
            .iter()
            .map(|(&coord, &score)| QueueEntry { coord, score })
            .collect();
    }

    /// Pop the farthest (worst-scored) queued coordinate.
    pub fn pop_farthest(&mut self) -> Option<ChunkCoord> {
        while let Some(entry) = self.heap.pop() {
            match self.scores.get(&entry.coord) {
                Some(&score) if score == entry.score => {
                    self.scores.remove(&entry.coord);
                    return Some(entry.coord);
                }
                // Stale entry left behind by a removal.
                _ => {}
            }
        }
        None
    }

    /// Drop a coordinate without popping it; its heap entry dies lazily.
    pub fn remove(&mut self, coord: ChunkCoord) {
        self.scores.remove(&coord);
    }
}
