//! Run-length-encoded block storage for a single chunk
//!
//! Terrain is locally homogeneous, so a chunk's blocks compress well into
//! (block, cumulative count) runs. Point reads binary-search the cumulative
//! counts; point writes splice runs in place.

use crate::voxel::block::BlockId;

/// One run of identical blocks. `end` is the cumulative voxel count up to
/// and including this run, so the run covers indices `[prev.end, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RunNode {
    block: BlockId,
    end: u32,
}

/// Compressed block storage for one chunk.
///
/// Invariants:
/// - `end` values are strictly increasing; the last one equals `len()`
/// - adjacent runs never share a block id (maximal coalescing)
#[derive(Clone, Debug, Default)]
pub struct VoxelRun {
    nodes: Vec<RunNode>,
    len: u32,
}

impl VoxelRun {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(runs: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(runs),
            len: 0,
        }
    }

    /// Logical voxel count.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored runs, the fragmentation measure.
    pub fn compressed_len(&self) -> usize {
        self.nodes.len()
    }

    /// Append a run during bulk build. Runs must arrive in flattened
    /// iteration order. A run matching the trailing block id extends it, so
    /// the coalescing invariant holds regardless of caller batching.
    pub fn push_run(&mut self, block: BlockId, count: u32) {
        if count == 0 {
            return;
        }
        self.len += count;
        match self.nodes.last_mut() {
            Some(last) if last.block == block => last.end = self.len,
            _ => self.nodes.push(RunNode {
                block,
                end: self.len,
            }),
        }
    }

    /// Block id at `index`.
    ///
    /// # Panics
    /// If `index >= len()`. Out-of-range access signals a broken invariant
    /// upstream, not a recoverable condition.
    pub fn get(&self, index: u32) -> BlockId {
        assert!(
            index < self.len,
            "index {index} out of range for voxel run of length {}",
            self.len
        );
        self.nodes[self.find(index)].block
    }

    /// Write `block` at `index`, splicing runs as needed.
    ///
    /// Depending on how the write lands against the owning run's edges and
    /// the neighboring run ids, this collapses up to two runs, grows or
    /// shrinks one boundary, or splits the owning run in up to three.
    /// Returns `false` when the stored id already matches.
    ///
    /// # Panics
    /// If `index >= len()`.
    pub fn set(&mut self, index: u32, block: BlockId) -> bool {
        assert!(
            index < self.len,
            "index {index} out of range for voxel run of length {}",
            self.len
        );
        let idx = self.find(index);
        let current = self.nodes[idx].block;
        if current == block {
            return false;
        }

        let start = if idx == 0 { 0 } else { self.nodes[idx - 1].end };
        let end = self.nodes[idx].end;
        let single = end - start == 1;
        let left_matches = idx > 0 && self.nodes[idx - 1].block == block;
        let right_matches = idx + 1 < self.nodes.len() && self.nodes[idx + 1].block == block;

        if single {
            match (left_matches, right_matches) {
                // Both neighbors coalesce: three runs collapse into one.
                (true, true) => {
                    let merged_end = self.nodes[idx + 1].end;
                    self.nodes[idx - 1].end = merged_end;
                    self.nodes.drain(idx..=idx + 1);
                }
                // Left neighbor absorbs the voxel.
                (true, false) => {
                    self.nodes[idx - 1].end += 1;
                    self.nodes.remove(idx);
                }
                // Right neighbor grows leftward once this run is gone.
                (false, true) => {
                    self.nodes.remove(idx);
                }
                (false, false) => self.nodes[idx].block = block,
            }
        } else if index == start {
            if left_matches {
                self.nodes[idx - 1].end += 1;
            } else {
                self.nodes.insert(
                    idx,
                    RunNode {
                        block,
                        end: start + 1,
                    },
                );
            }
        } else if index == end - 1 {
            // Shrinking this run hands the voxel to whatever follows.
            self.nodes[idx].end -= 1;
            if !right_matches {
                self.nodes.insert(idx + 1, RunNode { block, end });
            }
        } else {
            // Interior write splits the run in three.
            self.nodes[idx].end = index;
            self.nodes.insert(
                idx + 1,
                RunNode {
                    block,
                    end: index + 1,
                },
            );
            self.nodes.insert(
                idx + 2,
                RunNode {
                    block: current,
                    end,
                },
            );
        }
        true
    }

    /// Iterate (block, run length) pairs in order.
    pub fn runs(&self) -> impl Iterator<Item = (BlockId, u32)> + '_ {
        let mut prev = 0;
        self.nodes.iter().map(move |node| {
            let count = node.end - prev;
            prev = node.end;
            (node.block, count)
        })
    }

    /// Index of the first node whose cumulative count exceeds `index`.
    fn find(&self, index: u32) -> usize {
        self.nodes.partition_point(|node| node.end <= index)
    }
}
