//! Parallel terrain generation scheduling
//!
//! One pure generation task per requested coordinate runs on a fixed-size
//! worker pool. Tasks share no mutable state: each sends its finished chunk
//! over a channel and the coordination thread merges the whole batch into
//! the cache after joining. There is no cancellation; submitted tasks
//! always run to completion.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::streaming::cache::ChunkCache;
use crate::terrain::generator::TerrainGenerator;
use crate::voxel::chunk::{ChunkCoord, ChunkData};

/// Dispatches per-coordinate generation batches onto a worker pool.
pub struct TerrainScheduler {
    pool: rayon::ThreadPool,
    generator: Arc<TerrainGenerator>,
    tx: Sender<(ChunkCoord, ChunkData)>,
    rx: Receiver<(ChunkCoord, ChunkData)>,
    in_flight: usize,
    ready: Vec<(ChunkCoord, ChunkData)>,
    started: Option<Instant>,
}

impl TerrainScheduler {
    /// Scheduler with a dedicated pool of `threads` workers (0 = one per
    /// available core, rayon's default).
    pub fn new(generator: TerrainGenerator, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("terrain-gen-{i}"))
            .build()
            .map_err(|e| Error::Scheduler(e.to_string()))?;
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            pool,
            generator: Arc::new(generator),
            tx,
            rx,
            in_flight: 0,
            ready: Vec::new(),
            started: None,
        })
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Whether no batch is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.ready.is_empty()
    }

    /// Submit one generation task per coordinate. Tasks are independent and
    /// order-insensitive.
    ///
    /// # Panics
    /// If a batch is already in flight; the coordinator finishes one batch
    /// before submitting the next.
    pub fn request_generation(&mut self, coords: Vec<ChunkCoord>) {
        assert!(self.is_idle(), "generation batch already in flight");
        if coords.is_empty() {
            return;
        }

        log::debug!("scheduling generation of {} chunks", coords.len());
        self.started = Some(Instant::now());
        self.in_flight = coords.len();

        for coord in coords {
            let generator = Arc::clone(&self.generator);
            let tx = self.tx.clone();
            self.pool.spawn(move || {
                let data = generator.generate_chunk(coord);
                // The receiver only drops on scheduler teardown.
                let _ = tx.send((coord, data));
            });
        }
    }

    fn drain(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.in_flight -= 1;
            self.ready.push(result);
        }
    }

    /// Non-blocking completion poll for the current batch.
    pub fn is_complete(&mut self) -> bool {
        self.drain();
        self.in_flight == 0
    }

    /// Block until the batch has joined, then merge every result into the
    /// cache. The cache is never touched while workers are still running.
    pub fn complete(&mut self, cache: &mut ChunkCache) {
        while self.in_flight > 0 {
            let result = self.rx.recv().expect("terrain worker pool disconnected");
            self.in_flight -= 1;
            self.ready.push(result);
        }

        let merged = self.ready.len();
        for (coord, data) in self.ready.drain(..) {
            cache.insert_generated(coord, data);
        }

        if merged > 0 {
            if let Some(started) = self.started.take() {
                log::info!(
                    "generated {merged} chunks in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::generator::TerrainParams;
    use crate::voxel::chunk::CHUNK_VOLUME;

    fn scheduler() -> TerrainScheduler {
        let generator = TerrainGenerator::new(TerrainParams::default()).unwrap();
        TerrainScheduler::new(generator, 2).unwrap()
    }

    fn cube(radius: i32) -> Vec<ChunkCoord> {
        let mut coords = Vec::new();
        for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    coords.push(ChunkCoord::new(x, y, z));
                }
            }
        }
        coords
    }

    #[test]
    fn test_batch_merges_all_results() {
        let mut scheduler = scheduler();
        let mut cache = ChunkCache::new(64);

        let coords = cube(1);
        scheduler.request_generation(coords.clone());
        scheduler.complete(&mut cache);

        assert!(scheduler.is_idle());
        assert_eq!(cache.len(), coords.len());
        for coord in coords {
            let data = cache.get(coord).expect("missing generated chunk");
            assert_eq!(data.run().len(), CHUNK_VOLUME);
        }
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut scheduler = scheduler();
        let mut cache = ChunkCache::new(8);

        scheduler.request_generation(Vec::new());
        assert!(scheduler.is_idle());
        assert!(scheduler.is_complete());
        scheduler.complete(&mut cache);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_results_match_direct_generation() {
        let generator = TerrainGenerator::new(TerrainParams::default()).unwrap();
        let coord = ChunkCoord::new(3, 0, -2);
        let expected = generator.generate_chunk(coord);

        let mut scheduler = TerrainScheduler::new(generator, 2).unwrap();
        let mut cache = ChunkCache::new(8);
        scheduler.request_generation(vec![coord]);
        scheduler.complete(&mut cache);

        let merged = cache.get(coord).unwrap();
        assert_eq!(
            merged.run().runs().collect::<Vec<_>>(),
            expected.run().runs().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_poll_eventually_completes() {
        let mut scheduler = scheduler();
        let mut cache = ChunkCache::new(8);

        scheduler.request_generation(vec![ChunkCoord::new(0, 0, 0)]);
        // Interleave "other work" with completion polling.
        while !scheduler.is_complete() {
            std::thread::yield_now();
        }
        scheduler.complete(&mut cache);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already in flight")]
    fn test_overlapping_batches_panic() {
        let mut scheduler = scheduler();
        scheduler.request_generation(vec![ChunkCoord::new(0, 0, 0)]);
        scheduler.request_generation(vec![ChunkCoord::new(1, 0, 0)]);
    }
}
