//! # World Manager
//!
//! Streams chunks in and out around a moving focal point.
//!
//! ## Architecture
//!
//! ```text
//!   update thread ──> [slot table] ──> [bounded job queue] ──> worker 1..N
//!        ^                 ^                                      │
//!        │                 └──────── completion (ticket check) <──┘
//!        └── get_chunk / voxel_at (non-blocking poll)
//! ```
//!
//! - The slot table maps every tracked coordinate to `Pending`, `Ready` or
//!   `Failed`. It is the only shared mutable state.
//! - A request takes the table lock once and does get-or-insert for every
//!   coordinate, so a coordinate can never get two in-flight jobs.
//! - Every pending slot carries a ticket. A worker stores its result only if
//!   the slot still holds that ticket. Results for coordinates that were
//!   evicted (or evicted and requested again) are discarded on arrival.
//! - Generation itself runs outside the lock and shares nothing mutable.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use cubeworld_core::{split_world_pos, Chunk, ChunkCoord, Direction, VoxelCatalog, VoxelTypeId};
use parking_lot::{Condvar, Mutex};

use crate::config::{WorldConfig, MAX_LOAD_RADIUS};
use crate::error::{ProcError, ProcResult};
use crate::terrain::TerrainGenerator;

/// Anything that can produce the chunk for a coordinate.
///
/// Implementations are called concurrently from every worker thread.
pub trait ChunkSource: Send + Sync + 'static {
    /// Produces the complete chunk at `coord`.
    ///
    /// # Errors
    ///
    /// A failure moves the coordinate's slot to the terminal failed state.
    fn generate(&self, coord: ChunkCoord) -> ProcResult<Chunk>;
}

impl ChunkSource for TerrainGenerator {
    fn generate(&self, coord: ChunkCoord) -> ProcResult<Chunk> {
        TerrainGenerator::generate(self, coord)
    }
}

/// Public view of a coordinate's lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Not tracked (never requested, or evicted).
    Absent,
    /// Generation is queued or running.
    Pending,
    /// Generation finished.
    Ready(Arc<Chunk>),
    /// Generation failed; the slot stays failed until evicted.
    Failed(ProcError),
}

enum Slot {
    Pending { ticket: u64 },
    Ready(Arc<Chunk>),
    Failed(ProcError),
}

impl Slot {
    const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    fn holds_ticket(&self, expected: u64) -> bool {
        matches!(self, Self::Pending { ticket } if *ticket == expected)
    }
}

struct GenerationJob {
    coord: ChunkCoord,
    ticket: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    generated: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
    skipped: AtomicU64,
    deferred: AtomicU64,
    evicted: AtomicU64,
}

/// State shared between the manager and its workers.
struct Shared {
    slots: Mutex<HashMap<ChunkCoord, Slot>>,
    /// Signalled whenever a pending slot resolves or disappears.
    settled: Condvar,
    counters: Counters,
}

impl Shared {
    fn is_current(&self, job: &GenerationJob) -> bool {
        self.slots
            .lock()
            .get(&job.coord)
            .is_some_and(|slot| slot.holds_ticket(job.ticket))
    }

    fn complete(&self, job: &GenerationJob, result: ProcResult<Chunk>) {
        let mut slots = self.slots.lock();
        let current = slots
            .get(&job.coord)
            .is_some_and(|slot| slot.holds_ticket(job.ticket));

        if current {
            match result {
                Ok(chunk) => {
                    slots.insert(job.coord, Slot::Ready(Arc::new(chunk)));
                    self.counters.generated.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    tracing::warn!(coord = %job.coord, %err, "chunk generation failed");
                    slots.insert(job.coord, Slot::Failed(err));
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        } else {
            tracing::debug!(coord = %job.coord, "discarding result for evicted chunk");
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        }

        drop(slots);
        self.settled.notify_all();
    }

    /// Removes pending slots that still hold the given jobs' tickets.
    fn rollback(&self, jobs: &[GenerationJob]) {
        let mut slots = self.slots.lock();
        for job in jobs {
            if slots
                .get(&job.coord)
                .is_some_and(|slot| slot.holds_ticket(job.ticket))
            {
                slots.remove(&job.coord);
            }
        }
        drop(slots);
        self.settled.notify_all();
    }
}

/// Snapshot of manager activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Coordinates currently tracked.
    pub tracked: usize,
    /// Tracked coordinates waiting for generation.
    pub pending: usize,
    /// Tracked coordinates with a finished chunk.
    pub ready: usize,
    /// Tracked coordinates whose generation failed.
    pub failed: usize,
    /// Jobs handed to the worker pool.
    pub submitted: u64,
    /// Jobs whose chunk was stored.
    pub generated: u64,
    /// Jobs that failed and left a failed slot.
    pub generation_failures: u64,
    /// Finished jobs whose coordinate was no longer waiting for them.
    pub discarded: u64,
    /// Queued jobs dropped before starting because their slot was gone.
    pub skipped: u64,
    /// Requests rolled back because the queue was full.
    pub deferred: u64,
    /// Slots removed by eviction.
    pub evicted: u64,
}

/// Outcome of one [`WorldManager::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateReport {
    /// Chunk containing the focal point.
    pub center: ChunkCoord,
    /// Jobs submitted by this update.
    pub submitted: usize,
    /// Slots evicted, if an eviction sweep ran.
    pub evicted: Option<usize>,
}

/// A chunk together with its six face neighbours, indexed by
/// `Direction as usize`.
pub type Neighborhood = (Arc<Chunk>, [Option<Arc<Chunk>>; 6]);

/// Asynchronous chunk lifecycle manager.
pub struct WorldManager {
    config: WorldConfig,
    shared: Arc<Shared>,
    sender: Mutex<Option<Sender<GenerationJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: AtomicBool,
    next_ticket: AtomicU64,
    last_eviction: Mutex<Option<Instant>>,
}

impl WorldManager {
    /// Creates a manager generating terrain from `config` and `catalog`.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, a catalog without the terrain types,
    /// or if a worker thread cannot be spawned.
    pub fn new(config: WorldConfig, catalog: &VoxelCatalog) -> ProcResult<Self> {
        config.validate()?;
        let generator = TerrainGenerator::new(config.world_seed(), catalog, config.terrain.clone())?;
        Self::with_source(config, Arc::new(generator))
    }

    /// Creates a manager around any chunk source.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or if a worker cannot be spawned.
    pub fn with_source(config: WorldConfig, source: Arc<dyn ChunkSource>) -> ProcResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            slots: Mutex::new(HashMap::new()),
            settled: Condvar::new(),
            counters: Counters::default(),
        });
        let (sender, receiver) = bounded(config.queue_capacity);

        let worker_count = config.worker_count();
        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let receiver = receiver.clone();
            let source = Arc::clone(&source);
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("chunk-gen-{index}"))
                .spawn(move || worker_loop(&receiver, source.as_ref(), &shared))
                .map_err(|e| ProcError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }

        tracing::info!(
            workers = worker_count,
            load_radius = config.load_radius,
            visibility_radius = config.visibility_radius,
            seed = config.seed,
            "world manager started"
        );

        Ok(Self {
            config,
            shared,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            shutdown: AtomicBool::new(false),
            next_ticket: AtomicU64::new(0),
            last_eviction: Mutex::new(None),
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Ensures every coordinate within `radius` of `center` is tracked,
    /// queueing generation for the ones that were not. Nearest first.
    ///
    /// Returns the number of jobs submitted. Coordinates that did not fit in
    /// the queue are left untracked and picked up by a later request.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ShutDown`] after [`WorldManager::shutdown`] and
    /// [`ProcError::RadiusTooLarge`] above [`MAX_LOAD_RADIUS`].
    pub fn request_chunks_in_radius(&self, center: ChunkCoord, radius: u32) -> ProcResult<usize> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(ProcError::ShutDown);
        }
        if radius > MAX_LOAD_RADIUS {
            return Err(ProcError::RadiusTooLarge {
                radius,
                max: MAX_LOAD_RADIUS,
            });
        }

        let coords = ChunkCoord::sorted_near_to_far(center, radius);
        let mut jobs = Vec::new();
        {
            let mut slots = self.shared.slots.lock();
            for coord in coords {
                if let Entry::Vacant(entry) = slots.entry(coord) {
                    let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                    entry.insert(Slot::Pending { ticket });
                    jobs.push(GenerationJob { coord, ticket });
                }
            }
        }

        if jobs.is_empty() {
            return Ok(0);
        }
        self.dispatch(jobs)
    }

    fn dispatch(&self, jobs: Vec<GenerationJob>) -> ProcResult<usize> {
        let sender_guard = self.sender.lock();
        let Some(sender) = sender_guard.as_ref() else {
            self.shared.rollback(&jobs);
            return Err(ProcError::ShutDown);
        };

        let mut submitted = 0usize;
        let mut rejected = Vec::new();
        let mut disconnected = false;
        for job in jobs {
            match sender.try_send(job) {
                Ok(()) => submitted += 1,
                Err(TrySendError::Full(job)) => rejected.push(job),
                Err(TrySendError::Disconnected(job)) => {
                    disconnected = true;
                    rejected.push(job);
                }
            }
        }
        drop(sender_guard);

        let counters = &self.shared.counters;
        counters.submitted.fetch_add(submitted as u64, Ordering::Relaxed);

        if !rejected.is_empty() {
            self.shared.rollback(&rejected);
            if disconnected {
                return Err(ProcError::ShutDown);
            }
            counters.deferred.fetch_add(rejected.len() as u64, Ordering::Relaxed);
            tracing::warn!(
                deferred = rejected.len(),
                capacity = self.config.queue_capacity,
                "generation queue full, deferring chunk requests"
            );
        }

        tracing::debug!(submitted, "chunk generation requested");
        Ok(submitted)
    }

    /// The chunk at `coord` if its generation has finished.
    ///
    /// Never waits for generation.
    #[must_use]
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        match self.shared.slots.lock().get(&coord) {
            Some(Slot::Ready(chunk)) => Some(Arc::clone(chunk)),
            _ => None,
        }
    }

    /// Lifecycle state of `coord`.
    #[must_use]
    pub fn chunk_state(&self, coord: ChunkCoord) -> ChunkState {
        match self.shared.slots.lock().get(&coord) {
            None => ChunkState::Absent,
            Some(Slot::Pending { .. }) => ChunkState::Pending,
            Some(Slot::Ready(chunk)) => ChunkState::Ready(Arc::clone(chunk)),
            Some(Slot::Failed(err)) => ChunkState::Failed(err.clone()),
        }
    }

    /// Stops tracking every coordinate farther than `radius` from `center`
    /// on any axis. In-flight jobs for those coordinates run to completion
    /// and their results are discarded.
    ///
    /// Returns the number of slots removed.
    pub fn evict_beyond(&self, center: ChunkCoord, radius: u32) -> usize {
        let mut slots = self.shared.slots.lock();
        let before = slots.len();
        slots.retain(|coord, _| coord.within_radius(center, radius));
        let evicted = before - slots.len();
        drop(slots);

        self.shared.settled.notify_all();
        self.shared
            .counters
            .evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
        tracing::debug!(%center, radius, evicted, "evicted distant chunks");
        evicted
    }

    /// Per-tick entry point: requests the load radius around the chunk
    /// containing `focal`, and sweeps distant chunks once per eviction
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ShutDown`] after [`WorldManager::shutdown`].
    pub fn update(&self, focal: [f64; 3]) -> ProcResult<UpdateReport> {
        let center = ChunkCoord::containing(focal);

        let sweep_due = {
            let mut last = self.last_eviction.lock();
            let due = last.map_or(true, |at| at.elapsed() >= self.config.eviction_interval());
            if due {
                *last = Some(Instant::now());
            }
            due
        };
        let evicted = sweep_due.then(|| self.evict_beyond(center, self.config.load_radius));

        let submitted = self.request_chunks_in_radius(center, self.config.load_radius)?;
        Ok(UpdateReport {
            center,
            submitted,
            evicted,
        })
    }

    /// Coordinates a renderer needs around `center`, nearest first.
    #[must_use]
    pub fn coords_for_visibility(center: ChunkCoord, radius: u32) -> Vec<ChunkCoord> {
        ChunkCoord::sorted_near_to_far(center, radius)
    }

    /// Ready chunks within the visibility radius of `center`, nearest first.
    #[must_use]
    pub fn visible_chunks(&self, center: ChunkCoord) -> Vec<(ChunkCoord, Arc<Chunk>)> {
        let coords = Self::coords_for_visibility(center, self.config.visibility_radius);
        let slots = self.shared.slots.lock();
        coords
            .into_iter()
            .filter_map(|coord| match slots.get(&coord) {
                Some(Slot::Ready(chunk)) => Some((coord, Arc::clone(chunk))),
                _ => None,
            })
            .collect()
    }

    /// The ready chunk at `coord` and whichever face neighbours are ready.
    #[must_use]
    pub fn neighborhood(&self, coord: ChunkCoord) -> Option<Neighborhood> {
        let slots = self.shared.slots.lock();
        let ready = |at: ChunkCoord| match slots.get(&at) {
            Some(Slot::Ready(chunk)) => Some(Arc::clone(chunk)),
            _ => None,
        };
        let center = ready(coord)?;
        let neighbors = Direction::ALL.map(|dir| ready(coord.neighbor(dir)));
        Some((center, neighbors))
    }

    /// Voxel at a world position, or `None` if its chunk is not ready.
    #[must_use]
    pub fn voxel_at(&self, world: [i32; 3]) -> Option<VoxelTypeId> {
        let (coord, local) = split_world_pos(world);
        self.get_chunk(coord).map(|chunk| chunk.get_local(local))
    }

    /// Blocks until no slot is pending or `timeout` passes.
    ///
    /// Returns true if the table went idle. Meant for tools and tests; the
    /// update loop should poll instead.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slots = self.shared.slots.lock();
        loop {
            if !slots.values().any(Slot::is_pending) {
                return true;
            }
            if self.shared.settled.wait_until(&mut slots, deadline).timed_out() {
                return !slots.values().any(Slot::is_pending);
            }
        }
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        {
            let slots = self.shared.slots.lock();
            stats.tracked = slots.len();
            for slot in slots.values() {
                match slot {
                    Slot::Pending { .. } => stats.pending += 1,
                    Slot::Ready(_) => stats.ready += 1,
                    Slot::Failed(_) => stats.failed += 1,
                }
            }
        }

        let counters = &self.shared.counters;
        stats.submitted = counters.submitted.load(Ordering::Relaxed);
        stats.generated = counters.generated.load(Ordering::Relaxed);
        stats.generation_failures = counters.failed.load(Ordering::Relaxed);
        stats.discarded = counters.discarded.load(Ordering::Relaxed);
        stats.skipped = counters.skipped.load(Ordering::Relaxed);
        stats.deferred = counters.deferred.load(Ordering::Relaxed);
        stats.evicted = counters.evicted.load(Ordering::Relaxed);
        stats
    }

    /// True once [`WorldManager::shutdown`] has run.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Stops accepting requests and drains the worker pool.
    ///
    /// Queued jobs that have not started are abandoned and their pending
    /// slots removed; running jobs finish and are discarded. Ready chunks
    /// stay readable. Idempotent.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        let abandoned = {
            let mut slots = self.shared.slots.lock();
            let before = slots.len();
            slots.retain(|_, slot| !slot.is_pending());
            before - slots.len()
        };

        // Disconnecting the queue ends each worker loop once it is drained.
        self.sender.lock().take();
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if handle.join().is_err() {
                tracing::warn!("chunk generation worker panicked");
            }
        }
        self.shared.settled.notify_all();

        let stats = self.stats();
        tracing::info!(
            abandoned,
            generated = stats.generated,
            discarded = stats.discarded,
            ready = stats.ready,
            "world manager shut down"
        );
    }
}

impl Drop for WorldManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker thread main loop. Returns when the queue is disconnected and empty.
///
/// A panicking source fails only its own coordinate; the worker keeps
/// serving the queue.
fn worker_loop(receiver: &Receiver<GenerationJob>, source: &dyn ChunkSource, shared: &Shared) {
    for job in receiver.iter() {
        if !shared.is_current(&job) {
            shared.counters.skipped.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        let result = panic::catch_unwind(AssertUnwindSafe(|| source.generate(job.coord)))
            .unwrap_or_else(|_| {
                tracing::warn!(coord = %job.coord, "chunk source panicked");
                Err(ProcError::GenerationPanicked(job.coord))
            });
        shared.complete(&job, result);
    }
}
