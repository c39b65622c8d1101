//! Kernel dispatch.
//!
//! A [`Dispatcher`] runs a per-cell function over a grid of square thread
//! groups and returns only once every cell is written, which gives the
//! pipeline its barrier between passes. [`SerialDispatcher`] walks the tiles
//! in order; [`ParallelDispatcher`] (feature `parallel`) spreads bands of tile
//! rows across a dedicated Rayon pool.

use crate::kernel::{Kernel, WORKGROUP_SIZE};

#[cfg(feature = "parallel")]
use core::sync::atomic::{AtomicUsize, Ordering};
#[cfg(feature = "parallel")]
use std::sync::OnceLock;

/// Number of thread groups along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groups {
    pub x: usize,
    pub y: usize,
}

impl Groups {
    /// Groups needed to cover a `width` x `height` grid with tiles of
    /// `group_size`. Both dimensions must be multiples of the tile size.
    pub fn covering(width: usize, height: usize, group_size: usize) -> Self {
        debug_assert!(width % group_size == 0 && height % group_size == 0);
        Self {
            x: width / group_size,
            y: height / group_size,
        }
    }
}

/// Capability to execute a kernel over a tiled 2D grid.
///
/// `dst` is laid out row-major with `width` cells per row and must hold the
/// whole grid covered by `groups`. `cell(x, y)` is evaluated exactly once per
/// cell and its result stored at `dst[y * width + x]`. Cells carry no ordering
/// guarantee relative to each other.
pub trait Dispatcher {
    /// Edge length of one thread group; must equal [`WORKGROUP_SIZE`].
    fn group_size(&self) -> usize;

    fn dispatch<T, F>(&self, kernel: Kernel, groups: Groups, width: usize, dst: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync;
}

/// Executes every tile of a dispatch serially on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialDispatcher;

impl Dispatcher for SerialDispatcher {
    fn group_size(&self) -> usize {
        WORKGROUP_SIZE
    }

    fn dispatch<T, F>(&self, kernel: Kernel, groups: Groups, width: usize, dst: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync,
    {
        let g = WORKGROUP_SIZE;
        debug_assert!(dst.len() >= groups.y * g * width && width >= groups.x * g);
        vlog!(
            trace,
            "dispatch {} over {}x{} groups (serial)",
            kernel.name(),
            groups.x,
            groups.y
        );
        for gy in 0..groups.y {
            for gx in 0..groups.x {
                for y in gy * g..(gy + 1) * g {
                    let row = &mut dst[y * width..(y + 1) * width];
                    for x in gx * g..(gx + 1) * g {
                        row[x] = cell(x, y);
                    }
                }
            }
        }
    }
}

/// Override for the parallel dispatcher thread count. `0` means no override.
#[cfg(feature = "parallel")]
static PARALLEL_THREAD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);

#[cfg(feature = "parallel")]
static PARALLEL_ENV_THREADS: OnceLock<usize> = OnceLock::new();

#[cfg(feature = "parallel")]
/// Override the number of threads new [`ParallelDispatcher`]s start with.
///
/// Passing `0` reverts to the `TILEFFT_THREADS` environment variable, or the
/// number of logical CPUs when that is unset.
pub fn set_parallel_threads(threads: usize) {
    PARALLEL_THREAD_OVERRIDE.store(threads, Ordering::Relaxed);
}

#[cfg(feature = "parallel")]
/// Thread count a new [`ParallelDispatcher`] would use.
pub fn parallel_threads() -> usize {
    let override_thr = PARALLEL_THREAD_OVERRIDE.load(Ordering::Relaxed);
    if override_thr != 0 {
        return override_thr;
    }
    *PARALLEL_ENV_THREADS.get_or_init(|| {
        std::env::var("TILEFFT_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| num_cpus::get().max(1))
    })
}

#[cfg(feature = "parallel")]
/// Executes bands of tile rows on a dedicated Rayon thread pool.
///
/// Requires the `parallel` feature, which enables the
/// [`rayon`](https://crates.io/crates/rayon) dependency.
pub struct ParallelDispatcher {
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl ParallelDispatcher {
    /// Build a dispatcher sized by [`parallel_threads`].
    pub fn new() -> Result<Self, rayon::ThreadPoolBuildError> {
        Self::with_threads(parallel_threads())
    }

    pub fn with_threads(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| std::format!("tilefft-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

#[cfg(feature = "parallel")]
impl Dispatcher for ParallelDispatcher {
    fn group_size(&self) -> usize {
        WORKGROUP_SIZE
    }

    fn dispatch<T, F>(&self, kernel: Kernel, groups: Groups, width: usize, dst: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync,
    {
        use rayon::prelude::*;
        let g = WORKGROUP_SIZE;
        debug_assert!(dst.len() >= groups.y * g * width && width >= groups.x * g);
        vlog!(
            trace,
            "dispatch {} over {}x{} groups on {} threads",
            kernel.name(),
            groups.x,
            groups.y,
            self.pool.current_num_threads()
        );
        let cols = groups.x * g;
        self.pool.install(|| {
            dst[..groups.y * g * width]
                .par_chunks_mut(g * width)
                .enumerate()
                .for_each(|(gy, band)| {
                    for (ly, row) in band.chunks_mut(width).enumerate() {
                        let y = gy * g + ly;
                        for (x, out) in row[..cols].iter_mut().enumerate() {
                            *out = cell(x, y);
                        }
                    }
                });
        });
    }
}
