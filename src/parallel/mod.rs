//! Parallel simulation of independent runs.
//!
//! Every run is a complete single threaded simulation, only whole runs are
//! distributed over the thread pool.

use crate::{config::Config, sim::Simulator, trace::Event};
use color_eyre::eyre;
use rayon::prelude::*;

pub fn get_num_threads() -> Result<Option<usize>, std::num::ParseIntError> {
    let count = std::env::var("NUM_THREADS")
        .ok()
        .as_deref()
        .map(str::parse)
        .transpose()?;
    Ok(count)
}

pub fn rayon_pool(num_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
}

/// Simulate each `(config, trace)` pair.
///
/// Uses `NUM_THREADS` worker threads if set, one per physical core otherwise.
///
/// # Returns
/// The statistics of each run, in the order of `runs`.
pub fn simulate_all(runs: &[(Config, Vec<Event>)]) -> eyre::Result<Vec<stats::Stats>> {
    let num_threads = get_num_threads()?.unwrap_or_else(num_cpus::get_physical);
    log::info!(
        "simulating {} run(s) on {} thread(s)",
        runs.len(),
        num_threads
    );
    let stats = rayon_pool(num_threads)?.install(|| {
        runs.par_iter()
            .map(|(config, trace)| {
                let mut sim = Simulator::new(config.clone());
                sim.run(trace.iter().copied());
                sim.stats()
            })
            .collect()
    });
    Ok(stats)
}
