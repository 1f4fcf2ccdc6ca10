//! Trace driven simulation of a bus based multiprocessor.

use crate::{
    bus::Bus,
    cache::Cache,
    config::Config,
    trace::{self, Event},
};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Simulator {
    config: Config,
    caches: Vec<Cache>,
    bus: Bus,
    stats: stats::Sim,
}

impl Simulator {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let caches = (0..config.num_processors)
            .map(|id| {
                Cache::new(
                    id,
                    config.protocol,
                    config.cache.clone(),
                    &config.snoop_filter,
                )
            })
            .collect();
        log::debug!(
            "simulating {} x {} cache(s) [{}]",
            config.num_processors,
            config.cache,
            config.protocol
        );
        Self {
            bus: Bus::new(config.protocol),
            config,
            caches,
            stats: stats::Sim::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    #[must_use]
    pub fn cache(&self, id: usize) -> Option<&Cache> {
        self.caches.get(id)
    }

    /// Apply a single trace event.
    ///
    /// The access is issued to the processor's cache, and its bus request
    /// is resolved before returning.
    ///
    /// # Returns
    /// `false` if the event names a processor that does not exist.
    pub fn process(&mut self, event: &Event) -> bool {
        let Event {
            processor,
            kind,
            addr,
        } = *event;
        if processor >= self.caches.len() {
            log::warn!(
                "skipping trace event \"{}\": only {} processor(s) configured",
                event,
                self.caches.len()
            );
            self.stats.skipped_events += 1;
            return false;
        }

        let request = self.caches[processor].access(addr, kind);
        self.bus
            .transaction(&mut self.caches, processor, addr, kind, request);
        self.stats.events += 1;
        true
    }

    /// Run all events of `trace` in order.
    pub fn run(&mut self, trace: impl IntoIterator<Item = Event>) -> &mut Self {
        for event in trace {
            self.process(&event);
        }
        log::info!(
            "processed {} event(s), skipped {}",
            self.stats.events,
            self.stats.skipped_events
        );
        self
    }

    #[must_use]
    pub fn stats(&self) -> stats::Stats {
        let mut stats = stats::Stats::new(self.caches.len());
        stats.sim = self.stats.clone();
        for cache in &self.caches {
            stats.caches.insert(cache.id(), cache.stats());
        }
        stats
    }
}

/// Simulate the trace file at `path`.
pub fn simulate_trace(config: Config, path: impl AsRef<Path>) -> Result<stats::Stats, utils::fs::Error> {
    let trace = trace::open(path)?;
    let mut sim = Simulator::new(config);
    sim.run(trace);
    Ok(sim.stats())
}
