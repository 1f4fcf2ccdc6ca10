use crate::{cache, protocol::Protocol, snoop_filter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid cache geometry")]
    Cache(#[from] cache::config::Error),
    #[error("invalid snoop filter geometry")]
    SnoopFilter(#[source] cache::config::Error),
    #[error("at least one processor is required")]
    NoProcessors,
}

/// Simulator configuration.
///
/// All caches share the same geometry and protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache: cache::Config,
    pub num_processors: usize,
    pub protocol: Protocol,
    /// Geometry of the per-cache snoop filter.
    ///
    /// Only used with [`Protocol::MESI_SNOOP_FILTER`].
    pub snoop_filter: cache::Config,
}

impl Config {
    pub fn new(
        cache_size: usize,
        associativity: usize,
        block_size: u32,
        num_processors: usize,
        protocol: Protocol,
    ) -> Result<Self, Error> {
        if num_processors == 0 {
            return Err(Error::NoProcessors);
        }
        let cache = cache::Config::new(cache_size, associativity, block_size)?;
        let snoop_filter = snoop_filter::default_config().map_err(Error::SnoopFilter)?;
        Ok(Self {
            cache,
            num_processors,
            protocol,
            snoop_filter,
        })
    }

    #[must_use]
    pub fn with_snoop_filter(mut self, snoop_filter: cache::Config) -> Self {
        self.snoop_filter = snoop_filter;
        self
    }
}
