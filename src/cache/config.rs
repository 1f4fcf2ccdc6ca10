/// Invalid cache geometry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{what} must be a non-zero power of two (got {value})")]
    NotPowerOfTwo { what: &'static str, value: usize },
    #[error(
        "cache size {size} is not divisible into {associativity}-way sets of {line_size} byte lines"
    )]
    Indivisible {
        size: usize,
        line_size: u32,
        associativity: usize,
    },
}

/// Geometry of a set-associative store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Total size in bytes.
    pub size: usize,

    /// Cache line size in bytes.
    pub line_size: u32,

    /// Cache associativity.
    pub associativity: usize,

    /// Number of sets.
    pub num_sets: usize,

    /// Number of lines.
    pub total_lines: usize,
    pub line_size_log2: u32,
    pub num_sets_log2: u32,
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let size = human_bytes::human_bytes(self.size as f64);
        write!(
            f,
            "{size} ({} set, {}-way, {} byte line)",
            self.num_sets, self.associativity, self.line_size
        )
    }
}

fn check_power_of_two(what: &'static str, value: usize) -> Result<(), Error> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(Error::NotPowerOfTwo { what, value })
    }
}

impl Config {
    /// Derive the store geometry from size, associativity and line size.
    ///
    /// `size` must equal `num_sets * associativity * line_size` exactly, with
    /// power of two line size and set count.
    pub fn new(size: usize, associativity: usize, line_size: u32) -> Result<Self, Error> {
        check_power_of_two("line size", line_size as usize)?;
        if associativity == 0 {
            return Err(Error::NotPowerOfTwo {
                what: "associativity",
                value: associativity,
            });
        }
        let indivisible = || Error::Indivisible {
            size,
            line_size,
            associativity,
        };
        let line_size_bytes = line_size as usize;
        if size == 0 || size % line_size_bytes != 0 {
            return Err(indivisible());
        }
        let total_lines = size / line_size_bytes;
        if total_lines % associativity != 0 {
            return Err(indivisible());
        }
        let num_sets = total_lines / associativity;
        check_power_of_two("number of sets", num_sets)?;

        Ok(Self {
            size,
            line_size,
            associativity,
            num_sets,
            total_lines,
            line_size_log2: line_size.ilog2(),
            num_sets_log2: num_sets.ilog2(),
        })
    }

    /// Direct mapped geometry with the given number of sets.
    pub fn direct_mapped(num_sets: usize, line_size: u32) -> Result<Self, Error> {
        Self::new(num_sets * line_size as usize, 1, line_size)
    }

    #[inline]
    #[must_use]
    pub fn set_index_mask(&self) -> u64 {
        (1u64 << self.num_sets_log2) - 1
    }
}
