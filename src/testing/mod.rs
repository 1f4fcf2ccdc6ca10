pub mod invariants;
pub mod scenarios;

use crate::{config::Config, protocol::Protocol, sim::Simulator, trace};
use color_eyre::eyre;

static LOGGER: std::sync::Once = std::sync::Once::new();

pub fn init_logging() {
    LOGGER.call_once(|| {
        env_logger::builder().is_test(true).init();
    });
}

/// Run a textual trace on caches of 1024 bytes, direct mapped, 64 byte lines.
pub fn simulate(protocol: Protocol, num_processors: usize, trace: &str) -> eyre::Result<Simulator> {
    init_logging();
    let config = Config::new(1024, 1, 64, num_processors, protocol)?;
    let mut reader = trace::Reader::new(std::io::Cursor::new(trace));
    let mut sim = Simulator::new(config);
    sim.run(reader.by_ref());
    if let Some(err) = reader.error() {
        eyre::bail!("bad test trace: {err}");
    }
    Ok(sim)
}

/// Deterministic pseudo random trace mixing private and shared blocks.
#[must_use]
pub fn synthetic_trace(num_processors: usize, len: usize, seed: u64) -> Vec<trace::Event> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let processor = (state % num_processors as u64) as usize;
            let block = (state >> 8) % 48;
            let addr = block * 0x40 + ((state >> 20) & 0x3f);
            if (state >> 32) % 4 == 0 {
                trace::Event::write(processor, addr)
            } else {
                trace::Event::read(processor, addr)
            }
        })
        .collect()
}
