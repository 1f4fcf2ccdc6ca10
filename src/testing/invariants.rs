use super::{init_logging, synthetic_trace};
use crate::{cache::State, config::Config, protocol::Protocol, sim::Simulator};
use color_eyre::eyre;
use stats::cache::Counter;
use stats::mem::AccessKind;

const NUM_PROCESSORS: usize = 4;

fn simulator(protocol: Protocol) -> eyre::Result<Simulator> {
    init_logging();
    // 4 sets of 2 ways, small enough to force evictions
    let config = Config::new(512, 2, 64, NUM_PROCESSORS, protocol)?;
    Ok(Simulator::new(config))
}

/// After every event at most one cache may own a block, and an owner
/// excludes all other valid copies.
fn check_single_owner(protocol: Protocol, seed: u64) -> eyre::Result<()> {
    let mut sim = simulator(protocol)?;
    for event in synthetic_trace(NUM_PROCESSORS, 2_000, seed) {
        sim.process(&event);
        let states: Vec<State> = sim
            .caches()
            .iter()
            .map(|cache| cache.state_of(event.addr))
            .collect();
        let owners = states
            .iter()
            .filter(|state| matches!(state, State::MODIFIED | State::EXCLUSIVE))
            .count();
        let valid = states.iter().filter(|state| state.is_valid()).count();
        assert!(owners <= 1, "{protocol}: {event} left {states:?}");
        if owners == 1 {
            assert_eq!(valid, 1, "{protocol}: {event} left {states:?}");
        }
        if protocol.is_implemented() {
            let state = states[event.processor];
            match event.kind {
                AccessKind::READ => assert!(state.is_valid(), "{protocol}: {event}"),
                AccessKind::WRITE => assert_eq!(state, State::MODIFIED, "{protocol}: {event}"),
            }
        }
    }
    Ok(())
}

/// Accesses are counted on the issuing cache, misses never exceed accesses.
fn check_access_counts(protocol: Protocol, seed: u64) -> eyre::Result<()> {
    let trace = synthetic_trace(NUM_PROCESSORS, 2_000, seed);
    let mut sim = simulator(protocol)?;
    sim.run(trace.iter().copied());
    let stats = sim.stats();

    for (id, cache) in stats.ordered() {
        let reads = trace
            .iter()
            .filter(|e| e.processor == id && e.kind == AccessKind::READ)
            .count() as u64;
        let writes = trace
            .iter()
            .filter(|e| e.processor == id && e.kind == AccessKind::WRITE)
            .count() as u64;
        assert_eq!(cache.get(Counter::READS), reads, "{protocol}");
        assert_eq!(cache.get(Counter::WRITES), writes, "{protocol}");
        assert!(cache.get(Counter::READ_MISSES) <= reads);
        assert!(cache.get(Counter::WRITE_MISSES) <= writes);
        assert!(cache.get(Counter::WRITEBACKS) <= cache.get(Counter::MEMORY_TRANSACTIONS));

        let expected = if reads + writes == 0 {
            0.0
        } else {
            cache.total_misses() as f64 / (reads + writes) as f64 * 100.0
        };
        assert_eq!(cache.miss_rate(), expected, "{protocol}");
        assert_eq!(
            cache.snoop_filter.is_some(),
            protocol.has_snoop_filter(),
            "{protocol}"
        );
    }
    assert_eq!(stats.sim.events, trace.len() as u64);
    Ok(())
}

macro_rules! protocol_checks {
    ($($name:ident: $protocol:expr,)*) => {
        $(
            paste::paste! {
                #[test]
                fn [<single_owner_ $name>]() -> eyre::Result<()> {
                    for seed in [1, 7, 42] {
                        check_single_owner($protocol, seed)?;
                    }
                    Ok(())
                }

                #[test]
                fn [<access_counts_ $name>]() -> eyre::Result<()> {
                    for seed in [3, 11] {
                        check_access_counts($protocol, seed)?;
                    }
                    Ok(())
                }
            }
        )*
    }
}

protocol_checks! {
    msi: Protocol::MSI,
    msi_bus_upgrade: Protocol::MSI_BUS_UPGRADE,
    mesi: Protocol::MESI,
    mesi_snoop_filter: Protocol::MESI_SNOOP_FILTER,
    moesi: Protocol::MOESI,
}
