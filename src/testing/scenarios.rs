use super::simulate;
use crate::{cache::State, protocol::Protocol};
use color_eyre::eyre;
use stats::cache::Counter;

#[test]
fn mesi_private_read_then_write() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI, 1, "0 r 0\n")?;
    assert_eq!(sim.cache(0).unwrap().state_of(0x0), State::EXCLUSIVE);

    let sim = simulate(Protocol::MESI, 1, "0 r 0\n0 w 0\n")?;
    let cache = sim.cache(0).unwrap();
    assert_eq!(cache.state_of(0x0), State::MODIFIED);

    let stats = cache.stats();
    assert_eq!(stats.get(Counter::READS), 1);
    assert_eq!(stats.get(Counter::WRITES), 1);
    assert_eq!(stats.get(Counter::READ_MISSES), 1);
    assert_eq!(stats.get(Counter::WRITE_MISSES), 0);
    // the write hit is silent
    assert_eq!(stats.get(Counter::BUS_UPGRADE), 0);
    assert_eq!(stats.get(Counter::BUS_READ_EXCLUSIVE), 0);
    assert_eq!(stats.get(Counter::MEMORY_TRANSACTIONS), 1);
    Ok(())
}

#[test]
fn msi_write_invalidates_sharer() -> eyre::Result<()> {
    let sim = simulate(Protocol::MSI, 2, "0 r 40\n1 r 40\n0 w 40\n")?;
    assert_eq!(sim.cache(0).unwrap().state_of(0x40), State::MODIFIED);
    assert_eq!(sim.cache(1).unwrap().state_of(0x40), State::INVALID);

    let stats = sim.stats();
    assert_eq!(stats.caches[&0].get(Counter::BUS_READ_EXCLUSIVE), 1);
    assert_eq!(stats.caches[&0].get(Counter::BUS_UPGRADE), 0);
    assert_eq!(stats.caches[&1].get(Counter::INVALIDATIONS), 1);
    Ok(())
}

#[test]
fn msi_bus_upgrade_write_invalidates_sharer() -> eyre::Result<()> {
    let sim = simulate(Protocol::MSI_BUS_UPGRADE, 2, "0 r 40\n1 r 40\n0 w 40\n")?;
    assert_eq!(sim.cache(0).unwrap().state_of(0x40), State::MODIFIED);
    assert_eq!(sim.cache(1).unwrap().state_of(0x40), State::INVALID);

    let stats = sim.stats();
    assert_eq!(stats.caches[&0].get(Counter::BUS_READ_EXCLUSIVE), 0);
    assert_eq!(stats.caches[&0].get(Counter::BUS_UPGRADE), 1);
    // both read misses fetched from memory, the upgrade did not
    assert_eq!(stats.caches[&0].get(Counter::MEMORY_TRANSACTIONS), 1);
    assert_eq!(stats.caches[&1].get(Counter::INVALIDATIONS), 1);
    Ok(())
}

#[test]
fn mesi_modified_line_supplies_reader() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI, 2, "0 w 80\n1 r 80\n")?;
    assert_eq!(sim.cache(0).unwrap().state_of(0x80), State::SHARED);
    assert_eq!(sim.cache(1).unwrap().state_of(0x80), State::SHARED);

    let stats = sim.stats();
    let owner = &stats.caches[&0];
    assert_eq!(owner.get(Counter::INTERVENTIONS), 1);
    assert_eq!(owner.get(Counter::FLUSHES), 1);
    assert_eq!(owner.get(Counter::WRITEBACKS), 1);
    // one fetch for the write miss, one for the flush
    assert_eq!(owner.get(Counter::MEMORY_TRANSACTIONS), 2);

    let reader = &stats.caches[&1];
    assert_eq!(reader.get(Counter::CACHE_TO_CACHE_TRANSFERS), 1);
    assert_eq!(reader.get(Counter::MEMORY_TRANSACTIONS), 0);
    Ok(())
}

#[test]
fn snoop_filter_wasted_lookup() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI_SNOOP_FILTER, 2, "0 r 1000\n")?;
    let stats = sim.stats();
    let filter = stats.caches[&1].snoop_filter.unwrap();
    assert_eq!(filter.wasted, 1);
    assert_eq!(filter.useful, 0);
    assert_eq!(filter.filtered, 0);

    // the owner never snoops its own requests
    assert_eq!(stats.caches[&0].snoop_filter.unwrap().total(), 0);
    Ok(())
}

#[test]
fn snoop_filter_useful_lookup() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI_SNOOP_FILTER, 2, "0 r 1000\n1 r 1000\n")?;
    let stats = sim.stats();
    let filter = stats.caches[&0].snoop_filter.unwrap();
    assert_eq!((filter.useful, filter.wasted, filter.filtered), (1, 0, 0));
    Ok(())
}

#[test]
fn unknown_processor_is_skipped() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI, 2, "0 r 40\n5 w 40\n1 r 80\n")?;
    let stats = sim.stats();
    assert_eq!(stats.sim.events, 2);
    assert_eq!(stats.sim.skipped_events, 1);
    assert_eq!(stats.caches.total_accesses(), 2);
    assert_eq!(sim.cache(0).unwrap().state_of(0x40), State::EXCLUSIVE);
    Ok(())
}

#[test]
fn moesi_counts_accesses_only() -> eyre::Result<()> {
    let sim = simulate(Protocol::MOESI, 2, "0 r 40\n1 w 40\n0 w 40\n")?;
    let stats = sim.stats();
    let reduced = stats.caches.reduce();
    assert_eq!(reduced.get(Counter::READS), 1);
    assert_eq!(reduced.get(Counter::WRITES), 2);
    assert_eq!(reduced.total_misses(), 0);
    assert_eq!(reduced.get(Counter::MEMORY_TRANSACTIONS), 0);
    Ok(())
}

#[test]
fn miss_rate_from_raw_counters() -> eyre::Result<()> {
    let sim = simulate(Protocol::MESI, 1, "0 r 0\n0 r 400\n0 r 0\n")?;
    let stats = sim.cache(0).unwrap().stats();
    // 0x0 and 0x400 share a set, every access misses
    assert_eq!(stats.total_misses(), 3);
    assert_eq!(stats.miss_rate(), 100.0);

    let sim = simulate(Protocol::MESI, 1, "0 r 0\n0 r 4\n0 w 8\n0 r c\n")?;
    assert_eq!(sim.cache(0).unwrap().stats().miss_rate(), 25.0);
    Ok(())
}
