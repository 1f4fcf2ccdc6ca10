//! Textual and machine readable simulation reports.

use crate::config::Config;
use stats::cache::Counter;
use std::io::Write;
use std::path::Path;

/// Format `value` with `precision` significant digits like `printf("%g")`.
///
/// Trailing zeros are dropped, very small or large values use scientific
/// notation.
#[must_use]
pub fn format_significant(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(num: &str) -> &str {
    if num.contains('.') {
        num.trim_end_matches('0').trim_end_matches('.')
    } else {
        num
    }
}

/// Print the configuration banner.
pub fn write_config(mut w: impl Write, config: &Config, trace_file: &Path) -> std::io::Result<()> {
    writeln!(w, "===== 506 Coherence Simulator Configuration =====")?;
    writeln!(w, "L1_SIZE: {}", config.cache.size)?;
    writeln!(w, "L1_ASSOC: {}", config.cache.associativity)?;
    writeln!(w, "L1_BLOCKSIZE: {}", config.cache.line_size)?;
    writeln!(w, "NUMBER OF PROCESSORS: {}", config.num_processors)?;
    writeln!(w, "COHERENCE PROTOCOL: {}", config.protocol)?;
    writeln!(w, "TRACE FILE: {}", trace_file.display())?;
    Ok(())
}

/// Print the statistics of a single cache.
///
/// Snoop filter lookups are only listed for caches that run a filter.
pub fn write_cache(mut w: impl Write, id: usize, stats: &stats::Cache) -> std::io::Result<()> {
    writeln!(w, "============ Simulation results (Cache {id}) ============")?;
    writeln!(w, "01. number of reads: {}", stats.get(Counter::READS))?;
    writeln!(w, "02. number of read misses: {}", stats.get(Counter::READ_MISSES))?;
    writeln!(w, "03. number of writes: {}", stats.get(Counter::WRITES))?;
    writeln!(w, "04. number of write misses: {}", stats.get(Counter::WRITE_MISSES))?;
    writeln!(
        w,
        "05. total miss rate: {}%",
        format_significant(stats.miss_rate(), 3)
    )?;
    writeln!(w, "06. number of writebacks: {}", stats.get(Counter::WRITEBACKS))?;
    writeln!(
        w,
        "07. number of cache-to-cache transfers: {}",
        stats.get(Counter::CACHE_TO_CACHE_TRANSFERS)
    )?;
    writeln!(
        w,
        "08. number of memory transactions: {}",
        stats.get(Counter::MEMORY_TRANSACTIONS)
    )?;
    writeln!(w, "09. number of interventions: {}", stats.get(Counter::INTERVENTIONS))?;
    writeln!(w, "10. number of invalidations: {}", stats.get(Counter::INVALIDATIONS))?;
    writeln!(w, "11. number of flushes: {}", stats.get(Counter::FLUSHES))?;
    writeln!(w, "12. number of BusRdX: {}", stats.get(Counter::BUS_READ_EXCLUSIVE))?;
    writeln!(w, "13. number of BusUpgr: {}", stats.get(Counter::BUS_UPGRADE))?;
    if let Some(filter) = &stats.snoop_filter {
        writeln!(w, "14. number of useful snoops: {}", filter.useful)?;
        writeln!(w, "15. number of wasted snoops: {}", filter.wasted)?;
        writeln!(w, "16. number of filtered snoops: {}", filter.filtered)?;
    }
    Ok(())
}

/// Print the statistics of all caches in id order.
pub fn write_report(mut w: impl Write, stats: &stats::Stats) -> std::io::Result<()> {
    for (id, cache) in stats.ordered() {
        write_cache(&mut w, id, cache)?;
    }
    Ok(())
}

/// Write one `cache_id,counter,value` row per counter.
pub fn write_csv(w: impl Write, stats: &stats::Stats) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(w);
    for row in stats.caches.flatten() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(w: impl Write, stats: &stats::Stats) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(w, stats)
}
