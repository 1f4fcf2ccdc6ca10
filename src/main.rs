use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use console::style;
use smpcachesim::{config::Config, protocol::Protocol, report, sim::Simulator, trace};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
    about = "trace driven simulator of snooping cache coherence protocols",
)]
pub struct Options {
    #[clap(help = "cache size in bytes")]
    pub cache_size: usize,
    #[clap(help = "associativity (ways per set)")]
    pub associativity: usize,
    #[clap(help = "block size in bytes")]
    pub block_size: u32,
    #[clap(help = "number of processors")]
    pub num_processors: usize,
    #[clap(help = "coherence protocol (0=MSI, 1=MSI BusUpgr, 2=MESI, 3=MESI Filter)")]
    pub protocol: Protocol,
    #[clap(help = "trace file")]
    pub trace_file: PathBuf,

    #[clap(long = "stats-json", help = "write statistics as json")]
    pub stats_json: Option<PathBuf>,
    #[clap(long = "stats-csv", help = "write per-cache counters as csv")]
    pub stats_csv: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let start = std::time::Instant::now();
    let options = Options::parse();

    let config = Config::new(
        options.cache_size,
        options.associativity,
        options.block_size,
        options.num_processors,
        options.protocol,
    )
    .wrap_err("invalid configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_config(&mut out, &config, &options.trace_file)?;

    let trace = trace::open(&options.trace_file).wrap_err("trace file problem")?;
    let mut sim = Simulator::new(config);
    sim.run(trace);
    let stats = sim.stats();

    report::write_report(&mut out, &stats)?;
    out.flush()?;

    if let Some(path) = &options.stats_json {
        let writer = utils::fs::open_writable(path)?;
        report::write_json(writer, &stats)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = &options.stats_csv {
        let writer = utils::fs::open_writable(path)?;
        report::write_csv(writer, &stats)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    }

    if stats.sim.skipped_events > 0 {
        eprintln!(
            "{}",
            style(format!(
                "skipped {} event(s) for unknown processors",
                stats.sim.skipped_events
            ))
            .for_stderr()
            .yellow()
        );
    }
    log::info!("simulation done in {:?}", start.elapsed());
    Ok(())
}
