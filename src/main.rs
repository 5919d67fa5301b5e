#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

use dram_migration_core::*;

const TOP_CACHE_CAPACITY: usize = 4;

pub fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    debug!("clock_ratio={} (unused by the translation/migration core)", cli.clock_ratio);

    let org = config::load_dram_organization(&cli.dram_config)?;
    let decoder = Decoder::setup(&org, cli.scheme.into())?;

    let page_size_bytes = cli.pagesize_kb * 1024;
    let offset_bits = bits::log2_floor(page_size_bytes);
    let num_channels = org.num_channels();
    let total_pages = cli.max_addr / page_size_bytes;
    let pages_per_channel = total_pages / num_channels;

    let migration = MigrationParams {
        window_size: cli.window_size,
        hot_page_threshold: cli.hot_page_threshold,
        cooldown_windows: cli.cooldown_windows,
        future_access_multiplier: 1,
        migration_cost_us: MigrationParams::migration_cost_us(page_size_bytes, cli.bandwidth_gbps),
    };

    let mut engine = Engine::new(
        decoder,
        EngineParams {
            offset_bits,
            num_channels,
            pages_per_channel,
            migration,
            seed: cli.seed,
            top_cache_capacity: TOP_CACHE_CAPACITY,
        },
    );

    let mut trace = Trace::load(&cli.path)?;
    info!("loaded {} trace entries from {:?}", trace.len(), cli.path);

    while !trace.is_finished() {
        let mut req = trace.current().expect("not finished implies a current entry");
        engine.dispatch(&mut req);
        trace.advance();
    }

    let stats = engine.stats();
    info!("{stats}");
    println!("{stats}");
    Ok(())
}
