use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use namedb_core::config::NamedbConfig;
use namedb_core::telemetry::init_tracing_with;

mod client;
mod commands;

fn main() {
    let cli = client::Cli::parse();

    if let Err(e) = try_main(cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn try_main(cli: client::Cli) -> Result<()> {
    // 统一从 namedb.toml 加载配置，命令行 --db 优先
    let mut cfg = NamedbConfig::load_config(cli.config.as_deref())
        .context("failed to load namedb configuration")?;
    if let Some(db) = &cli.db {
        cfg.db_file = db.clone();
    }

    init_tracing_with(&cfg.telemetry.to_log_config());

    client::run(cli, &cfg)
}
