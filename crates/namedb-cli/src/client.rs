use crate::commands::list::{ListArgs, run_list};
use crate::commands::load::run_load;
use crate::commands::name::{PutArgs, RmArgs, TagsArgs, UntagArgs, run_put, run_rm, run_tags, run_untag};
use crate::commands::rand::{RandArgs, run_rand};
use anyhow::{Context, Result};
use clap::Parser;
use namedb_core::SqliteStore;
use namedb_core::config::NamedbConfig;
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "namedb",
    author,
    version,
    about,
    long_about = None,
    after_help = r#"Examples:
  # Tag some names
  namedb put alice red tall
  namedb put bob blue tall
  namedb untag bob tall

  # Inspect the database
  namedb list -t
  namedb tags alice bob

  # Pick random names: ',' is AND, '|' is OR
  namedb rand -t 'red,tall'
  namedb rand -n 5 -t 'red|blue' -t tall
  namedb rand -s -t blue | head -n 3

  # Bulk load alternating name/tag lines
  printf 'alice\nred\nbob\nblue\n' | namedb load -v"#
)]
pub struct Cli {
    /// Configuration file path (defaults to ./namedb.toml when present)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overrides `db_file` from the configuration
    #[arg(long, value_name = "DB_FILE")]
    pub db: Option<PathBuf>,

    /// Echo what each mutation stored
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Add a name and attach tags to it
    Put(PutArgs),
    /// Detach tags from a name
    Untag(UntagArgs),
    /// Delete a name and all of its tags
    Rm(RmArgs),
    /// List all names alphabetically
    List(ListArgs),
    /// Show the tags of one or more names
    Tags(TagsArgs),
    /// Pick random names matching tag filters
    Rand(RandArgs),
    /// Read alternating name/tag lines from stdin
    Load,
}

pub fn run(cli: Cli, cfg: &NamedbConfig) -> Result<()> {
    let store = SqliteStore::open(&cfg.db_file)
        .with_context(|| format!("failed to open database {}", cfg.db_file.display()))?;
    debug!(db = %cfg.db_file.display(), "Database ready");

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Put(args) => run_put(&store, args, verbose, &mut err)?,
        Commands::Untag(args) => run_untag(&store, args, verbose, &mut err)?,
        Commands::Rm(args) => run_rm(&store, args, verbose, &mut err)?,
        Commands::List(args) => run_list(&store, args, &mut out)?,
        Commands::Tags(args) => run_tags(&store, args, &mut out)?,
        Commands::Rand(args) => run_rand(&store, args, &cfg.selection, &mut out)?,
        Commands::Load => run_load(&store, io::stdin().lock(), verbose, &mut err)?,
    }
    Ok(())
}
