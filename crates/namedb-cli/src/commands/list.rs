use anyhow::Result;
use namedb_core::{SqliteStore, TagIndex};
use std::io::Write;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show each name's tags
    #[arg(short = 't', long = "tags")]
    pub tags: bool,

    /// Print only the number of names
    #[arg(short = 'c', long = "count", conflicts_with_all = ["tags", "output"])]
    pub count: bool,

    /// Output format for displaying results
    ///
    /// Available formats:
    ///   text - one name per line (default)
    ///   json - one JSON record per line, for scripting
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        value_parser = ["text", "json"],
        help = "Output format: text|json"
    )]
    pub output: String,
}

pub fn run_list<W: Write>(store: &SqliteStore, args: ListArgs, out: &mut W) -> Result<()> {
    if args.count {
        writeln!(out, "{}", store.count_names()?)?;
        return Ok(());
    }

    let entries = store.list_names()?;
    match args.output.as_str() {
        "json" => {
            for entry in &entries {
                writeln!(out, "{}", serde_json::to_string(entry)?)?;
            }
        }
        _ => {
            for entry in &entries {
                if args.tags {
                    writeln!(out, "{}", entry)?;
                } else {
                    writeln!(out, "{}", entry.name)?;
                }
            }
        }
    }
    Ok(())
}
