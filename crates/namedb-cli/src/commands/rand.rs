use anyhow::Result;
use namedb_core::config::SelectionConfig;
use namedb_core::{EntrySource, FilterParser, Pick, Strategy, TagIndex};
use std::io::{self, Write};
use tracing::debug;

#[derive(clap::Args, Debug)]
pub struct RandArgs {
    /// Number of lines to print
    #[arg(short = 'n', long = "count", value_name = "N", default_value_t = 1, conflicts_with = "stream")]
    pub count: u64,

    /// Keep printing lines until the output is closed
    #[arg(short = 's', long = "stream")]
    pub stream: bool,

    /// Tag filter, one pick per filter on each line
    ///
    /// ',' joins tags with AND, '|' joins groups with OR:
    ///   -t 'red,tall'     names tagged both red and tall
    ///   -t 'red|blue'     names tagged red or blue
    ///   -t 'a,b|c'        (a AND b) OR c
    #[arg(short = 't', long = "tag", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Evaluation strategy, overrides the configuration
    #[arg(long, value_name = "STRATEGY", help = "Evaluation strategy: index|scan")]
    pub strategy: Option<Strategy>,

    /// Fixed random seed for reproducible picks
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

pub fn run_rand<S, W>(source: &S, args: RandArgs, selection: &SelectionConfig, out: &mut W) -> Result<()>
where
    S: TagIndex + EntrySource + ?Sized,
    W: Write,
{
    let selection = SelectionConfig {
        strategy: args.strategy.unwrap_or(selection.strategy),
        seed: args.seed.or(selection.seed),
    };
    let mut picker = selection.picker();
    let filters = FilterParser::parse_all(&args.filters);
    debug!(filters = filters.len(), strategy = %picker.strategy(), stream = args.stream, "Picking names");

    let mut printed: u64 = 0;
    while args.stream || printed < args.count {
        let line = render_line(&picker.select_line(&filters, source)?);
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                debug!(printed = printed, "Output closed, stopping");
                return Ok(());
            }
            return Err(e.into());
        }
        printed += 1;
    }
    Ok(())
}

fn render_line(picks: &[Pick]) -> String {
    picks.iter().map(Pick::to_string).collect::<Vec<_>>().join(" ")
}
