use anyhow::{Context, Result};
use namedb_core::SqliteStore;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// 逐对读取 名称/标签 行；任一侧为空的对被跳过
pub fn run_load<R, W>(store: &SqliteStore, input: R, verbose: bool, err: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    let mut loaded = 0usize;
    let mut skipped = 0usize;

    while let Some(name) = lines.next() {
        let name = name.context("failed to read name line")?;
        let Some(tag) = lines.next() else {
            warn!(name = %name.trim(), "Trailing name without a tag line ignored");
            break;
        };
        let tag = tag.context("failed to read tag line")?;

        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            skipped += 1;
            continue;
        }

        store
            .put_name_tags(name, &[tag.to_string()])
            .with_context(|| format!("failed to load '{}' => '{}'", name, tag))?;
        if verbose {
            writeln!(err, "{} => {}", name, tag)?;
        }
        loaded += 1;
    }

    info!(loaded = loaded, skipped = skipped, "Load finished");
    Ok(())
}
