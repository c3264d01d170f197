use anyhow::{Context, Result};
use namedb_core::SqliteStore;
use std::io::Write;
use tracing::warn;

#[derive(clap::Args, Debug)]
pub struct PutArgs {
    /// Name to add (created if absent)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Tags to attach; already attached tags are kept once
    #[arg(value_name = "TAG", required = true)]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UntagArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Tags to detach
    #[arg(value_name = "TAG", required = true)]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct TagsArgs {
    /// Names to look up; falls back to a case-insensitive match
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

pub fn run_put<W: Write>(store: &SqliteStore, args: PutArgs, verbose: bool, err: &mut W) -> Result<()> {
    let entry = store
        .put_name_tags(&args.name, &args.tags)
        .with_context(|| format!("failed to tag '{}'", args.name))?;
    if verbose {
        writeln!(err, "{}", entry)?;
    }
    Ok(())
}

pub fn run_untag<W: Write>(store: &SqliteStore, args: UntagArgs, verbose: bool, err: &mut W) -> Result<()> {
    let entry = store
        .untag(&args.name, &args.tags)
        .with_context(|| format!("failed to untag '{}'", args.name))?;
    if verbose {
        writeln!(err, "{}", entry)?;
    }
    Ok(())
}

pub fn run_rm<W: Write>(store: &SqliteStore, args: RmArgs, verbose: bool, err: &mut W) -> Result<()> {
    let removed = store
        .remove_name(&args.name)
        .with_context(|| format!("failed to remove '{}'", args.name))?;
    if !removed {
        warn!(name = %args.name, "Name not found, nothing removed");
    } else if verbose {
        writeln!(err, "removed {}", args.name.trim())?;
    }
    Ok(())
}

pub fn run_tags<W: Write>(store: &SqliteStore, args: TagsArgs, out: &mut W) -> Result<()> {
    for name in &args.names {
        match store.find_name(name)? {
            Some(entry) => writeln!(out, "{}", entry)?,
            None => writeln!(out, "{}: NOT FOUND", name.trim())?,
        }
    }
    Ok(())
}
