use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use publist::{config::Config, library::Library, pipeline};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Command};

mod cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_level());
    match args.command {
        Command::Render {
            config,
            bib,
            output,
            stdout,
        } => render(&config, bib, output, stdout),
        Command::Find { bib, authors } => find(&bib, &authors),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render(config_path: &Path, bib: Option<PathBuf>, output: Option<PathBuf>, stdout: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let bib = bib
        .or_else(|| config.bibliography.clone())
        .context("no bibliography given, set `bibliography` in the configuration or pass --bib")?;
    let library = Library::load(&bib)?;
    let page = pipeline::build_page(&config, &library)?;

    if stdout {
        print!("{}", page.assemble());
    } else if let Some(path) = output.or_else(|| config.output.clone()) {
        page.write(&path)?;
    } else {
        tracing::warn!("no output path set, not writing anything (use --output or --stdout)");
    }

    eprintln!("{} {} rendered", "✓".green(), page.item_count());
    Ok(())
}

fn find(bib: &Path, authors: &[String]) -> anyhow::Result<()> {
    let library = Library::load(bib)?;
    let mut found = 0usize;
    for entry in library.by_author(authors) {
        println!(
            "{}\t{}\t{}",
            entry.key,
            entry.field("year").unwrap_or("-"),
            publist::text::clean(entry.field("title").unwrap_or_default()),
        );
        found += 1;
    }
    eprintln!("{} {} found", "✓".green(), found);
    Ok(())
}
