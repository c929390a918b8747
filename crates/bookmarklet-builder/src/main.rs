use std::io;

use clap::Parser;

/// Embed bookmarklet sources into bookmarklets.json and bookmarklets.js.
#[derive(Parser)]
#[command(name = "build-bookmarklets", version, about, long_about = None)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();
    bookmarklet_builder::init();

    let layout = bookmarklet_builder::infra::config::Layout::discover()?;
    bookmarklet_builder::app::pipeline::run(&layout, &mut io::stdout().lock())
}
