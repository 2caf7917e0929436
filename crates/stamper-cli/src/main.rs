mod cli;
mod host;

use std::fs;

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use stamper::dom::Selector;
use stamper::html::{HtmlParser, HtmlSerializer};
use stamper::{Config, Page};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, RenderArgs, Step};
use host::TerminalHost;

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Render(args) => render(args, matches.subcommand_matches("render")),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(args: &RenderArgs, matches: Option<&ArgMatches>) -> Result<()> {
    let html = fs::read_to_string(&args.page)
        .with_context(|| format!("failed to read {}", args.page.display()))?;
    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let url = format!("file://{}", args.page.display());
    let document = HtmlParser::new()
        .parse_with_url(&html, &url)
        .with_context(|| format!("failed to parse {}", args.page.display()))?;

    let mut page = Page::with_config(document, TerminalHost::new(!args.decline), config);
    page.initialize_all();
    tracing::info!("{} scope(s) on {}", page.scopes().len(), url);

    for step in args.steps(matches) {
        match step {
            Step::Click(selector) => {
                let parsed = Selector::parse(selector)
                    .with_context(|| format!("invalid selector `{}`", selector))?;
                if !page.click_selector(&parsed) {
                    tracing::warn!("nothing matches {}", selector);
                }
            }
            Step::Add(add) => {
                let id = page
                    .scope_by_identifier(&add.scope)
                    .with_context(|| format!("no scope named `{}`", add.scope))?;
                page.add_item_using_data(id, &add.data);
            }
        }
    }

    let serializer = if args.pretty {
        HtmlSerializer::pretty()
    } else {
        HtmlSerializer::new()
    };
    println!(
        "{}",
        serializer.serialize_outer(page.tree(), page.document().document_element())
    );
    Ok(())
}
