//! CLI command structure using clap

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{ArgMatches, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stamper")]
#[command(version, about = "Render HTML pages through the Stamper engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log engine steps (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize every scope of a page, replay actions and print the result
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// HTML page to load
    pub page: PathBuf,

    /// Engine configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Click the first element matching an attribute selector, e.g. `[s-cast=list]`
    #[arg(long, value_name = "SELECTOR")]
    pub click: Vec<String>,

    /// Add an item from data: `<scope>={"slot": "text", ...}`
    #[arg(long, value_name = "SCOPE=JSON", value_parser = parse_add)]
    pub add: Vec<AddStep>,

    /// Answer "no" to every delete confirmation
    #[arg(long)]
    pub decline: bool,

    /// Indent the printed HTML
    #[arg(long)]
    pub pretty: bool,
}

/// Data for one `--add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStep {
    pub scope: String,
    pub data: BTreeMap<String, String>,
}

fn parse_add(value: &str) -> Result<AddStep, String> {
    let (scope, json) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <scope>=<json>, got `{}`", value))?;
    if scope.is_empty() {
        return Err("scope identifier is empty".to_string());
    }
    let data: BTreeMap<String, String> =
        serde_json::from_str(json).map_err(|e| format!("invalid data for `{}`: {}", scope, e))?;
    Ok(AddStep {
        scope: scope.to_string(),
        data,
    })
}

/// One replayed action
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    Click(&'a str),
    Add(&'a AddStep),
}

impl RenderArgs {
    /// `--click` and `--add` steps in command-line order
    pub fn steps(&self, matches: Option<&ArgMatches>) -> Vec<Step<'_>> {
        let positions = |id: &str| -> Vec<usize> {
            matches
                .and_then(|m| m.indices_of(id))
                .map(|indices| indices.collect())
                .unwrap_or_default()
        };
        let clicks = positions("click");
        let adds = positions("add");

        let mut steps: Vec<(usize, Step<'_>)> = self
            .click
            .iter()
            .enumerate()
            .map(|(i, s)| (clicks.get(i).copied().unwrap_or(i), Step::Click(s.as_str())))
            .chain(
                self.add
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (adds.get(i).copied().unwrap_or(self.click.len() + i), Step::Add(a))),
            )
            .collect();
        steps.sort_by_key(|(position, _)| *position);
        steps.into_iter().map(|(_, step)| step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    #[test]
    fn test_parse_add() {
        let step = parse_add(r#"list={"name": "Alice"}"#).unwrap();
        assert_eq!(step.scope, "list");
        assert_eq!(step.data.get("name").map(String::as_str), Some("Alice"));

        assert!(parse_add("list").is_err());
        assert!(parse_add(r#"={"a": "b"}"#).is_err());
        assert!(parse_add("list={bad json}").is_err());
    }

    #[test]
    fn test_steps_keep_command_line_order() {
        let matches = Cli::command()
            .try_get_matches_from([
                "stamper",
                "render",
                "page.html",
                "--click",
                "[s-cast=a]",
                "--add",
                r#"a={"name": "x"}"#,
                "--click",
                "[s-delete=a]",
            ])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        let Commands::Render(args) = &cli.command;

        let steps = args.steps(matches.subcommand_matches("render"));
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], Step::Click("[s-cast=a]"));
        assert!(matches!(steps[1], Step::Add(add) if add.scope == "a"));
        assert_eq!(steps[2], Step::Click("[s-delete=a]"));
    }

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }
}
