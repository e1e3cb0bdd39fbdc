pub mod cli;
pub mod config;
pub mod filter;
pub mod report;

use crate::config::FilterConfig;
use crate::report::{FilterDiff, FilterReport, create_styled_table, terms_table};
use anyhow::{Context, bail};
use colored::Colorize;
use comfy_table::Cell;
pub use cli::{ColorMode, Commands, OutputFormat, PageAction, cli_parse};
pub use filter::{Filter, FilterError, MetaKeyword, Relation, SortState, Term};

fn init_logging(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Print a filter in the selected format.
fn emit_filter(filter: &Filter, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{filter}"),
        OutputFormat::Json => println!("{}", to_json(&FilterReport::new(filter))?),
    }
    Ok(())
}

/// Resolves filter arguments against the config and applies its defaults.
struct FilterLoader<'a> {
    config: &'a FilterConfig,
    defaults: Filter,
}

impl FilterLoader<'_> {
    fn load(&self, input: &str) -> anyhow::Result<Filter> {
        let filter = self.config.resolve(input)?;
        tracing::debug!(input, parsed = %filter, "resolved filter argument");
        Ok(filter.merge_meta(&self.defaults))
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.log_level());
    apply_color_mode(cli.color);

    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let defaults = if cli.no_defaults {
        Filter::new()
    } else {
        config.default_filter()
    };
    tracing::info!(
        profile = %config.profile_name,
        defaults = %defaults,
        "using filter config"
    );
    let loader = FilterLoader {
        config: &config,
        defaults,
    };
    let format = cli.format;

    match &cli.command {
        Commands::Normalize { filter } => {
            emit_filter(&loader.load(filter)?, format)?;
        }
        Commands::Parse { filter } => {
            let filter = loader.load(filter)?;
            match format {
                OutputFormat::Text => {
                    if filter.is_empty() {
                        println!("{}", "No terms".bright_black());
                    } else {
                        println!("{}", terms_table(&filter));
                    }
                    println!("{} {}", "Applied filter:".bold(), filter);
                }
                OutputFormat::Json => println!("{}", to_json(&FilterReport::new(&filter))?),
            }
        }
        Commands::Get { filter, keyword } => {
            let filter = loader.load(filter)?;
            let Some(term) = filter.get_term(keyword) else {
                bail!("Keyword '{}' is not present in filter: {}", keyword, filter);
            };
            match format {
                OutputFormat::Text => println!("{}", term.value()),
                OutputFormat::Json => println!("{}", to_json(term)?),
            }
        }
        Commands::Set {
            filter,
            keyword,
            value,
            relation,
            replace,
        } => {
            let relation: Relation = relation
                .parse()
                .with_context(|| format!("Invalid relation for '{}'", keyword))?;
            // validate up front, `set` itself ignores bad keywords
            Term::new(keyword, relation, value.as_str())?;

            let mut filter = loader.load(filter)?;
            if *replace {
                filter = filter.delete(keyword);
            }
            emit_filter(&filter.set(keyword, value.as_str(), relation), format)?;
        }
        Commands::Delete { filter, keyword } => {
            emit_filter(&loader.load(filter)?.delete(keyword), format)?;
        }
        Commands::Merge { filter, others } => {
            let mut merged = loader.load(filter)?;
            for other in others {
                let other = loader.config.resolve(other)?;
                merged = merged.and(&other);
            }
            emit_filter(&merged, format)?;
        }
        Commands::Contains { filter, term } => {
            let filter = loader.load(filter)?;
            let term: Term = term
                .parse()
                .with_context(|| format!("Invalid term '{}'", term))?;
            let found = filter.has_term(&term);
            match format {
                OutputFormat::Text => println!("{}", if found { "yes" } else { "no" }),
                OutputFormat::Json => println!(
                    "{}",
                    to_json(&serde_json::json!({ "term": term, "contains": found }))?
                ),
            }
        }
        Commands::Sort {
            filter,
            field,
            reverse,
            clear,
        } => {
            let filter = loader.load(filter)?;
            let state = match (field, *clear) {
                (_, true) | (None, false) => SortState::Unsorted,
                (Some(field), false) if *reverse => SortState::Descending(field.clone()),
                (Some(field), false) => SortState::Ascending(field.clone()),
            };
            emit_filter(&filter.with_sort_state(&state), format)?;
        }
        Commands::Page { filter, action } => {
            let filter = loader.load(filter)?;
            let paged = match action {
                PageAction::First => filter.first_page(),
                PageAction::Next => filter.next_page(),
                PageAction::Previous => filter.previous_page(),
                PageAction::All => filter.all_rows(),
            };
            emit_filter(&paged, format)?;
        }
        Commands::Diff { filter1, filter2 } => {
            let old = loader.load(filter1)?;
            let new = loader.load(filter2)?;
            let diff = FilterDiff::between(&old, &new);
            match format {
                OutputFormat::Text => {
                    print!("{}", diff.to_colored_text());
                    if diff.is_empty() {
                        println!("{}", "Filters are identical".green());
                    } else if diff.equivalent {
                        println!("{}", "Filters are equivalent (criteria order differs)".yellow());
                    }
                }
                OutputFormat::Json => println!("{}", to_json(&diff)?),
            }
        }
        Commands::Saved => match format {
            OutputFormat::Text => {
                if config.saved.is_empty() {
                    println!("{}", "No saved filters".bright_black());
                } else {
                    let mut table = create_styled_table(&["Name", "Filter"]);
                    for (name, raw) in &config.saved {
                        table.add_row(vec![
                            Cell::new(format!("@{name}")),
                            Cell::new(Filter::from_string(raw)),
                        ]);
                    }
                    println!("{table}");
                }
            }
            OutputFormat::Json => {
                let saved: std::collections::BTreeMap<_, _> = config
                    .saved
                    .iter()
                    .map(|(name, raw)| (name, Filter::from_string(raw)))
                    .collect();
                println!("{}", to_json(&saved)?);
            }
        },
    }

    Ok(())
}
