//! Command-line browser for the composed catalog.
//!
//! Loads every source once, then prints the requested view: a summary, the
//! collection or case listing, one loose category, or the members of a single
//! collection/case. `--search` and `--sort` narrow and order item listings.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use skindex::view::{self, LookupOutcome, NOT_FOUND_MESSAGE, Named, SortOrder};
use skindex::{Catalog, CatalogStore, Item, LooseCategory, SourceSet};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXIT_NOT_FOUND: i32 = 2;

#[tokio::main]
async fn main() {
    init_tracing();
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skindex=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse()?;
    let sources = SourceSet::from_env(cli.source_root.as_deref())?;
    let store = CatalogStore::new();
    let catalog = store.reload(&sources).await.context("loading catalog")?;
    render(&cli, &catalog)
}

enum Command {
    Summary,
    Collections,
    Cases,
    Category(LooseCategory),
    Collection(String),
    Case(String),
}

struct Cli {
    command: Command,
    source_root: Option<String>,
    search: String,
    sort: SortOrder,
    json: bool,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut command: Option<Command> = None;
        let mut source_root = None;
        let mut search = String::new();
        let mut sort = SortOrder::None;
        let mut json = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            let selected = match arg.as_str() {
                "--summary" => Some(Command::Summary),
                "--collections" => Some(Command::Collections),
                "--cases" => Some(Command::Cases),
                "--category" => {
                    let raw = next_value(&mut args, "--category")?;
                    let category = LooseCategory::parse(&raw)
                        .with_context(|| format!("unknown category '{raw}'"))?;
                    Some(Command::Category(category))
                }
                "--collection" => Some(Command::Collection(next_value(&mut args, "--collection")?)),
                "--case" => Some(Command::Case(next_value(&mut args, "--case")?)),
                "--source-root" => {
                    source_root = Some(next_value(&mut args, "--source-root")?);
                    None
                }
                "--search" => {
                    search = next_value(&mut args, "--search")?;
                    None
                }
                "--sort" => {
                    sort = SortOrder::parse(&next_value(&mut args, "--sort")?)?;
                    None
                }
                "--json" => {
                    json = true;
                    None
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n\n{}", usage()),
            };
            if let Some(selected) = selected {
                if command.is_some() {
                    bail!("only one view may be requested\n\n{}", usage());
                }
                command = Some(selected);
            }
        }

        Ok(Cli {
            command: command.unwrap_or(Command::Summary),
            source_root,
            search,
            sort,
            json,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: skindex [--source-root ROOT] [--summary | --collections | --cases | --category NAME | --collection NAME | --case NAME] [--search TEXT] [--sort asc|desc] [--json]\n\
ROOT is an http(s) base URL or a directory holding skins.json, crates.json, collections.json, ...\n\
Falls back to SKINDEX_SOURCE_ROOT, then the public mirror.\n"
}

fn render(cli: &Cli, catalog: &Arc<Catalog>) -> Result<i32> {
    match &cli.command {
        Command::Summary => {
            let summary = catalog.summary();
            if cli.json {
                return print_json(&summary);
            }
            println!("items        {}", summary.items);
            println!("collections  {}", summary.collections);
            println!("cases        {}", summary.cases);
            for (category, items) in catalog.categories() {
                println!("{:<12} {}", category.as_str(), items.len());
            }
        }
        Command::Collections => {
            print_listing(cli, catalog.collections(), |collection| collection.items.len())?;
        }
        Command::Cases => {
            print_listing(cli, catalog.cases(), |case| case.pool.len())?;
        }
        Command::Category(category) => {
            print_items(cli, catalog.category(*category).iter())?;
        }
        Command::Collection(name) => {
            match LookupOutcome::from_option(name, catalog.collection(name)) {
                LookupOutcome::Found(collection) => {
                    print_items(cli, collection.items.iter().map(|item| &**item))?
                }
                LookupOutcome::NotFound { name } => return Ok(not_found(&name)),
            }
        }
        Command::Case(name) => match LookupOutcome::from_option(name, catalog.case(name)) {
            LookupOutcome::Found(case) => print_items(cli, case.pool.items().map(|item| &**item))?,
            LookupOutcome::NotFound { name } => return Ok(not_found(&name)),
        },
    }
    Ok(0)
}

fn print_listing<'a, T: Named + 'a>(
    cli: &Cli,
    entries: impl Iterator<Item = &'a T>,
    count: impl Fn(&T) -> usize,
) -> Result<()> {
    let selected = view::browse(entries, &cli.search, cli.sort);
    if cli.json {
        let names: Vec<&str> = selected.iter().map(|entry| entry.name()).collect();
        print_json(&names)?;
        return Ok(());
    }
    for entry in selected {
        println!("{} ({})", entry.name(), count(entry));
    }
    Ok(())
}

fn print_items<'a>(cli: &Cli, items: impl Iterator<Item = &'a Item>) -> Result<()> {
    let selected = view::browse(items, &cli.search, cli.sort);
    if cli.json {
        print_json(&selected)?;
        return Ok(());
    }
    for item in selected {
        let rarity = item
            .rarity
            .as_ref()
            .map(|rarity| rarity.name.as_str())
            .unwrap_or("-");
        println!("{}\t{}\t{}", item.id, item.name, rarity);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<i32> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}

fn not_found(name: &str) -> i32 {
    eprintln!("{NOT_FOUND_MESSAGE}: {name}");
    EXIT_NOT_FOUND
}
