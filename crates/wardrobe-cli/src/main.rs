use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use wardrobe_core::{Formality, OutfitStore, SortKey, SortOrder};
use wardrobe_store_json::{JsonFileStore, LoadOutcome, DEFAULT_DATA_FILE};

mod session;

use session::Session;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "wardrobe")]
#[command(about = "Outfit inventory and outfit-of-the-day planner")]
struct Cli {
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive menu (the default).
    Menu,
    List(ListArgs),
    Search(SearchArgs),
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, value_enum)]
    sort: Option<SortKeyArg>,
    #[arg(long, value_enum, default_value_t = OrderArg::Asc)]
    order: OrderArg,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(value_enum)]
    by: SearchFieldArg,
    value: String,
}

#[derive(Debug, Args)]
struct PlanArgs {
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    formality: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortKeyArg {
    Name,
    Category,
    Formality,
    LastUsed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchFieldArg {
    Name,
    Category,
    Color,
}

impl From<SortKeyArg> for SortKey {
    fn from(value: SortKeyArg) -> Self {
        match value {
            SortKeyArg::Name => Self::Name,
            SortKeyArg::Category => Self::Category,
            SortKeyArg::Formality => Self::Formality,
            SortKeyArg::LastUsed => Self::LastUsed,
        }
    }
}

impl From<OrderArg> for SortOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => Self::Ascending,
            OrderArg::Desc => Self::Descending,
        }
    }
}

/// Print `document` as pretty JSON, stamped with the CLI contract version.
fn emit_json(mut document: Value) -> Result<()> {
    if let Value::Object(fields) = &mut document {
        fields.insert("contract_version".to_string(), json!(CLI_CONTRACT_VERSION));
    }
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let persistence = JsonFileStore::new(&cli.file);

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(persistence),
        Command::List(args) => run_list(&args, &persistence),
        Command::Search(args) => run_search(&args, &persistence),
        Command::Plan(args) => run_plan(&args, &persistence),
    }
}

fn run_menu(persistence: JsonFileStore) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::open(persistence, stdin.lock(), stdout.lock())?;
    session.run()
}

/// Strict load for the JSON commands: a missing file is seeded and written,
/// any other failure aborts the command.
fn open_store(persistence: &JsonFileStore) -> Result<OutfitStore> {
    let (store, outcome) = persistence
        .load_or_seed()
        .with_context(|| format!("failed to open {}", persistence.path().display()))?;
    if outcome == LoadOutcome::Seeded {
        persistence.save(&store)?;
        tracing::info!(path = %persistence.path().display(), "seeded new data file");
    }
    Ok(store)
}

fn outfits_json(store: &OutfitStore, indexes: impl IntoIterator<Item = usize>) -> Result<Value> {
    let mut outfits = Vec::new();
    for index in indexes {
        let record = store
            .get(index)
            .ok_or_else(|| anyhow!("search returned position {index} past the store"))?;
        outfits.push(serde_json::to_value(record).context("failed to serialize outfit")?);
    }
    Ok(Value::Array(outfits))
}

fn run_list(args: &ListArgs, persistence: &JsonFileStore) -> Result<()> {
    let mut store = open_store(persistence)?;
    let order = SortOrder::from(args.order);
    if let Some(key) = args.sort {
        store.sort_by(key.into(), order);
    }

    let outfits = outfits_json(&store, 0..store.len())?;
    emit_json(json!({
        "sort": args.sort.map(|key| SortKey::from(key).as_str()),
        "order": order.as_str(),
        "count": store.len(),
        "capacity": store.capacity(),
        "outfits": outfits
    }))
}

fn run_search(args: &SearchArgs, persistence: &JsonFileStore) -> Result<()> {
    let mut store = open_store(persistence)?;
    let (by, matches): (&str, Vec<usize>) = match args.by {
        SearchFieldArg::Name => ("name", store.search_by_name(&args.value).into_iter().collect()),
        SearchFieldArg::Category => {
            store.sort_by_category(SortOrder::Ascending);
            ("category", store.search_by_category_checked(&args.value)?.into_iter().collect())
        }
        SearchFieldArg::Color => ("color", store.search_by_color(&args.value)),
    };

    let count = matches.len();
    let outfits = outfits_json(&store, matches)?;
    emit_json(json!({
        "by": by,
        "query": args.value,
        "count": count,
        "outfits": outfits
    }))
}

fn run_plan(args: &PlanArgs, persistence: &JsonFileStore) -> Result<()> {
    let formality = Formality::from_level(args.formality)
        .ok_or_else(|| anyhow!("formality MUST be 1, 2 or 3"))?;
    let mut store = open_store(persistence)?;

    let index = store.recommend(formality)?;
    persistence.save(&store)?;

    let outfit = store.get(index).ok_or_else(|| anyhow!("planned outfit vanished"))?;
    let outfit = serde_json::to_value(outfit).context("failed to serialize outfit")?;
    emit_json(json!({
        "formality": formality.level(),
        "label": formality.label(),
        "outfit": outfit
    }))
}
