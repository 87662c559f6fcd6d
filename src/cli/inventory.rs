use std::{
    fmt,
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use deskwork::{
    domain::{InventorySettings, StoreFormat},
    storage::{Loaded, Repository},
    Backend, Config, Item, ItemId, ItemPatch,
};
use serde::Serialize;
use tracing::instrument;

use crate::cli::{
    prompt::{parse_decimal, PromptError, Prompter},
    terminal::{is_narrow, render_items, render_stats, Colorize},
};

/// Command arguments for `desk inventory`.
#[derive(Debug, Parser, Default)]
pub struct Inventory {
    /// Inventory file (defaults to the configured path)
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Storage format (inferred from the file extension when omitted)
    #[arg(long)]
    format: Option<StoreFormat>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Add an item
    Add {
        /// Unique item id
        id: String,
        /// Item name
        name: String,
        /// Units in stock
        quantity: i64,
        /// Unit price (`,` or `.` as decimal separator)
        #[arg(value_parser = parse_decimal)]
        price: f64,
    },

    /// Remove an item
    Remove {
        /// Id of the item to remove
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Change some fields of an item
    Update {
        /// Id of the item to change
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New quantity
        #[arg(long)]
        quantity: Option<i64>,

        /// New unit price
        #[arg(long, value_parser = parse_decimal)]
        price: Option<f64>,
    },

    /// Find items whose name contains a text (ignoring case and accents)
    Find {
        /// Text to look for
        query: String,
    },

    /// List every item
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show item count, total units and total value
    Stats,
}

/// Output formats for `list`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
        })
    }
}

#[derive(Serialize)]
struct ItemRow<'a> {
    id: &'a str,
    name: &'a str,
    quantity: u64,
    price: f64,
}

impl Inventory {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let settings = InventorySettings {
            path: self.file.unwrap_or_else(|| config.inventory.path.clone()),
            format: self.format.or(config.inventory.format),
            seed: config.inventory.seed.clone(),
        };
        let mut repository = open(&settings)?;

        match self.action {
            None => menu(&mut repository, &mut Prompter::stdio()),
            Some(action) => action.run(&mut repository),
        }
    }
}

/// Loads the inventory, reporting what the load found and seeding a newly
/// created file.
fn open(
    settings: &InventorySettings,
) -> anyhow::Result<Repository<Box<dyn Backend>, Loaded>> {
    let path = &settings.path;
    let mut repository = Repository::open(path.clone(), settings.resolved_format())
        .load()
        .with_context(|| format!("failed to load inventory from {}", path.display()))?;

    let summary = repository.summary();
    if summary.created {
        eprintln!(
            "{}",
            format!("Created empty inventory at {}", path.display()).dim()
        );
        if let Some(seed) = &settings.seed {
            let item = Item::new(&seed.id, &seed.name, seed.quantity, seed.price)
                .context("invalid seed item in configuration")?;
            repository
                .add(item)
                .context("failed to add the seed item")?;
        }
    }
    if summary.skipped > 0 {
        eprintln!(
            "{}",
            format!(
                "⚠️  Skipped {} malformed or duplicate record(s) in {}",
                summary.skipped,
                path.display()
            )
            .warning()
        );
    }
    Ok(repository)
}

impl Action {
    fn run<B: Backend>(self, repository: &mut Repository<B, Loaded>) -> anyhow::Result<()> {
        match self {
            Self::Add {
                id,
                name,
                quantity,
                price,
            } => {
                let item = Item::new(&id, &name, quantity, price)?;
                repository.add(item)?;
                println!("{}", format!("✅ Added item {id}").success());
            }
            Self::Remove { id, yes } => {
                let id = ItemId::new(&id)?;
                let Some(item) = repository.get(&id) else {
                    anyhow::bail!("no item with id {id}");
                };
                if !yes {
                    let proceed = dialoguer::Confirm::new()
                        .with_prompt(format!("Remove {item}?"))
                        .default(false)
                        .interact()
                        .context("failed to read confirmation")?;
                    if !proceed {
                        println!("Cancelled");
                        return Ok(());
                    }
                }
                repository.remove(&id)?;
                println!("{}", format!("✅ Removed item {id}").success());
            }
            Self::Update {
                id,
                name,
                quantity,
                price,
            } => {
                let patch = ItemPatch {
                    name,
                    quantity,
                    price,
                };
                if patch.is_empty() {
                    anyhow::bail!("nothing to update: pass --name, --quantity or --price");
                }
                let item = repository.update(&ItemId::new(&id)?, &patch)?;
                println!("{}", format!("✅ Updated {item}").success());
            }
            Self::Find { query } => {
                render_items(
                    &mut std::io::stdout(),
                    &repository.find_by_name(&query),
                    is_narrow(),
                )?;
            }
            Self::List { output } => {
                let items = repository.list_all();
                match output {
                    OutputFormat::Table => {
                        let mut stdout = std::io::stdout();
                        render_items(&mut stdout, &items, is_narrow())?;
                        render_stats(&mut stdout, &repository.stats())?;
                    }
                    OutputFormat::Json => {
                        let rows: Vec<_> = items
                            .iter()
                            .map(|item| ItemRow {
                                id: item.id().as_str(),
                                name: item.name(),
                                quantity: item.quantity(),
                                price: item.price(),
                            })
                            .collect();
                        serde_json::to_writer_pretty(std::io::stdout(), &rows)
                            .context("failed to render json output")?;
                        println!();
                    }
                }
            }
            Self::Stats => render_stats(&mut std::io::stdout(), &repository.stats())?,
        }
        Ok(())
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Runs the numbered inventory menu until the user exits or input ends.
pub fn menu<B, R, W>(
    repository: &mut Repository<B, Loaded>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()>
where
    B: Backend,
    R: BufRead,
    W: Write,
{
    prompter.say("=".repeat(70))?;
    prompter.say(" INVENTORY MANAGEMENT".heading())?;
    prompter.say("=".repeat(70))?;
    loop {
        match menu_step(repository, prompter) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) | Err(PromptError::Eof) => {
                prompter.say("Goodbye!")?;
                return Ok(());
            }
            Err(PromptError::Io(e)) => return Err(e.into()),
        }
    }
}

fn menu_step<B, R, W>(
    repository: &mut Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<Flow, PromptError>
where
    B: Backend,
    R: BufRead,
    W: Write,
{
    p.say("")?;
    p.say("Choose an option:")?;
    p.say(" 1) Add item")?;
    p.say(" 2) Remove item")?;
    p.say(" 3) Update item")?;
    p.say(" 4) Search by name")?;
    p.say(" 5) List inventory")?;
    p.say(" 6) Exit")?;

    match p.line("Option: ")?.as_str() {
        "1" => add(repository, p)?,
        "2" => remove(repository, p)?,
        "3" => update(repository, p)?,
        "4" => search(repository, p)?,
        "5" => list(repository, p)?,
        "6" => return Ok(Flow::Exit),
        _ => p.warn("Invalid option, try again.")?,
    }
    Ok(Flow::Continue)
}

fn add<B: Backend, R: BufRead, W: Write>(
    repository: &mut Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say("\n→ Add item")?;
    let id = p.text("ID: ")?;
    let name = p.text("Name: ")?;
    let quantity = p.integer("Quantity (whole number ≥ 0): ", Some(0))?;
    let price = p.decimal("Price (≥ 0): ", Some(0.0))?;

    let item = match Item::new(&id, &name, quantity, price) {
        Ok(item) => item,
        Err(e) => return Ok(p.failure(&format!("Invalid data: {e}"))?),
    };
    match repository.add(item) {
        Ok(()) => p.success(&format!("Item {} added.", id.trim()))?,
        Err(e) => p.failure(&e.to_string())?,
    }
    Ok(())
}

fn remove<B: Backend, R: BufRead, W: Write>(
    repository: &mut Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say("\n→ Remove item")?;
    let id = p.text("ID to remove: ")?;
    let result = ItemId::new(&id)
        .map_err(anyhow::Error::from)
        .and_then(|id| Ok(repository.remove(&id)?));
    match result {
        Ok(item) => p.success(&format!("Removed {item}"))?,
        Err(e) => p.failure(&e.to_string())?,
    }
    Ok(())
}

fn update<B: Backend, R: BufRead, W: Write>(
    repository: &mut Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say("\n→ Update item")?;
    let id = p.text("ID to update: ")?;
    let Some(current) = ItemId::new(&id)
        .ok()
        .and_then(|id| repository.get(&id))
        .cloned()
    else {
        return Ok(p.failure("No item with that ID.")?);
    };

    p.say(format!("Current: {current}"))?;
    p.say("Leave blank to keep the current value.".dim())?;
    let patch = ItemPatch {
        name: p.optional_text("New name: ")?,
        quantity: p.optional_integer("New quantity (whole number ≥ 0): ", Some(0))?,
        price: p.optional_decimal("New price (≥ 0): ", Some(0.0))?,
    };
    if patch.is_empty() {
        return Ok(p.say("Nothing to change.")?);
    }

    match repository.update(current.id(), &patch) {
        Ok(item) => p.success(&format!("Updated {item}"))?,
        Err(e) => p.failure(&e.to_string())?,
    }
    Ok(())
}

fn search<B: Backend, R: BufRead, W: Write>(
    repository: &Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say("\n→ Search by name")?;
    let query = p.text("Part of the name: ")?;
    let found = repository.find_by_name(&query);
    if found.is_empty() {
        p.say("No matches found.")?;
    } else {
        render_items(p.output(), &found, is_narrow())?;
    }
    Ok(())
}

fn list<B: Backend, R: BufRead, W: Write>(
    repository: &Repository<B, Loaded>,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say("\n→ Current inventory")?;
    render_items(p.output(), &repository.list_all(), is_narrow())?;
    render_stats(p.output(), &repository.stats())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use deskwork::storage::CsvTable;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::prompt::tests::{output, scripted};

    fn repository() -> (TempDir, Repository<CsvTable, Loaded>) {
        let tmp = tempfile::tempdir().unwrap();
        let table = CsvTable::new(tmp.path().join("inventario.csv"));
        (tmp, Repository::new(table).load().unwrap())
    }

    #[test]
    fn add_duplicate_update_search_remove() {
        let (tmp, mut repository) = repository();
        let mut prompter = scripted(
            "1\n1\nCafé\n10\n2,50\n\
             1\n1\nCafé\n10\n2.50\n\
             3\n1\n\n\n3\n\
             4\ncafe\n\
             2\n1\n\
             6\n",
        );

        menu(&mut repository, &mut prompter).unwrap();

        let text = output(&prompter);
        assert!(text.contains("Item 1 added."));
        assert!(text.contains("an item with id 1 already exists"));
        assert!(text.contains("Updated [1] Café | qty: 10 | $ 3.00"));
        assert!(text.contains("Removed [1] Café"));
        assert!(text.ends_with("Goodbye!\n"));
        assert!(repository.inventory().is_empty());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("inventario.csv")).unwrap(),
            "id,nombre,cantidad,precio\n"
        );
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let (_tmp, mut repository) = repository();
        let mut prompter = scripted("1\n7\nTé\n");

        menu(&mut repository, &mut prompter).unwrap();

        assert!(output(&prompter).ends_with("Goodbye!\n"));
        assert!(repository.inventory().is_empty());
    }

    #[test]
    fn unknown_id_does_not_stop_the_loop() {
        let (_tmp, mut repository) = repository();
        let mut prompter = scripted("2\n99\n3\n99\n9\n5\n6\n");

        menu(&mut repository, &mut prompter).unwrap();

        let text = output(&prompter);
        assert!(text.contains("no item with id 99"));
        assert!(text.contains("No item with that ID."));
        assert!(text.contains("Invalid option"));
        assert!(text.contains("No items to show."));
    }

    #[test]
    fn blank_update_changes_nothing() {
        let (_tmp, mut repository) = repository();
        repository
            .add(Item::new("1", "Café", 10, 2.5).unwrap())
            .unwrap();
        let mut prompter = scripted("3\n1\n\n\n\n6\n");

        menu(&mut repository, &mut prompter).unwrap();

        assert!(output(&prompter).contains("Nothing to change."));
        assert_eq!(
            repository.get(&ItemId::new("1").unwrap()),
            Some(&Item::new("1", "Café", 10, 2.5).unwrap())
        );
    }
}
