use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use scriptmenu::catalog::{CatalogStore, CategoryUpdate, NewScript, ScriptUpdate, SyncAction};
use scriptmenu::menu::MenuStore;
use scriptmenu::workspace::{load_or_default, workspace_root, WorkspaceLayout};
use scriptmenu::{CategoryId, RegistrationStatus, ScriptContext, ScriptSync};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Attach scripts to a nested shell context menu.
#[derive(Parser, Debug)]
#[command(name = "scriptmenu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Workspace directory (defaults to SCRIPTMENU_HOME or the OS data dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage categories (menu groups)
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage scripts (menu commands)
    #[command(subcommand)]
    Script(ScriptCommand),
    /// Print the category/script tree with resolved menu paths
    List,
    /// Remove and re-add every menu entry from the catalog
    Resync,
    /// Set the interpreter used to launch scripts
    ToolPath {
        path: String,
        /// Keep existing menu entries untouched
        #[arg(long)]
        no_resync: bool,
    },
    /// Write the catalog document to a file
    Export { path: PathBuf },
    /// Replace the catalog with a previously exported document
    Import { path: PathBuf },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Add {
        name: String,
        #[arg(long)]
        parent: Option<Uuid>,
    },
    Rename {
        id: Uuid,
        name: String,
    },
    Move {
        id: Uuid,
        #[command(flatten)]
        target: ParentTarget,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ParentTarget {
    /// New parent category
    #[arg(long, conflicts_with = "root")]
    parent: Option<Uuid>,
    /// Move to the top level of the menu
    #[arg(long)]
    root: bool,
}

impl ParentTarget {
    fn resolve(&self) -> Result<Option<CategoryId>> {
        match (self.parent, self.root) {
            (Some(parent), false) => Ok(Some(parent)),
            (None, true) => Ok(None),
            _ => bail!("pass either --parent <ID> or --root"),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ScriptCommand {
    Add {
        source: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Option<Uuid>,
        /// Context to attach to; repeat for several
        #[arg(long = "context", value_enum, required = true)]
        contexts: Vec<ContextArg>,
        #[arg(long)]
        icon: Option<PathBuf>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "root")]
        category: Option<Uuid>,
        /// Move the script to the top level of the menu
        #[arg(long)]
        root: bool,
        #[arg(long = "context", value_enum)]
        contexts: Vec<ContextArg>,
        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<PathBuf>,
        #[arg(long)]
        clear_icon: bool,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ContextArg {
    File,
    Directory,
}

impl From<ContextArg> for ScriptContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::File => ScriptContext::File,
            ContextArg::Directory => ScriptContext::Directory,
        }
    }
}

fn contexts(args: &[ContextArg]) -> BTreeSet<ScriptContext> {
    args.iter().copied().map(ScriptContext::from).collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let root = match &cli.home {
        Some(home) => home.clone(),
        None => workspace_root()?,
    };
    let layout = WorkspaceLayout::new(root);
    let config = load_or_default(&layout.config_file)?;
    let menu_store = config.open_menu_store(&layout)?;
    let mut store = CatalogStore::open(layout, menu_store, config.store_options())
        .context("Failed to open script catalog")?;
    if !store.recovered().is_empty() {
        println!(
            "Recovered {} menu entries from an interrupted change.",
            store.recovered().len()
        );
        report(store.recovered())?;
    }

    match cli.command {
        Command::Category(command) => run_category(&mut store, command),
        Command::Script(command) => run_script(&mut store, command),
        Command::List => list(&store),
        Command::Resync => {
            let outcomes = store.resync()?;
            println!("Re-registered {} scripts.", outcomes.len());
            report(&outcomes)
        }
        Command::ToolPath { path, no_resync } => {
            let outcomes = store.set_tool_path(&path, !no_resync)?;
            println!("Tool path set to {path}");
            report(&outcomes)
        }
        Command::Export { path } => {
            store.export_catalog(&path)?;
            println!("Catalog exported to {}", path.display());
            Ok(())
        }
        Command::Import { path } => {
            let outcomes = store.import_catalog(&path)?;
            println!("Catalog imported from {}", path.display());
            report(&outcomes)
        }
    }
}

fn run_category<S: MenuStore>(store: &mut CatalogStore<S>, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::Add { name, parent } => {
            let id = store.add_category(&name, parent)?;
            println!("{id}  {}", store.resolve_category(Some(id))?.join(" > "));
            Ok(())
        }
        CategoryCommand::Rename { id, name } => {
            let update = CategoryUpdate {
                name: Some(name),
                parent: None,
            };
            report(&store.update_category(&id, update)?)
        }
        CategoryCommand::Move { id, target } => {
            let update = CategoryUpdate {
                name: None,
                parent: Some(target.resolve()?),
            };
            report(&store.update_category(&id, update)?)
        }
        CategoryCommand::Remove { id } => report(&store.remove_category(&id)?),
    }
}

fn run_script<S: MenuStore>(store: &mut CatalogStore<S>, command: ScriptCommand) -> Result<()> {
    match command {
        ScriptCommand::Add {
            source,
            name,
            category,
            contexts: context_args,
            icon,
        } => {
            let outcome = store.add_script(NewScript {
                source,
                name,
                category,
                contexts: contexts(&context_args),
                icon,
            })?;
            println!(
                "{}  {}",
                outcome.script_id,
                store.resolve_script(&outcome.script_id)?.join(" > ")
            );
            report(std::slice::from_ref(&outcome))
        }
        ScriptCommand::Update {
            id,
            name,
            category,
            root,
            contexts: context_args,
            icon,
            clear_icon,
        } => {
            let category = if root { Some(None) } else { category.map(Some) };
            let update = ScriptUpdate {
                name,
                category,
                contexts: (!context_args.is_empty()).then(|| contexts(&context_args)),
                icon,
                clear_icon,
            };
            let outcome = store.update_script(&id, update)?;
            report(std::slice::from_ref(&outcome))
        }
        ScriptCommand::Remove { id } => {
            let outcome = store.remove_script(&id)?;
            report(std::slice::from_ref(&outcome))
        }
    }
}

fn list<S: MenuStore>(store: &CatalogStore<S>) -> Result<()> {
    println!("Tool path: {}", store.tool_path());
    for category in store.categories() {
        let path = store.resolve_category(Some(category.id))?;
        println!("[category] {}  {}", category.id, path.join(" > "));
    }
    for script in store.scripts() {
        let path = store.resolve_script(&script.id)?;
        let contexts: Vec<String> = script.contexts.iter().map(ToString::to_string).collect();
        println!(
            "[script]   {}  {}  ({})",
            script.id,
            path.join(" > "),
            contexts.join(", ")
        );
    }
    Ok(())
}

/// Prints every failed step and fails when any entry is stale or missing.
fn report(outcomes: &[ScriptSync]) -> Result<()> {
    let mut unclean = 0;
    for outcome in outcomes {
        if outcome.is_clean() {
            continue;
        }
        unclean += 1;
        let status = match outcome.status() {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Unregistered => "unregistered",
            RegistrationStatus::PartiallyRegistered => "partially registered",
        };
        println!("script {} is {status}", outcome.script_id);
        for step in outcome.unregistered.iter().chain(outcome.registered.iter()) {
            let verb = match step.action {
                SyncAction::Register => "add",
                SyncAction::Unregister => "remove",
            };
            for failure in &step.failed {
                println!(
                    "  failed to {verb} {} entry: {}",
                    failure.context,
                    failure.error
                );
            }
        }
    }
    if unclean > 0 {
        bail!("{unclean} script(s) have stale or missing menu entries; run `scriptmenu resync` to retry");
    }
    Ok(())
}
