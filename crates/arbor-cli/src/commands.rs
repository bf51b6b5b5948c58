use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info};

use arbor_data::{DataStore, DatabaseDataStore, ItemData, ItemId, ItemMetadata, ItemPath, ProxyItem};
use arbor_store::{InMemoryRegistry, RegistrySnapshot, StoreConfig};

use crate::cli::*;

/// A registry loaded from config and snapshot, with the data store over it.
struct Session {
    registry: Arc<InMemoryRegistry>,
    store: Arc<DatabaseDataStore>,
    snapshot: Option<PathBuf>,
    format: OutputFormat,
}

impl Session {
    fn open(config: Option<PathBuf>, snapshot: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<Self> {
        let config = match &config {
            Some(path) => StoreConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => StoreConfig::default(),
        };
        let registry = Arc::new(InMemoryRegistry::from_config(&config)?);

        let snapshot = snapshot.or(config.snapshot);
        if let Some(path) = snapshot.as_ref().filter(|p| p.exists()) {
            let data = RegistrySnapshot::load(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            registry.apply_snapshot(&data)?;
            debug!(path = %path.display(), "snapshot loaded");
        }

        let store = DatabaseDataStore::with_default_deserializer(registry.clone(), registry.events().clone());
        Ok(Self {
            registry,
            store,
            snapshot,
            format,
        })
    }

    /// Write the registry back to the snapshot file, if there is one.
    fn persist(&self) -> anyhow::Result<()> {
        match &self.snapshot {
            Some(path) => {
                self.registry
                    .snapshot()?
                    .save(path)
                    .with_context(|| format!("failed to write snapshot {}", path.display()))?;
                info!(path = %path.display(), "snapshot written");
            }
            None => debug!("no snapshot configured, changes are not persisted"),
        }
        Ok(())
    }

    fn find_by_id(&self, db: &str, id: &str) -> anyhow::Result<Box<dyn ItemData>> {
        let id = ItemId::parse(id)?;
        match self.store.get_by_id(id, db)? {
            Some(item) => Ok(item),
            None => bail!("item {id} not found in database {db}"),
        }
    }

    fn print_items(&self, items: &[Box<dyn ItemData>]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let payload: Vec<ProxyItem> = items.iter().map(|i| ProxyItem::from_item(i.as_ref())).collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            OutputFormat::Text => {
                if items.is_empty() {
                    println!("{}", "No items.".dimmed());
                }
                for item in items {
                    print_item_line(item.as_ref());
                }
            }
        }
        Ok(())
    }

    fn print_status(&self, ok: bool, message: &str) {
        match self.format {
            OutputFormat::Json => println!("{}", json!({ "ok": ok, "message": message })),
            OutputFormat::Text if ok => println!("{} {message}", "✓".green().bold()),
            OutputFormat::Text => println!("{} {message}", "✗".red().bold()),
        }
    }
}

fn print_item_line(item: &dyn ItemData) {
    println!(
        "{}  {}  {}",
        item.path().to_string().bold(),
        item.id().to_string().dimmed(),
        format!("template {}", item.template_id().short_id()).cyan()
    );
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let session = Session::open(cli.config, cli.snapshot, cli.format)?;
    match cli.command {
        Command::Databases => cmd_databases(&session),
        Command::Get(args) => cmd_get(&session, args),
        Command::Find(args) => cmd_find(&session, args),
        Command::Children(args) => cmd_children(&session, args),
        Command::Save(args) => cmd_save(&session, args),
        Command::Remove(args) => cmd_remove(&session, args),
        Command::ResetTemplates => cmd_reset_templates(&session),
        Command::Check(args) => cmd_check(&session, args),
        Command::Move(args) => cmd_move(&session, args),
    }
}

fn cmd_databases(session: &Session) -> anyhow::Result<()> {
    let names = session.store.get_database_names()?;
    match session.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            for name in &names {
                let count = session
                    .registry
                    .get(name)
                    .map(|db| db.len())
                    .transpose()?
                    .unwrap_or_default();
                println!("{}  {}", name.bold(), format!("{count} items").dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_get(session: &Session, args: GetArgs) -> anyhow::Result<()> {
    let metadata = match (&args.id, &args.path) {
        (Some(id), _) => ItemMetadata::from_id(ItemId::parse(id)?),
        (None, Some(path)) => ItemMetadata::from_path(path.as_str()),
        (None, None) => bail!("either --id or --path is required"),
    };
    match session.store.get_by_metadata(&metadata, &args.db)? {
        Some(item) => session.print_items(&[item]),
        None => bail!("no item matched in database {}", args.db),
    }
}

fn cmd_find(session: &Session, args: FindArgs) -> anyhow::Result<()> {
    let items = session.store.get_by_path(&args.path, &args.db)?;
    session.print_items(&items)
}

fn cmd_children(session: &Session, args: ChildrenArgs) -> anyhow::Result<()> {
    let parent = session.find_by_id(&args.db, &args.id)?;
    let children = parent.children()?;
    session.print_items(&children)
}

fn cmd_save(session: &Session, args: SaveArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let item = ProxyItem::from_json(&text)
        .with_context(|| format!("{} is not a valid item payload", args.file.display()))?;
    session.store.save(&item)?;
    session.persist()?;
    session.print_status(true, &format!("saved {} to {}", item.path, item.database_name));
    Ok(())
}

fn cmd_remove(session: &Session, args: RemoveArgs) -> anyhow::Result<()> {
    let target = session.find_by_id(&args.db, &args.id)?;

    let removed = if args.bulk {
        let _bulk = session.registry.events().disable();
        session.store.remove(target.as_ref())?
    } else {
        session.store.remove(target.as_ref())?
    };

    if !removed {
        bail!("item {} was removed from database {} concurrently", target.id(), args.db);
    }
    session.persist()?;
    session.print_status(true, &format!("recycled {} in {}", target.path(), args.db));
    Ok(())
}

fn cmd_reset_templates(session: &Session) -> anyhow::Result<()> {
    session.store.reset_template_engine()?;
    session.print_status(true, "template engines reset");
    Ok(())
}

fn cmd_check(session: &Session, args: CheckArgs) -> anyhow::Result<()> {
    let mut findings = Vec::new();
    session
        .store
        .check_consistency(&args.db, args.fix, &mut |message: &str| findings.push(message.to_string()))?;

    match session.format {
        OutputFormat::Json => println!("{}", json!({ "database": args.db, "findings": findings })),
        OutputFormat::Text if findings.is_empty() => {
            println!("{} {} is consistent", "✓".green().bold(), args.db.bold())
        }
        OutputFormat::Text => {
            for finding in &findings {
                println!("  {} {finding}", "!".yellow().bold());
            }
        }
    }
    Ok(())
}

fn cmd_move(session: &Session, args: MoveArgs) -> anyhow::Result<()> {
    let current = session.find_by_id(&args.db, &args.id)?;
    let mut moved = ProxyItem::from_item(current.as_ref());
    moved.set_path(ItemPath::new(&args.to)?);
    session
        .store
        .move_or_rename_item(&moved, current.path().as_str())
        .with_context(|| format!("cannot move {} to {}", current.path(), moved.path))?;
    session.persist()?;
    session.print_status(true, &format!("moved {} to {}", current.path(), moved.path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_data::DataStoreError;
    use arbor_store::{Database, EventState};

    fn session_in(dir: &tempfile::TempDir) -> Session {
        Session::open(None, Some(dir.path().join("store.json")), OutputFormat::Json).unwrap()
    }

    fn write_item(dir: &tempfile::TempDir, json: serde_json::Value) -> PathBuf {
        let path = dir.path().join("item.json");
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    const HOME: &str = "6f1a5a6e-0e1b-4a0b-9c57-2c2a8e7e0b11";

    fn save_home(session: &Session, dir: &tempfile::TempDir) {
        let file = write_item(
            dir,
            json!({ "id": HOME, "database_name": "master", "name": "home", "path": "/home" }),
        );
        cmd_save(session, SaveArgs { file }).unwrap();
    }

    #[test]
    fn save_persists_to_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        save_home(&session_in(&dir), &dir);

        let reopened = session_in(&dir);
        let item = reopened.find_by_id("master", HOME).unwrap();
        assert_eq!(item.path().as_str(), "/home");
    }

    #[test]
    fn bulk_remove_recycles_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(&dir);
        save_home(&session, &dir);

        cmd_remove(
            &session,
            RemoveArgs {
                db: "master".into(),
                id: HOME.into(),
                bulk: true,
            },
        )
        .unwrap();
        assert!(!session.registry.events().events_disabled());

        let reopened = session_in(&dir);
        assert!(reopened.find_by_id("master", HOME).is_err());
        let master = reopened.registry.get("master").unwrap();
        assert_eq!(master.recycle_bin().unwrap().len(), 1);
    }

    #[test]
    fn removing_an_unknown_item_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(&dir);
        save_home(&session, &dir);

        let missing = RemoveArgs {
            db: "master".into(),
            id: "00000000-0000-0000-0000-0000000000ff".into(),
            bulk: false,
        };
        let err = cmd_remove(&session, missing).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let twice = || RemoveArgs {
            db: "master".into(),
            id: HOME.into(),
            bulk: false,
        };
        cmd_remove(&session, twice()).unwrap();
        assert!(cmd_remove(&session, twice()).is_err());
    }

    #[test]
    fn move_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(&dir);
        save_home(&session, &dir);

        let err = cmd_move(
            &session,
            MoveArgs {
                db: "master".into(),
                id: HOME.into(),
                to: "/start".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataStoreError>(),
            Some(DataStoreError::Unsupported { .. })
        ));
        let master = session.registry.get("master").unwrap();
        let home = master.get_item(&ItemId::parse(HOME).unwrap()).unwrap().unwrap();
        assert_eq!(home.name(), "home");
    }

    #[test]
    fn missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(&dir);
        assert_eq!(session.registry.get("web").unwrap().len().unwrap(), 0);
        assert!(cmd_get(
            &session,
            GetArgs {
                db: "web".into(),
                id: None,
                path: Some("/home".into()),
            },
        )
        .is_err());
    }
}
