//! Marksync CLI - Command line interface for bookmark snapshot operations.
//!
//! The local bookmark forest lives in a JSON file (the same wire shape a
//! snapshot carries in `bookmarkTree`); the remote snapshot store is a
//! directory. Backup captures the file into a new timestamped snapshot,
//! restore merges a snapshot back into the file.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use marksync_bookmarks::{count_nodes, flatten, parse_forest, BookmarkStore, MemoryStore, TreeNode};
use marksync_storage::LocalDirTransport;
use marksync_sync::{RemoteConfig, RestoreMode, SnapshotStore, SyncEngine};

/// Roots seeded into a destination file that does not exist yet.
const DEFAULT_ROOTS: [&str; 3] = ["Bookmarks bar", "Other bookmarks", "Mobile bookmarks"];

#[derive(Parser)]
#[command(name = "marksync")]
#[command(about = "Marksync - bookmark tree backup and restore")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Only add missing nodes.
    Incremental,
    /// Clear matched top folders before merging.
    Overwrite,
}

impl From<Mode> for RestoreMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Incremental => RestoreMode::Incremental,
            Mode::Overwrite => RestoreMode::Overwrite,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the bookmark file as a new snapshot.
    Backup {
        /// Bookmark forest JSON file.
        #[arg(short, long)]
        bookmarks: PathBuf,

        /// Snapshot directory (defaults to the user data dir).
        #[arg(short, long)]
        remote: Option<PathBuf>,
    },

    /// Merge a snapshot into the bookmark file.
    Restore {
        /// Bookmark forest JSON file; created if missing.
        #[arg(short, long)]
        bookmarks: PathBuf,

        /// Snapshot directory (defaults to the user data dir).
        #[arg(short, long)]
        remote: Option<PathBuf>,

        /// Snapshot file name (defaults to the newest backup).
        #[arg(short, long)]
        name: Option<String>,

        /// Restore mode.
        #[arg(short, long, value_enum, default_value_t = Mode::Incremental)]
        mode: Mode,
    },

    /// List snapshots, newest first.
    List {
        /// Snapshot directory (defaults to the user data dir).
        #[arg(short, long)]
        remote: Option<PathBuf>,
    },

    /// Delete one snapshot by name.
    Delete {
        /// Snapshot file name.
        name: String,

        /// Snapshot directory (defaults to the user data dir).
        #[arg(short, long)]
        remote: Option<PathBuf>,
    },

    /// Show statistics for a bookmark file.
    Info {
        /// Bookmark forest JSON file.
        #[arg(short, long)]
        bookmarks: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Backup { bookmarks, remote } => cmd_backup(&bookmarks, remote).await,
        Commands::Restore {
            bookmarks,
            remote,
            name,
            mode,
        } => cmd_restore(&bookmarks, remote, name.as_deref(), mode.into()).await,
        Commands::List { remote } => cmd_list(remote).await,
        Commands::Delete { name, remote } => cmd_delete(&name, remote).await,
        Commands::Info { bookmarks } => cmd_info(&bookmarks),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "marksync",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

fn remote_dir(remote: Option<PathBuf>) -> PathBuf {
    remote.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("marksync")
            .join("remote")
    })
}

fn snapshot_store(remote: Option<PathBuf>) -> Result<SnapshotStore<LocalDirTransport>> {
    let transport = LocalDirTransport::new(remote_dir(remote))?;
    Ok(SnapshotStore::new(
        Arc::new(transport),
        RemoteConfig::default(),
    ))
}

fn load_forest(path: &Path) -> Result<Vec<TreeNode>> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read bookmark file {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse bookmark file {}", path.display()))
}

fn save_forest(path: &Path, forest: &[TreeNode]) -> Result<()> {
    let data = serde_json::to_vec_pretty(forest)?;
    std::fs::write(path, data)
        .with_context(|| format!("failed to write bookmark file {}", path.display()))
}

fn open_store(path: &Path) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    if path.exists() {
        store.seed_forest(load_forest(path)?);
    } else {
        for root in DEFAULT_ROOTS {
            store.add_root_folder(root);
        }
    }
    Ok(store)
}

async fn cmd_backup(bookmarks: &Path, remote: Option<PathBuf>) -> Result<()> {
    let store = MemoryStore::new();
    store.seed_forest(load_forest(bookmarks)?);

    let transport = LocalDirTransport::new(remote_dir(remote))?;
    let engine = SyncEngine::new(
        Arc::new(store),
        Arc::new(transport),
        RemoteConfig::default(),
    );

    let name = engine.backup().await?;
    println!("Backup written: {}", name);
    Ok(())
}

async fn cmd_restore(
    bookmarks: &Path,
    remote: Option<PathBuf>,
    name: Option<&str>,
    mode: RestoreMode,
) -> Result<()> {
    let store = Arc::new(open_store(bookmarks)?);

    let transport = LocalDirTransport::new(remote_dir(remote))?;
    let engine = SyncEngine::new(store.clone(), Arc::new(transport), RemoteConfig::default());

    let report = engine.restore(name, mode).await?;
    save_forest(bookmarks, &store.tree().await?)?;

    println!("Added {} nodes", report.added);
    if report.removed > 0 {
        println!("Removed {} nodes while clearing", report.removed);
    }
    for error in &report.errors {
        eprintln!("warning: '{}' failed: {}", error.title, error.message);
    }
    Ok(())
}

async fn cmd_list(remote: Option<PathBuf>) -> Result<()> {
    let store = snapshot_store(remote)?;
    let backups = store.list_backups().await?;

    if backups.is_empty() {
        println!("No backups found");
        return Ok(());
    }
    for backup in backups {
        println!(
            "{}  {:>8} bytes  {}",
            backup.name,
            backup.size_bytes,
            backup.last_modified.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

async fn cmd_delete(name: &str, remote: Option<PathBuf>) -> Result<()> {
    let store = snapshot_store(remote)?;
    store.delete_backup(name).await?;
    println!("Deleted {}", name);
    Ok(())
}

fn cmd_info(bookmarks: &Path) -> Result<()> {
    let forest = parse_forest(load_forest(bookmarks)?);
    let counts = count_nodes(&forest);

    println!(
        "{} folders, {} bookmarks ({} nodes)",
        counts.folders,
        counts.bookmarks,
        counts.total()
    );
    for flat in flatten(&forest) {
        if flat.folder_path.is_empty() {
            println!("  {} <{}>", flat.title, flat.url);
        } else {
            println!("  {}/{} <{}>", flat.folder_path, flat.title, flat.url);
        }
    }
    Ok(())
}
