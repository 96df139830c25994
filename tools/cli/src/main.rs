//! DocVault CLI - command line interface for document vault operations.
//!
//! Paths given relative are resolved against the vault root. Results are
//! written to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use docvault_vault::{handle_json, DocumentVault, VaultConfig};

#[derive(Parser)]
#[command(name = "docvault")]
#[command(about = "DocVault - Sandboxed document vault")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: user config dir).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Vault root, overriding the configuration and DOCVAULT_ROOT.
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory.
    Ls {
        /// Directory to list (default: vault root).
        dir: Option<PathBuf>,
    },

    /// Print a document.
    Cat {
        /// Document path.
        path: PathBuf,
    },

    /// Replace a document's content.
    Write {
        /// Document path.
        path: PathBuf,

        /// New content (default: read from stdin).
        #[arg(long)]
        content: Option<String>,
    },

    /// Create a folder.
    Mkdir {
        /// Parent directory.
        parent: PathBuf,

        /// Folder name.
        name: String,
    },

    /// Create a document.
    New {
        /// Parent directory.
        parent: PathBuf,

        /// Document name or title.
        name: String,

        /// Initial content (default: scaffolded header).
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a file.
    Rm {
        /// File path.
        path: PathBuf,
    },

    /// Delete a folder and its contents.
    Rmdir {
        /// Folder path.
        path: PathBuf,
    },

    /// Rename an entry within its folder.
    Mv {
        /// Entry path.
        path: PathBuf,

        /// New name.
        new_name: String,
    },

    /// List the most recently created documents.
    Recent {
        /// Directory to search (default: vault root).
        dir: Option<PathBuf>,

        /// Maximum number of documents (default: from configuration).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip documents directly inside the searched directory.
        #[arg(long)]
        exclude_direct: bool,
    },

    /// Check whether a path is inside the vault.
    Check {
        /// Path to check.
        path: PathBuf,
    },

    /// Serve JSON-lines requests on stdin.
    Serve,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "docvault", &mut io::stdout());
        return Ok(());
    }

    let vault = open_vault(cli.config.as_deref(), cli.root).await?;

    match cli.command {
        Commands::Ls { dir } => cmd_ls(&vault, dir).await,
        Commands::Cat { path } => cmd_cat(&vault, &path).await,
        Commands::Write { path, content } => cmd_write(&vault, &path, content).await,
        Commands::Mkdir { parent, name } => cmd_mkdir(&vault, &parent, &name).await,
        Commands::New {
            parent,
            name,
            content,
        } => cmd_new(&vault, &parent, &name, content.as_deref()).await,
        Commands::Rm { path } => cmd_rm(&vault, &path).await,
        Commands::Rmdir { path } => cmd_rmdir(&vault, &path).await,
        Commands::Mv { path, new_name } => cmd_mv(&vault, &path, &new_name).await,
        Commands::Recent {
            dir,
            limit,
            exclude_direct,
        } => cmd_recent(&vault, dir, limit, exclude_direct).await,
        Commands::Check { path } => cmd_check(&vault, &path).await,
        Commands::Serve => cmd_serve(&vault).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load configuration and open the vault.
async fn open_vault(config_path: Option<&Path>, root: Option<PathBuf>) -> Result<DocumentVault> {
    let mut config = VaultConfig::load(config_path)
        .context("Failed to load configuration")?
        .with_env_overrides();
    if let Some(root) = root {
        config.root = Some(root);
    }

    DocumentVault::open(config)
        .await
        .context("Failed to open vault root")
}

/// Current root, required by every command except `serve`.
async fn require_root(vault: &DocumentVault) -> Result<PathBuf> {
    match vault.root().await {
        Some(root) => Ok(root),
        None => bail!("No vault root: pass --root, set DOCVAULT_ROOT or set root in the config file"),
    }
}

/// Resolve a command-line path against the vault root.
async fn resolve(vault: &DocumentVault, path: &Path) -> Result<PathBuf> {
    let root = require_root(vault).await?;
    Ok(resolve_against(&root, path))
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

async fn cmd_ls(vault: &DocumentVault, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => resolve(vault, &dir).await?,
        None => require_root(vault).await?,
    };
    let entries = vault
        .try_list_entries(&dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    print_json(&entries)
}

async fn cmd_cat(vault: &DocumentVault, path: &Path) -> Result<()> {
    let path = resolve(vault, path).await?;
    let text = vault
        .read_document(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    print!("{}", text);
    Ok(())
}

async fn cmd_write(vault: &DocumentVault, path: &Path, content: Option<String>) -> Result<()> {
    let path = resolve(vault, path).await?;
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read content from stdin")?;
            buf
        }
    };

    vault
        .write_document(&path, &content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    print_json(&path)
}

async fn cmd_mkdir(vault: &DocumentVault, parent: &Path, name: &str) -> Result<()> {
    let parent = resolve(vault, parent).await?;
    let created = vault
        .create_folder(&parent, name)
        .await
        .with_context(|| format!("Failed to create folder '{}'", name))?;
    print_json(&created)
}

async fn cmd_new(
    vault: &DocumentVault,
    parent: &Path,
    name: &str,
    content: Option<&str>,
) -> Result<()> {
    let parent = resolve(vault, parent).await?;
    let created = vault
        .create_document(&parent, name, content)
        .await
        .with_context(|| format!("Failed to create document '{}'", name))?;
    print_json(&created)
}

async fn cmd_rm(vault: &DocumentVault, path: &Path) -> Result<()> {
    let path = resolve(vault, path).await?;
    if !vault.delete_file(&path).await {
        bail!("Could not delete {}", path.display());
    }
    print_json(&true)
}

async fn cmd_rmdir(vault: &DocumentVault, path: &Path) -> Result<()> {
    let path = resolve(vault, path).await?;
    if !vault.delete_folder(&path).await {
        bail!("Could not delete folder {}", path.display());
    }
    print_json(&true)
}

async fn cmd_mv(vault: &DocumentVault, path: &Path, new_name: &str) -> Result<()> {
    let path = resolve(vault, path).await?;
    match vault.rename(&path, new_name).await {
        Some(renamed) => print_json(&renamed),
        None => bail!("Could not rename {}", path.display()),
    }
}

async fn cmd_recent(
    vault: &DocumentVault,
    dir: Option<PathBuf>,
    limit: Option<usize>,
    exclude_direct: bool,
) -> Result<()> {
    let dir = match dir {
        Some(dir) => resolve(vault, &dir).await?,
        None => require_root(vault).await?,
    };
    let limit = limit.unwrap_or(vault.config().recent_limit);

    let documents = vault
        .try_list_recent_documents(&dir, limit, exclude_direct)
        .await
        .with_context(|| format!("Failed to search {}", dir.display()))?;
    print_json(&documents)
}

async fn cmd_check(vault: &DocumentVault, path: &Path) -> Result<()> {
    let path = resolve(vault, path).await?;
    print_json(&vault.is_safe(&path).await)
}

/// Answer one JSON request per stdin line until EOF.
async fn cmd_serve(vault: &DocumentVault) -> Result<()> {
    info!("Serving JSON-lines requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_json(vault, &line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    debug!("Input closed, stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recent() {
        let cli = Cli::try_parse_from([
            "docvault",
            "--root",
            "/srv/vault",
            "recent",
            "projects",
            "--limit",
            "5",
            "--exclude-direct",
        ])
        .unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("/srv/vault")));
        match cli.command {
            Commands::Recent {
                dir,
                limit,
                exclude_direct,
            } => {
                assert_eq!(dir, Some(PathBuf::from("projects")));
                assert_eq!(limit, Some(5));
                assert!(exclude_direct);
            }
            _ => panic!("expected recent"),
        }
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        assert!(Cli::try_parse_from(["docvault", "recent", "--limit", "-1"]).is_err());
    }

    #[test]
    fn test_resolve_against_root() {
        let root = Path::new("/srv/vault");
        assert_eq!(
            resolve_against(root, Path::new("ws/a.md")),
            PathBuf::from("/srv/vault/ws/a.md")
        );
        assert_eq!(resolve_against(root, Path::new("/etc")), PathBuf::from("/etc"));
    }

    #[tokio::test]
    async fn test_open_vault_with_root_flag() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("config.json");
        std::fs::write(&config, r#"{"recent_limit": 4}"#).unwrap();

        let vault = open_vault(Some(&config), Some(temp.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(vault.config().recent_limit, 4);
        assert!(vault.root().await.is_some());
    }
}
