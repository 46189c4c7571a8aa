//! Refsync - keep a working tree at a remote revision
//!
//! Usage:
//!   refsync checkout --url <URL> --path <DIR> --branch main
//!   refsync checkout --url <URL> --path <DIR> --semver '^1.2'
//!   refsync tags --path <DIR> [--semver EXPR]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refsync_core::checkout::Checkout;
use refsync_core::config::{AuthConfig, RefsyncConfig, load_config};
use refsync_core::git::{ResolvedCommit, TagCatalog};
use refsync_core::options::CheckoutOptions;
use refsync_core::version::{SemverConstraint, select_latest};

#[derive(Parser)]
#[command(name = "refsync")]
#[command(about = "Check out branches, tags, commits and semver ranges from git remotes", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/refsync/refsync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a revision on the remote and check it out
    Checkout(Box<CheckoutArgs>),

    /// List the tags of an already fetched working tree
    Tags {
        /// Working tree directory
        #[arg(long)]
        path: PathBuf,

        /// Also show the tag a semver checkout would select
        #[arg(long)]
        semver: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct CheckoutArgs {
    /// Remote url, or a local repository directory
    #[arg(long)]
    url: Option<String>,

    /// Working tree directory
    #[arg(long)]
    path: Option<PathBuf>,

    /// Branch to track
    #[arg(long, conflicts_with_all = ["tag", "semver", "commit"])]
    branch: Option<String>,

    /// Tag to check out
    #[arg(long, conflicts_with_all = ["semver", "commit"])]
    tag: Option<String>,

    /// Semantic version constraint, e.g. '>=1.2, <2'
    #[arg(long, conflicts_with = "commit")]
    semver: Option<String>,

    /// Full commit id
    #[arg(long)]
    commit: Option<String>,

    /// Revision printed by the previous checkout; skips fetching when unchanged
    #[arg(long)]
    last_revision: Option<String>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long, requires = "username")]
    password: Option<String>,

    /// PEM encoded SSH private key
    #[arg(long)]
    identity_file: Option<PathBuf>,

    /// Session key; derived from url and path when omitted
    #[arg(long)]
    transport_id: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Checkout(args) => run_checkout(cli.config.as_deref(), *args),
        Commands::Tags {
            path,
            semver,
            format,
        } => run_tags(&path, semver.as_deref(), format),
    }
}

fn run_checkout(config_path: Option<&Path>, args: CheckoutArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let format = args.format;
    let resolved = ResolvedCheckout::from_args(config, args)?;
    debug!(
        url = %resolved.url,
        path = %resolved.path.display(),
        "resolved checkout configuration"
    );

    let auth = resolved
        .auth
        .auth_options(&resolved.url, &resolved.path)
        .context("Failed to prepare credentials")?;

    let commit = Checkout::new()
        .run_options(&resolved.options, &resolved.path, &resolved.url, Some(&auth))
        .with_context(|| format!("Checkout of {} failed", resolved.url))?;

    print_commit(&commit, format)
}

/// Configuration with command line overrides applied.
#[derive(Debug)]
struct ResolvedCheckout {
    url: String,
    path: PathBuf,
    options: CheckoutOptions,
    auth: AuthConfig,
}

impl ResolvedCheckout {
    fn from_args(config: RefsyncConfig, args: CheckoutArgs) -> Result<Self> {
        let url = args
            .url
            .or(config.source.url)
            .context("No remote url: pass --url or set source.url")?;
        let path = args
            .path
            .or(config.source.path)
            .context("No working tree: pass --path or set source.path")?;

        let options = config.checkout.merge(CheckoutOptions {
            branch: args.branch,
            tag: args.tag,
            semver: args.semver,
            commit: args.commit,
            last_revision: args.last_revision,
            recurse_submodules: false,
        });
        let auth = config.auth.merge(AuthConfig {
            username: args.username,
            password: args.password,
            identity_file: args.identity_file,
            transport_id: args.transport_id,
        });
        auth.validate()?;

        Ok(Self {
            url: normalize_url(&url)?,
            path,
            options,
            auth,
        })
    }
}

/// Turn a local repository directory into a `file://` url.
fn normalize_url(raw: &str) -> Result<String> {
    let candidate = Path::new(raw);
    if !candidate.is_dir() {
        return Ok(raw.to_string());
    }
    let absolute = candidate
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", candidate.display()))?;
    let url = url::Url::from_directory_path(&absolute)
        .map_err(|_| anyhow::anyhow!("Cannot express {} as a url", absolute.display()))?;
    Ok(url.to_string())
}

fn print_commit(commit: &ResolvedCommit, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if commit.is_partial() {
                println!("Unchanged {} at {}", display_ref(commit), commit.hash);
            } else {
                println!("Checked out {} at {}", display_ref(commit), commit.hash);
                if let Some(author) = &commit.author {
                    println!("  Author:  {} <{}> {}", author.name, author.email, author.when);
                }
                println!("  Message: {}", commit.short_message());
                if commit.signature.is_some() {
                    println!("  Signed:  yes");
                }
            }
            println!("revision: {}", commit.revision());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "commit": commit,
                "revision": commit.revision(),
                "partial": commit.is_partial(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn display_ref(commit: &ResolvedCommit) -> &str {
    if commit.reference.is_empty() {
        "HEAD"
    } else {
        &commit.reference
    }
}

fn run_tags(path: &Path, semver: Option<&str>, format: OutputFormat) -> Result<()> {
    let catalog = TagCatalog::open(path)?;
    let constraint = semver.map(SemverConstraint::parse).transpose()?;
    let selected = constraint
        .as_ref()
        .and_then(|constraint| select_latest(&catalog, constraint));

    match format {
        OutputFormat::Text => {
            if catalog.is_empty() {
                println!("No tags in {}", path.display());
            }
            for entry in &catalog {
                let kind = if entry.annotated { "annotated" } else { "lightweight" };
                println!(
                    "{:<30} {} {:<11} {}",
                    entry.name, entry.commit_id, kind, entry.committed_at
                );
            }
            if let Some(constraint) = &constraint {
                match selected {
                    Some(entry) => println!("\n{} selects {}", constraint, entry.name),
                    None => println!("\nno match found for semver: {}", constraint),
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "tags": catalog.iter().collect::<Vec<_>>(),
                "selected": selected.map(|entry| &entry.name),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
