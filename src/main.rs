mod cli;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visionsync::config::Config;
use visionsync::journal::Journal;
use visionsync::{FileStore, KeyValueStore, SessionStore};

#[derive(Parser)]
#[command(name = "visionsync", about = "VisionSync account and session store")]
pub struct Args {
    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "VISIONSYNC_DATA_DIR", help = "Account data directory")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "Seed the demo account when no users exist")]
    pub demo: bool,

    #[arg(long, help = "Verbose output (log session transitions)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (log storage access and settings)")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the signed-in account
    Whoami,
    /// Sign out of the current session
    Signout,
    /// List registered accounts
    Users,
}

fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args);

    let mut cfg = if let Some(config_path) = &args.config {
        Config::load_from(config_path)?
    } else {
        Config::load()?
    };

    // CLI overrides
    if let Some(dir) = &args.data_dir {
        cfg.storage.dir = Some(dir.clone());
    }
    if args.demo {
        cfg.auth.seed_demo_user = Some(true);
    }

    if let Err(errors) = cfg.validate() {
        let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(anyhow!("Invalid configuration:\n  {}", lines.join("\n  ")));
    }

    let file_store = FileStore::open(cfg.data_dir())?;
    let data_dir = file_store.dir().to_path_buf();
    let settings = cfg.auth_settings();
    tracing::debug!(data_dir = %data_dir.display(), ?settings, "Resolved settings");

    let storage: Box<dyn KeyValueStore> = Box::new(file_store);
    let mut store = SessionStore::new(storage, settings);
    if let Some(journal_path) = cfg.journal_path() {
        store = store.with_journal(Journal::open(&journal_path)?);
    }

    let ctx = cli::Context {
        args,
        data_dir,
        store,
    };
    cli::run(&ctx)
}
