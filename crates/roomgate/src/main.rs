use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use roomgate::http::AppState;
use roomgate::{
    initialize_gate, resolve_service_account, RegistrationFileRegistry, RootConfig, RootError,
};
use roomgate_policy::{AccessDecisionEngine, DiscardHandoff, RoomCreationRequest, Verdict};

/// Roomgate: room-creation gate for a Matrix homeserver
///
/// Denies user-initiated room creation and redirects direct messages
/// to the platform adapter.
#[derive(Parser, Debug)]
#[command(name = "roomgate", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Homeserver domain
        #[arg(long)]
        server_name: Option<String>,

        /// Application-service registration file to search for the adapter
        #[arg(long = "registration-file")]
        registration_files: Vec<PathBuf>,
    },

    /// Start the host adapter HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// Port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve and print the adapter service account
    Resolve,

    /// Evaluate one room-creation request offline
    Check {
        /// Full user id of the requester
        #[arg(long)]
        requester: String,

        /// Mark the room as a direct message
        #[arg(long)]
        direct: bool,

        /// Invitee user id (repeatable)
        #[arg(long)]
        invite: Vec<String>,

        /// Treat the requester as a server admin
        #[arg(long)]
        admin: bool,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("roomgate=debug,roomgate_policy=debug,roomgate_notify=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roomgate=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RootConfig, RootError> {
    match path {
        Some(p) => RootConfig::load(p),
        None => {
            let default_path = RootConfig::default_config_path();
            RootConfig::load(&default_path)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli).await;
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RootError> {
    match cli.command {
        Commands::Init {
            server_name,
            registration_files,
        } => cmd_init(cli.config.as_ref(), server_name, registration_files),
        Commands::Serve { bind, port } => cmd_serve(cli.config.as_ref(), bind, port).await,
        Commands::Resolve => cmd_resolve(cli.config.as_ref()),
        Commands::Check {
            requester,
            direct,
            invite,
            admin,
        } => cmd_check(cli.config.as_ref(), requester, direct, invite, admin),
    }
}

fn cmd_init(
    config_path: Option<&PathBuf>,
    server_name: Option<String>,
    registration_files: Vec<PathBuf>,
) -> Result<(), RootError> {
    let mut config = load_config(config_path)?;

    if let Some(name) = server_name {
        config.server_name = name;
    }
    if !registration_files.is_empty() {
        config.registration_files = registration_files;
    }
    config.validate()?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(RootConfig::default_config_path);
    config.save(&save_path)?;

    println!("Roomgate configuration written.");
    println!("  Server name:   {}", config.server_name);
    println!("  Registrations: {}", config.registration_files.len());
    println!("  Config:        {}", save_path.display());

    Ok(())
}

async fn cmd_serve(
    config_path: Option<&PathBuf>,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<(), RootError> {
    let mut config = load_config(config_path)?;

    if let Some(bind) = bind {
        config.http.bind = bind;
    }
    if let Some(port) = port {
        config.http.port = port;
    }

    let gate = initialize_gate(config)?;
    let bind = gate.config.http.bind.clone();
    let port = gate.config.http.port;

    info!(bind = %bind, port = %port, "starting host adapter");
    roomgate::http::serve(Arc::new(AppState { gate }), &bind, port).await
}

fn cmd_resolve(config_path: Option<&PathBuf>) -> Result<(), RootError> {
    let config = load_config(config_path)?;
    config.validate()?;

    let registry = RegistrationFileRegistry::new(config.registration_files.clone());
    let account = resolve_service_account(&registry, &config.server_name);

    println!("Service account: {}", account.service_user_id());
    println!("Adapter:         {}", account.adapter_endpoint);
    println!(
        "Token:           {}",
        if account.has_secret() { "configured" } else { "absent" }
    );

    Ok(())
}

fn cmd_check(
    config_path: Option<&PathBuf>,
    requester: String,
    direct: bool,
    invite: Vec<String>,
    admin: bool,
) -> Result<(), RootError> {
    let config = load_config(config_path)?;
    config.validate()?;

    let registry = RegistrationFileRegistry::new(config.registration_files.clone());
    let account = resolve_service_account(&registry, &config.server_name);
    let engine = AccessDecisionEngine::new(Arc::new(account), Arc::new(DiscardHandoff))?
        .with_platform_name(config.platform_name.clone())?;

    let mut request = RoomCreationRequest::new(requester).direct(direct).admin(admin);
    for target in invite {
        request = request.invite(target);
    }

    match engine.decide(&request) {
        Verdict::Allow => println!("ALLOW"),
        Verdict::Deny(denial) => {
            println!("DENY {} {}", denial.status, denial.errcode);
            println!("  {}", denial.message);
        }
    }

    Ok(())
}
