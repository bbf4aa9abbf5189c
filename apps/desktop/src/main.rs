use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    render::render_view, BearerToken, CardActions, CollectionController, HttpCharacterApi,
    Operation, SessionAccessor,
};
use shared::{
    domain::CharacterId,
    protocol::{CharacterForm, FormImage},
};
use storage::{KeyValueStore, MemoryStore, Storage};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "fighters", about = "Browse and manage fighting characters")]
struct Args {
    /// Config file; defaults to ./client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_origin: Option<String>,
    #[arg(long)]
    store_url: Option<String>,
    /// Accept self-signed TLS certificates.
    #[arg(long)]
    insecure: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every character.
    List,
    /// Delete a character, then show the remaining ones.
    Delete { id: i64 },
    /// Print where a character is edited.
    Edit { id: i64 },
    /// Create a character.
    Create(CreateArgs),
    /// Manage the stored bearer token.
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(ClapArgs, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    strength: f64,
    #[arg(long)]
    speed: f64,
    #[arg(long)]
    durability: f64,
    #[arg(long)]
    power: f64,
    #[arg(long)]
    combat: f64,
    /// Accepted for parity with the web form; not uploaded.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Store a token issued by the backend.
    Set { token: String },
    Clear,
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_origin) = args.api_origin {
        settings.api_origin = api_origin;
    }
    if let Some(store_url) = args.store_url {
        settings.store_url = store_url;
    }
    if args.insecure {
        settings.accept_invalid_certs = true;
    }

    run(&settings, args.command).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_store(settings: &Settings) -> Result<Storage> {
    let storage = Storage::new(&settings.store_url)
        .await
        .with_context(|| format!("failed to open session store '{}'", settings.store_url))?;
    storage
        .health_check()
        .await
        .with_context(|| format!("session store '{}' is not usable", settings.store_url))?;
    Ok(storage)
}

async fn run_session_command(settings: &Settings, command: SessionCommand) -> Result<ExitCode> {
    let accessor = SessionAccessor::new(Arc::new(open_store(settings).await?));

    match command {
        SessionCommand::Set { token } => {
            let token = BearerToken::new(token).ok_or_else(|| anyhow!("token must not be blank"))?;
            accessor.store_token(&token).await?;
            println!("Signed in.");
        }
        SessionCommand::Clear => {
            accessor.clear().await?;
            println!("Signed out.");
        }
        SessionCommand::Status => {
            if accessor.resolve().await.is_authenticated() {
                println!("Signed in.");
            } else {
                println!("Anonymous (read-only).");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn build_controller(settings: &Settings) -> Result<CollectionController<HttpCharacterApi>> {
    // Viewing never fails on storage: an unreadable store means anonymous.
    let store: Arc<dyn KeyValueStore> = match open_store(settings).await {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "session store unavailable; continuing anonymously");
            Arc::new(MemoryStore::new())
        }
    };
    let session = SessionAccessor::new(store).resolve().await;

    let api = HttpCharacterApi::with_options(&settings.api_origin, &settings.http_options())?;
    Ok(CollectionController::new(api, session))
}

async fn run(settings: &Settings, command: Command) -> Result<ExitCode> {
    match command {
        Command::Session { command } => run_session_command(settings, command).await,
        Command::List => {
            let controller = build_controller(settings).await?;
            let loaded = controller.mount().await.is_ok();
            print_view(&controller).await;
            Ok(exit_code(loaded))
        }
        Command::Delete { id } => {
            let controller = build_controller(settings).await?;
            if let Err(err) = controller.mount().await {
                warn!(error = %err, "initial character load failed");
            }
            let actions: &dyn CardActions = &controller;
            let deleted = actions.delete(CharacterId(id)).await.is_ok();
            print_view(&controller).await;
            Ok(exit_code(deleted))
        }
        Command::Edit { id } => {
            let controller = build_controller(settings).await?;
            if !controller.session().is_authenticated() {
                eprintln!("You must be signed in to edit a character.");
                return Ok(ExitCode::FAILURE);
            }
            let actions: &dyn CardActions = &controller;
            println!("{}", actions.edit(CharacterId(id)).route);
            Ok(ExitCode::SUCCESS)
        }
        Command::Create(create) => {
            let controller = build_controller(settings).await?;
            let form = build_form(create).await?;
            match controller.create_one(&form).await {
                Ok(created) => {
                    println!("Created fighter #{} {}.", created.id, created.name);
                    if form.image.is_some() {
                        println!("Note: the image was not uploaded.");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", err.user_message(Operation::Create));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

async fn build_form(create: CreateArgs) -> Result<CharacterForm> {
    let image = match create.image {
        Some(path) => Some(FormImage::Bytes(
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read image '{}'", path.display()))?,
        )),
        None => None,
    };

    Ok(CharacterForm {
        nom: create.name,
        image,
        force: create.strength,
        vitesse: create.speed,
        endurance: create.durability,
        power: create.power,
        combat: create.combat,
    })
}

async fn print_view(controller: &CollectionController<HttpCharacterApi>) {
    let snapshot = controller.snapshot().await;
    let view = render_view(&snapshot, controller.session(), controller.api().api_origin());
    print!("{view}");
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
