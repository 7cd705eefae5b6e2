use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use retreat_registration::application::orchestrator::{
    RegistrationOrchestrator, ReturnOutcome, SubmissionOutcome,
};
use retreat_registration::application::session::SessionSlot;
use retreat_registration::application::store::RegistrationStore;
use retreat_registration::config::RegistrationConfig;
use retreat_registration::domain::form::FormSnapshot;
use retreat_registration::domain::ports::{NotifierHandle, StorageHandle};
use retreat_registration::domain::validation::FieldStates;
use retreat_registration::infrastructure::in_memory::InMemoryStorage;
use retreat_registration::infrastructure::relay::RelayNotifier;
use retreat_registration::interfaces::csv::registration_writer::RegistrationWriter;
use retreat_registration::interfaces::presenter::ConsolePresenter;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file overriding the built-in event settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Mail relay endpoint for confirmation emails
    #[arg(long, global = true)]
    relay_url: Option<String>,

    /// Also print screen-reader announcements
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a registration form (JSON)
    Register { form: PathBuf },
    /// Handle the return from the hosted payment page
    Return { url: String },
    /// Print retained registrations as CSV
    Export,
    /// Discard the in-flight registration
    Reset,
}

#[cfg(feature = "storage-rocksdb")]
fn open_storage(db_path: Option<&Path>) -> Result<(StorageHandle, StorageHandle)> {
    use retreat_registration::infrastructure::rocksdb::RocksDBStorage;

    match db_path {
        Some(path) => {
            let (persistent, session) = RocksDBStorage::open(path).into_diagnostic()?;
            Ok((Arc::new(persistent), Arc::new(session)))
        }
        None => Ok(in_memory_storage()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_storage(db_path: Option<&Path>) -> Result<(StorageHandle, StorageHandle)> {
    use tracing::warn;

    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_storage())
}

fn in_memory_storage() -> (StorageHandle, StorageHandle) {
    (
        Arc::new(InMemoryStorage::new()),
        Arc::new(InMemoryStorage::new()),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RegistrationConfig::load(path).into_diagnostic()?,
        None => RegistrationConfig::default(),
    };
    if let Some(relay_url) = cli.relay_url {
        config.relay_url = Some(relay_url);
    }

    let (persistent, session) = open_storage(cli.db_path.as_deref())?;
    let store = RegistrationStore::with_capacity(persistent, config.max_records);

    let notifier: Option<NotifierHandle> = match &config.relay_url {
        Some(endpoint) => Some(Arc::new(
            RelayNotifier::new(endpoint, config.admin_email.clone(), config.event.clone())
                .into_diagnostic()?,
        )),
        None => None,
    };

    let orchestrator = RegistrationOrchestrator::new(
        config,
        store,
        SessionSlot::new(session),
        notifier,
        Arc::new(ConsolePresenter::new(cli.verbose)),
    );

    match cli.command {
        Command::Register { form } => register(&orchestrator, &form).await,
        Command::Return { url } => {
            match orchestrator.handle_return(&url).await.into_diagnostic()? {
                ReturnOutcome::NoPendingRegistration => println!("No pending registration."),
                ReturnOutcome::AwaitingPayment => {
                    println!("Payment not confirmed yet. Registration remains pending.")
                }
                ReturnOutcome::Completed { .. } => {}
            }
            Ok(())
        }
        Command::Export => {
            let registrations = orchestrator.store().registrations().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = RegistrationWriter::new(stdout.lock());
            writer.write_registrations(&registrations).into_diagnostic()?;
            Ok(())
        }
        Command::Reset => orchestrator.reset().await.into_diagnostic(),
    }
}

async fn register(orchestrator: &RegistrationOrchestrator, form_path: &Path) -> Result<()> {
    let file = File::open(form_path).into_diagnostic()?;
    let form: FormSnapshot = serde_json::from_reader(file).into_diagnostic()?;

    if let (Some(method), Some(amount)) = (form.selected_method(), form.parsed_amount()) {
        println!("{}", orchestrator.payment_instructions(method, amount));
    }

    let mut fields = FieldStates::new();
    match orchestrator.submit(&form, &mut fields).await.into_diagnostic()? {
        SubmissionOutcome::Invalid(report) => {
            for field in fields.invalid_fields() {
                eprintln!("  {}: {}", field.id(), field.message());
            }
            Err(miette!(
                "registration rejected: {} field(s) need attention",
                report.error_count()
            ))
        }
        SubmissionOutcome::Redirect { url, .. } => {
            println!("Redirect: {}", url);
            Ok(())
        }
        SubmissionOutcome::Completed(_) => Ok(()),
    }
}
