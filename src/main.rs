//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; setup and dispatch live in the use cases.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use supplier_invoices::adapters::mail::{HttpMailAdapter, MockMailAdapter};
use supplier_invoices::adapters::persistence::local_drive::LocalDrive;
use supplier_invoices::adapters::persistence::run_manifest::RunManifestJson;
use supplier_invoices::adapters::ui::progress::SpinnerProgress;
use supplier_invoices::adapters::ui::tui::TuiInputPort;
use supplier_invoices::ports::{
    ArtifactStore, InputPort, MailGateway, ProgressPort, RunManifestPort, SheetStore,
};
use supplier_invoices::shared::config::AppConfig;
use supplier_invoices::usecases::{NotificationDispatcher, SetupService};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "supplier-invoices", version, about = "Supplier invoice workspace and payment notifications")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the workspace: copy templates, place them, link the forms
    Provision {
        /// Set up again even if a previous run exists
        #[arg(long)]
        yes: bool,
    },
    /// Send payment confirmations for paid, not yet notified invoices
    Notify,
    /// Create demo templates in the local drive and print their ids
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cli = Cli::parse();
    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let drive_path = cfg.drive_file_or_default();
    let drive = Arc::new(
        LocalDrive::open(&drive_path)
            .await
            .map_err(|e| anyhow::anyhow!("open drive {}: {}", drive_path.display(), e))?,
    );
    info!(path = %drive_path.display(), "drive opened");

    if let Some(Command::Seed) = cli.command {
        let seeded = drive
            .seed_templates()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        println!("SUPPLIER_INVOICES_INVOICE_TEMPLATE_ID={}", seeded.invoice_database);
        println!("SUPPLIER_INVOICES_SUPPLIER_TEMPLATE_ID={}", seeded.supplier_database);
        println!("SUPPLIER_INVOICES_DASHBOARD_ID={}", seeded.dashboard);
        return Ok(());
    }

    let store: Arc<dyn ArtifactStore> = Arc::clone(&drive) as Arc<dyn ArtifactStore>;
    let sheets: Arc<dyn SheetStore> = Arc::clone(&drive) as Arc<dyn SheetStore>;
    let manifest: Arc<dyn RunManifestPort> =
        Arc::new(RunManifestJson::new(cfg.manifest_file_or_default()));
    let progress: Arc<dyn ProgressPort> = Arc::new(SpinnerProgress::new());

    let mail: Arc<dyn MailGateway> = if cfg.is_mail_configured() {
        let url = cfg.mail_api_url().unwrap_or_default();
        info!(url = %url, "mail delivery enabled with HTTP mail API");
        Arc::new(HttpMailAdapter::new(
            url,
            cfg.mail_api_key().unwrap_or_default(),
            cfg.mail_from_or_default(),
        ))
    } else {
        warn!("SUPPLIER_INVOICES_MAIL_API_URL / _MAIL_API_KEY not set, using mock mail adapter");
        Arc::new(MockMailAdapter::new())
    };

    // --- Services ---
    let setup = Arc::new(SetupService::new(
        Arc::clone(&store),
        Arc::clone(&sheets),
        Arc::clone(&progress),
        cfg.settings_layout(),
        cfg.workspace_names(),
    ));
    // Column schema is checked here, before any command runs.
    let dispatcher = Arc::new(
        NotificationDispatcher::new(
            Arc::clone(&sheets),
            mail,
            cfg.payment_log_schema(),
            cfg.mail_layout(),
            cfg.failure_policy(),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    let assume_yes = matches!(cli.command, Some(Command::Provision { yes: true }));
    let input_port = TuiInputPort::new(
        setup,
        dispatcher,
        manifest,
        cfg.template_registry(),
        cfg.dashboard_id(),
        cfg.payment_log_id(),
    )
    .assume_yes(assume_yes);

    let result = match cli.command {
        Some(Command::Provision { .. }) => input_port.run_provision().await,
        Some(Command::Notify) => input_port.run_dispatch().await,
        Some(Command::Seed) | None => {
            supplier_invoices::adapters::ui::init_ui();
            input_port.run().await
        }
    };
    result.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
