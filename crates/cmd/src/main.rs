mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_core::{
    backend::{
        InstallAppsFlags, ListAppsFlags, ListDistroUpgradesFlags, RefineCategoriesFlags,
        RefreshMetadataFlags, UninstallAppsFlags, UpdateAppsFlags,
    },
    job::{JobEvent, JobEventSender},
    load_config, validate_config, AppList, AppQuery, Catalog, InstallAppsJob, ListAppsJob,
    ListCategoriesJob, ListDistroUpgradesJob, RefreshMetadataJob, UninstallAppsJob,
    UpdateAppsJob,
};
use catalog_core::query::{DedupeFlags, DeveloperVerifiedType, LicenseType, RefineRequire};

use output::Format;

#[derive(Debug, Parser)]
#[command(name = "catalog-cmd", version, about = "Query and manage the software catalog")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "CATALOG_CONFIG", default_value = "catalog.toml")]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Let backends ask for user interaction
    #[arg(long, global = true)]
    interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List apps matching a query
    ListApps(ListAppsArgs),
    /// List categories with their app counts
    ListCategories,
    /// Install apps by ID
    Install {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Only download, do not apply
        #[arg(long)]
        download_only: bool,
    },
    /// Uninstall apps by ID
    Uninstall {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Update apps by ID, or everything updatable
    Update {
        ids: Vec<String>,
        /// Only download, do not apply
        #[arg(long)]
        download_only: bool,
    },
    /// List available distribution upgrades
    DistroUpgrades,
    /// Refresh backend metadata
    Refresh {
        /// Skip backends refreshed within this many seconds (0 forces a refresh)
        #[arg(long, default_value_t = 0)]
        cache_age: u64,
    },
}

#[derive(Debug, clap::Args)]
struct ListAppsArgs {
    /// Only installed apps
    #[arg(long)]
    installed: bool,
    /// Only apps with an update available
    #[arg(long)]
    for_update: bool,
    /// Category ID, or `parent/child`
    #[arg(long)]
    category: Option<String>,
    /// Match all of these keywords
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    /// Match any of these developers
    #[arg(long = "developer")]
    developers: Vec<String>,
    /// Maximum number of results (0 for no limit)
    #[arg(long, default_value_t = 0)]
    max_results: usize,
    /// Hide apps without a free license
    #[arg(long)]
    foss_only: bool,
    /// Hide apps from unverified developers
    #[arg(long)]
    verified_only: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let format = if cli.json { Format::Json } else { Format::Text };

    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let catalog = Catalog::from_config(&config).context("Failed to set up backends")?;
    info!(backends = ?catalog.backends().names(), "catalog ready");

    let cancellable = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancellable.clone()));

    let (events, events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(events_rx));

    let result = dispatch(&catalog, cli.command, cli.interactive, format, events, &cancellable).await;

    // The last sender went away with the job, so the printer drains and exits.
    let _ = printer.await;
    result
}

async fn dispatch(
    catalog: &Catalog,
    command: Command,
    interactive: bool,
    format: Format,
    events: JobEventSender,
    cancellable: &CancellationToken,
) -> Result<()> {
    match command {
        Command::ListApps(args) => {
            let query = build_query(catalog, &args)?;
            let job = ListAppsJob::new(query, ListAppsFlags { interactive }).with_events(events);
            let apps = catalog.run(job, cancellable).await?;
            output::print_apps(&apps, format)
        }
        Command::ListCategories => {
            let job = ListCategoriesJob::new(RefineCategoriesFlags {
                interactive,
                ..Default::default()
            })
            .with_events(events);
            let categories = catalog.run(job, cancellable).await?;
            output::print_categories(&categories, format)
        }
        Command::Install { ids, download_only } => {
            let apps = resolve(catalog, &ids, cancellable).await?;
            let flags = InstallAppsFlags {
                interactive,
                no_apply: download_only,
                ..Default::default()
            };
            catalog
                .run(InstallAppsJob::new(apps.clone(), flags).with_events(events), cancellable)
                .await?;
            output::print_apps(&apps, format)
        }
        Command::Uninstall { ids } => {
            let apps = resolve(catalog, &ids, cancellable).await?;
            let flags = UninstallAppsFlags {
                interactive,
                ..Default::default()
            };
            catalog
                .run(UninstallAppsJob::new(apps.clone(), flags).with_events(events), cancellable)
                .await?;
            output::print_apps(&apps, format)
        }
        Command::Update { ids, download_only } => {
            let apps = if ids.is_empty() {
                updatable(catalog, cancellable).await?
            } else {
                resolve(catalog, &ids, cancellable).await?
            };
            if apps.is_empty() {
                info!("Nothing to update");
                return output::print_apps(&apps, format);
            }
            let flags = UpdateAppsFlags {
                interactive,
                no_apply: download_only,
                ..Default::default()
            };
            catalog
                .run(UpdateAppsJob::new(apps.clone(), flags).with_events(events), cancellable)
                .await?;
            output::print_apps(&apps, format)
        }
        Command::DistroUpgrades => {
            let job = ListDistroUpgradesJob::new(ListDistroUpgradesFlags { interactive })
                .with_events(events);
            let upgrades = catalog.run(job, cancellable).await?;
            output::print_apps(&upgrades, format)
        }
        Command::Refresh { cache_age } => {
            let job = RefreshMetadataJob::new(
                Duration::from_secs(cache_age),
                RefreshMetadataFlags { interactive },
            )
            .with_events(events);
            catalog.run(job, cancellable).await?;
            info!("Metadata refreshed");
            Ok(())
        }
    }
}

fn build_query(catalog: &Catalog, args: &ListAppsArgs) -> Result<AppQuery> {
    let mut builder = AppQuery::builder()
        .keywords(args.keywords.iter().cloned())
        .developers(args.developers.iter().cloned())
        .max_results(args.max_results)
        .dedupe_flags(DedupeFlags::default_for_callers())
        .sort_func(|a, b| {
            let key = |app: &catalog_core::App| app.name().unwrap_or_default().to_lowercase();
            key(a).cmp(&key(b)).then_with(|| a.id().cmp(b.id()))
        })
        .refine_require_flags([RefineRequire::Version, RefineRequire::Origin].into());

    if args.installed {
        builder = builder.is_installed(true);
    }
    if args.for_update {
        builder = builder.is_for_update(true);
    }
    if let Some(id) = &args.category {
        let category = catalog
            .categories()
            .lookup(id)
            .ok_or_else(|| anyhow!("Unknown category '{}'", id))?;
        builder = builder.category(category);
    }
    if args.foss_only {
        builder = builder.license_type(LicenseType::FossOnly);
    }
    if args.verified_only {
        builder = builder.developer_verified_type(DeveloperVerifiedType::VerifiedOnly);
    }
    Ok(builder.build())
}

/// Look up apps by ID across every backend.
async fn resolve(catalog: &Catalog, ids: &[String], cancellable: &CancellationToken) -> Result<AppList> {
    let query = AppQuery::builder()
        .dedupe_flags(DedupeFlags {
            id: true,
            prefer_installed: true,
            ..DedupeFlags::NONE
        })
        .sort_func(|a, b| a.id().cmp(b.id()))
        .build();
    let known = catalog
        .run(ListAppsJob::new(query, ListAppsFlags::default()), cancellable)
        .await
        .context("Failed to look up apps")?;

    let mut apps = AppList::new();
    for id in ids {
        match known.lookup(id) {
            Some(app) => apps.push(app.clone()),
            None => bail!("No app with ID '{}'", id),
        }
    }
    Ok(apps)
}

async fn updatable(catalog: &Catalog, cancellable: &CancellationToken) -> Result<AppList> {
    let query = AppQuery::builder()
        .is_for_update(true)
        .dedupe_flags(DedupeFlags::default_for_callers())
        .sort_func(|a, b| a.id().cmp(b.id()))
        .build();
    catalog
        .run(ListAppsJob::new(query, ListAppsFlags::default()), cancellable)
        .await
        .context("Failed to list updates")
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<JobEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::Progress(progress) => info!(%progress, "progress"),
            JobEvent::NeedsUserAction {
                backend,
                app,
                action,
            } => warn!(backend = %backend, app = %app.id(), "action required: {}", action),
            JobEvent::Backend { backend, event } => warn!(
                backend = %backend,
                app = ?event.app.as_ref().map(|a| a.id().to_string()),
                "{}",
                event.error
            ),
        }
    }
}

/// Cancel the running job on Ctrl+C.
async fn cancel_on_ctrl_c(cancellable: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("Interrupted, cancelling");
            cancellable.cancel();
        }
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
