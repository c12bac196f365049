use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keynote_tracker::cli::{format_announcement, Cli, Commands};
use keynote_tracker::config::{Config, SourcesConfig};
use keynote_tracker::domain::Announcement;
use keynote_tracker::errors::{TrackerError, TrackerResult};
use keynote_tracker::services::{BatchResult, FetchService};
use keynote_tracker::sources::SourceRegistry;
use keynote_tracker::storage::{CacheStore, JsonFileStore};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keynote_tracker=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> TrackerResult<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.sources {
        config.sources_path = path;
    }
    if let Some(path) = cli.cache {
        config.cache_path = path;
    }

    let store = JsonFileStore::new(&config.cache_path);

    match cli.command {
        Some(Commands::Status) => cmd_status(&store),
        Some(Commands::Clear) => cmd_clear(&store),
        command => {
            let sources = SourcesConfig::load_or_init(&config.sources_path)?;
            let registry = SourceRegistry::from_config(&sources);
            let service =
                FetchService::new(registry, store).with_request_delay(config.request_delay);

            match (command, cli.source) {
                (Some(Commands::Refresh), _) => cmd_refresh(&service),
                (Some(Commands::List { source }), _) | (None, Some(source)) => {
                    cmd_list(&service, &source, cli.refresh)
                }
                (Some(Commands::Sources), _) => cmd_sources(&service),
                _ => cmd_show(&service, cli.refresh),
            }
        }
    }
}

fn cmd_show(service: &FetchService<JsonFileStore>, force: bool) -> TrackerResult<()> {
    refresh_if_needed(service, force)?;

    print_announcements(&service.cache().announcements());
    Ok(())
}

fn refresh_if_needed(service: &FetchService<JsonFileStore>, force: bool) -> TrackerResult<()> {
    let cache = service.cache();
    if force || cache.needs_refresh() || cache.announcements().is_empty() {
        cmd_refresh(service)?;
        println!();
    }
    Ok(())
}

fn cmd_refresh(service: &FetchService<JsonFileStore>) -> TrackerResult<()> {
    let result = service.fetch_all(|progress| {
        println!(
            "[{}/{}] Fetching {}...",
            progress.current, progress.total, progress.source
        );
    });

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &BatchResult) {
    println!(
        "\nFetched {} announcements from {} sources.",
        result.total_announcements,
        result.successful.len()
    );

    if !result.failed.is_empty() {
        println!("{} sources failed:", result.failed.len());
        for failed in &result.failed {
            println!("  {} ({}): {}", failed.name, failed.source, failed.error);
        }
    }
}

fn cmd_list(service: &FetchService<JsonFileStore>, source: &str, force: bool) -> TrackerResult<()> {
    if !service.registry().contains(source) {
        return Err(TrackerError::UnknownSource(source.to_string()));
    }

    refresh_if_needed(service, force)?;

    let announcements = service.cache().announcements_by_source(source);
    if announcements.is_empty() {
        println!(
            "No announcements cached for '{}'. Run 'keynote-tracker refresh' to fetch them.",
            source
        );
        return Ok(());
    }

    print_announcements(&announcements);
    Ok(())
}

fn cmd_sources(service: &FetchService<JsonFileStore>) -> TrackerResult<()> {
    let available = service.registry().available();
    if available.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Available sources:\n");
    for info in available {
        println!("  {} - {}", info.key, info.name);
        println!("      {}", info.description);
    }

    Ok(())
}

fn cmd_status(store: &JsonFileStore) -> TrackerResult<()> {
    let status = store.status();

    println!("Cache: {}", store.path().display());
    match status.last_fetch {
        Some(at) => println!("Last fetch: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last fetch: never"),
    }
    println!("Stale: {}", if status.is_stale { "yes" } else { "no" });
    println!("Total announcements: {}", status.total_announcements);

    for (key, meta) in &status.sources {
        println!(
            "  {}: {} announcements (fetched {})",
            key,
            meta.count,
            meta.last_fetch.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

fn cmd_clear(store: &JsonFileStore) -> TrackerResult<()> {
    store.clear()?;
    println!("Cache cleared.");
    Ok(())
}

fn print_announcements(announcements: &[Announcement]) {
    if announcements.is_empty() {
        println!("No announcements.");
        return;
    }

    for announcement in announcements {
        println!("{}\n", format_announcement(announcement));
    }
}
