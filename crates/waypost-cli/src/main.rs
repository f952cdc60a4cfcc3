//! `waypost` – command-line entry point for the wayfinding assistant
//! edge backend.
//!
//! Commands:
//!
//! 1. `waypost seed [--db PATH]` – initialise the store, load the bundled
//!    sample catalog and promotions, and run a few verification queries.
//! 2. `waypost ask "<query>"` – one-shot guest interaction through the
//!    full service (intent routing, two-tier lookup, telemetry).
//! 3. `waypost sync <file.json>` – apply a sync payload from a file and
//!    print the report.
//! 4. `waypost stats` – print cache statistics and the current catalog
//!    version.
//!
//! Configuration is read from `waypost.toml` (path overridable via
//! `WAYPOST_CONFIG`); every field has a default.

mod config;
mod sample;

use chrono::Utc;
use colored::Colorize;
use waypost_runtime::{EdgeService, ServiceConfig};
use waypost_types::{InteractionRequest, SyncPayload};

#[tokio::main]
async fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set WAYPOST_LOG_FORMAT=json to emit newline-delimited JSON logs.
    // User-facing output still uses println! for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("WAYPOST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let exit_code = match args.first().map(String::as_str) {
        Some("seed") => cmd_seed(&args[1..]).await,
        Some("ask") => cmd_ask(&args[1..]).await,
        Some("sync") => cmd_sync(&args[1..]).await,
        Some("stats") => cmd_stats().await,
        Some("help") | None => {
            print_usage();
            0
        }
        Some(other) => {
            eprintln!("{} unknown command `{}`", "error:".red().bold(), other);
            print_usage();
            2
        }
    };
    std::process::exit(exit_code);
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

async fn cmd_seed(args: &[String]) -> i32 {
    let mut service_config = load_service_config();
    if let Some(db) = flag_value(args, "--db") {
        service_config.db_path = db.into();
    }

    let mut service = match EdgeService::open(service_config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };

    let payload = SyncPayload {
        version: format!("seed-{}", Utc::now().format("%Y%m%d%H%M%S")),
        timestamp: Utc::now(),
        items: Some(sample::sample_catalog()),
        promotions: Some(sample::sample_promotions()),
        store_config: None,
    };

    match service.apply_sync(payload) {
        Ok(report) => {
            println!(
                "{} {} items, {} promotions (version {})",
                "✓ seeded".green().bold(),
                report.items_updated,
                report.promos_updated,
                report.accepted_version.bold()
            );
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    }

    println!("\n  Verification queries:");
    for query in sample::VERIFY_QUERIES {
        let hits = service.search(query, 3);
        match hits.first() {
            Some(top) => println!(
                "    {:<14} → {} ({})",
                query.bold(),
                top.name,
                top.location.dimmed()
            ),
            None => println!("    {:<14} → {}", query.bold(), "no results".yellow()),
        }
    }

    service.shutdown().await;
    0
}

async fn cmd_ask(args: &[String]) -> i32 {
    let query = args.join(" ");
    if query.trim().is_empty() {
        eprintln!("{} usage: waypost ask \"<query>\"", "error:".red().bold());
        return 2;
    }

    let service = match EdgeService::open(load_service_config()) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };

    let response = service
        .interact(InteractionRequest {
            query,
            session_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        })
        .await;

    println!("{}", response.response.bold());
    println!(
        "  {}",
        format!(
            "tool={} cache_hit={} latency={:.1}ms",
            response.tool_used.as_deref().unwrap_or("-"),
            response.cache_hit,
            response.latency_ms
        )
        .dimmed()
    );

    service.shutdown().await;
    0
}

async fn cmd_sync(args: &[String]) -> i32 {
    let Some(path) = args.first() else {
        eprintln!("{} usage: waypost sync <file.json>", "error:".red().bold());
        return 2;
    };

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("{} cannot read {}: {}", "error:".red().bold(), path, e);
            return 1;
        }
    };
    let payload: SyncPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("{} malformed payload: {}", "error:".red().bold(), e);
            return 1;
        }
    };

    let mut service = match EdgeService::open(load_service_config()) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };

    match service.apply_sync(payload) {
        Ok(report) => {
            println!(
                "{} version {} ({} items, {} promotions)",
                "✓ synced".green().bold(),
                report.accepted_version.bold(),
                report.items_updated,
                report.promos_updated
            );
            service.shutdown().await;
            0
        }
        Err(e) => {
            eprintln!("{} sync failed: {}", "error:".red().bold(), e);
            service.shutdown().await;
            1
        }
    }
}

async fn cmd_stats() -> i32 {
    let service = match EdgeService::open(load_service_config()) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };

    let cache = service.cache_stats();
    println!("{}", "Volatile cache".bold());
    println!("  size      {} / {}", cache.size, cache.max_size);
    println!("  hits      {}", cache.hits);
    println!("  misses    {}", cache.misses);
    println!("  hit rate  {:.2}%", cache.hit_rate_pct);

    println!("{}", "Catalog".bold());
    match service.catalog_size() {
        Ok(count) => println!("  records   {count}"),
        Err(e) => println!("  records   {} ({e})", "unavailable".yellow()),
    }
    match service.catalog_version() {
        Ok(Some(version)) => println!("  version   {version}"),
        Ok(None) => println!("  version   {}", "never synced".yellow()),
        Err(e) => println!("  version   {} ({e})", "unavailable".yellow()),
    }

    service.shutdown().await;
    0
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_service_config() -> ServiceConfig {
    match config::load() {
        Ok(Some(cfg)) => cfg.service_config(),
        Ok(None) => {
            let cfg = config::Config::default();
            if let Err(e) = config::save(&cfg) {
                tracing::warn!(error = %e, "could not write default waypost.toml");
            } else {
                println!(
                    "  Wrote default config to {}",
                    config::config_path().display().to_string().bold()
                );
            }
            cfg.service_config()
        }
        Err(e) => {
            eprintln!("{} {} – using defaults", "config error:".red(), e);
            config::Config::default().service_config()
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_usage() {
    println!();
    println!("  {} {}", "waypost".bold().cyan(), env!("CARGO_PKG_VERSION").dimmed());
    println!("  Wayfinding assistant edge backend");
    println!();
    println!("  {}", "USAGE".bold());
    println!("    waypost seed [--db PATH]   seed the catalog with sample data");
    println!("    waypost ask \"<query>\"      answer one guest question");
    println!("    waypost sync <file.json>   apply a sync payload");
    println!("    waypost stats              show cache and catalog state");
    println!();
    println!("  Config: waypost.toml (override path with WAYPOST_CONFIG)");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_value_finds_following_argument() {
        let args = vec!["--db".to_string(), "/tmp/x.db".to_string()];
        assert_eq!(flag_value(&args, "--db"), Some("/tmp/x.db"));
    }

    #[test]
    fn flag_value_missing_flag_is_none() {
        let args = vec!["seed".to_string()];
        assert_eq!(flag_value(&args, "--db"), None);
    }

    #[test]
    fn flag_value_trailing_flag_is_none() {
        let args = vec!["--db".to_string()];
        assert_eq!(flag_value(&args, "--db"), None);
    }
}
