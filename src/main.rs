//! Evict Cache - line-driven front end for the cache engine
//!
//! Reads commands from stdin, applies them to a cache built from the
//! environment and prints a metrics report when input ends.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evict_cache::cache::{Cache, PutOutcome};
use evict_cache::cipher::SubstitutionCipher;
use evict_cache::feeder::{parse_line, Command};
use evict_cache::metrics::{HitMissCounter, RunTimer};
use evict_cache::CacheConfig;

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache
/// 4. Feed stdin line by line until EOF or `quit`
/// 5. Print the run report
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var.
    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evict_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, policy={}, max_key_len={}, max_value_len={}, buckets={}",
        config.capacity, config.policy, config.max_key_len, config.max_value_len, config.bucket_count
    );

    let mut cache = Cache::new(&config).context("building cache from environment")?;
    let cipher = SubstitutionCipher::default();
    info!(shift = cipher.shift(), "cipher ready");
    let mut counter = HitMissCounter::new();
    let timer = RunTimer::start();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = number + 1, "{}", e);
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        execute(command, &mut cache, &cipher, &mut counter, &timer, &mut out)?;
    }

    let report = timer.finish(&counter, &cache);
    writeln!(out, "\n{}", report.render_table())?;
    info!("Run complete");
    Ok(())
}

/// Applies one command. Recoverable cache errors are reported and skipped.
fn execute(
    command: Command,
    cache: &mut Cache,
    cipher: &SubstitutionCipher,
    counter: &mut HitMissCounter,
    timer: &RunTimer,
    out: &mut impl Write,
) -> Result<()> {
    let result = match command {
        Command::Put { key, value } => cache.put(key, value).map(|outcome| {
            if let PutOutcome::Evicted { key, .. } = outcome {
                counter.record_eviction();
                info!(key = %key, "evicted");
            }
        }),
        Command::Get { key } => {
            let value = cache.get(&key).map(str::to_string);
            counter.record_lookup(value.is_some());
            match value {
                Some(value) => writeln!(out, "Value for key:{} is {}", key, value)?,
                None => writeln!(out, "Key {} not found in cache.", key)?,
            }
            Ok(())
        }
        Command::Delete { key } => cache.remove(&key).map(|removed| {
            if removed.is_none() {
                warn!(key = %key, "delete of absent key");
            }
        }),
        Command::Print => {
            for (key, value) in cache.iter() {
                writeln!(out, "Key: {} has Value: {}", key, value)?;
            }
            Ok(())
        }
        Command::Clear => {
            cache.clear();
            Ok(())
        }
        Command::Encrypt => cipher.encrypt_cache(cache),
        Command::Decrypt => cipher.decrypt_cache(cache),
        Command::Stats { json } => {
            let report = timer.finish(counter, cache);
            if json {
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else {
                writeln!(out, "{}", report.render_table())?;
            }
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_recoverable() => {
            writeln!(out, "error: {}", e)?;
            Ok(())
        }
        Err(e) => Err(e).context("cache is in an inconsistent state"),
    }
}
