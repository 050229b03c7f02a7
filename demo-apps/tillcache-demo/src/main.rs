mod config;

use anyhow::{ensure, Context, Result};
use config::DemoConfig;
use futures::future::join_all;
use std::time::{Instant, SystemTime};
use tillcache_core::{Cache, CacheConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Keys written by one worker, split by whether they expire
struct WorkerKeys {
    forever: Vec<String>,
    expiring: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tillcache_demo=info,tillcache_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DemoConfig::from_env().context("failed to read demo configuration")?;

    tracing::info!("Tillcache demo");
    tracing::info!("   Workers: {}", config.workers);
    tracing::info!("   Keys per worker: {}", config.keys_per_worker);
    tracing::info!("   Expiring key TTL: {:?}", config.ttl);

    let cache = Cache::with_config(
        CacheConfig::new().with_initial_capacity(config.total_keys),
    );

    let written = concurrent_writes(&cache, &config).await?;
    check_expiry(&cache, &config, &written).await?;
    check_overwrite_revives(&cache, &written)?;

    tracing::info!("All checks passed");
    Ok(())
}

/// Writes from every worker at once, then verifies everything is readable
async fn concurrent_writes(cache: &Cache, config: &DemoConfig) -> Result<Vec<WorkerKeys>> {
    tracing::info!("Step: concurrent writes");

    let start = Instant::now();
    let deadline = SystemTime::now() + config.ttl;

    let tasks: Vec<_> = (0..config.workers)
        .map(|worker| {
            let cache = cache.clone();
            let keys_per_worker = config.keys_per_worker;
            // Cache calls block on the lock, keep them off the async workers
            tokio::task::spawn_blocking(move || {
                let mut keys = WorkerKeys {
                    forever: Vec::new(),
                    expiring: Vec::new(),
                };
                for i in 0..keys_per_worker {
                    let key = format!("worker{}:key{}", worker, i);
                    if i % 2 == 0 {
                        cache.put(key.clone(), format!("value{}", i));
                        keys.forever.push(key);
                    } else {
                        cache.put_till(key.clone(), format!("value{}", i), deadline);
                        keys.expiring.push(key);
                    }
                }
                keys
            })
        })
        .collect();

    let mut written = Vec::with_capacity(tasks.len());
    for result in join_all(tasks).await {
        written.push(result.context("writer task failed")?);
    }

    let total = config.total_keys;
    ensure!(
        cache.len() == total,
        "expected {} stored entries, found {}",
        total,
        cache.len()
    );

    // Expiring keys may already be gone on a slow machine with a tiny TTL
    for keys in &written {
        for key in &keys.forever {
            ensure!(cache.get(key).is_some(), "key {} missing after writes", key);
        }
    }

    tracing::info!("   {} keys written in {:?}", total, start.elapsed());
    Ok(written)
}

/// Waits past the deadline and checks that only non-expiring keys remain visible
async fn check_expiry(cache: &Cache, config: &DemoConfig, written: &[WorkerKeys]) -> Result<()> {
    tracing::info!("Step: lazy expiry");

    let len_before = cache.len();
    tokio::time::sleep(config.ttl * 2).await;

    let forever: usize = written.iter().map(|keys| keys.forever.len()).sum();
    let live = cache.keys();
    ensure!(
        live.len() == forever,
        "expected {} live keys after expiry, found {}",
        forever,
        live.len()
    );

    for key in written.iter().flat_map(|keys| &keys.expiring) {
        ensure!(cache.get(key).is_none(), "expired key {} is still readable", key);
    }

    ensure!(
        cache.len() == len_before,
        "stored entry count changed from {} to {}",
        len_before,
        cache.len()
    );

    tracing::info!(
        "   {} live keys, {} stored entries (expired entries are kept)",
        live.len(),
        cache.len()
    );
    Ok(())
}

/// A plain put over an expired key makes it visible again
fn check_overwrite_revives(cache: &Cache, written: &[WorkerKeys]) -> Result<()> {
    tracing::info!("Step: overwrite clears deadline");

    let Some(key) = written.iter().flat_map(|keys| &keys.expiring).next() else {
        tracing::info!("   no expiring keys written, skipping");
        return Ok(());
    };

    cache.put(key.clone(), "revived");
    ensure!(
        cache.get(key).as_deref() == Some("revived"),
        "key {} was not revived by put",
        key
    );

    tracing::info!("   key revived");
    Ok(())
}
