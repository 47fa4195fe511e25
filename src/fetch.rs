use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

const CONCURRENCY: usize = 16;

/// Fetch stats returned after completion.
#[derive(Debug)]
pub struct FetchStats {
    pub total: usize,
    pub ok: usize,
    pub dropped: usize,
}

pub struct FetchOutcome {
    /// Response bodies keyed by identifier. Identifiers whose fetch did
    /// not return 200 are simply absent.
    pub bodies: HashMap<String, String>,
    pub stats: FetchStats,
}

/// Fetch every (identifier, url) pair concurrently, keeping only 200 bodies.
///
/// Results arrive in completion order and are reassembled by identifier
/// key. Non-200 responses and transport errors leave the identifier out
/// of the map and are counted as dropped; there is no retry or timeout.
pub async fn fetch_all(client: &Client, requests: Vec<(String, String)>) -> Result<FetchOutcome> {
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = requests.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send results, main loop collects by identifier
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(String, Option<String>)>(CONCURRENCY * 2);

    for (id, url) in requests {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let body = fetch_one(&client, &id, &url).await;
            let _ = tx.send((id, body)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut bodies = HashMap::with_capacity(total);
    let mut dropped = 0usize;

    while let Some((id, body)) = rx.recv().await {
        match body {
            Some(text) => {
                bodies.insert(id, text);
            }
            None => dropped += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    let ok = bodies.len();
    info!("Fetched {} documents ({} ok, {} dropped)", total, ok, dropped);

    Ok(FetchOutcome {
        bodies,
        stats: FetchStats { total, ok, dropped },
    })
}

/// Single attempt, single status check. Anything but a clean 200 body
/// yields None.
async fn fetch_one(client: &Client, id: &str, url: &str) -> Option<String> {
    match client.get(url).send().await {
        Ok(resp) if resp.status() == StatusCode::OK => match resp.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to read body for {}: {}", id, e);
                None
            }
        },
        Ok(resp) => {
            debug!("Dropping {}: status {}", id, resp.status());
            None
        }
        Err(e) => {
            warn!("Request failed for {}: {}", id, e);
            None
        }
    }
}

/// Fetch a single required document (index, roster). Unlike the bulk
/// fetcher, a non-200 status here is an error for the caller to surface.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?;
    if resp.status() != StatusCode::OK {
        bail!("GET {} returned status {}", url, resp.status());
    }
    resp.text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}

// ── Tests ──
