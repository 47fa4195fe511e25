use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::extract::json::get_value;
use crate::fetch::{self, FetchStats};
use crate::{enrich, output, parties};

pub const DEFAULT_BASE_URL: &str = "https://www.assemblee-nationale.fr/dyn/opendata";
pub const DEFAULT_START: u32 = 1;
pub const DEFAULT_END: u32 = 5116;

// Column names are kept in the source language, as published.
pub const HEADER: &[&str] = &[
    "Amendement",
    "Auteur",
    "Parti",
    "Titre",
    "Type",
    "ArticleAdditionnel",
    "ChapitreAdditionnel",
    "Dispositif",
    "ExposéSommaire",
];

/// Amendment JSON document URL for one article number, zero-padded to
/// the 6-digit field the endpoint expects.
fn article_url(base: &str, n: u32) -> String {
    format!("{base}/AMANR5L16PO791932B1680P1D1N{n:06}.json")
}

/// Numeric-range pipeline: fetch [start, end], extract the fixed field
/// set, resolve the author's party, sort ascending and write the sheet.
pub async fn run(base_url: &str, start: u32, end: u32, out: &Path) -> Result<FetchStats> {
    let client = reqwest::Client::new();
    let requests: Vec<(String, String)> = (start..=end)
        .map(|n| (n.to_string(), article_url(base_url, n)))
        .collect();

    info!("Fetching {} amendment documents", requests.len());
    let outcome = fetch::fetch_all(&client, requests).await?;

    let party_table = parties::party_table();
    let mut records: Vec<(u64, Vec<String>)> = Vec::with_capacity(outcome.bodies.len());
    let mut unparseable = 0usize;

    for (id, body) in &outcome.bodies {
        let data: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping amendment {}: body is not valid JSON ({})", id, e);
                unparseable += 1;
                continue;
            }
        };
        records.push((output::extract_number(id), extract_row(&data, &party_table)));
    }

    records.sort_by_key(|(n, _)| *n);
    let rows: Vec<Vec<String>> = records.into_iter().map(|(_, row)| row).collect();
    output::write_csv(out, HEADER, &rows)?;

    let mut stats = outcome.stats;
    stats.ok -= unparseable;
    stats.dropped += unparseable;
    Ok(stats)
}

/// Project one amendment document into its output row.
fn extract_row(data: &Value, party_table: &HashMap<&str, &str>) -> Vec<String> {
    let party_ref = get_value(data, &["signataires", "auteur", "groupePolitiqueRef"]);
    let party = enrich::resolve(party_table.get(party_ref.as_str()).copied());

    vec![
        get_value(data, &["identification", "numeroOrdreDepot"]),
        get_value(data, &["signataires", "libelle"]),
        party,
        get_value(data, &["pointeurFragmentTexte", "division", "articleDesignationCourte"]),
        get_value(data, &["pointeurFragmentTexte", "division", "type"]),
        get_value(data, &["pointeurFragmentTexte", "division", "articleAdditionnel"]),
        get_value(data, &["pointeurFragmentTexte", "division", "chapitreAdditionnel"]),
        get_value(data, &["corps", "contenuAuteur", "dispositif"]),
        get_value(data, &["corps", "contenuAuteur", "exposeSommaire"]),
    ]
}

// ── Tests ──
