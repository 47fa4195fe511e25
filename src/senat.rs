use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::info;

use crate::extract::{self, html::extract_regions};
use crate::fetch::{self, FetchStats};
use crate::{enrich, output};

pub const DEFAULT_BASE_URL: &str = "https://www.senat.fr/encommission/2023-2024/550";
pub const DEFAULT_ROSTER_URL: &str = "https://www.senat.fr/api-senat/senateurs.json";

// Column names are kept in the source language, as published.
pub const HEADER: &[&str] = &[
    "Amendement",
    "Auteur",
    "Article",
    "Signataires",
    "AccordGouv",
    "Subdivision",
    "Dispositif",
    "Objet",
    "Groupe",
    "ConcerneArticle14",
    "ContientAssurance",
];

const REGION_FIELDS: &[&str] = &["signataires", "accordGouv", "subdivision", "dispositif", "objet"];

#[derive(Deserialize)]
struct Discussion {
    #[serde(rename = "Subdivisions")]
    subdivisions: Vec<Subdivision>,
}

#[derive(Deserialize)]
struct Subdivision {
    libelle_subdivision: String,
    #[serde(rename = "Amendements")]
    amendements: Vec<AmendementEntry>,
}

#[derive(Deserialize)]
struct AmendementEntry {
    #[serde(rename = "urlAmdt")]
    url_amdt: String,
    auteur: String,
    #[serde(rename = "urlAuteur")]
    url_auteur: String,
}

/// One amendment as listed in the discussion index. Identifier, author,
/// subdivision label and signatory code travel together in one record,
/// so the later group join cannot drift out of alignment.
struct IndexedAmendment {
    url_amdt: String,
    auteur: String,
    subdivision: String,
    signatory_code: String,
}

/// Flatten the index into one record per amendment, in document order.
fn index_amendments(discussion: Discussion) -> Vec<IndexedAmendment> {
    discussion
        .subdivisions
        .into_iter()
        .flat_map(|sub| {
            let libelle = sub.libelle_subdivision;
            sub.amendements.into_iter().map(move |entry| IndexedAmendment {
                signatory_code: signatory_code(&entry.url_auteur),
                url_amdt: entry.url_amdt,
                auteur: entry.auteur,
                subdivision: libelle.clone(),
            })
        })
        .collect()
}

/// Signatory registration code from an author URL fragment: stem before
/// the first '.', last 6 characters, upper-cased ("senateur/dupont_j14x.html"
/// style fragments end in the matricule).
fn signatory_code(url_auteur: &str) -> String {
    let stem = url_auteur.split('.').next().unwrap_or(url_auteur);
    let start = stem
        .char_indices()
        .rev()
        .nth(5)
        .map(|(i, _)| i)
        .unwrap_or(0);
    stem[start..].to_uppercase()
}

#[derive(Deserialize)]
struct Senator {
    #[serde(default)]
    matricule: String,
    #[serde(default)]
    groupe: Option<Groupe>,
}

#[derive(Deserialize)]
struct Groupe {
    libelle: String,
}

/// Build the matricule -> group label lookup from the roster document.
/// Senators without a group entry are skipped.
fn roster_lookup(body: &str) -> Result<HashMap<String, String>> {
    let senators: Vec<Senator> =
        serde_json::from_str(body).context("Failed to parse the senator roster")?;
    Ok(senators
        .into_iter()
        .filter(|s| !s.matricule.is_empty())
        .filter_map(|s| s.groupe.map(|g| (s.matricule, g.libelle)))
        .collect())
}

/// Index-driven pipeline: enumerate amendments from the discussion index,
/// fetch each HTML page, extract the comment-delimited regions, join the
/// senator roster and compute the flags, then write the sorted sheet.
///
/// A missing or unparseable index aborts the run before any output is
/// written; individual page failures are only dropped rows.
pub async fn run(base_url: &str, roster_url: &str, out: &Path) -> Result<FetchStats> {
    let client = reqwest::Client::new();

    let index_url = format!("{base_url}/liste_discussion.json");
    info!("Fetching discussion index: {}", index_url);
    let index_body = fetch::fetch_text(&client, &index_url)
        .await
        .context("Failed to fetch the discussion index")?;
    let discussion: Discussion =
        serde_json::from_str(&index_body).context("Failed to parse the discussion index")?;
    let amendments = index_amendments(discussion);
    info!("Index lists {} amendments", amendments.len());

    info!("Fetching senator roster: {}", roster_url);
    let roster_body = fetch::fetch_text(&client, roster_url).await?;
    let roster = roster_lookup(&roster_body)?;
    info!("Roster covers {} senators", roster.len());

    let requests: Vec<(String, String)> = amendments
        .iter()
        .map(|a| (a.url_amdt.clone(), format!("{base_url}/{}", a.url_amdt)))
        .collect();
    let outcome = fetch::fetch_all(&client, requests).await?;

    // Extraction pass over the fetched pages; amendments whose page was
    // dropped produce no row.
    let fetched: Vec<&IndexedAmendment> = amendments
        .iter()
        .filter(|a| outcome.bodies.contains_key(&a.url_amdt))
        .collect();

    info!("Extracting {} amendment pages", fetched.len());
    let pb = ProgressBar::new(fetched.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut records: Vec<(u64, Vec<String>)> = fetched
        .par_iter()
        .map(|a| {
            let row = extract_row(a, &outcome.bodies[&a.url_amdt], &roster);
            pb.inc(1);
            (output::extract_number(&a.url_amdt), row)
        })
        .collect();
    pb.finish_and_clear();

    records.sort_by_key(|(n, _)| *n);
    let rows: Vec<Vec<String>> = records.into_iter().map(|(_, row)| row).collect();
    output::write_csv(out, HEADER, &rows)?;

    Ok(outcome.stats)
}

/// Extract the marker-delimited regions from one amendment page and
/// project the output row, flags included. Missing regions become empty
/// strings rather than errors.
fn extract_row(
    amendment: &IndexedAmendment,
    body: &str,
    roster: &HashMap<String, String>,
) -> Vec<String> {
    let mut regions = extract_regions(body, REGION_FIELDS);
    let signataires = regions.remove("signataires").unwrap_or_default();
    let accord_gouv = regions.remove("accordGouv").unwrap_or_default();
    let subdivision = regions.remove("subdivision").unwrap_or_default();
    // dispositif and objet get a second, text-only pass
    let dispositif = extract::visible_text(&regions.remove("dispositif").unwrap_or_default());
    let objet = extract::visible_text(&regions.remove("objet").unwrap_or_default());

    let groupe = enrich::resolve(roster.get(&amendment.signatory_code).map(String::as_str));
    let article14 = enrich::matches_subdivision(&amendment.subdivision, enrich::TARGET_SUBDIVISION);
    let assurance = enrich::contains_any(enrich::ASSURANCE_KEYWORDS, &[&dispositif, &objet]);

    vec![
        amendment.url_amdt.clone(),
        amendment.auteur.clone(),
        amendment.subdivision.clone(),
        signataires,
        accord_gouv,
        subdivision,
        dispositif,
        objet,
        groupe,
        article14.to_string(),
        assurance.to_string(),
    ]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_doc() -> serde_json::Value {
        json!({
            "Subdivisions": [
                {
                    "libelle_subdivision": "Article 14",
                    "Amendements": [
                        { "urlAmdt": "Amdt_COM-10.html", "auteur": "M. Durand",
                          "urlAuteur": "senateur/durand_a08015x.html" }
                    ]
                },
                {
                    "libelle_subdivision": "Article 2",
                    "Amendements": [
                        { "urlAmdt": "Amdt_COM-2.html", "auteur": "Mme Petit",
                          "urlAuteur": "senateur/petit_b14022y.html" },
                        { "urlAmdt": "Amdt_COM-5.html", "auteur": "M. Leroy",
                          "urlAuteur": "senateur/leroy_c19003z.html" }
                    ]
                }
            ]
        })
    }

    fn roster_doc() -> serde_json::Value {
        json!([
            { "matricule": "08015X", "groupe": { "libelle": "Les Républicains" } },
            { "matricule": "14022Y", "groupe": { "libelle": "Socialiste, Écologiste et Républicain" } },
            { "matricule": "00000Q" }
        ])
    }

    fn amendment_page(dispositif: &str, objet: &str) -> String {
        format!(
            "<html><body>\
             <!-- debut_signataires --><p>M. Untel</p><!-- fin_signataires -->\
             <!-- debut_accordGouv -->Défavorable<!-- fin_accordGouv -->\
             <!-- debut_subdivision --><b>ARTICLE</b><!-- fin_subdivision -->\
             <!-- debut_dispositif -->{dispositif}<!-- fin_dispositif -->\
             <!-- debut_objet -->{objet}<!-- fin_objet -->\
             </body></html>"
        )
    }

    #[test]
    fn index_join_keeps_fields_paired() {
        let discussion: Discussion = serde_json::from_value(index_doc()).unwrap();
        let amendments = index_amendments(discussion);
        assert_eq!(amendments.len(), 3);

        let a = &amendments[0];
        assert_eq!(a.url_amdt, "Amdt_COM-10.html");
        assert_eq!(a.auteur, "M. Durand");
        assert_eq!(a.subdivision, "Article 14");
        assert_eq!(a.signatory_code, "08015X");

        let b = &amendments[2];
        assert_eq!(b.url_amdt, "Amdt_COM-5.html");
        assert_eq!(b.subdivision, "Article 2");
        assert_eq!(b.signatory_code, "19003Z");
    }

    #[test]
    fn signatory_code_is_stem_tail_uppercased() {
        assert_eq!(signatory_code("senateur/durand_a08015x.html"), "08015X");
        assert_eq!(signatory_code("x.html"), "X");
        assert_eq!(signatory_code(""), "");
    }

    #[test]
    fn roster_skips_groupless_entries() {
        let roster = roster_lookup(&roster_doc().to_string()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("08015X").map(String::as_str), Some("Les Républicains"));
        assert!(!roster.contains_key("00000Q"));
    }

    #[test]
    fn row_carries_flags_and_group() {
        let amendment = IndexedAmendment {
            url_amdt: "Amdt_COM-10.html".into(),
            auteur: "M. Durand".into(),
            subdivision: "Article 14".into(),
            signatory_code: "08015X".into(),
        };
        let roster = roster_lookup(&roster_doc().to_string()).unwrap();
        let page = amendment_page("<p>Une assurance obligatoire</p>", "<p>Objet</p>");
        let row = extract_row(&amendment, &page, &roster);

        assert_eq!(row[0], "Amdt_COM-10.html");
        assert_eq!(row[2], "Article 14");
        assert_eq!(row[3], "<p>M. Untel</p>");
        assert_eq!(row[4], "Défavorable");
        assert_eq!(row[5], "<b>ARTICLE</b>");
        assert_eq!(row[6], "Une assurance obligatoire"); // text-only pass
        assert_eq!(row[8], "Les Républicains");
        assert_eq!(row[9], "true");
        assert_eq!(row[10], "true");
    }

    #[test]
    fn missing_regions_yield_empty_strings_not_errors() {
        let amendment = IndexedAmendment {
            url_amdt: "Amdt_COM-2.html".into(),
            auteur: "Mme Petit".into(),
            subdivision: "Article 2".into(),
            signatory_code: "ZZZZZZ".into(),
        };
        let row = extract_row(&amendment, "<html><body>rien</body></html>", &HashMap::new());
        assert_eq!(row[3], "");
        assert_eq!(row[6], "");
        assert_eq!(row[8], "reference not found");
        assert_eq!(row[9], "false");
        assert_eq!(row[10], "false");
    }

    #[tokio::test]
    async fn index_pipeline_drops_404_and_sorts_numerically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/liste_discussion.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index_doc()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/senateurs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(roster_doc()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Amdt_COM-10.html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(amendment_page("<p>Une assurance obligatoire</p>", "<p>Objet</p>")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Amdt_COM-2.html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(amendment_page("<p>Une garantie facultative</p>", "<p>Objet</p>")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Amdt_COM-5.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("simplif_data.csv");
        let roster_url = format!("{}/senateurs.json", server.uri());
        let stats = run(&server.uri(), &roster_url, &out).await.unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.ok, 2);
        assert_eq!(stats.dropped, 1);

        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows, COM-5 absent
        assert!(lines[0].starts_with("Amendement,Auteur,Article"));
        // COM-2 sorts before COM-10 numerically
        assert!(lines[1].starts_with("Amdt_COM-2.html,Mme Petit,Article 2"));
        assert!(lines[2].starts_with("Amdt_COM-10.html,M. Durand,Article 14"));
        assert!(lines[1].ends_with("false,false"));
        assert!(lines[2].ends_with("true,true"));
    }

    #[tokio::test]
    async fn missing_index_aborts_without_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/liste_discussion.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("simplif_data.csv");
        let roster_url = format!("{}/senateurs.json", server.uri());
        let err = run(&server.uri(), &roster_url, &out).await.unwrap_err();

        assert!(err.to_string().contains("discussion index"));
        assert!(!out.exists());
    }
}
