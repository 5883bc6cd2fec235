/*============================================================
  Synavera Project: Quack
  Module: quack::aur
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Query the Arch User Repository RPC API for package records,
    by exact name (`info`) or by keyword (`search`).

  Security / Safety Notes:
    Performs read-only HTTPS requests to the public AUR API.
    No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, serde/serde_json for response parsing,
    urlencoding for query arguments.

  Operational Scope:
    Supplies remote versions for upgrade resolution and the
    records rendered by search and info.

  Revision History:
    2026-10-19 COD  Adapted AUR client for Quack lookups.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single attempt per request; failures surface to the caller
    - Structured response parsing with explicit error paths
============================================================*/

use std::time::Duration;

use serde::Deserialize;
use urlencoding::encode;

use crate::config::AurConfig;
use crate::error::{QuackError, Result};
use crate::logger::Logger;

/// Client for interacting with the AUR RPC API.
pub struct AurClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl AurClient {
    /// Construct a new client from configuration.
    pub fn new(config: &AurConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("quack/", env!("CARGO_PKG_VERSION"), " (linux)"));
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| QuackError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.trim_end_matches('/').to_string(),
        })
    }

    /// Records for the given package names, in response order.
    ///
    /// `by_name` restricts the lookup to exact name matches.
    pub async fn info(
        &self,
        packages: &[String],
        by_name: bool,
        logger: &Logger,
    ) -> Result<Vec<AurPackage>> {
        if packages.is_empty() {
            return Ok(Vec::new());
        }
        let url = compose_info_url(&self.rpc_url, packages, by_name);
        logger.debug("AUR", format!("info lookup for {} package(s)", packages.len()));
        self.fetch(&url).await
    }

    /// Keyword search; the terms travel as one space-joined argument.
    pub async fn search(&self, terms: &str, logger: &Logger) -> Result<Vec<AurPackage>> {
        let url = compose_search_url(&self.rpc_url, terms);
        logger.debug("AUR", format!("search for `{terms}`"));
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<AurPackage>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| QuackError::Network(format!("AUR request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuackError::Network(format!(
                "AUR request {url} failed with status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| QuackError::Network(format!("Failed to read AUR response: {err}")))?;
        parse_response(&body)
    }
}

/// Decode an RPC body. A body without `results` is an empty answer.
pub fn parse_response(body: &str) -> Result<Vec<AurPackage>> {
    let payload: AurResponse = serde_json::from_str(body).map_err(|err| {
        QuackError::Serialization(format!("Failed to decode AUR response: {err}"))
    })?;

    if let Some(error) = payload.error {
        return Err(QuackError::Network(format!("AUR responded with error: {error}")));
    }

    Ok(payload.results)
}

fn compose_info_url(rpc_url: &str, packages: &[String], by_name: bool) -> String {
    let mut url = format!("{rpc_url}?v=5&type=info");
    for pkg in packages {
        url.push_str("&arg[]=");
        url.push_str(&encode(pkg));
    }
    if by_name {
        url.push_str("&by=name");
    }
    url
}

fn compose_search_url(rpc_url: &str, terms: &str) -> String {
    format!("{rpc_url}?v=5&type=search&arg={}", encode(terms))
}

#[derive(Debug, Deserialize)]
struct AurResponse {
    #[serde(default)]
    results: Vec<AurPackage>,
    #[serde(default)]
    error: Option<String>,
}

/// One package record as reported by the AUR.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AurPackage {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "License", default, deserialize_with = "one_or_many")]
    pub license: Vec<String>,
    #[serde(rename = "Depends", default)]
    pub depends: Vec<String>,
    #[serde(rename = "MakeDepends", default)]
    pub make_depends: Vec<String>,
    #[serde(rename = "Provides", default)]
    pub provides: Vec<String>,
    #[serde(rename = "Conflicts", default)]
    pub conflicts: Vec<String>,
    #[serde(rename = "Keywords", default)]
    pub keywords: Vec<String>,
    #[serde(rename = "Maintainer", default)]
    pub maintainer: Option<String>,
    #[serde(rename = "LastModified", default)]
    pub last_modified: Option<i64>,
    #[serde(rename = "NumVotes", default)]
    pub num_votes: Option<u64>,
    #[serde(rename = "Popularity", default)]
    pub popularity: Option<f64>,
}

/// `License` is a list in RPC v5 but a bare string on older records.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_results_is_empty_not_error() {
        let records = parse_response(r#"{"version":5,"type":"info","resultcount":0}"#)
            .expect("empty answer");
        assert!(records.is_empty());
    }

    #[test]
    fn service_error_is_fatal() {
        let err = parse_response(r#"{"version":5,"type":"error","results":[],"error":"Too many package results."}"#)
            .unwrap_err();
        assert!(matches!(err, QuackError::Network(msg) if msg.contains("Too many")));
    }

    #[test]
    fn malformed_body_is_serialization_error() {
        let err = parse_response("<html>").unwrap_err();
        assert!(matches!(err, QuackError::Serialization(_)));
    }

    #[test]
    fn records_keep_optional_fields_optional() {
        let body = r#"{
            "resultcount": 2,
            "results": [
                {
                    "Name": "foo",
                    "Version": "1.1-1",
                    "Description": "A foo",
                    "URL": "https://foo.example",
                    "License": ["MIT"],
                    "Depends": ["glibc", "bar"],
                    "Maintainer": "alice",
                    "LastModified": 1700000000,
                    "NumVotes": 12,
                    "Popularity": 0.25
                },
                {
                    "Name": "orphan-git",
                    "Version": "r10.abc-1",
                    "Description": null,
                    "Maintainer": null,
                    "License": "GPL"
                }
            ]
        }"#;
        let records = parse_response(body).expect("records");
        assert_eq!(records.len(), 2);

        let foo = &records[0];
        assert_eq!(foo.name, "foo");
        assert_eq!(foo.depends, vec!["glibc", "bar"]);
        assert_eq!(foo.license, vec!["MIT"]);
        assert_eq!(foo.num_votes, Some(12));
        assert!(foo.make_depends.is_empty());

        let orphan = &records[1];
        assert_eq!(orphan.maintainer, None);
        assert_eq!(orphan.description, None);
        assert_eq!(orphan.license, vec!["GPL"]);
        assert_eq!(orphan.last_modified, None);
    }

    #[test]
    fn info_url_repeats_encoded_arguments() {
        let url = compose_info_url(
            "https://aur.archlinux.org/rpc.php",
            &["foo".to_string(), "c++utils".to_string()],
            true,
        );
        assert_eq!(
            url,
            "https://aur.archlinux.org/rpc.php?v=5&type=info&arg[]=foo&arg[]=c%2B%2Butils&by=name"
        );
    }

    #[test]
    fn search_url_joins_terms() {
        let url = compose_search_url("https://aur.archlinux.org/rpc.php", "pacman helper");
        assert_eq!(
            url,
            "https://aur.archlinux.org/rpc.php?v=5&type=search&arg=pacman%20helper"
        );
    }

    #[tokio::test]
    async fn empty_info_query_skips_the_network() {
        let client = AurClient::new(&AurConfig {
            rpc_url: "http://127.0.0.1:9/rpc.php".into(),
            ..AurConfig::default()
        })
        .expect("client");
        let records = client
            .info(&[], false, &Logger::stderr_only(false))
            .await
            .expect("no request");
        assert!(records.is_empty());
    }
}
