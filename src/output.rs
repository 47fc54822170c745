// src/output.rs
// =============================================================================
// The output sink: where every Discovery ends up.
//
// Three renderings:
// - plain (default): "[category] - value", with status / length annotations
// - json (--json):   one JSON object per line
//                    {"input", "source", "type", "output", "status"?, "length"?}
// - quiet (--quiet): the bare value only
//
// Lines go to stdout, and with --output DIR are also appended to a file
// named after the site's hostname (dots replaced by underscores).
//
// The sink is shared by every fetch task of a site, so writes are serialised
// through a Mutex. A multi-line record (subdomains print twice) is written
// under a single lock so its lines stay together.
// =============================================================================

use crate::config::ConfigError;
use crate::discovery::{Category, Discovery};
use crate::site::Site;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Anything that accepts discoveries
pub trait Sink: Send + Sync {
    fn emit(&self, discovery: &Discovery);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain { show_length: bool },
    Json,
    Quiet,
}

// The structured record shape for --json
#[derive(Serialize)]
struct Record<'a> {
    input: &'a str,
    source: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    output: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
}

pub struct Output {
    input: String,
    format: Format,
    file: Mutex<Option<LineWriter<File>>>,
}

impl Output {
    /// Creates the sink for one site, opening its output file if a folder
    /// was given
    pub fn new(site: &Site, format: Format, folder: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match folder {
            Some(folder) => {
                let path = folder.join(site.hostname().replace('.', "_"));
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| ConfigError::Output { path, source })?;
                Some(LineWriter::new(file))
            }
            None => None,
        };

        Ok(Output {
            input: site.origin_str().to_string(),
            format,
            file: Mutex::new(file),
        })
    }

    /// Renders a discovery into the line(s) that will be printed
    pub fn render(&self, discovery: &Discovery) -> Vec<String> {
        match self.format {
            Format::Quiet => vec![discovery.value.clone()],
            Format::Json => {
                let record = Record {
                    input: &self.input,
                    source: &discovery.source,
                    kind: discovery.category.label(),
                    output: &discovery.value,
                    status: discovery.status,
                    length: discovery.length,
                };
                serde_json::to_string(&record).into_iter().collect()
            }
            Format::Plain { show_length } => render_plain(discovery, show_length),
        }
    }
}

fn render_plain(discovery: &Discovery, show_length: bool) -> Vec<String> {
    let label = discovery.category.label();
    let value = &discovery.value;

    let mut lines = match (discovery.category, discovery.status) {
        (Category::Url, Some(status)) => vec![format!("[{label}] - [code-{status}] - {value}")],
        (Category::Linkfinder, _) => {
            vec![format!("[{label}] - [from: {}] - {value}", discovery.source)]
        }
        // Display only: both schemes are shown, neither is crawled
        (Category::Subdomain, _) => vec![
            format!("[{label}] - http://{value}"),
            format!("[{label}] - https://{value}"),
        ],
        _ => vec![format!("[{label}] - {value}")],
    };

    if let (true, Some(length)) = (show_length, discovery.length) {
        for line in &mut lines {
            line.push_str(&format!(" - [length-{length}]"));
        }
    }
    lines
}

impl Sink for Output {
    fn emit(&self, discovery: &Discovery) {
        let lines = self.render(discovery);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        for line in &lines {
            println!("{}", line);
            if let Some(writer) = file.as_mut() {
                if let Err(e) = writeln!(writer, "{}", line) {
                    tracing::warn!(error = %e, "failed to write output file");
                }
            }
        }
    }
}

/// Test sink that keeps every discovery in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Discovery>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn records(&self) -> Vec<Discovery> {
        self.records.lock().unwrap().clone()
    }

    /// Values emitted under one category, in emission order
    pub fn values(&self, category: Category) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|d| d.category == category)
            .map(|d| d.value)
            .collect()
    }
}

#[cfg(test)]
impl Sink for MemorySink {
    fn emit(&self, discovery: &Discovery) {
        self.records.lock().unwrap().push(discovery.clone());
    }
}
