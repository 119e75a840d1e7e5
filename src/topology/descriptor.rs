//! Descriptor file formats
//!
//! Four text files describe the network: two boundary-link files, one
//! optical-link file and one id mapping file. This module turns their text
//! into port pairs and id assertions; the graph rules live in the model.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::port::PortId;
use crate::core::{DatapathId, Error, Result};

/// One line of a boundary-link file
#[derive(Debug, Clone, Deserialize)]
struct BoundaryRecord {
    lower_nw_port: String,
    upper_nw_port: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OchLinkDocument {
    ochlink: Vec<Termination>,
}

#[derive(Debug, Clone, Deserialize)]
struct Termination {
    termination1: String,
    termination2: String,
}

/// Decimal value that may be written as a JSON string or number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(serde_json::Number),
}

impl Decimal {
    fn as_text(&self) -> String {
        match self {
            Decimal::Text(text) => text.trim().to_string(),
            Decimal::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct IdexEntry {
    dpid: Decimal,
    port: Decimal,
}

/// Id mapping entries in file order, duplicates included
struct IdexDocument(Vec<(String, IdexEntry)>);

impl<'de> Deserialize<'de> for IdexDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = IdexDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of port id to {dpid, port}")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, entry)) = map.next_entry::<String, IdexEntry>()? {
                    entries.push((key, entry));
                }
                Ok(IdexDocument(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A single `port id -> (dpid, southbound port)` assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAssertion {
    pub port: PortId,
    pub dpid: DatapathId,
    pub southbound_port: u32,
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Parses a boundary-link file into `(lower, upper)` port pairs
pub fn parse_boundary(text: &str) -> Result<Vec<(PortId, PortId)>> {
    let mut pairs = Vec::new();
    for (line_no, line) in non_empty_lines(text) {
        let record: BoundaryRecord = serde_json::from_str(line)
            .map_err(|e| Error::file_parse(format!("line {line_no}: {e}")))?;
        let lower = record
            .lower_nw_port
            .parse::<PortId>()
            .map_err(|e| Error::file_parse(format!("line {line_no}: {e}")))?;
        let upper = record
            .upper_nw_port
            .parse::<PortId>()
            .map_err(|e| Error::file_parse(format!("line {line_no}: {e}")))?;
        pairs.push((lower, upper));
    }
    Ok(pairs)
}

/// Parses the optical-link file into termination pairs
///
/// The document is a single line; anything after it is ignored.
pub fn parse_och_links(text: &str) -> Result<Vec<(PortId, PortId)>> {
    let (_, line) = non_empty_lines(text)
        .next()
        .ok_or_else(|| Error::file_parse("optical link file is empty"))?;
    let document: OchLinkDocument =
        serde_json::from_str(line).map_err(|e| Error::file_parse(e.to_string()))?;

    document
        .ochlink
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let one = t
                .termination1
                .parse::<PortId>()
                .map_err(|e| Error::file_parse(format!("ochlink[{i}]: {e}")))?;
            let two = t
                .termination2
                .parse::<PortId>()
                .map_err(|e| Error::file_parse(format!("ochlink[{i}]: {e}")))?;
            Ok((one, two))
        })
        .collect()
}

/// Joins the id mapping lines into one JSON object
///
/// `a:{..}` / `b:{..}` becomes `{a:{..},b:{..}}`.
pub fn wrap_id_mapping(text: &str) -> String {
    let body = non_empty_lines(text)
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}

/// Parses the id mapping file into assertions, in file order
pub fn parse_id_mapping(text: &str) -> Result<Vec<IdAssertion>> {
    let wrapped = wrap_id_mapping(text);
    let document: IdexDocument =
        serde_json::from_str(&wrapped).map_err(|e| Error::file_parse(e.to_string()))?;

    let mut assertions = Vec::with_capacity(document.0.len());
    for (key, entry) in document.0 {
        let port = key.parse::<PortId>()?;
        let dpid = DatapathId::parse(&entry.dpid.as_text())?;
        let raw_port = entry.port.as_text();
        let southbound_port = raw_port
            .parse::<u32>()
            .ok()
            .filter(|p| *p <= i32::MAX as u32)
            .ok_or_else(|| {
                Error::file_parse(format!(
                    "OpenFlow port [{raw_port}] of [{key}] is out of boundary (valid between 0 and 2^31-1)"
                ))
            })?;
        assertions.push(IdAssertion {
            port,
            dpid,
            southbound_port,
        });
    }
    Ok(assertions)
}
