//! Reads the declarative opcode document and validates it into an [`OpcodeTable`].
//!
//! Every record field is deserialized as optional and checked here, so a missing `Name` or
//! `Length` is reported with its table and byte instead of as a generic parse failure.

use std::{fs, path::Path, str::FromStr};

use serde::Deserialize;

use crate::{
    error::LoadError,
    opcode::{Category, OpcodeSpec, OpcodeTable, TableKind, parse_operands},
    prelude::*,
};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "Unprefixed")]
    unprefixed: Option<Vec<RawOpcode>>,
    #[serde(rename = "CBPrefixed")]
    cb_prefixed: Option<Vec<RawOpcode>>,
}

#[derive(Debug, Deserialize)]
struct RawOpcode {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Group")]
    group: Option<String>,
    #[serde(rename = "Length")]
    length: Option<IntField>,
    #[serde(rename = "TCyclesNoBranch")]
    cycles_no_branch: Option<IntField>,
    #[serde(rename = "TCyclesBranch")]
    cycles_branch: Option<IntField>,
}

/// A number, or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntField {
    Int(i64),
    Text(String),
}

/// Where a record sits, for error reporting.
#[derive(Clone, Copy)]
struct Site {
    kind: TableKind,
    byte: u8,
}

impl Site {
    fn missing(self, field: &'static str) -> LoadError {
        LoadError::MissingField { kind: self.kind, byte: self.byte, field }
    }

    fn integer(self, field: &'static str, value: Option<IntField>) -> Result<i64, LoadError> {
        match value.ok_or_else(|| self.missing(field))? {
            IntField::Int(n) => Ok(n),
            IntField::Text(text) => i64::from_str(text.trim()).map_err(|_| LoadError::NotAnInteger {
                kind: self.kind,
                byte: self.byte,
                field,
                value: text,
            }),
        }
    }

    fn cycles(self, field: &'static str, value: Option<IntField>) -> Result<i32, LoadError> {
        let cycles = self.integer(field, value)?;
        i32::try_from(cycles)
            .ok()
            .filter(|&cycles| cycles >= 0)
            .ok_or(LoadError::CyclesOutOfRange {
                kind: self.kind,
                byte: self.byte,
                field,
                cycles,
            })
    }
}

#[instrument(skip(source), fields(bytes = source.len()))]
pub fn from_str(source: &str) -> Result<OpcodeTable, LoadError> {
    let document: RawDocument = serde_json::from_str(source)?;
    let unprefixed = validate(TableKind::Unprefixed, document.unprefixed)?;
    let cb_prefixed = validate(TableKind::CbPrefixed, document.cb_prefixed)?;
    let table = OpcodeTable::new(unprefixed, cb_prefixed)?;
    debug!(
        unused = table.placeholder_count(TableKind::Unprefixed),
        cb_unused = table.placeholder_count(TableKind::CbPrefixed),
        "Loaded opcode tables"
    );
    Ok(table)
}

pub fn from_path(path: &Path) -> Result<OpcodeTable, LoadError> {
    info!("Loading opcode table from {}", path.display());
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&source)
}

fn validate(kind: TableKind, records: Option<Vec<RawOpcode>>) -> Result<Vec<OpcodeSpec>, LoadError> {
    let records = records.ok_or(LoadError::MissingTable { kind })?;
    if records.len() != crate::constants::TABLE_SIZE {
        return Err(LoadError::TableLength { kind, len: records.len() });
    }
    records
        .into_iter()
        .zip(0..=u8::MAX)
        .map(|(raw, byte)| record(Site { kind, byte }, raw))
        .collect()
}

fn record(site: Site, raw: RawOpcode) -> Result<OpcodeSpec, LoadError> {
    let mnemonic = raw.name.ok_or_else(|| site.missing("Name"))?;
    // Names are pasted into string literals and line comments of the generated sources.
    if mnemonic.chars().any(|c| c == '"' || c.is_control()) {
        return Err(LoadError::InvalidName { kind: site.kind, byte: site.byte, name: mnemonic });
    }
    let group = raw.group.ok_or_else(|| site.missing("Group"))?;
    let length = site.integer("Length", raw.length)?;
    let cycles_no_branch = site.cycles("TCyclesNoBranch", raw.cycles_no_branch)?;
    let cycles_branch = match raw.cycles_branch {
        Some(value) => site.cycles("TCyclesBranch", Some(value))?,
        None => cycles_no_branch,
    };

    let declared_length = u32::try_from(length)
        .ok()
        .filter(|&length| length >= 1)
        .ok_or(LoadError::InvalidLength { kind: site.kind, byte: site.byte, length })?;
    let category = Category::from_str(&group).map_err(|_| LoadError::UnknownCategory {
        kind: site.kind,
        byte: site.byte,
        group: group.clone(),
    })?;

    let spec = OpcodeSpec {
        operands: parse_operands(&mnemonic),
        mnemonic,
        declared_length,
        category,
        cycles_no_branch,
        cycles_branch,
        byte: site.byte,
        kind: site.kind,
    };
    if category == Category::Unused && !spec.is_placeholder() {
        return Err(LoadError::UnusedCategory {
            kind: site.kind,
            byte: site.byte,
            mnemonic: spec.mnemonic,
        });
    }
    trace!("{} {} -> {}", site.kind, spec.hex(), spec.mnemonic);
    Ok(spec)
}
