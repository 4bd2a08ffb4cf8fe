use std::path::PathBuf;

use crate::opcode::TableKind;

/// Everything that can stop an opcode table from loading. All of these abort the run.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed opcode document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("document has no {kind} table")]
    MissingTable { kind: TableKind },
    #[error("{kind} table has {len} records, expected 256")]
    TableLength { kind: TableKind, len: usize },
    #[error("{kind} record at position {position} claims opcode byte {byte:#04X}")]
    Misplaced { kind: TableKind, position: usize, byte: u8 },
    #[error("{kind} {byte:#04X}: missing required field '{field}'")]
    MissingField { kind: TableKind, byte: u8, field: &'static str },
    #[error("{kind} {byte:#04X}: field '{field}' is not an integer ({value})")]
    NotAnInteger {
        kind: TableKind,
        byte: u8,
        field: &'static str,
        value: String,
    },
    #[error("{kind} {byte:#04X}: Length must be at least 1, got {length}")]
    InvalidLength { kind: TableKind, byte: u8, length: i64 },
    #[error("{kind} {byte:#04X}: field '{field}' must be between 0 and 2147483647, got {cycles}")]
    CyclesOutOfRange {
        kind: TableKind,
        byte: u8,
        field: &'static str,
        cycles: i64,
    },
    #[error("{kind} {byte:#04X}: name {name:?} contains a quote or control character")]
    InvalidName { kind: TableKind, byte: u8, name: String },
    #[error("{kind} {byte:#04X}: unknown group '{group}'")]
    UnknownCategory { kind: TableKind, byte: u8, group: String },
    #[error("{kind} {byte:#04X}: '{mnemonic}' is a defined instruction but is grouped as unused")]
    UnusedCategory { kind: TableKind, byte: u8, mnemonic: String },
}
