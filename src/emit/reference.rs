//! Human-readable `{ "NAME", operand bytes }, // 0xNN` dump of a whole table.

use std::fmt::Write;

use crate::opcode::{OpcodeTable, TableKind};

pub fn file_name(kind: TableKind) -> String {
    format!("{}.txt", kind.source_key())
}

pub fn render(table: &OpcodeTable, kind: TableKind) -> String {
    table.iter(kind).fold(String::new(), |mut out, op| {
        _ = writeln!(out, "{{ \"{}\", {} }}, // {}", op.mnemonic, op.operand_byte_length(), op.hex());
        out
    })
}
