//! Handler declarations and the two 256-entry dispatch tables.

use std::fmt::Write;

use strum::IntoEnumIterator;

use super::{Backend, banner};
use crate::opcode::{OpcodeTable, TableKind};

/// One `opcode byte -> handler` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRow {
    pub byte: u8,
    pub handler: String,
    /// Set for UNUSED opcodes routed to the shared handler.
    pub fallback: bool,
}

/// A handler the dispatch table refers to. `mnemonic` is `None` for the shared fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub handler: String,
    pub mnemonic: Option<String>,
}

/// Dispatch rows for every byte of `kind` in ascending order.
pub fn rows(table: &OpcodeTable, kind: TableKind, backend: Backend) -> Vec<DispatchRow> {
    table
        .iter(kind)
        .map(|op| {
            if op.is_placeholder() {
                DispatchRow {
                    byte: op.byte,
                    handler: backend.fallback_id(kind).to_string(),
                    fallback: true,
                }
            } else {
                DispatchRow {
                    byte: op.byte,
                    handler: backend.handler_id(kind, op.byte),
                    fallback: false,
                }
            }
        })
        .collect()
}

/// The fallback declaration, then one per defined opcode.
pub fn declarations(table: &OpcodeTable, kind: TableKind, backend: Backend) -> Vec<Declaration> {
    let fallback = Declaration {
        handler: backend.fallback_id(kind).to_string(),
        mnemonic: None,
    };
    std::iter::once(fallback)
        .chain(table.iter(kind).filter(|op| !op.is_placeholder()).map(|op| Declaration {
            handler: backend.handler_id(kind, op.byte),
            mnemonic: Some(op.mnemonic.clone()),
        }))
        .collect()
}

pub fn render(table: &OpcodeTable, backend: Backend) -> String {
    match backend {
        Backend::Cpp => render_cpp(table),
        Backend::Rust => render_rust(table),
    }
}

/// ` // NAME` after a declaration, nothing for the fallback.
fn trailer(mnemonic: Option<&str>) -> String {
    mnemonic.map(|m| format!(" // {m}")).unwrap_or_default()
}

fn render_cpp(table: &OpcodeTable) -> String {
    let mut out = banner();
    out.push_str("#include <array>\n\nclass CPU {\npublic:\n");

    for kind in TableKind::iter() {
        for decl in declarations(table, kind, Backend::Cpp) {
            _ = writeln!(out, "auto {}() -> void;{}", decl.handler, trailer(decl.mnemonic.as_deref()));
        }
        out.push('\n');
    }

    out.push_str("typedef void (CPU::*Instruction)(void);\n");
    for (kind, name) in [
        (TableKind::Unprefixed, "unprefixedInstructions"),
        (TableKind::CbPrefixed, "prefixedInstructions"),
    ] {
        _ = writeln!(out, "\nstd::array<Instruction, 256> {name} = {{");
        for row in rows(table, kind, Backend::Cpp) {
            _ = writeln!(out, "&CPU::{}, // 0x{:02X}", row.handler, row.byte);
        }
        out.push_str("};\n");
    }

    out.push_str(&super::cycles::render_cpp(table));
    out.push_str("};\n");
    out
}

fn render_rust(table: &OpcodeTable) -> String {
    let mut out = banner();
    out.push_str("\nuse super::Cpu;\n\npub type Handler = fn(&mut Cpu);\n");

    // Every declaration is a coercion to `Handler`, so a missing or mistyped handler fails to build.
    for kind in TableKind::iter() {
        out.push('\n');
        for decl in declarations(table, kind, Backend::Rust) {
            _ = writeln!(out, "const _: Handler = Cpu::{};{}", decl.handler, trailer(decl.mnemonic.as_deref()));
        }
    }

    out.push_str("\nimpl Cpu {\n");
    for (kind, name) in [(TableKind::Unprefixed, "dispatch"), (TableKind::CbPrefixed, "dispatch_cb")] {
        if kind == TableKind::CbPrefixed {
            out.push('\n');
        }
        _ = writeln!(out, "    pub(super) fn {name}(&mut self, opcode: u8) {{");
        out.push_str("        match opcode {\n");
        for row in rows(table, kind, Backend::Rust) {
            _ = writeln!(out, "            0x{:02X} => self.{}(),", row.byte, row.handler);
        }
        out.push_str("        }\n    }\n");
    }
    out.push_str("}\n");
    out
}
