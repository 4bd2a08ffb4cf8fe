//! Per-opcode T-cycle tables laid out as a 16 column grid, one row per high nibble.

use std::fmt::Write;

use strum::IntoEnumIterator;

use super::banner;
use crate::{
    constants::{CYCLE_SENTINEL, GRID_WIDTH},
    opcode::{OpcodeSpec, OpcodeTable, TableKind},
};

pub const RUST_CYCLES_FILE: &str = "cycles.rs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    NoBranch,
    /// Conditional instructions whose branch is taken.
    Branch,
}

impl Timing {
    const fn of(self, op: &OpcodeSpec) -> i32 {
        match self {
            Self::NoBranch => op.cycles_no_branch,
            Self::Branch => op.cycles_branch,
        }
    }
}

/// 256 cycle counts in byte order, [`CYCLE_SENTINEL`] for UNUSED opcodes.
pub fn values(table: &OpcodeTable, kind: TableKind, timing: Timing) -> Vec<i32> {
    table
        .iter(kind)
        .map(|op| if op.is_placeholder() { CYCLE_SENTINEL } else { timing.of(op) })
        .collect()
}

/// Comma separated values with a line break after every 16th, none after the last.
pub fn grid(values: &[i32]) -> String {
    values
        .chunks(GRID_WIDTH)
        .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
        .collect::<Vec<_>>()
        .join(",\n")
}

const fn cpp_name(kind: TableKind, timing: Timing) -> &'static str {
    match (kind, timing) {
        (TableKind::Unprefixed, Timing::NoBranch) => "unprefixedCycles",
        (TableKind::CbPrefixed, Timing::NoBranch) => "prefixedCycles",
        (TableKind::Unprefixed, Timing::Branch) => "unprefixedBranchCycles",
        (TableKind::CbPrefixed, Timing::Branch) => "prefixedBranchCycles",
    }
}

const fn rust_name(kind: TableKind, timing: Timing) -> &'static str {
    match (kind, timing) {
        (TableKind::Unprefixed, Timing::NoBranch) => "UNPREFIXED_CYCLES",
        (TableKind::CbPrefixed, Timing::NoBranch) => "CB_CYCLES",
        (TableKind::Unprefixed, Timing::Branch) => "UNPREFIXED_BRANCH_CYCLES",
        (TableKind::CbPrefixed, Timing::Branch) => "CB_BRANCH_CYCLES",
    }
}

fn describe(kind: TableKind, timing: Timing) -> String {
    let table = match kind {
        TableKind::Unprefixed => "unprefixed",
        TableKind::CbPrefixed => "prefixed",
    };
    match timing {
        Timing::NoBranch => format!("Cycles for {table} instructions"),
        Timing::Branch => format!("Cycles for {table} instructions when the branch is taken"),
    }
}

fn tables() -> impl Iterator<Item = (TableKind, Timing)> {
    [Timing::NoBranch, Timing::Branch]
        .into_iter()
        .flat_map(|timing| TableKind::iter().map(move |kind| (kind, timing)))
}

/// Cycle arrays as members of the C++ `CPU` class.
pub fn render_cpp(table: &OpcodeTable) -> String {
    let mut out = String::new();
    for (kind, timing) in tables() {
        _ = writeln!(out, "\n// {}", describe(kind, timing));
        _ = writeln!(out, "std::array<int, 256> {} = {{", cpp_name(kind, timing));
        out.push_str(&grid(&values(table, kind, timing)));
        out.push_str("\n};\n");
    }
    out
}

/// Standalone Rust module with one `[i32; 256]` constant per table.
pub fn render_module(table: &OpcodeTable) -> String {
    let mut out = banner();
    for (kind, timing) in tables() {
        _ = writeln!(out, "\n/// {}. `{CYCLE_SENTINEL}` marks unused opcodes.", describe(kind, timing));
        _ = writeln!(out, "pub const {}: [i32; 256] = [", rust_name(kind, timing));
        for line in grid(&values(table, kind, timing)).lines() {
            _ = writeln!(out, "    {line}");
        }
        out.push_str("];\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{Category, tests::table_with};

    fn parse(grid: &str) -> Vec<i32> {
        grid.replace('\n', "").split(',').map(|v| v.trim().parse().unwrap()).collect()
    }

    #[test]
    fn grid_breaks_after_every_sixteenth_value() {
        let values: Vec<i32> = (0..256).collect();
        let text = grid(&values);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,");
        assert_eq!(lines[15].split(", ").count(), 16);
        assert!(text.ends_with("255"));
        assert_eq!(parse(&text), values);
    }

    #[test]
    fn grid_of_partial_row() {
        assert_eq!(grid(&[4, -1, 8]), "4, -1, 8");
        assert_eq!(grid(&[]), "");
    }

    #[test]
    fn placeholders_use_sentinel() {
        let table = table_with(&[
            (TableKind::Unprefixed, 0xD3, "UNUSED", Category::Unused),
            (TableKind::Unprefixed, 0xFC, "UNUSED", Category::Unused),
        ]);
        let cycles = values(&table, TableKind::Unprefixed, Timing::NoBranch);
        assert_eq!(cycles.len(), 256);
        assert_eq!(cycles[0xD3], -1);
        assert_eq!(cycles[0xFC], -1);
        assert_eq!(cycles[0x00], 4);
        assert_eq!(cycles.iter().filter(|&&c| c == CYCLE_SENTINEL).count(), 2);

        let branch = values(&table, TableKind::Unprefixed, Timing::Branch);
        assert_eq!(branch[0xD3], -1);
        assert_eq!(branch[0x00], 8);
    }

    #[test]
    fn rendered_tables_parse_back_to_model_values() {
        let table = table_with(&[(TableKind::CbPrefixed, 0x10, "UNUSED", Category::Unused)]);
        let module = render_module(&table);
        let body = module
            .split("pub const CB_CYCLES: [i32; 256] = [\n")
            .nth(1)
            .and_then(|rest| rest.split("\n];").next())
            .unwrap();
        assert_eq!(parse(body), values(&table, TableKind::CbPrefixed, Timing::NoBranch));

        let cpp = render_cpp(&table);
        assert!(cpp.contains("// Cycles for unprefixed instructions\nstd::array<int, 256> unprefixedCycles = {\n"));
        assert_eq!(cpp.matches("std::array<int, 256>").count(), 4);
    }
}
