//! Handler stubs split into one unit per `(table, category)`.

use std::fmt::Write;

use super::{Backend, GenConfig, banner};
use crate::{
    opcode::{Category, OpcodeSpec, OpcodeTable, TableKind},
    synth::{self, MacroCall},
};

/// A handler for one defined opcode. `body` is `None` when the semantics are written by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stub<'a> {
    pub op: &'a OpcodeSpec,
    pub handler: String,
    pub body: Option<MacroCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyUnit<'a> {
    pub kind: TableKind,
    pub category: Category,
    /// Name of the shared UNUSED handler if it is emitted in this unit.
    pub fallback: Option<&'static str>,
    pub stubs: Vec<Stub<'a>>,
}

/// Non-empty units for `kind`, ordered by category.
pub fn units<'a>(table: &'a OpcodeTable, kind: TableKind, config: &GenConfig) -> Vec<BodyUnit<'a>> {
    let backend = config.backend;
    let mut groups = table.groups(kind);
    // The fallback handler needs a home even when its category has no opcodes.
    groups.entry(config.unused_routing.category()).or_default();

    groups
        .into_iter()
        .map(|(category, ops)| BodyUnit {
            kind,
            category,
            fallback: (category == config.unused_routing.category()).then_some(backend.fallback_id(kind)),
            stubs: ops
                .into_iter()
                .map(|op| Stub {
                    op,
                    handler: backend.handler_id(kind, op.byte),
                    body: synth::synthesize(op),
                })
                .collect(),
        })
        .collect()
}

pub fn render(unit: &BodyUnit<'_>, backend: Backend) -> String {
    match backend {
        Backend::Cpp => render_cpp(unit),
        Backend::Rust => render_rust(unit),
    }
}

fn render_cpp(unit: &BodyUnit<'_>) -> String {
    let mut out = banner();
    out.push_str("#include \"gen_CPU.h\"\n");
    if let Some(fallback) = unit.fallback {
        _ = write!(out, "\nauto CPU::{fallback}() -> void {{\n  // UNUSED\n}}\n");
    }
    for stub in &unit.stubs {
        _ = write!(
            out,
            "\nauto CPU::{}() -> void {{\n  // {}\n  // {}\n",
            stub.handler,
            stub.op.mnemonic,
            stub.op.operand_byte_length()
        );
        if let Some(call) = &stub.body {
            _ = writeln!(out, "  {call};");
        }
        out.push_str("}\n");
    }
    out
}

fn render_rust(unit: &BodyUnit<'_>) -> String {
    let mut out = banner();
    out.push_str("\nuse super::Cpu;\n\nimpl Cpu {\n");
    let mut first = true;
    let mut separate = |out: &mut String| {
        if !std::mem::take(&mut first) {
            out.push('\n');
        }
    };

    if let Some(fallback) = unit.fallback {
        separate(&mut out);
        out.push_str("    /// Shared handler for opcodes with no defined instruction.\n");
        _ = writeln!(out, "    pub(super) fn {fallback}(&mut self) {{}}");
    }
    for stub in &unit.stubs {
        separate(&mut out);
        _ = writeln!(out, "    /// {}", stub.op.mnemonic);
        _ = writeln!(out, "    /// Operand bytes: {}", stub.op.operand_byte_length());
        match &stub.body {
            Some(call) => {
                _ = writeln!(out, "    pub(super) fn {}(&mut self) {{", stub.handler);
                _ = writeln!(out, "        {}!(self, {});", call.family.name(), call.arguments());
                out.push_str("    }\n");
            }
            None => {
                _ = writeln!(out, "    pub(super) fn {}(&mut self) {{}}", stub.handler);
            }
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{emit::UnusedRouting, opcode::tests::table_with, synth::MacroFamily};

    fn sample() -> OpcodeTable {
        table_with(&[
            (TableKind::Unprefixed, 0x04, "INC B", Category::X8Alu),
            (TableKind::Unprefixed, 0x18, "JR i8", Category::ControlBr),
            (TableKind::Unprefixed, 0xD3, "UNUSED", Category::Unused),
            (TableKind::CbPrefixed, 0x00, "RLC B", Category::X8Rsb),
            (TableKind::CbPrefixed, 0x58, "BIT 3,B", Category::X8Rsb),
            (TableKind::CbPrefixed, 0x86, "RES 0,(HL)", Category::X8Rsb),
        ])
    }

    #[test]
    fn stubs_cover_each_defined_opcode_once() {
        let table = sample();
        let config = GenConfig::new(Backend::Rust);
        let units = units(&table, TableKind::Unprefixed, &config);
        let bytes: Vec<u8> = units.iter().flat_map(|u| &u.stubs).map(|s| s.op.byte).collect();
        let unique: BTreeSet<u8> = bytes.iter().copied().collect();
        assert_eq!(bytes.len(), 255);
        assert_eq!(unique.len(), 255);
        assert!(!unique.contains(&0xD3));
        for unit in &units {
            assert!(unit.stubs.iter().all(|s| s.op.category == unit.category));
        }
    }

    #[test]
    fn units_are_ordered_and_non_empty() {
        let table = sample();
        let units = units(&table, TableKind::Unprefixed, &GenConfig::new(Backend::Rust));
        let categories: Vec<_> = units.iter().map(|u| u.category).collect();
        assert_eq!(categories, [Category::ControlBr, Category::X8Alu, Category::ControlMisc]);
        assert!(units.iter().all(|u| !u.stubs.is_empty() || u.fallback.is_some()));
    }

    #[test]
    fn fallback_follows_routing() {
        let table = sample();
        let misc = units(&table, TableKind::CbPrefixed, &GenConfig::new(Backend::Rust));
        let holder: Vec<_> = misc.iter().filter(|u| u.fallback.is_some()).collect();
        assert_eq!(holder.len(), 1);
        assert_eq!(holder[0].category, Category::ControlMisc);
        assert_eq!(holder[0].fallback, Some("opcode_cb_unused"));

        let config = GenConfig::new(Backend::Rust).with_unused_routing(UnusedRouting::Bucket);
        let bucket = units(&table, TableKind::Unprefixed, &config);
        let unused = bucket.iter().find(|u| u.category == Category::Unused).unwrap();
        assert!(unused.stubs.is_empty());
        assert_eq!(unused.fallback, Some("opcode_unused"));
        assert!(bucket.iter().filter(|u| u.category != Category::Unused).all(|u| u.fallback.is_none()));
    }

    #[test]
    fn bit_family_bodies_are_synthesized() {
        let table = sample();
        let units = units(&table, TableKind::CbPrefixed, &GenConfig::new(Backend::Rust));
        let rsb = units.iter().find(|u| u.category == Category::X8Rsb).unwrap();
        let by_byte = |byte: u8| rsb.stubs.iter().find(|s| s.op.byte == byte).unwrap();

        let bit = by_byte(0x58).body.as_ref().unwrap();
        assert_eq!(bit.family, MacroFamily::BitTest);
        assert_eq!(bit.args, ["3", "b"]);

        let res = by_byte(0x86).body.as_ref().unwrap();
        assert_eq!(res.family, MacroFamily::ReadModifyWrite);
        assert_eq!(res.args, ["0", "(hl)"]);

        assert_eq!(by_byte(0x00).body, None);
    }

    #[test]
    fn rust_unit_text() {
        let table = sample();
        let units = units(&table, TableKind::CbPrefixed, &GenConfig::new(Backend::Rust));
        let rsb = units.iter().find(|u| u.category == Category::X8Rsb).unwrap();
        let text = render(rsb, Backend::Rust);
        assert!(text.contains("use super::Cpu;\n\nimpl Cpu {\n"));
        assert!(text.contains(
            "    /// BIT 3,B\n    /// Operand bytes: 1\n    pub(super) fn opcode_cb_0x58(&mut self) {\n        alu_op_bit_test!(self, bit, 3, b);\n    }\n"
        ));
        assert!(text.contains("        alu_op_r8!(self, res, 0, (hl));\n"));
        assert!(text.contains("    /// RLC B\n    /// Operand bytes: 0\n    pub(super) fn opcode_cb_0x00(&mut self) {}\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn cpp_unit_text() {
        let table = sample();
        let config = GenConfig::new(Backend::Cpp);
        let unprefixed = units(&table, TableKind::Unprefixed, &config);
        let alu = unprefixed.iter().find(|u| u.category == Category::X8Alu).unwrap();
        let text = render(alu, Backend::Cpp);
        assert!(text.contains("#include \"gen_CPU.h\"\n"));
        assert!(text.contains("\nauto CPU::opcode_0x04() -> void {\n  // INC B\n  // 1\n}\n"));

        let unused = unprefixed.iter().find(|u| u.category == Category::Unused).unwrap();
        assert!(render(unused, Backend::Cpp).contains("auto CPU::opcode_UNUSED() -> void {\n  // UNUSED\n}\n"));

        let cb = units(&table, TableKind::CbPrefixed, &config);
        let rsb = cb.iter().find(|u| u.category == Category::X8Rsb).unwrap();
        assert!(render(rsb, Backend::Cpp).contains("  // BIT 3,B\n  // 1\n  alu_op_bit_test(bit, 3, b);\n}\n"));
    }
}
