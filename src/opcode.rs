//! Typed opcode model shared by every emitter.
//!
//! An [`OpcodeTable`] is built once from the source document and never mutated. Both tables
//! always hold exactly 256 records whose `byte` equals their position.

use std::collections::BTreeMap;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    constants::{PLACEHOLDER_MNEMONIC, TABLE_SIZE},
    error::LoadError,
};

/// Instruction group used to split handler bodies across output units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, IntoStaticStr, EnumIter, Display)]
pub enum Category {
    #[strum(serialize = "control/br")]
    ControlBr,
    #[strum(serialize = "x8/rsb")]
    X8Rsb,
    #[strum(serialize = "x8/alu")]
    X8Alu,
    #[strum(serialize = "x16/lsm")]
    X16Lsm,
    #[strum(serialize = "control/misc")]
    ControlMisc,
    #[strum(serialize = "x16/alu")]
    X16Alu,
    #[strum(serialize = "x8/lsm")]
    X8Lsm,
    #[strum(serialize = "unused")]
    Unused,
}

impl Category {
    /// File name stem for the output unit of this group, `x8/alu` -> `x8_alu`.
    pub fn file_stem(self) -> String {
        let tag: &'static str = self.into();
        tag.replace('/', "_")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoStaticStr, EnumIter, Display)]
pub enum TableKind {
    #[strum(serialize = "Unprefixed")]
    Unprefixed,
    #[strum(serialize = "CBPrefixed")]
    CbPrefixed,
}

impl TableKind {
    /// Key of this table in the source document.
    pub fn source_key(self) -> &'static str {
        self.into()
    }
}

/// One instruction definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeSpec {
    pub mnemonic: String,
    pub operands: Vec<String>,
    /// Total instruction length in bytes, opcode byte included. Always at least 1.
    pub declared_length: u32,
    pub category: Category,
    /// T-cycles, never negative. Signed so the `-1` sentinel tables hold them unchanged.
    pub cycles_no_branch: i32,
    pub cycles_branch: i32,
    pub byte: u8,
    pub kind: TableKind,
}

impl OpcodeSpec {
    pub fn is_placeholder(&self) -> bool {
        self.mnemonic == PLACEHOLDER_MNEMONIC
    }

    pub const fn operand_byte_length(&self) -> u32 {
        self.declared_length.saturating_sub(1)
    }

    /// First whitespace-separated token of the mnemonic.
    pub fn keyword(&self) -> &str {
        self.mnemonic.split_whitespace().next().unwrap_or_default()
    }

    /// Opcode byte as `0xNN`.
    pub fn hex(&self) -> String {
        format!("0x{:02X}", self.byte)
    }
}

/// Operands are whatever follows the first whitespace, split on `,`.
pub fn parse_operands(mnemonic: &str) -> Vec<String> {
    mnemonic
        .trim()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| {
            rest.split(',')
                .map(str::trim)
                .filter(|operand| !operand.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Non-placeholder records of one table keyed by category.
pub type CategoryGroups<'a> = BTreeMap<Category, Vec<&'a OpcodeSpec>>;

pub struct OpcodeTable {
    unprefixed: Box<[OpcodeSpec; TABLE_SIZE]>,
    cb_prefixed: Box<[OpcodeSpec; TABLE_SIZE]>,
}

impl OpcodeTable {
    pub fn new(unprefixed: Vec<OpcodeSpec>, cb_prefixed: Vec<OpcodeSpec>) -> Result<Self, LoadError> {
        Ok(Self {
            unprefixed: checked(TableKind::Unprefixed, unprefixed)?,
            cb_prefixed: checked(TableKind::CbPrefixed, cb_prefixed)?,
        })
    }

    pub fn get(&self, kind: TableKind) -> &[OpcodeSpec; TABLE_SIZE] {
        match kind {
            TableKind::Unprefixed => &self.unprefixed,
            TableKind::CbPrefixed => &self.cb_prefixed,
        }
    }

    pub fn iter(&self, kind: TableKind) -> impl Iterator<Item = &OpcodeSpec> {
        self.get(kind).iter()
    }

    pub fn placeholder_count(&self, kind: TableKind) -> usize {
        self.iter(kind).filter(|op| op.is_placeholder()).count()
    }

    /// Partition of the defined opcodes of `kind` by category, each group in ascending byte order.
    pub fn groups(&self, kind: TableKind) -> CategoryGroups<'_> {
        let mut groups = CategoryGroups::new();
        for op in self.iter(kind).filter(|op| !op.is_placeholder()) {
            groups.entry(op.category).or_default().push(op);
        }
        groups
    }
}

fn checked(kind: TableKind, specs: Vec<OpcodeSpec>) -> Result<Box<[OpcodeSpec; TABLE_SIZE]>, LoadError> {
    if specs.len() != TABLE_SIZE {
        return Err(LoadError::TableLength { kind, len: specs.len() });
    }
    if let Some((position, op)) = specs
        .iter()
        .enumerate()
        .find(|(position, op)| op.kind != kind || usize::from(op.byte) != *position)
    {
        return Err(LoadError::Misplaced { kind, position, byte: op.byte });
    }
    specs
        .into_boxed_slice()
        .try_into()
        .map_err(|specs: Box<[OpcodeSpec]>| LoadError::TableLength { kind, len: specs.len() })
}
