//! Body synthesis for the bit instruction families.
//!
//! Only `BIT`, `RES` and `SET` with a `KEYWORD operands` shaped mnemonic and one or two operands
//! get a body. Everything
//! else keeps an empty stub to be filled in by hand.

use std::fmt;

use crate::opcode::OpcodeSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Bit,
    Res,
    Set,
    Other,
}

impl Keyword {
    pub fn classify(token: &str) -> Self {
        match token {
            "BIT" => Self::Bit,
            "RES" => Self::Res,
            "SET" => Self::Set,
            _ => Self::Other,
        }
    }

    pub const fn family(self) -> Option<MacroFamily> {
        match self {
            Self::Bit => Some(MacroFamily::BitTest),
            Self::Res | Self::Set => Some(MacroFamily::ReadModifyWrite),
            Self::Other => None,
        }
    }
}

/// Hand-written macros the synthesized bodies expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFamily {
    /// `alu_op_bit_test`: reads the operand and only updates flags.
    BitTest,
    /// `alu_op_r8`: reads, transforms and writes back the operand.
    ReadModifyWrite,
}

impl MacroFamily {
    pub const fn name(self) -> &'static str {
        match self {
            Self::BitTest => "alu_op_bit_test",
            Self::ReadModifyWrite => "alu_op_r8",
        }
    }
}

/// A macro invocation making up a synthesized handler body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub family: MacroFamily,
    /// Lower-cased keyword, selects the ALU function inside the macro.
    pub op: String,
    /// Lower-cased operands in their original order.
    pub args: Vec<String>,
}

impl MacroCall {
    /// Argument list after the receiver: the operation followed by the operands.
    pub fn arguments(&self) -> String {
        std::iter::once(self.op.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Call form without a receiver, as written in C++ bodies.
impl fmt::Display for MacroCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.family.name(), self.arguments())
    }
}

pub fn synthesize(op: &OpcodeSpec) -> Option<MacroCall> {
    let mut tokens = op.mnemonic.split_whitespace();
    let (Some(keyword), Some(_), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };
    if op.operands.is_empty() || op.operands.len() > 2 {
        return None;
    }
    let family = Keyword::classify(keyword).family()?;
    Some(MacroCall {
        family,
        op: keyword.to_lowercase(),
        args: op.operands.iter().map(|operand| operand.to_lowercase()).collect(),
    })
}
