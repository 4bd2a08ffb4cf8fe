//! Opcode table compiler for the Game Boy CPU.
//!
//! Loads the 256 unprefixed and 256 CB-prefixed opcode records and projects them into the
//! scaffolding a hand-written interpreter builds on: dispatch tables, handler stubs grouped by
//! category, cycle tables and a reference listing.

pub mod constants;
pub mod emit;
pub mod error;
pub mod loader;
pub mod opcode;
pub mod synth;
pub mod writer;

pub mod prelude {
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use emit::{Artifacts, Backend, GenConfig, UnusedRouting, generate};
pub use error::LoadError;
pub use opcode::{Category, OpcodeSpec, OpcodeTable, TableKind};
