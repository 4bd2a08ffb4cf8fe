//! Projections of an [`OpcodeTable`] into text artifacts.
//!
//! Each submodule builds plain data first (rows, stubs, cycle values) and renders it for the
//! selected [`Backend`] second. Nothing here touches the filesystem.

pub mod bodies;
pub mod cycles;
pub mod dispatch;
pub mod reference;

use clap::ValueEnum;
use strum::IntoEnumIterator;
use strum_macros::Display;

use crate::{
    constants::GENERATED_BANNER,
    opcode::{Category, OpcodeTable, TableKind},
    prelude::*,
};

/// Output language and dispatch style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// C++ class header with arrays of member function pointers.
    Cpp,
    /// Rust `impl` blocks dispatched through a `match` on the opcode.
    Rust,
}

/// Where the shared handler for UNUSED opcodes is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum UnusedRouting {
    /// Its own `unused` unit per table.
    Bucket,
    /// Alongside the `control/misc` handlers.
    ControlMisc,
}

impl UnusedRouting {
    pub const fn category(self) -> Category {
        match self {
            Self::Bucket => Category::Unused,
            Self::ControlMisc => Category::ControlMisc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenConfig {
    pub backend: Backend,
    pub unused_routing: UnusedRouting,
}

impl GenConfig {
    /// Config with the routing each backend has always used.
    pub const fn new(backend: Backend) -> Self {
        let unused_routing = match backend {
            Backend::Cpp => UnusedRouting::Bucket,
            Backend::Rust => UnusedRouting::ControlMisc,
        };
        Self { backend, unused_routing }
    }

    #[must_use]
    pub const fn with_unused_routing(self, unused_routing: UnusedRouting) -> Self {
        Self { unused_routing, ..self }
    }
}

impl Backend {
    /// Name of the handler for a defined opcode.
    pub fn handler_id(self, kind: TableKind, byte: u8) -> String {
        match (self, kind) {
            (Self::Cpp, TableKind::Unprefixed) => format!("opcode_0x{byte:02X}"),
            (Self::Cpp, TableKind::CbPrefixed) => format!("opcode_CB_0x{byte:02X}"),
            (Self::Rust, TableKind::Unprefixed) => format!("opcode_0x{byte:02x}"),
            (Self::Rust, TableKind::CbPrefixed) => format!("opcode_cb_0x{byte:02x}"),
        }
    }

    /// Name of the handler every UNUSED opcode of `kind` dispatches to.
    pub const fn fallback_id(self, kind: TableKind) -> &'static str {
        match (self, kind) {
            (Self::Cpp, TableKind::Unprefixed) => "opcode_UNUSED",
            (Self::Cpp, TableKind::CbPrefixed) => "opcode_CB_UNUSED",
            (Self::Rust, TableKind::Unprefixed) => "opcode_unused",
            (Self::Rust, TableKind::CbPrefixed) => "opcode_cb_unused",
        }
    }

    /// File holding the handler declarations, dispatch tables and (for C++) cycle tables.
    pub const fn dispatch_file(self) -> &'static str {
        match self {
            Self::Cpp => "gen_CPU.h",
            Self::Rust => "dispatch.rs",
        }
    }

    pub fn unit_file(self, kind: TableKind, category: Category) -> String {
        let stem = category.file_stem();
        match (self, kind) {
            (Self::Cpp, TableKind::Unprefixed) => format!("gen_CPU_{stem}.cpp"),
            (Self::Cpp, TableKind::CbPrefixed) => format!("gen_CPU_CB_{stem}.cpp"),
            (Self::Rust, TableKind::Unprefixed) => format!("{stem}.rs"),
            (Self::Rust, TableKind::CbPrefixed) => format!("{stem}_prefixed.rs"),
        }
    }
}

pub(crate) fn banner() -> String {
    format!("// {GENERATED_BANNER}\n")
}

/// One generated file, path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Artifacts(pub Vec<Artifact>);

impl Artifacts {
    fn push(&mut self, path: impl Into<String>, contents: String) {
        self.0.push(Artifact { path: path.into(), contents });
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.iter().find(|a| a.path == path).map(|a| a.contents.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.0.iter()
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Runs every emitter over `table`. Same input, same bytes out.
#[instrument(skip(table))]
pub fn generate(table: &OpcodeTable, config: &GenConfig) -> Artifacts {
    let backend = config.backend;
    let mut artifacts = Artifacts::default();

    for kind in TableKind::iter() {
        artifacts.push(reference::file_name(kind), reference::render(table, kind));
    }

    artifacts.push(backend.dispatch_file(), dispatch::render(table, backend));
    if backend == Backend::Rust {
        artifacts.push(cycles::RUST_CYCLES_FILE, cycles::render_module(table));
    }

    for kind in TableKind::iter() {
        let units = bodies::units(table, kind, config);
        debug!(
            "{kind}: {} units, {} stubs, {} synthesized",
            units.len(),
            units.iter().map(|u| u.stubs.len()).sum::<usize>(),
            units.iter().flat_map(|u| &u.stubs).filter(|s| s.body.is_some()).count()
        );
        for unit in &units {
            artifacts.push(backend.unit_file(kind, unit.category), bodies::render(unit, backend));
        }
    }

    info!("Generated {} artifacts for the {backend} backend", artifacts.len());
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::tests::table_with;

    fn sample() -> OpcodeTable {
        table_with(&[
            (TableKind::Unprefixed, 0x04, "INC B", Category::X8Alu),
            (TableKind::Unprefixed, 0xD3, "UNUSED", Category::Unused),
            (TableKind::CbPrefixed, 0x58, "BIT 3,B", Category::X8Rsb),
        ])
    }

    #[test]
    fn handler_names_per_backend() {
        assert_eq!(Backend::Cpp.handler_id(TableKind::Unprefixed, 0x0A), "opcode_0x0A");
        assert_eq!(Backend::Cpp.handler_id(TableKind::CbPrefixed, 0xFF), "opcode_CB_0xFF");
        assert_eq!(Backend::Rust.handler_id(TableKind::Unprefixed, 0x0A), "opcode_0x0a");
        assert_eq!(Backend::Rust.handler_id(TableKind::CbPrefixed, 0x7), "opcode_cb_0x07");
        assert_eq!(Backend::Rust.fallback_id(TableKind::CbPrefixed), "opcode_cb_unused");
        assert_eq!(Backend::Cpp.fallback_id(TableKind::Unprefixed), "opcode_UNUSED");
    }

    #[test]
    fn default_routing_follows_backend() {
        assert_eq!(GenConfig::new(Backend::Cpp).unused_routing, UnusedRouting::Bucket);
        assert_eq!(GenConfig::new(Backend::Rust).unused_routing, UnusedRouting::ControlMisc);
        let config = GenConfig::new(Backend::Rust).with_unused_routing(UnusedRouting::Bucket);
        assert_eq!(config.backend, Backend::Rust);
        assert_eq!(config.unused_routing, UnusedRouting::Bucket);
    }

    #[test]
    fn rust_artifact_set() {
        let artifacts = generate(&sample(), &GenConfig::new(Backend::Rust));
        let paths: Vec<_> = artifacts.paths().collect();
        assert_eq!(
            paths,
            [
                "Unprefixed.txt",
                "CBPrefixed.txt",
                "dispatch.rs",
                "cycles.rs",
                "x8_alu.rs",
                "control_misc.rs",
                "x8_rsb_prefixed.rs",
                "control_misc_prefixed.rs",
            ]
        );
    }

    #[test]
    fn cpp_artifact_set() {
        let artifacts = generate(&sample(), &GenConfig::new(Backend::Cpp));
        let paths: Vec<_> = artifacts.paths().collect();
        assert_eq!(
            paths,
            [
                "Unprefixed.txt",
                "CBPrefixed.txt",
                "gen_CPU.h",
                "gen_CPU_x8_alu.cpp",
                "gen_CPU_control_misc.cpp",
                "gen_CPU_unused.cpp",
                "gen_CPU_CB_x8_rsb.cpp",
                "gen_CPU_CB_control_misc.cpp",
                "gen_CPU_CB_unused.cpp",
            ]
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let table = sample();
        for backend in [Backend::Cpp, Backend::Rust] {
            let config = GenConfig::new(backend);
            assert_eq!(generate(&table, &config), generate(&table, &config));
        }
    }
}
