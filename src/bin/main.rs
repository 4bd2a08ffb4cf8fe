use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use opgen::{
    Backend, GenConfig, UnusedRouting,
    constants::setup_logger,
    generate, loader,
    prelude::*,
    writer::{self, Drift},
};
use std::path::PathBuf;
use tap::Tap;

#[derive(Parser)]
#[command(name = "opgen", about = "Generate CPU dispatch scaffolding from an opcode table")]
struct Settings {
    /// Opcode document with `Unprefixed` and `CBPrefixed` tables
    #[arg()]
    input: PathBuf,
    #[arg(short, long, default_value = "generated")]
    out_dir: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Backend::Rust)]
    backend: Backend,
    /// Where UNUSED opcodes get their shared handler [default: bucket for cpp, control-misc for rust]
    #[arg(long, value_enum)]
    unused_routing: Option<UnusedRouting>,
    /// Compare against the files in the output directory instead of writing them
    #[arg(long)]
    check: bool,
}

impl Settings {
    fn config(&self) -> GenConfig {
        let config = GenConfig::new(self.backend);
        self.unused_routing
            .map_or(config, |routing| config.with_unused_routing(routing))
    }
}

fn main() -> Result<()> {
    let settings = Settings::parse();
    setup_logger()?;

    let table = loader::from_path(&settings.input)?;
    let config = settings.config();
    let artifacts = generate(&table, &config);

    if settings.check {
        let drift = writer::check(&artifacts, &settings.out_dir)?;
        for d in &drift {
            match d {
                Drift::Missing(path) => error!("Missing {}", path.display()),
                Drift::Differs(path) => error!("Out of date {}", path.display()),
            }
        }
        if !drift.is_empty() {
            return Err(eyre!("{} of {} artifacts differ from {}", drift.len(), artifacts.len(), settings.out_dir.display()));
        }
        info!("All {} artifacts up to date", artifacts.len());
        return Ok(());
    }

    writer::write_all(&artifacts, &settings.out_dir)?
        .tap(|summary| info!("{} written, {} unchanged in {}", summary.written, summary.unchanged, settings.out_dir.display()));
    Ok(())
}
