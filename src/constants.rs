use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Table geometry
pub const TABLE_SIZE: usize = 256;
pub const GRID_WIDTH: usize = 16;

// Cycle count written for UNUSED opcodes. No real opcode has a negative count.
pub const CYCLE_SENTINEL: i32 = -1;

// Mnemonic that marks a byte value with no defined instruction.
pub const PLACEHOLDER_MNEMONIC: &str = "UNUSED";

pub const GENERATED_BANNER: &str = "Generated by opgen from the opcode table. Do not edit by hand.";

pub fn setup_logger() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).without_time())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()?;
    Ok(())
}
