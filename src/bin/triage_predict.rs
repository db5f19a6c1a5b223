//! Prediction binary: `triage-predict MODEL [TEXT]...`.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;

use triage::cli::args::PredictArgs;
use triage::cli::commands::execute_predict;

fn main() -> anyhow::Result<()> {
    let args = PredictArgs::parse();

    Builder::new()
        .filter_level(args.global.log_level())
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    execute_predict(&args)
        .with_context(|| format!("prediction with {} failed", args.model.display()))?;
    Ok(())
}
