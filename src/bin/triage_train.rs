//! Training binary: `triage-train DATABASE MODEL`.

use std::io::Write;

use anyhow::Context;
use env_logger::Builder;

use triage::cli::args::{TrainArgs, TrainInvocation};
use triage::cli::commands::execute_train;

fn main() -> anyhow::Result<()> {
    let args = match TrainArgs::parse_invocation(std::env::args_os()) {
        Ok(TrainInvocation::Run(args)) => args,
        Ok(TrainInvocation::Usage(text)) => {
            println!("{text}");
            return Ok(());
        }
        Err(err) => err.exit(),
    };

    Builder::new()
        .filter_level(args.global.log_level())
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    execute_train(&args)
        .with_context(|| format!("training on {} failed", args.dataset.display()))?;
    Ok(())
}
