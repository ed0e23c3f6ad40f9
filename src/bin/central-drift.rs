use std::process::ExitCode;

use central_drift::config::args::Args;
use central_drift::config::loader;
use central_drift::runner;
use central_drift::utils::logging;
use clap::Parser;
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // -------------------------------
    // 1. Read arguments and settings
    // -------------------------------

    let dotenv = loader::load_dotenv();
    let args = Args::parse();
    let (settings, env_file) = match dotenv.and_then(|env_file| Ok((loader::run(&args)?, env_file))) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::run(&Default::default(), args.log_level);
            error!("{}", e);
            return ExitCode::from(runner::ExitStatus::Failure.code());
        }
    };

    // -------------------------------
    // 2. Logging
    // -------------------------------

    logging::run(&settings, args.log_level);
    if let Some(path) = &env_file {
        debug!("environment loaded from '{}'", path.display());
    }

    // -------------------------------
    // 3. Fetch, filter, compare
    // -------------------------------

    let mut stdout = std::io::stdout();
    let status = runner::run(&args, &settings, &mut stdout).await;
    ExitCode::from(status.code())
}
