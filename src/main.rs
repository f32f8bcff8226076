// src/main.rs

use maintrun::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("maintrun error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> maintrun::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
