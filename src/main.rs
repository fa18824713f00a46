// src/main.rs

use sitegraph::{cli, logging};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("sitegraph: failed to initialise logging: {err}");
        std::process::exit(1);
    }

    if let Err(err) = sitegraph::run(args).await {
        eprintln!("sitegraph: {err}");
        std::process::exit(1);
    }
}
