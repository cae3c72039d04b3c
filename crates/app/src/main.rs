// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Delete, Init, List, Publish, Retrieve, Version};
use cti_exchange::{init_logging, AppState};

command_enum! {
    (Init, Init),
    (Publish, Publish),
    (Retrieve, Retrieve),
    (List, List),
    (Delete, Delete),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Log directory comes from the config file when there is one
    let log_dir = AppState::load(args.config_path.clone())
        .ok()
        .and_then(|state| state.config.log_dir);
    let guards = init_logging(args.log_level, log_dir.as_deref());

    let ctx = cli::op::OpContext::new(args.config_path, args.creator_token, args.consumer_token);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    // Flush buffered log writers before exiting
    drop(guards);
    std::process::exit(code);
}
