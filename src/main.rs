use clap::Parser;
use feedback::cli::{Cli, Commands};
use feedback::{Config, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // `init` creates the file that would otherwise be loaded here
    let config = if matches!(cli.command, Some(Commands::Init)) {
        Config::default()
    } else {
        Config::load(cli.config.as_deref())?
    };
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
