use args::Args;
use clap::Parser;
use env_file::EnvFile;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;
mod env_file;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = EnvFile::load();
    let args = Args::parse();

    logger::init(&args);
    env_file.log();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let shutdown_signal = CancellationToken::new();

    tokio::spawn({
        let shutdown_signal = shutdown_signal.clone();

        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for the shutdown signal: {e}");
                return;
            }

            log::info!("Shutdown signal received, draining connections");
            shutdown_signal.cancel();
        }
    });

    let serve_config = ServeConfig {
        listen_address: args.listen_address(&config),
        config,
        shutdown_signal,
    };

    if let Err(e) = server::serve(serve_config).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}
