use std::process::ExitCode;
use std::sync::Arc;

use linkrelay::broker::Broker;
use linkrelay::config::load_config;
use linkrelay::transport::{bind, catcher, feeds, serve};
use linkrelay::utils::error::RelayError;
use linkrelay::utils::logging;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init("info");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("linkrelay failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), RelayError> {
    let settings = load_config()?;
    let broker = Arc::new(Broker::new());

    // Both listeners must bind before either serves.
    let catcher_listener = bind(&settings.catcher_addr()).await?;
    let feeds_listener = bind(&settings.feeds_addr()).await?;

    let (stop, stopped) = watch::channel(false);

    let catcher = serve(
        "catcher",
        catcher_listener,
        catcher::router(broker.clone(), settings.intake.clone()),
        wait_for_stop(stopped.clone()),
    );
    let feeds = serve(
        "feeds",
        feeds_listener,
        feeds::router(broker.clone(), &settings.feeds),
        wait_for_stop(stopped),
    );

    let signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received. Closing feeds.");
        broker.close_all();
        let _ = stop.send(true);
        Ok::<_, RelayError>(())
    };

    tokio::try_join!(catcher, feeds, signal)?;
    info!("Shut down cleanly");
    Ok(())
}

async fn wait_for_stop(mut stopped: watch::Receiver<bool>) {
    let _ = stopped.wait_for(|stop| *stop).await;
}
