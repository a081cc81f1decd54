use clap::Parser;
use flexbac_client::Coordinator;
use flexbac_tools::{connect, ConnectionArgs};
use std::sync::Arc;
use tokio::sync::watch;

/// Polls the unit at the configured interval until Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "flexit-poll")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let (config, device) = connect(&args.connection).await?;
    let coordinator = Coordinator::new(Arc::new(device), config.refresh_interval());

    if let Err(e) = coordinator.first_refresh().await {
        eprintln!("first refresh failed: {e}");
        std::process::exit(1);
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut updates = coordinator.subscribe();
    let mut stopped = stop_rx.clone();

    let printer = async {
        loop {
            let update = updates.borrow_and_update().clone();
            match (&update.snapshot, &update.last_error) {
                (_, Some(err)) => println!("unavailable: {err}"),
                (Some(state), None) => println!("{}", serde_json::json!(&**state)),
                (None, None) => {}
            }
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = stopped.changed() => return,
            }
        }
    };
    let stopper = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("cannot listen for Ctrl-C: {e}");
        }
        let _ = stop_tx.send(true);
    };

    tokio::join!(coordinator.run(stop_rx), printer, stopper);
    Ok(())
}
