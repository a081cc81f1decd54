use clap::Parser;
use flexbac_tools::{connect, ConnectionArgs};

/// Checks that the configured address and device id answer an identity read.
#[derive(Parser, Debug)]
#[command(name = "flexit-validate")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let (_, device) = connect(&args.connection).await?;

    if !device.validate().await {
        eprintln!(
            "device {} at {} did not answer",
            device.device_id(),
            device.peer()
        );
        std::process::exit(1);
    }
    if let Some(identity) = device.identity() {
        println!("{}", serde_json::to_string_pretty(identity)?);
    }
    Ok(())
}
