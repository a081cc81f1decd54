use clap::Parser;
use flexbac_tools::{connect, ConnectionArgs};

/// Runs one refresh and prints the snapshot as JSON.
#[derive(Parser, Debug)]
#[command(name = "flexit-read")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Print only this register.
    #[arg(long)]
    register: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let (_, device) = connect(&args.connection).await?;

    let state = match device.refresh().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("refresh failed: {e}");
            std::process::exit(1);
        }
    };

    match args.register {
        Some(name) => match device.current_value(&name) {
            Ok(value) => println!("{name}: {value}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => println!("{}", serde_json::to_string_pretty(&*state)?),
    }
    Ok(())
}
