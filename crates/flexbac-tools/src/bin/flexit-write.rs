use clap::Parser;
use flexbac_tools::{connect, ConnectionArgs};

/// Writes one register, refreshes and prints the value read back.
#[derive(Parser, Debug)]
#[command(name = "flexit-write")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[arg(long)]
    register: String,
    /// Number, on/off for binary registers, or a state index.
    #[arg(long)]
    value: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let (_, device) = connect(&args.connection).await?;

    let register = device.catalog().lookup(&args.register)?;
    let Some(value) = register.decoder.parse(&args.value) else {
        eprintln!("'{}' is not a valid value for {}", args.value, register.name);
        std::process::exit(1);
    };

    if let Err(e) = device.set_register_and_refresh(register.name, value).await {
        eprintln!("write failed: {e}");
        std::process::exit(1);
    }
    println!("{}: {}", register.name, device.current_value(register.name)?);
    Ok(())
}
