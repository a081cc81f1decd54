use clap::Args;
use flexbac_client::setup::transport_for;
use flexbac_client::{nordic, BipTransport, ConfigError, Device, DeviceConfig};
use std::error::Error;
use std::path::PathBuf;

/// Connection flags shared by every tool.
///
/// Either `--config` or both `--address` and `--device-id` must be given;
/// flags override values from the file.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// JSON device config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Host name or IP address of the unit.
    #[arg(long, required_unless_present = "config")]
    pub address: Option<String>,
    /// BACnet device instance of the unit.
    #[arg(long, required_unless_present = "config")]
    pub device_id: Option<u32>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Seconds each operation may take.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Minutes between scheduled refreshes.
    #[arg(long)]
    pub refresh_interval: Option<u64>,
    /// Fixed local UDP port instead of an ephemeral one.
    #[arg(long)]
    pub local_port: Option<u16>,
}

impl ConnectionArgs {
    pub fn device_config(&self) -> Result<DeviceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DeviceConfig::from_json_file(path)?,
            None => DeviceConfig::new(
                self.address.clone().unwrap_or_default(),
                self.device_id.unwrap_or_default(),
            ),
        };
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(device_id) = self.device_id {
            config.device_id = device_id;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh_interval = interval;
        }
        if self.local_port.is_some() {
            config.local_port = self.local_port;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Builds a Nordic device from the flags without touching the network
/// beyond name resolution.
pub async fn connect(
    args: &ConnectionArgs,
) -> Result<(DeviceConfig, Device<BipTransport>), Box<dyn Error>> {
    let config = args.device_config()?;
    let peer = config.resolve_peer().await?;
    let device = Device::new(
        transport_for(&config),
        peer,
        config.device_id,
        nordic::catalog()?,
    )
    .with_deadline(config.timeout());
    Ok((config, device))
}
