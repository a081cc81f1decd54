use crate::bip::BipTransport;
use crate::config::DeviceConfig;
use crate::coordinator::Coordinator;
use crate::device::Device;
use crate::error::SetupError;
use crate::nordic;
use crate::registry::DeviceRegistry;
use crate::session::Transport;
use std::sync::Arc;

/// BACnet/IP transport honouring the config's local port and timeout.
pub fn transport_for(config: &DeviceConfig) -> BipTransport {
    let transport = BipTransport::new().with_response_timeout(config.timeout());
    match config.local_port {
        Some(port) => transport.with_local_port(port),
        None => transport,
    }
}

/// Brings one unit online over BACnet/IP.
pub async fn setup(
    config: &DeviceConfig,
    registry: &DeviceRegistry<BipTransport>,
) -> Result<Arc<Coordinator<BipTransport>>, SetupError> {
    setup_with(config, transport_for(config), registry).await
}

/// Validates the config, resolves the peer, confirms the unit answers,
/// runs the first refresh and registers the coordinator under the unit's
/// unique id. Nothing is registered when any step fails.
pub async fn setup_with<T: Transport>(
    config: &DeviceConfig,
    transport: T,
    registry: &DeviceRegistry<T>,
) -> Result<Arc<Coordinator<T>>, SetupError> {
    config.validate()?;
    let peer = config.resolve_peer().await?;
    let catalog = nordic::catalog()?;
    let device = Device::new(transport, peer, config.device_id, catalog)
        .with_deadline(config.timeout());

    if !device.validate().await {
        return Err(SetupError::ValidationFailed {
            peer,
            device_id: config.device_id,
        });
    }
    let id = device
        .identity()
        .map(|identity| identity.unique_id())
        .unwrap_or_else(|| format!("device-{}", config.device_id));

    let coordinator = Arc::new(Coordinator::new(
        Arc::new(device),
        config.refresh_interval(),
    ));
    coordinator
        .first_refresh()
        .await
        .map_err(SetupError::FirstRefresh)?;
    registry.insert(id.clone(), coordinator.clone())?;
    log::info!("set up '{}' as {id} at {peer}", config.name);
    Ok(coordinator)
}
