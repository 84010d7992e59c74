//! btleplug-backed transport.
//!
//! Scans by advertised name, connects, discovers services, and addresses
//! characteristics by the fixed `AttributeId` UUIDs.

use std::time::Duration;

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};

use lockbox_proto::AttributeId;

use crate::transport::{Transport, TransportError};

const DEFAULT_SCAN_WINDOW: Duration = Duration::from_secs(5);

pub struct BleTransport {
    adapter: Adapter,
    scan_window: Duration,
}

impl BleTransport {
    /// Acquire the first Bluetooth adapter on the host.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(TransportError::NoAdapter)?;
        Ok(Self {
            adapter,
            scan_window: DEFAULT_SCAN_WINDOW,
        })
    }

    pub fn with_scan_window(mut self, window: Duration) -> Self {
        self.scan_window = window;
        self
    }

    fn find_characteristic(
        conn: &Peripheral,
        id: AttributeId,
    ) -> Result<Characteristic, TransportError> {
        conn.characteristics()
            .into_iter()
            .find(|c| c.uuid == id.uuid())
            .ok_or(TransportError::MissingAttribute(id))
    }
}

impl Transport for BleTransport {
    type Peripheral = Peripheral;
    // btleplug models the connection on the peripheral handle itself.
    type Connection = Peripheral;

    async fn scan(&self, target_name: &str) -> Result<Option<Peripheral>, TransportError> {
        self.adapter.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(self.scan_window).await;

        let peripherals = self.adapter.peripherals().await?;
        let mut found = None;
        for peripheral in peripherals {
            if let Some(props) = peripheral.properties().await? {
                let name = props.local_name.unwrap_or_default();
                if name == target_name {
                    tracing::info!(%name, address = %peripheral.address(), "found peripheral");
                    found = Some(peripheral);
                    break;
                }
            }
        }

        self.adapter.stop_scan().await?;
        Ok(found)
    }

    async fn connect(&self, peripheral: &Peripheral) -> Result<Peripheral, TransportError> {
        peripheral.connect().await?;
        peripheral.discover_services().await?;

        for service in peripheral.services() {
            tracing::debug!(service = %service.uuid, "discovered service");
            for characteristic in &service.characteristics {
                tracing::debug!(
                    characteristic = %characteristic.uuid,
                    properties = ?characteristic.properties,
                    "discovered characteristic"
                );
            }
        }

        Ok(peripheral.clone())
    }

    async fn read_attribute(
        &self,
        conn: &Peripheral,
        id: AttributeId,
    ) -> Result<Vec<u8>, TransportError> {
        let characteristic = Self::find_characteristic(conn, id)?;
        Ok(conn.read(&characteristic).await?)
    }

    async fn write_attribute(
        &self,
        conn: &Peripheral,
        id: AttributeId,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let characteristic = Self::find_characteristic(conn, id)?;
        Ok(conn.write(&characteristic, data, WriteType::WithResponse).await?)
    }

    async fn disconnect(&self, conn: Peripheral) {
        if let Err(e) = conn.disconnect().await {
            tracing::warn!(error = %e, "disconnect failed");
        }
    }
}
