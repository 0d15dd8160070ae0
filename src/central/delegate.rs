use log::*;

use crate::*;
use crate::error::Error;
use crate::platform::Platform;
use crate::stream::EventHub;

use super::*;
use super::driver::CentralDelegate;
use super::peripheral::*;

/// The single delegate installed on the driver. Republishes every callback on the hub of its
/// kind and, as a [`CentralEvent`], on the `events` hub.
pub(in crate) struct Delegate {
    pub state: EventHub<ManagerState>,
    pub restored: EventHub<RestoredState>,
    pub connected: EventHub<Peripheral>,
    pub connect_failed: EventHub<(Peripheral, Option<Error>)>,
    pub disconnected: EventHub<(Peripheral, Option<Error>)>,
    pub connection_event: EventHub<(ConnectionEvent, Peripheral)>,
    pub discovered: EventHub<PeripheralDiscovery>,
    pub ancs_authorization: EventHub<Peripheral>,
    pub events: EventHub<CentralEvent>,
}

impl Delegate {
    pub fn new(platform: Platform) -> Self {
        Self {
            state: EventHub::new(),
            restored: EventHub::new(),
            connected: EventHub::new(),
            connect_failed: EventHub::new(),
            disconnected: EventHub::new(),
            connection_event: EventHub::with_support(platform.connection_events()),
            discovered: EventHub::new(),
            ancs_authorization: EventHub::with_support(platform.ancs_authorization()),
            events: EventHub::new(),
        }
    }
}

impl CentralDelegate for Delegate {
    fn did_update_state(&self, new_state: ManagerState) {
        trace!("state updated: {:?}", new_state);
        self.state.publish(new_state);
        self.events.publish(CentralEvent::ManagerStateChanged { new_state });
    }

    fn will_restore_state(&self, state: RestoredState) {
        trace!("restoring state with {} peripherals", state.peripherals.len());
        self.restored.publish(state.clone());
        self.events.publish(CentralEvent::StateRestored { state });
    }

    fn did_connect(&self, peripheral: Peripheral) {
        trace!("connected to {}", peripheral.id());
        self.connected.publish(peripheral.clone());
        self.events.publish(CentralEvent::PeripheralConnected { peripheral });
    }

    fn did_fail_to_connect(&self, peripheral: Peripheral, error: Option<Error>) {
        trace!("failed to connect to {}: {:?}", peripheral.id(), error);
        self.connect_failed.publish((peripheral.clone(), error.clone()));
        self.events.publish(CentralEvent::PeripheralConnectFailed { peripheral, error });
    }

    fn did_disconnect(&self, peripheral: Peripheral, error: Option<Error>) {
        trace!("disconnected from {}: {:?}", peripheral.id(), error);
        self.disconnected.publish((peripheral.clone(), error.clone()));
        self.events.publish(CentralEvent::PeripheralDisconnected { peripheral, error });
    }

    fn connection_event_did_occur(&self, event: ConnectionEvent, peripheral: Peripheral) {
        if !self.connection_event.is_supported() {
            warn!("ignoring connection event {:?} for {}: not supported on this platform",
                event, peripheral.id());
            return;
        }
        trace!("connection event {:?} for {}", event, peripheral.id());
        self.connection_event.publish((event, peripheral.clone()));
        self.events.publish(CentralEvent::ConnectionEvent { event, peripheral });
    }

    fn did_discover(&self, peripheral: Peripheral, advertisement_data: AdvertisementData, rssi: i32) {
        trace!("discovered {} at {} dBm", peripheral.id(), rssi);
        self.discovered.publish(PeripheralDiscovery {
            peripheral: peripheral.clone(),
            advertisement_data: advertisement_data.clone(),
            rssi,
        });
        self.events.publish(CentralEvent::PeripheralDiscovered {
            peripheral,
            advertisement_data,
            rssi,
        });
    }

    fn did_update_ancs_authorization(&self, peripheral: Peripheral) {
        if !self.ancs_authorization.is_supported() {
            warn!("ignoring ANCS authorization update for {}: not supported on this platform",
                peripheral.id());
            return;
        }
        trace!("ANCS authorization updated for {}", peripheral.id());
        self.ancs_authorization.publish(peripheral.clone());
        self.events.publish(CentralEvent::AncsAuthorizationUpdated { peripheral });
    }
}
