use enumflags2::BitFlags;
use std::sync::Arc;

use crate::*;
use crate::error::Error;
use crate::platform::Platform;
use crate::uuid::Uuid;

use super::*;
use super::peripheral::Peripheral;

/// Imperative side of the hardware central manager.
///
/// Implementations wrap the platform manager object. All callbacks must be delivered to the
/// delegate serially, from a single dispatch context, in the order they occur.
pub trait CentralDriver: Send + Sync + 'static {
    /// Installs the delegate receiving all callbacks of this manager.
    fn set_delegate(&self, delegate: Arc<dyn CentralDelegate>, options: &ManagerOptions);

    /// Removes the delegate; no callbacks are delivered afterwards.
    fn clear_delegate(&self);

    fn state(&self) -> ManagerState;

    fn authorization(&self) -> Authorization;

    fn is_scanning(&self) -> bool;

    fn supports_features(&self, features: BitFlags<Feature>) -> bool;

    fn scan(&self, options: &ScanOptions);

    fn stop_scan(&self);

    fn connect(&self, peripheral: &Peripheral, options: &ConnectOptions);

    fn cancel_connect(&self, peripheral: &Peripheral);

    fn retrieve_peripherals(&self, ids: &[Uuid]) -> Vec<Peripheral>;

    fn retrieve_connected_peripherals(&self, services: &[Uuid]) -> Vec<Peripheral>;

    fn register_for_connection_events(&self, options: &ConnectionEventOptions);

    /// Callbacks and operations available on the platform this driver runs on.
    fn platform(&self) -> Platform {
        Platform::current()
    }
}

/// Callback surface of the hardware central manager.
pub trait CentralDelegate: Send + Sync {
    fn did_update_state(&self, new_state: ManagerState);

    fn will_restore_state(&self, state: RestoredState);

    fn did_connect(&self, peripheral: Peripheral);

    fn did_fail_to_connect(&self, peripheral: Peripheral, error: Option<Error>);

    fn did_disconnect(&self, peripheral: Peripheral, error: Option<Error>);

    fn connection_event_did_occur(&self, event: ConnectionEvent, peripheral: Peripheral);

    fn did_discover(&self, peripheral: Peripheral, advertisement_data: AdvertisementData, rssi: i32);

    fn did_update_ancs_authorization(&self, peripheral: Peripheral);
}
