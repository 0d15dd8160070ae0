mod delegate;
pub mod driver;
pub mod peripheral;

use enumflags2::BitFlags;
use log::*;
use static_assertions::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::*;
use crate::error::{CentralManagerError, Error};
use crate::platform::Platform;
use crate::stream::*;
use crate::uuid::*;

use delegate::Delegate;
use driver::CentralDriver;
use peripheral::*;

/// Every delegate callback as a single tagged value, one variant per callback kind.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum CentralEvent {
    ManagerStateChanged {
        new_state: ManagerState,
    },

    StateRestored {
        state: RestoredState,
    },

    PeripheralConnected {
        peripheral: Peripheral,
    },

    PeripheralConnectFailed {
        peripheral: Peripheral,
        error: Option<Error>,
    },

    PeripheralDisconnected {
        peripheral: Peripheral,
        error: Option<Error>,
    },

    ConnectionEvent {
        event: ConnectionEvent,
        peripheral: Peripheral,
    },

    PeripheralDiscovered {
        peripheral: Peripheral,
        advertisement_data: AdvertisementData,
        rssi: i32,
    },

    AncsAuthorizationUpdated {
        peripheral: Peripheral,
    },
}

assert_impl_all!(CentralEvent: Send, Sync);

/// Change of a peripheral connection matching the registered connection event options.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConnectionEvent {
    PeerDisconnected,
    PeerConnected,
}

/// State the system preserved for the app, delivered before the app is relaunched into the
/// background.
#[derive(Clone, Debug, Default)]
pub struct RestoredState {
    /// Peripherals connected or pending connection when the app was terminated.
    pub peripherals: Vec<Peripheral>,

    /// Service filter of the scan in progress when the app was terminated.
    pub scan_services: Vec<Uuid>,

    /// Options of the scan in progress when the app was terminated.
    pub scan_options: Option<ScanOptions>,
}

/// Options the driver receives along with the delegate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ManagerOptions {
    show_power_alert: bool,
    restore_identifier: Option<String>,
}

impl ManagerOptions {
    /// Whether the system should warn the user if Bluetooth is powered off.
    pub fn shows_power_alert(&self) -> bool {
        self.show_power_alert
    }

    /// Identifier under which the system preserves the manager's state.
    pub fn restore_identifier(&self) -> Option<&str> {
        self.restore_identifier.as_deref()
    }
}

pub struct CentralManagerBuilder {
    options: ManagerOptions,
}

impl CentralManagerBuilder {
    pub fn new() -> Self {
        Self {
            options: ManagerOptions::default(),
        }
    }

    pub fn show_power_alert(&mut self, v: bool) -> &mut Self {
        self.options.show_power_alert = v;
        self
    }

    pub fn restore_identifier(&mut self, v: impl Into<String>) -> &mut Self {
        self.options.restore_identifier = Some(v.into());
        self
    }

    pub fn build(&self, driver: impl CentralDriver) -> CentralManager {
        CentralManager::build(self, Arc::new(driver))
    }
}

impl Default for CentralManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

assert_impl_all!(CentralManagerBuilder: Send, Sync);

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanOptions {
    allow_duplicates: bool,
    services: Option<Vec<Uuid>>,
    solicited_services: Vec<Uuid>,
}

impl ScanOptions {
    /// Report every advertisement of a peripheral rather than only the first one.
    pub fn allow_duplicates(mut self, v: bool) -> Self {
        self.allow_duplicates = v;
        self
    }

    /// Only discover peripherals advertising any of these services.
    pub fn services(mut self, uuids: &[Uuid]) -> Self {
        self.services.get_or_insert_with(Vec::new).extend_from_slice(uuids);
        self
    }

    /// Also discover peripherals soliciting any of these services.
    pub fn solicited_services(mut self, uuids: &[Uuid]) -> Self {
        self.solicited_services.extend_from_slice(uuids);
        self
    }

    pub fn duplicates_allowed(&self) -> bool {
        self.allow_duplicates
    }

    /// The service filter, `None` to discover all peripherals.
    pub fn service_uuids(&self) -> Option<&[Uuid]> {
        self.services.as_deref()
    }

    pub fn solicited_service_uuids(&self) -> &[Uuid] {
        &self.solicited_services
    }
}

assert_impl_all!(ScanOptions: Send, Sync);

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectOptions {
    notify_on_connection: bool,
    notify_on_disconnection: bool,
    notify_on_notification: bool,
    start_delay: Duration,
}

impl ConnectOptions {
    /// Show an alert if the app is suspended when the connection succeeds.
    pub fn notify_on_connection(mut self, v: bool) -> Self {
        self.notify_on_connection = v;
        self
    }

    /// Show an alert if the app is suspended when the peripheral disconnects.
    pub fn notify_on_disconnection(mut self, v: bool) -> Self {
        self.notify_on_disconnection = v;
        self
    }

    /// Show an alert for all notifications received while the app is suspended.
    pub fn notify_on_notification(mut self, v: bool) -> Self {
        self.notify_on_notification = v;
        self
    }

    /// Delay the system waits before starting the connection.
    pub fn start_delay(mut self, v: Duration) -> Self {
        self.start_delay = v;
        self
    }

    pub fn notifies_on_connection(&self) -> bool {
        self.notify_on_connection
    }

    pub fn notifies_on_disconnection(&self) -> bool {
        self.notify_on_disconnection
    }

    pub fn notifies_on_notification(&self) -> bool {
        self.notify_on_notification
    }

    pub fn delay(&self) -> Duration {
        self.start_delay
    }
}

assert_impl_all!(ConnectOptions: Send, Sync);

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectionEventOptions {
    peripherals: Vec<Uuid>,
    services: Vec<Uuid>,
}

impl ConnectionEventOptions {
    /// Match connections of these peripherals.
    pub fn peripherals(mut self, uuids: &[Uuid]) -> Self {
        self.peripherals.extend_from_slice(uuids);
        self
    }

    /// Match connections of peripherals exposing any of these services.
    pub fn services(mut self, uuids: &[Uuid]) -> Self {
        self.services.extend_from_slice(uuids);
        self
    }

    pub fn peripheral_uuids(&self) -> &[Uuid] {
        &self.peripherals
    }

    pub fn service_uuids(&self) -> &[Uuid] {
        &self.services
    }
}

struct Inner {
    driver: Arc<dyn CentralDriver>,
    delegate: Arc<Delegate>,
    platform: Platform,
}

impl Drop for Inner {
    fn drop(&mut self) {
        trace!("dropping central manager, clearing delegate");
        self.driver.clear_delegate();
    }
}

/// Stream-based front of a central manager driver.
///
/// Owns the driver and installs itself as its only delegate. Callbacks are republished as
/// streams; scanning and connecting are started by subscribing and stopped by dropping the
/// subscription.
#[derive(Clone)]
pub struct CentralManager(Arc<Inner>);

assert_impl_all!(CentralManager: Send, Sync);

impl CentralManager {
    pub fn new(driver: impl CentralDriver) -> Self {
        CentralManagerBuilder::new().build(driver)
    }

    /// Current state of the manager.
    pub fn state(&self) -> ManagerState {
        self.0.driver.state()
    }

    /// The app's authorization to use Bluetooth.
    pub fn authorization(&self) -> Authorization {
        self.0.driver.authorization()
    }

    pub fn is_scanning(&self) -> bool {
        self.0.driver.is_scanning()
    }

    pub fn platform(&self) -> Platform {
        self.0.platform
    }

    /// Whether the hardware supports all of the `features`.
    ///
    /// # Panics
    ///
    /// Panics if the platform can't report supported features (native macOS).
    pub fn supports_features(&self, features: BitFlags<Feature>) -> bool {
        assert!(self.0.platform.feature_probe(),
            "supports_features is not available on this platform");
        self.0.driver.supports_features(features)
    }

    /// Known peripherals with the specified identifiers.
    pub fn retrieve_peripherals(&self, ids: &[Uuid]) -> Vec<Peripheral> {
        self.0.driver.retrieve_peripherals(ids)
    }

    /// Peripherals connected to the system that expose any of the `services`.
    pub fn retrieve_connected_peripherals(&self, services: &[Uuid]) -> Vec<Peripheral> {
        self.0.driver.retrieve_connected_peripherals(services)
    }

    /// Scans for peripherals while the returned stream has subscribers.
    ///
    /// The scan starts when the first subscriber attaches and stops when the last one goes
    /// away. Subscribers joining an ongoing scan first receive the most recent discovery.
    pub fn scan_for_peripherals(&self, options: ScanOptions) -> SharedStream<PeripheralDiscovery> {
        let start = self.0.driver.clone();
        let stop = self.0.driver.clone();
        ActionBinder::new(
            move || {
                debug!("starting scan: {:?}", options);
                start.scan(&options);
            },
            move || {
                debug!("stopping scan");
                stop.stop_scan();
            })
            .bind(self.0.delegate.discovered.source())
            .share()
    }

    /// Connects to the peripheral once the returned stream gets a subscriber.
    ///
    /// The stream yields a single outcome for this peripheral and completes. Dropping the last
    /// subscriber before that cancels the pending connection and no outcome is delivered.
    pub fn connect(&self, peripheral: &Peripheral, options: ConnectOptions)
        -> SharedStream<Result<Peripheral, CentralManagerError>>
    {
        let outcome = first_outcome(
            peripheral.id(),
            self.0.delegate.connected.source(),
            self.0.delegate.connect_failed.source(),
            |(_, error): (Peripheral, Option<Error>)| CentralManagerError::FailedToConnect(error));

        let (start, start_peripheral) = (self.0.driver.clone(), peripheral.clone());
        let (stop, stop_peripheral) = (self.0.driver.clone(), peripheral.clone());
        ActionBinder::new(
            move || {
                debug!("connecting to {}", start_peripheral.id());
                start.connect(&start_peripheral, &options);
            },
            move || {
                debug!("cancelling connection to {}", stop_peripheral.id());
                stop.cancel_connect(&stop_peripheral);
            })
            .bind(outcome)
            .share()
    }

    /// Cancels an active or pending connection to the peripheral.
    pub fn cancel_peripheral_connection(&self, peripheral: &Peripheral) {
        debug!("cancelling connection to {}", peripheral.id());
        self.0.driver.cancel_connect(peripheral);
    }

    /// Asks for connection events matching `options`, delivered via
    /// [`connection_events`](#method.connection_events).
    ///
    /// # Panics
    ///
    /// Panics if the platform doesn't deliver connection events.
    pub fn register_for_connection_events(&self, options: ConnectionEventOptions) {
        assert!(self.0.platform.connection_events(),
            "register_for_connection_events is not available on this platform");
        self.0.driver.register_for_connection_events(&options);
    }

    hub_streams! {
        /// All callbacks from now on, in the order the driver made them.
        events => events: CentralEvent;

        state_updates => state: ManagerState;

        restored_states => restored: RestoredState;

        peripheral_connections => connected: Peripheral;

        connect_failures => connect_failed: (Peripheral, Option<Error>);

        disconnections => disconnected: (Peripheral, Option<Error>);

        /// Completes right away if the platform doesn't deliver connection events.
        connection_events => connection_event: (ConnectionEvent, Peripheral);

        /// Every discovery, whether or not a scan was started through this manager.
        discoveries => discovered: PeripheralDiscovery;

        /// Completes right away if the platform doesn't deliver ANCS authorization updates.
        ancs_authorization_updates => ancs_authorization: Peripheral;
    }

    fn build(b: &CentralManagerBuilder, driver: Arc<dyn CentralDriver>) -> Self {
        let platform = driver.platform();
        let delegate = Arc::new(Delegate::new(platform));
        trace!("installing delegate, {:?}", platform);
        driver.set_delegate(delegate.clone(), &b.options);
        Self(Arc::new(Inner {
            driver,
            delegate,
            platform,
        }))
    }
}

#[derive(Clone, Debug, Default)]
pub struct AdvertisementData {
    connectable: Option<bool>,
    local_name: Option<String>,
    manufacturer_data: Option<Vec<u8>>,
    service_data: ServiceData,
    service_uuids: Vec<Uuid>,
    solicited_service_uuids: Vec<Uuid>,
    overflow_service_uuids: Vec<Uuid>,
    tx_power_level: Option<i32>,
}

assert_impl_all!(AdvertisementData: Send, Sync);

impl AdvertisementData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connectable(mut self, v: bool) -> Self {
        self.connectable = Some(v);
        self
    }

    pub fn with_local_name(mut self, v: impl Into<String>) -> Self {
        self.local_name = Some(v.into());
        self
    }

    pub fn with_manufacturer_data(mut self, v: impl Into<Vec<u8>>) -> Self {
        self.manufacturer_data = Some(v.into());
        self
    }

    pub fn with_service_data(mut self, uuid: Uuid, v: impl Into<Vec<u8>>) -> Self {
        self.service_data.0.insert(uuid, v.into());
        self
    }

    pub fn with_service_uuids(mut self, v: &[Uuid]) -> Self {
        self.service_uuids.extend_from_slice(v);
        self
    }

    pub fn with_solicited_service_uuids(mut self, v: &[Uuid]) -> Self {
        self.solicited_service_uuids.extend_from_slice(v);
        self
    }

    pub fn with_overflow_service_uuids(mut self, v: &[Uuid]) -> Self {
        self.overflow_service_uuids.extend_from_slice(v);
        self
    }

    pub fn with_tx_power_level(mut self, v: i32) -> Self {
        self.tx_power_level = Some(v);
        self
    }

    /// Indicates whether the advertising event type is connectable.
    /// You can use this value to determine whether your app can currently connect to a peripheral.
    pub fn is_connectable(&self) -> Option<bool> {
        self.connectable
    }

    /// The local name of a peripheral.
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    /// The manufacturer data of a peripheral.
    pub fn manufacturer_data(&self) -> Option<&[u8]> {
        self.manufacturer_data.as_deref()
    }

    /// Service-specific advertisement data.
    pub fn service_data(&self) -> &ServiceData {
        &self.service_data
    }

    pub fn service_uuids(&self) -> &[Uuid] {
        &self.service_uuids
    }

    /// Service UUIDs found in the overflow area of the advertisement data.
    pub fn overflow_service_uuids(&self) -> &[Uuid] {
        &self.overflow_service_uuids
    }

    pub fn solicited_service_uuids(&self) -> &[Uuid] {
        &self.solicited_service_uuids
    }

    /// The transmit power of a peripheral.
    /// You can calculate the path loss by comparing the RSSI value with the transmitting power level.
    pub fn tx_power_level(&self) -> Option<i32> {
        self.tx_power_level
    }
}

/// Service-specific advertisement data. The keys represent Service UUIDs.
#[derive(Clone, Debug, Default)]
pub struct ServiceData(HashMap<Uuid, Vec<u8>>);

assert_impl_all!(ServiceData: Send, Sync);

impl ServiceData {
    pub fn get(&self, uuid: Uuid) -> Option<&[u8]> {
        self.0.get(&uuid).map(|v| v.as_slice())
    }

    pub fn keys<'a>(&'a self) -> impl Iterator<Item=Uuid> + 'a {
        self.0.keys().copied()
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item=(Uuid, &[u8])> + 'a {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod testing;
