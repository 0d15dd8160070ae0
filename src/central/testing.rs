use enumflags2::BitFlags;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::platform::Platform;
use crate::uuid::Uuid;

use super::*;
use super::driver::{CentralDelegate, CentralDriver};
use super::peripheral::Peripheral;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Scan(ScanOptions),
    StopScan,
    Connect(Uuid),
    CancelConnect(Uuid),
    RegisterForConnectionEvents(ConnectionEventOptions),
}

#[derive(Default)]
struct State {
    commands: Mutex<Vec<Command>>,
    delegate: Mutex<Option<Arc<dyn CentralDelegate>>>,
    options: Mutex<Option<ManagerOptions>>,
    scanning: AtomicBool,
    connect_immediately: AtomicBool,
}

/// Driver recording commands. Callbacks are fired by the test through `delegate()`.
#[derive(Clone)]
pub struct MockDriver {
    state: Arc<State>,
    platform: Platform,
}

impl MockDriver {
    pub fn new(platform: Platform) -> Self {
        Self {
            state: Default::default(),
            platform,
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.commands.lock().clone()
    }

    pub fn delegate(&self) -> Arc<dyn CentralDelegate> {
        self.state.delegate.lock().clone().expect("no delegate installed")
    }

    pub fn has_delegate(&self) -> bool {
        self.state.delegate.lock().is_some()
    }

    pub fn options(&self) -> Option<ManagerOptions> {
        self.state.options.lock().clone()
    }

    /// Makes `connect` report success before returning.
    pub fn connect_immediately(&self, v: bool) {
        self.state.connect_immediately.store(v, Ordering::SeqCst);
    }

    fn record(&self, command: Command) {
        self.state.commands.lock().push(command);
    }
}

impl CentralDriver for MockDriver {
    fn set_delegate(&self, delegate: Arc<dyn CentralDelegate>, options: &ManagerOptions) {
        *self.state.delegate.lock() = Some(delegate);
        *self.state.options.lock() = Some(options.clone());
    }

    fn clear_delegate(&self) {
        self.state.delegate.lock().take();
    }

    fn state(&self) -> ManagerState {
        ManagerState::PoweredOn
    }

    fn authorization(&self) -> Authorization {
        Authorization::AllowedAlways
    }

    fn is_scanning(&self) -> bool {
        self.state.scanning.load(Ordering::SeqCst)
    }

    fn supports_features(&self, features: BitFlags<Feature>) -> bool {
        features.contains(Feature::ExtendedScanAndConnect)
    }

    fn scan(&self, options: &ScanOptions) {
        self.record(Command::Scan(options.clone()));
        self.state.scanning.store(true, Ordering::SeqCst);
    }

    fn stop_scan(&self) {
        self.record(Command::StopScan);
        self.state.scanning.store(false, Ordering::SeqCst);
    }

    fn connect(&self, peripheral: &Peripheral, _options: &ConnectOptions) {
        self.record(Command::Connect(peripheral.id()));
        if self.state.connect_immediately.load(Ordering::SeqCst) {
            self.delegate().did_connect(peripheral.clone());
        }
    }

    fn cancel_connect(&self, peripheral: &Peripheral) {
        self.record(Command::CancelConnect(peripheral.id()));
    }

    fn retrieve_peripherals(&self, ids: &[Uuid]) -> Vec<Peripheral> {
        let known = Uuid::from_u16(1);
        ids.iter()
            .filter(|&&id| id == known)
            .map(|&id| Peripheral::new(id))
            .collect()
    }

    fn retrieve_connected_peripherals(&self, _services: &[Uuid]) -> Vec<Peripheral> {
        Vec::new()
    }

    fn register_for_connection_events(&self, options: &ConnectionEventOptions) {
        self.record(Command::RegisterForConnectionEvents(options.clone()));
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
