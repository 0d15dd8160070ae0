use static_assertions::assert_impl_all;

use crate::error::Error;
use crate::stream::Correlated;
use crate::uuid::*;

use super::AdvertisementData;

/// Remote peripheral as seen by the central manager.
///
/// Peripherals compare and hash by identifier only.
#[derive(Clone, Debug)]
pub struct Peripheral {
    id: Uuid,
    name: Option<String>,
}

assert_impl_all!(Peripheral: Send, Sync);

impl Peripheral {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for Peripheral {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Peripheral {}

impl std::hash::Hash for Peripheral {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Correlated for Peripheral {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Correlated for (Peripheral, Option<Error>) {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.0.id
    }
}

/// Advertisement received while scanning.
#[derive(Clone, Debug)]
pub struct PeripheralDiscovery {
    pub peripheral: Peripheral,
    pub advertisement_data: AdvertisementData,
    pub rssi: i32,
}

assert_impl_all!(PeripheralDiscovery: Send, Sync);

impl Correlated for PeripheralDiscovery {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.peripheral.id
    }
}
