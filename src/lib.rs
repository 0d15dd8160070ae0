//! Stream-based API over a [Core Bluetooth](https://developer.apple.com/documentation/corebluetooth)
//! style central manager.
//!
//! The hardware manager is consumed through the [`CentralDriver`](central/driver/trait.CentralDriver.html)
//! trait: imperative commands plus a single delegate receiving callbacks. The
//! [`CentralManager`](central/struct.CentralManager.html) installs itself as that delegate and
//! turns every callback kind into a stream any number of consumers can subscribe to.
//!
//! Requests are made by subscribing rather than by calling a command and waiting for the
//! callback:
//!
//! * [`scan_for_peripherals`](central/struct.CentralManager.html#method.scan_for_peripherals)
//!   starts scanning when the first subscriber attaches and stops when the last one is dropped;
//! * [`connect`](central/struct.CentralManager.html#method.connect) issues the connection on
//!   subscription and yields exactly one outcome for the requested peripheral. Dropping the
//!   subscription before that cancels the connection.
//!
//! Subscribers joining a shared stream late first receive its most recent value.
//!
//! ## Example
//!
//! ```no_run
//! use async_std::prelude::*;
//! use core_bluetooth_stream::*;
//! use core_bluetooth_stream::central::*;
//! use core_bluetooth_stream::central::driver::CentralDriver;
//!
//! async fn connect_to_first(driver: impl CentralDriver) {
//!     let central = CentralManager::new(driver);
//!
//!     let mut states = central.state_updates();
//!     while let Some(state) = states.next().await {
//!         // Must be in PoweredOn state.
//!         if state == ManagerState::PoweredOn {
//!             break;
//!         }
//!     }
//!
//!     let mut discoveries = central.scan_for_peripherals(ScanOptions::default()).subscribe();
//!     let discovery = match discoveries.next().await {
//!         Some(v) => v,
//!         None => return,
//!     };
//!     // Stops the scan.
//!     drop(discoveries);
//!
//!     let mut outcome = central.connect(&discovery.peripheral, ConnectOptions::default()).subscribe();
//!     match outcome.next().await {
//!         Some(Ok(peripheral)) => println!("connected to {}", peripheral.id()),
//!         Some(Err(e)) => eprintln!("{}", e),
//!         None => {}
//!     }
//! }
//! ```
#![deny(non_snake_case)]
#![deny(unused_must_use)]

#[macro_use]
mod macros;

pub mod central;
pub mod error;
pub mod platform;
pub mod stream;
mod sync;
pub mod uuid;

use enumflags2::bitflags;

/// The possible states of a Core Bluetooth manager.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ManagerState {
    /// The manager’s state is unknown.
    Unknown = 0,

    /// A state that indicates the connection with the system service was momentarily lost.
    Resetting = 1,

    /// A state that indicates this device doesn’t support the Bluetooth low energy central or client role.
    Unsupported = 2,

    /// A state that indicates the application isn’t authorized to use the Bluetooth low energy role.
    Unauthorized = 3,

    /// A state that indicates Bluetooth is currently powered off.
    PoweredOff = 4,

    /// A state that indicates Bluetooth is currently powered on and available to use.
    PoweredOn = 5,
}

impl ManagerState {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Unknown,
            1 => Self::Resetting,
            2 => Self::Unsupported,
            3 => Self::Unauthorized,
            4 => Self::PoweredOff,
            5 => Self::PoweredOn,
            _ => return None,
        })
    }
}

/// The app's authorization to use Bluetooth.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Authorization {
    /// The user hasn't chosen whether the app may use Bluetooth.
    NotDetermined = 0,

    /// The app isn't authorized and the user can't change that.
    Restricted = 1,

    /// The user denied the app the use of Bluetooth.
    Denied = 2,

    /// The app may use Bluetooth at any time.
    AllowedAlways = 3,
}

impl Authorization {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::NotDetermined,
            1 => Self::Restricted,
            2 => Self::Denied,
            3 => Self::AllowedAlways,
            _ => return None,
        })
    }
}

/// Optional central manager features the hardware may support.
#[bitflags]
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Feature {
    /// Extended advertising scanning and connecting.
    ExtendedScanAndConnect = 1 << 0,
}

#[cfg(test)]
mod test {
    use super::*;
    use enumflags2::BitFlags;

    #[test]
    fn from_u8() {
        assert_eq!(ManagerState::from_u8(5), Some(ManagerState::PoweredOn));
        assert_eq!(ManagerState::from_u8(6), None);
        assert_eq!(Authorization::from_u8(2), Some(Authorization::Denied));
        assert_eq!(Authorization::from_u8(4), None);
    }

    #[test]
    fn features() {
        let all = BitFlags::<Feature>::all();
        assert!(all.contains(Feature::ExtendedScanAndConnect));
        assert!(BitFlags::<Feature>::empty().is_empty());
    }
}
