use static_assertions::assert_impl_all;

/// Capabilities of the platform the driver runs on.
///
/// Callbacks the platform never delivers are exposed as streams that complete without emitting,
/// operations it doesn't support panic when called.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Platform {
    connection_events: bool,
    ancs_authorization: bool,
    feature_probe: bool,
}

assert_impl_all!(Platform: Send, Sync);

impl Platform {
    /// Capabilities of the compilation target: connection events and ANCS authorization are
    /// mobile-only, feature probing is missing on native macOS.
    pub const fn current() -> Self {
        let mobile = cfg!(any(target_os = "ios", target_os = "tvos", target_os = "watchos"));
        Self {
            connection_events: mobile,
            ancs_authorization: mobile,
            feature_probe: !cfg!(target_os = "macos"),
        }
    }

    /// Platform supporting every callback and operation.
    pub const fn full() -> Self {
        Self {
            connection_events: true,
            ancs_authorization: true,
            feature_probe: true,
        }
    }

    /// Platform supporting only the callbacks and operations available everywhere.
    pub const fn minimal() -> Self {
        Self {
            connection_events: false,
            ancs_authorization: false,
            feature_probe: false,
        }
    }

    pub const fn with_connection_events(mut self, v: bool) -> Self {
        self.connection_events = v;
        self
    }

    pub const fn with_ancs_authorization(mut self, v: bool) -> Self {
        self.ancs_authorization = v;
        self
    }

    pub const fn with_feature_probe(mut self, v: bool) -> Self {
        self.feature_probe = v;
        self
    }

    /// Whether connection events can be registered for and are delivered.
    pub fn connection_events(&self) -> bool {
        self.connection_events
    }

    /// Whether ANCS authorization updates are delivered.
    pub fn ancs_authorization(&self) -> bool {
        self.ancs_authorization
    }

    /// Whether the central manager can be asked about supported features.
    pub fn feature_probe(&self) -> bool {
        self.feature_probe
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
