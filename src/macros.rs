/// Generates `CentralManager` accessors subscribing to a delegate hub.
macro_rules! hub_streams {
    ($($(#[$attr:meta])* $n:ident => $hub:ident: $t:ty;)*) => {
        $(
        $(#[$attr])*
        pub fn $n(&self) -> crate::stream::EventStream<$t> {
            self.0.delegate.$hub.subscribe()
        }
        )*
    };
}
