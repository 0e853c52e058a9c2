pub mod network;
pub mod snapshot;

pub use network::Network;
pub use snapshot::{LayerSnapshot, NetworkSnapshot, SNAPSHOT_VERSION};
