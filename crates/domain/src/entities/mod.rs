pub mod block;
pub mod packet;

// Re-export for easier access
pub use block::Block;
pub use packet::{Packet, PacketAcknowledgement, PacketTimeout};
