pub mod chain_sync;
pub mod proposal;
pub mod signed_tx;
pub mod wallet_amount;

pub use chain_sync::{DeliveredBlock, Point, Tip, TxInclusion};
pub use proposal::Proposal;
pub use signed_tx::SignedTx;
pub use wallet_amount::WalletAmount;
