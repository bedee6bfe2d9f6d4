use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of one denomination held by, or sent to, an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAmount {
    /// Bech32 or chain-native address.
    pub address: String,
    /// Denomination, e.g. `uatom` or `lovelace`.
    pub denom: String,
    /// Amount in base units.
    pub amount: Decimal,
}

impl WalletAmount {
    /// Creates a wallet amount.
    pub fn new(address: impl Into<String>, denom: impl Into<String>, amount: Decimal) -> Self {
        Self {
            address: address.into(),
            denom: denom.into(),
            amount,
        }
    }

    /// Returns the same wallet and denom with a different amount.
    #[must_use]
    pub fn with_amount(&self, amount: Decimal) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}
