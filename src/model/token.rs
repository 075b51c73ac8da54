use serde::Deserialize;
use serde::Serialize;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub mint: Pubkey,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

impl TokenMetadata {
    /// Neither a name nor a symbol; typical of throwaway dust tokens.
    pub fn is_anonymous(&self) -> bool {
        let blank = |value: &Option<String>| value.as_deref().map(str::trim).is_none_or(str::is_empty);
        blank(&self.name) && blank(&self.symbol)
    }
}
