//! Ledger backend configuration, read once at backend construction time
//! from environment variables.

use crate::error::{ProofError, Result};

/// Which distributed-ledger network a `LedgerBackend` submits epochs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ProofError::InvalidInput(format!(
                "unknown ledger network: {other}"
            ))),
        }
    }
}

/// Credentials and network selection for a ledger-backed proof backend.
/// Absence of any of these at initialization time is a fatal
/// `ProofError::ConfigMissing` naming the missing variable.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub account_id: String,
    pub private_key: String,
    pub topic_id: String,
    pub network: Network,
}

const ACCOUNT_ID_VAR: &str = "SCHEMA_GRAPH_LEDGER_ACCOUNT_ID";
const PRIVATE_KEY_VAR: &str = "SCHEMA_GRAPH_LEDGER_PRIVATE_KEY";
const TOPIC_ID_VAR: &str = "SCHEMA_GRAPH_LEDGER_TOPIC_ID";
const NETWORK_VAR: &str = "SCHEMA_GRAPH_LEDGER_NETWORK";

impl LedgerConfig {
    /// Read all four required variables. The first missing one is reported
    /// by name, not rolled up into a generic message.
    pub fn from_env() -> Result<Self> {
        let account_id = read_var(ACCOUNT_ID_VAR)?;
        let private_key = read_var(PRIVATE_KEY_VAR)?;
        let topic_id = read_var(TOPIC_ID_VAR)?;
        let network = Network::parse(&read_var(NETWORK_VAR)?)?;

        Ok(Self {
            account_id,
            private_key,
            topic_id,
            network,
        })
    }
}

fn read_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ProofError::ConfigMissing {
        var: name.to_string(),
    })
}
