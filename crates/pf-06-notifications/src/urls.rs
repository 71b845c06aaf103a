//! Public URLs and network decoration of outgoing mail.

use crate::config::Network;

/// Builds links into the public web app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlBuilder {
    network: Network,
}

impl UrlBuilder {
    /// Builder for `network`.
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// Network this builder targets.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Absolute URL of `path` (must start with `/`).
    pub fn url(&self, path: &str) -> String {
        match self.network {
            Network::Mainnet => format!("https://psiforms.com{}", path),
            Network::Testnet => format!("https://testnet.psiforms.com{}", path),
        }
    }

    /// Prefix put in front of every subject.
    pub fn subject_prefix(&self) -> &'static str {
        match self.network {
            Network::Mainnet => "[ΨForms] ",
            Network::Testnet => "[ΨForms:TestNet] ",
        }
    }

    /// Footer appended to every body.
    pub fn footer(&self) -> String {
        format!("\n\nPowered by {}", self.url("/"))
    }
}
