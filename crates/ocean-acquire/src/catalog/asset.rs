//! Asset descriptors — the static table of datasets that can be acquired.

use serde::{Deserialize, Serialize};

use super::amount::{Price, TokenAmount};

/// A dataset known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Short catalog key (`enron`, `cameroon`).
    pub key: String,
    /// Marketplace decentralized identifier (`did:op:...`).
    pub did: String,
    /// Display name.
    pub name: String,
    /// Content format tag; also the file extension of the retrieved asset.
    pub format: String,
    /// Where the asset content is fetched from.
    #[serde(alias = "sample_url")]
    pub locator: String,
    /// Listed price.
    #[serde(alias = "estimated_price")]
    pub price: Price,
}

impl AssetDescriptor {
    /// File name the retrieved asset is stored under.
    pub fn destination_file_name(&self) -> String {
        format!("{}_full_dataset.{}", self.key, self.format)
    }
}

/// The datasets shipped as the default catalog table.
pub fn default_assets() -> Vec<AssetDescriptor> {
    vec![
        AssetDescriptor {
            key: "enron".to_string(),
            did: "did:op:1beabb1e18d4d5b15facabf9d0ac2fd38a0b00138ae4b3f9f6649cb6f44458dd"
                .to_string(),
            name: "Enron Email Dataset".to_string(),
            format: "csv".to_string(),
            locator: "https://e1k3lz2wcg.execute-api.us-west-2.amazonaws.com/data".to_string(),
            price: Price::new(TokenAmount::from_base_units(100_000_000_000_000_000), "OCEAN"),
        },
        AssetDescriptor {
            key: "cameroon".to_string(),
            did: "did:op:204e60c2a0f935d68743955afe1b4bb965770cfbc70342520d6bcecf75befe9c"
                .to_string(),
            name: "Cameroon Gazette Dataset".to_string(),
            format: "json".to_string(),
            locator: "https://yjiuaiehxf.execute-api.us-west-2.amazonaws.com/data".to_string(),
            price: Price::new(TokenAmount::from_base_units(50_000_000_000_000_000), "OCEAN"),
        },
    ]
}
