use serde::{Deserialize, Serialize};

/// One security from the exchange listing.
///
/// Field order is the output CSV schema (`id,name,type,class,begin_date`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedSecurity {
    pub id: String,
    pub name: String,
    /// Market segment as reported by the listing page.
    #[serde(rename = "type")]
    pub kind: String,
    /// Industry classification; rewritten to `ETF` for ETF sub-types.
    pub class: String,
    pub begin_date: String,
}
