//! Document shapes written to the two indices.
//!
//! Field names follow the indices' camelCase mapping; nested objects use the
//! capitalized entity names the queries address (`Account.accountId`).

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Account-domain index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDocument {
    #[serde(rename = "Account")]
    pub account: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub business_system_code: String,
    pub account_type: String,
    pub status: String,
}

/// Superindex document: one position denormalized with its account, party
/// and instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDocument {
    #[serde(rename = "Account")]
    pub account: Account,
    #[serde(rename = "Position")]
    pub position: Position,
    #[serde(rename = "Party")]
    pub party: Party,
    #[serde(rename = "Instrument")]
    pub instrument: Instrument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub account_id: String,
    pub position_id: String,
    pub business_system_code: String,
    pub position_date: Date,
    pub instrument_id: String,
    pub position_ccy: String,
    pub subledger_code: String,
    #[serde(rename = "Instrument")]
    pub instrument: InstrumentRef,
    #[serde(rename = "InstrumentClassifications")]
    pub classifications: InstrumentClassifications,
    #[serde(rename = "InstrumentPrice")]
    pub price: InstrumentPrice,
    #[serde(rename = "Taxlot")]
    pub taxlot: Taxlot,
    #[serde(rename = "Transaction")]
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRef {
    pub instrument_id: String,
    pub business_system_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentClassifications {
    pub instrument_id: String,
    pub business_system_code: String,
    pub classification_level1: String,
    pub classification_level2: String,
    pub classification_level3: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentPrice {
    pub instrument_id: String,
    pub business_system_code: String,
    pub date: Date,
    pub currency: String,
    /// Rounded to cents, within `10.00..1000.00`.
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxlot {
    pub account_id: String,
    pub instrument_cd: String,
    pub business_system_code: String,
    pub posted_date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub account_id: String,
    pub instrument_cd: String,
    pub business_system_code: String,
    pub transaction_time_stamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub account_id: String,
    pub business_system_code: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub instrument_id: String,
    pub business_system_code: String,
    pub classification_level1: String,
    pub classification_level2: String,
    pub classification_level3: String,
}
