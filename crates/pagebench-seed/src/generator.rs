//! Random record generation.

use jiff::civil::{Date, date};
use jiff::{Span, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::records::{
    Account, AccountDocument, Instrument, InstrumentClassifications, InstrumentPrice,
    InstrumentRef, Party, Position, PositionDocument, Taxlot, Transaction,
};
use crate::{Result, SeedConfig};

const FIRST_DATE: Date = date(2020, 1, 1);
const LAST_DATE: Date = date(2023, 12, 31);

const BUSINESS_SYSTEMS: usize = 1_000;
const CATEGORY_VALUES: usize = 100;

/// One generated position and the two documents it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPosition {
    pub account: AccountDocument,
    pub position: PositionDocument,
}

/// Fixed value pools records draw from.
#[derive(Debug)]
struct Pools {
    business_systems: Vec<String>,
    dates: Vec<Date>,
    instruments: Vec<String>,
    position_currencies: Vec<String>,
    subledgers: Vec<String>,
    classifications: Vec<String>,
    currencies: Vec<String>,
    account_types: Vec<String>,
    statuses: Vec<String>,
}

fn labels(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}_{i}")).collect()
}

impl Pools {
    fn new(config: &SeedConfig, rng: &mut StdRng) -> Result<Self> {
        let span_days = i64::from(FIRST_DATE.until(LAST_DATE)?.get_days());
        let dates = (0..config.num_dates)
            .map(|_| FIRST_DATE.checked_add(Span::new().days(rng.random_range(0..=span_days))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            business_systems: labels("system", BUSINESS_SYSTEMS),
            dates,
            instruments: labels("instrument", config.num_instruments),
            position_currencies: labels("ccy", CATEGORY_VALUES),
            subledgers: labels("subledger", CATEGORY_VALUES),
            classifications: labels("class", CATEGORY_VALUES),
            currencies: labels("currency", CATEGORY_VALUES),
            account_types: labels("type", CATEGORY_VALUES),
            statuses: labels("status", CATEGORY_VALUES),
        })
    }
}

/// Yields positions account by account until the configured total is reached.
///
/// Every position of an account shares the account's position id
/// (`position_{account % num_positions}`), matching the data the benchmarks
/// were calibrated on.
#[derive(Debug)]
pub struct RecordGenerator {
    rng: StdRng,
    pools: Pools,
    generated_at: Timestamp,

    num_accounts: usize,
    num_positions: usize,
    min_positions: usize,
    max_positions: usize,
    total_docs: usize,

    account: usize,
    remaining_in_account: usize,
    produced: usize,
}

impl RecordGenerator {
    /// Creates a generator; a configured seed makes the output reproducible.
    pub fn new(config: &SeedConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pools = Pools::new(config, &mut rng)?;

        Ok(Self {
            rng,
            pools,
            generated_at: Timestamp::now(),
            num_accounts: config.num_accounts,
            num_positions: config.num_positions,
            min_positions: config.min_positions,
            max_positions: config.max_positions,
            total_docs: config.total_docs,
            account: 0,
            remaining_in_account: 0,
            produced: 0,
        })
    }

    /// Fixes the transaction timestamp stamped on every record.
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: Timestamp) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Returns how many positions were generated so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    fn pick<'a>(rng: &mut StdRng, pool: &'a [String]) -> &'a str {
        &pool[rng.random_range(0..pool.len())]
    }

    fn generate(&mut self, account_index: usize) -> GeneratedPosition {
        let rng = &mut self.rng;
        let pools = &self.pools;

        let account_id = format!("account_{account_index}");
        let position_id = format!("position_{}", account_index % self.num_positions);
        let instrument = Self::pick(rng, &pools.instruments).to_owned();
        let date = pools.dates[rng.random_range(0..pools.dates.len())];
        let system = Self::pick(rng, &pools.business_systems).to_owned();

        let account = Account {
            account_id: account_id.clone(),
            business_system_code: system.clone(),
            account_type: Self::pick(rng, &pools.account_types).to_owned(),
            status: Self::pick(rng, &pools.statuses).to_owned(),
        };

        let position = Position {
            account_id: account_id.clone(),
            position_id,
            business_system_code: system.clone(),
            position_date: date,
            instrument_id: instrument.clone(),
            position_ccy: Self::pick(rng, &pools.position_currencies).to_owned(),
            subledger_code: Self::pick(rng, &pools.subledgers).to_owned(),
            instrument: InstrumentRef {
                instrument_id: instrument.clone(),
                business_system_code: system.clone(),
            },
            classifications: InstrumentClassifications {
                instrument_id: instrument.clone(),
                business_system_code: system.clone(),
                classification_level1: Self::pick(rng, &pools.classifications).to_owned(),
                classification_level2: Self::pick(rng, &pools.classifications).to_owned(),
                classification_level3: Self::pick(rng, &pools.classifications).to_owned(),
            },
            price: InstrumentPrice {
                instrument_id: instrument.clone(),
                business_system_code: system.clone(),
                date,
                currency: Self::pick(rng, &pools.currencies).to_owned(),
                price: (rng.random_range(10.0..1000.0_f64) * 100.0).round() / 100.0,
            },
            taxlot: Taxlot {
                account_id: account_id.clone(),
                instrument_cd: instrument.clone(),
                business_system_code: system.clone(),
                posted_date: date,
            },
            transaction: Transaction {
                account_id: account_id.clone(),
                instrument_cd: instrument.clone(),
                business_system_code: system.clone(),
                transaction_time_stamp: self.generated_at,
            },
        };

        let party = Party {
            account_id,
            business_system_code: system.clone(),
            status: Self::pick(rng, &pools.statuses).to_owned(),
        };

        let instrument = Instrument {
            instrument_id: instrument,
            business_system_code: system,
            classification_level1: Self::pick(rng, &pools.classifications).to_owned(),
            classification_level2: Self::pick(rng, &pools.classifications).to_owned(),
            classification_level3: Self::pick(rng, &pools.classifications).to_owned(),
        };

        GeneratedPosition {
            account: AccountDocument {
                account: account.clone(),
            },
            position: PositionDocument {
                account,
                position,
                party,
                instrument,
            },
        }
    }
}

impl Iterator for RecordGenerator {
    type Item = GeneratedPosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.produced >= self.total_docs {
            return None;
        }

        while self.remaining_in_account == 0 {
            if self.account >= self.num_accounts {
                return None;
            }
            self.remaining_in_account = self
                .rng
                .random_range(self.min_positions..=self.max_positions);
            self.account += 1;
        }

        self.remaining_in_account -= 1;
        self.produced += 1;
        Some(self.generate(self.account - 1))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn small() -> SeedConfig {
        SeedConfig::default()
            .with_accounts(4, 2, 3)
            .with_total_docs(100)
            .with_seed(7)
    }

    #[test]
    fn test_positions_per_account_within_range() {
        let generated: Vec<_> = RecordGenerator::new(&small()).unwrap().collect();

        let mut per_account = BTreeMap::new();
        for record in &generated {
            *per_account
                .entry(record.account.account.account_id.clone())
                .or_insert(0usize) += 1;
        }

        assert_eq!(per_account.len(), 4);
        assert!(per_account.values().all(|n| (2..=3).contains(n)));
        assert_eq!(generated.len(), per_account.values().sum::<usize>());
    }

    #[test]
    fn test_total_docs_caps_output() {
        let config = small().with_total_docs(5);
        let mut generator = RecordGenerator::new(&config).unwrap();
        assert_eq!(generator.by_ref().count(), 5);
        assert_eq!(generator.produced(), 5);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let at = Timestamp::UNIX_EPOCH;
        let first: Vec<_> = RecordGenerator::new(&small())
            .unwrap()
            .with_generated_at(at)
            .collect();
        let second: Vec<_> = RecordGenerator::new(&small())
            .unwrap()
            .with_generated_at(at)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_documents_are_consistent() {
        for record in RecordGenerator::new(&small()).unwrap() {
            let account = &record.account.account;
            let position = &record.position;

            assert_eq!(&position.account, account);
            assert_eq!(position.position.account_id, account.account_id);
            assert_eq!(
                position.position.business_system_code,
                account.business_system_code
            );
            assert_eq!(position.position.price.date, position.position.position_date);
            assert!((FIRST_DATE..=LAST_DATE).contains(&position.position.position_date));
            assert!((10.0..=1000.0).contains(&position.position.price.price));
        }
    }

    #[test]
    fn test_superindex_document_shape() {
        let record = RecordGenerator::new(&small()).unwrap().next().unwrap();
        let document = serde_json::to_value(&record.position).unwrap();

        assert_eq!(document["Account"]["accountId"], "account_0");
        assert_eq!(document["Position"]["positionId"], "position_0");
        assert!(document["Position"]["InstrumentClassifications"]["classificationLevel1"].is_string());
        assert!(document["Position"]["Transaction"]["transactionTimeStamp"].is_string());
        assert!(document["Party"]["status"].is_string());
        // Dates are rendered as plain calendar dates.
        let date = document["Position"]["positionDate"].as_str().unwrap();
        assert_eq!(date.len(), 10);
    }
}
