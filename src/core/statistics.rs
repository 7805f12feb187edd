use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::zones::ZoneKey;
use crate::types::{SnowError, SnowResult};

/// Which classification totals a statistics table accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// Single running `sum` of a binary class value
    Binary,
    /// Independent `wet` and `dry` running totals
    WetDry,
}

/// Running classification totals for one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ZoneAggregate {
    Binary { sum: u64 },
    WetDry { wet: u64, dry: u64 },
}

/// Per-zone running record: valid-pixel count plus the product's
/// classification totals. Serializes flat, matching the host's
/// `userData` shape: `{"count": n, "sum": s}` or
/// `{"count": n, "wet": w, "dry": d}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneRecord {
    pub count: u64,
    #[serde(flatten)]
    pub aggregate: ZoneAggregate,
}

impl ZoneRecord {
    fn zero(kind: AggregateKind) -> Self {
        let aggregate = match kind {
            AggregateKind::Binary => ZoneAggregate::Binary { sum: 0 },
            AggregateKind::WetDry => ZoneAggregate::WetDry { wet: 0, dry: 0 },
        };
        Self {
            count: 0,
            aggregate,
        }
    }
}

/// One valid pixel's addition to its zone record.
///
/// A wet/dry contribution never carries both flags: wet has priority
/// and suppresses dry at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    Binary { sum: u8 },
    WetDry { wet: u8, dry: u8 },
}

/// Run-scoped zonal statistics table.
///
/// Every zone of the configured aspect/elevation product gets a zeroed
/// record when the table is created; records are never added, removed,
/// or reset afterwards. The table is updated once per valid pixel and
/// read out once at run end through the metadata export hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonalStatistics {
    kind: AggregateKind,
    records: BTreeMap<ZoneKey, ZoneRecord>,
}

impl ZonalStatistics {
    /// Create a table with a zeroed record for every given zone
    pub fn new(keys: &[ZoneKey], kind: AggregateKind) -> Self {
        let records = keys
            .iter()
            .map(|&key| (key, ZoneRecord::zero(kind)))
            .collect();
        Self { kind, records }
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    /// Number of zones tracked by this table
    pub fn num_zones(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, key: &ZoneKey) -> Option<&ZoneRecord> {
        self.records.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ZoneKey, &ZoneRecord)> {
        self.records.iter()
    }

    /// Record one valid pixel: increment the zone's count and fold the
    /// contribution into its totals.
    ///
    /// The zone must exist (zones are fixed at construction) and the
    /// contribution kind must match the table; both violations are
    /// host-contract errors, not pixel-level sentinels.
    pub fn record(&mut self, key: ZoneKey, contribution: Contribution) -> SnowResult<()> {
        let record = self.records.get_mut(&key).ok_or_else(|| {
            SnowError::Processing(format!("Unknown zone {} in statistics update", key))
        })?;

        match (&mut record.aggregate, contribution) {
            (ZoneAggregate::Binary { sum }, Contribution::Binary { sum: add }) => {
                *sum += u64::from(add);
            }
            (ZoneAggregate::WetDry { wet, dry }, Contribution::WetDry { wet: w, dry: d }) => {
                *wet += u64::from(w);
                *dry += u64::from(d);
            }
            _ => {
                return Err(SnowError::Processing(format!(
                    "Contribution {:?} does not match {:?} statistics",
                    contribution, self.kind
                )));
            }
        }
        record.count += 1;
        Ok(())
    }

    /// A table with the same zones and kind but all records zeroed
    /// (fresh partial table for one parallel tile chunk).
    pub fn zeroed(&self) -> ZonalStatistics {
        let records = self
            .records
            .keys()
            .map(|&key| (key, ZoneRecord::zero(self.kind)))
            .collect();
        ZonalStatistics {
            kind: self.kind,
            records,
        }
    }

    /// Fold another table's totals into this one. Both tables must
    /// track the same zones and aggregate kind (parallel tile chunks
    /// are constructed from the same session, so they always do).
    pub fn merge(&mut self, other: &ZonalStatistics) -> SnowResult<()> {
        if self.kind != other.kind || self.records.len() != other.records.len() {
            return Err(SnowError::Processing(
                "Cannot merge statistics tables with different layouts".to_string(),
            ));
        }

        for (key, partial) in other.records.iter() {
            let record = self.records.get_mut(key).ok_or_else(|| {
                SnowError::Processing(format!("Unknown zone {} in statistics merge", key))
            })?;

            record.count += partial.count;
            match (&mut record.aggregate, partial.aggregate) {
                (ZoneAggregate::Binary { sum }, ZoneAggregate::Binary { sum: s }) => {
                    *sum += s;
                }
                (
                    ZoneAggregate::WetDry { wet, dry },
                    ZoneAggregate::WetDry { wet: w, dry: d },
                ) => {
                    *wet += w;
                    *dry += d;
                }
                _ => {
                    return Err(SnowError::Processing(
                        "Aggregate kind mismatch in statistics merge".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Ordered snapshot keyed by the rendered `"{aspect}_{elevation}"`
    /// string, the shape the host attaches to run metadata.
    pub fn snapshot(&self) -> BTreeMap<String, ZoneRecord> {
        self.records
            .iter()
            .map(|(key, record)| (key.to_string(), *record))
            .collect()
    }
}
