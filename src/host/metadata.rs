use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::statistics::ZoneRecord;
use crate::types::{SceneInfo, SnowResult};

/// Run-end summary handed to the host's output-metadata hook: the full
/// zonal statistics snapshot plus the temporal coverage of the scenes
/// that contributed to the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Product identifier
    pub product: String,
    /// Zone totals keyed by the rendered `"{aspect}_{elevation}"` label
    pub zones: BTreeMap<String, ZoneRecord>,
    /// Number of scenes the host mosaicked into the run
    pub scene_count: usize,
    /// Earliest contributing acquisition
    pub first_acquisition: Option<DateTime<Utc>>,
    /// Latest contributing acquisition
    pub last_acquisition: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(
        product: &str,
        zones: BTreeMap<String, ZoneRecord>,
        scenes: &[SceneInfo],
    ) -> Self {
        log::info!(
            "Exporting {} zonal statistics for {} zones ({} scenes)",
            product,
            zones.len(),
            scenes.len()
        );

        Self {
            product: product.to_string(),
            zones,
            scene_count: scenes.len(),
            first_acquisition: scenes.iter().map(|s| s.acquisition).min(),
            last_acquisition: scenes.iter().map(|s| s.acquisition).max(),
        }
    }

    /// The zone totals alone, in the host's `userData` shape
    pub fn user_data(&self) -> SnowResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.zones)?)
    }

    /// Full summary as a JSON document
    pub fn to_json(&self) -> SnowResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statistics::{AggregateKind, Contribution, ZonalStatistics};
    use crate::core::zones::ZoneKey;
    use chrono::TimeZone;

    #[test]
    fn test_user_data_shape() {
        let keys = vec![ZoneKey::new(0, 1500), ZoneKey::new(45, 1500)];
        let mut stats = ZonalStatistics::new(&keys, AggregateKind::Binary);
        stats
            .record(ZoneKey::new(0, 1500), Contribution::Binary { sum: 1 })
            .unwrap();

        let summary = RunSummary::new("persistent_snow", stats.snapshot(), &[]);
        let user_data = summary.user_data().unwrap();

        assert_eq!(user_data["0_1500"]["count"], 1);
        assert_eq!(user_data["0_1500"]["sum"], 1);
        assert_eq!(user_data["45_1500"]["count"], 0);
        assert!(summary.first_acquisition.is_none());
    }

    #[test]
    fn test_scene_coverage_ordering() {
        let scenes = vec![
            SceneInfo {
                id: "b".to_string(),
                acquisition: Utc.with_ymd_and_hms(2024, 2, 10, 5, 0, 0).unwrap(),
            },
            SceneInfo {
                id: "a".to_string(),
                acquisition: Utc.with_ymd_and_hms(2024, 1, 29, 5, 0, 0).unwrap(),
            },
        ];

        let summary = RunSummary::new("wet_dry_snow", BTreeMap::new(), &scenes);
        assert_eq!(summary.first_acquisition.unwrap(), scenes[1].acquisition);
        assert_eq!(summary.last_acquisition.unwrap(), scenes[0].acquisition);
    }
}
