use crate::core::classify::{
    PersistentSnowClassifier, SnowCoverClassifier, StackClassifier, StackOutcome, WetDryClassifier,
};
use crate::core::statistics::{AggregateKind, ZonalStatistics};
use crate::core::tile::{self, TerrainTile};
use crate::core::zones::ZoneTable;
use crate::host::metadata::RunSummary;
use crate::types::{
    ClassImage, ClassValue, CodeImage, CodeStack, SampleGroup, SceneInfo, SnowResult,
    TerrainSample, UNCLASSIFIED,
};
use ndarray::Axis;

/// Run-scoped zonal state shared by the session types: the zone
/// configuration plus the statistics table it indexes.
///
/// Created once per processing run, before the first pixel call, and
/// never reinitialized in between; rebuilding it mid-run would silently
/// reset every accumulated zone total.
#[derive(Debug, Clone)]
pub(crate) struct ZonalRun {
    pub(crate) zones: ZoneTable,
    pub(crate) stats: ZonalStatistics,
}

impl ZonalRun {
    fn new(zones: ZoneTable, kind: AggregateKind) -> Self {
        let stats = ZonalStatistics::new(&zones.distinct_keys(), kind);
        log::debug!(
            "Initialized zonal statistics table with {} zones",
            stats.num_zones()
        );
        Self { zones, stats }
    }

    /// Classify one pixel and fold a valid outcome into its zone.
    ///
    /// Pixels without terrain data and pixels whose stack carries no
    /// usable reading yield the `-1` sentinel and leave the statistics
    /// untouched.
    fn evaluate<C: StackClassifier>(
        &mut self,
        classifier: &C,
        terrain: TerrainSample,
        samples: &SampleGroup,
    ) -> SnowResult<ClassValue> {
        evaluate_readings(
            classifier,
            &self.zones,
            &mut self.stats,
            terrain,
            samples.readings().iter().copied(),
        )
    }
}

/// Per-pixel evaluation against an explicit zone table and statistics
/// table; shared between the per-pixel session entry points and the
/// tile drivers (which accumulate into partial tables).
pub(crate) fn evaluate_readings<C, I>(
    classifier: &C,
    zones: &ZoneTable,
    stats: &mut ZonalStatistics,
    terrain: TerrainSample,
    readings: I,
) -> SnowResult<ClassValue>
where
    C: StackClassifier,
    I: IntoIterator<Item = crate::types::SnowCode>,
{
    if !terrain.is_valid() {
        return Ok(UNCLASSIFIED);
    }

    match classifier.classify(readings) {
        StackOutcome::Unusable => Ok(UNCLASSIFIED),
        StackOutcome::Valid {
            value,
            contribution,
        } => {
            let key = zones.zone_for(terrain.aspect, terrain.elevation);
            stats.record(key, contribution)?;
            Ok(value)
        }
    }
}

/// Evaluation session for the wet/dry snow classification product.
///
/// The host creates one session per processing run, feeds it every
/// pixel, and reads the zonal totals back through [`export_metadata`]
/// when the run's output metadata is assembled.
///
/// [`export_metadata`]: WetDrySession::export_metadata
#[derive(Debug, Clone)]
pub struct WetDrySession {
    classifier: WetDryClassifier,
    run: ZonalRun,
}

impl WetDrySession {
    /// Session over the standard alpine zones
    pub fn new() -> SnowResult<Self> {
        Ok(Self::with_zones(ZoneTable::alpine()?))
    }

    pub fn with_zones(zones: ZoneTable) -> Self {
        Self {
            classifier: WetDryClassifier::new(),
            run: ZonalRun::new(zones, AggregateKind::WetDry),
        }
    }

    /// Classify one pixel: 1 = wet snow, 2 = dry snow, 0 = valid
    /// without snow, -1 = unclassifiable.
    pub fn evaluate_pixel(
        &mut self,
        terrain: TerrainSample,
        ssc: &SampleGroup,
    ) -> SnowResult<ClassValue> {
        self.run.evaluate(&self.classifier, terrain, ssc)
    }

    /// Classify a whole tile from its terrain layers and temporal SSC
    /// stack (scene axis first).
    pub fn evaluate_tile(
        &mut self,
        terrain: &TerrainTile,
        ssc: &CodeStack,
    ) -> SnowResult<ClassImage> {
        tile::evaluate_stack_tile(&self.classifier, &mut self.run, terrain, ssc.view())
    }

    pub fn statistics(&self) -> &ZonalStatistics {
        &self.run.stats
    }

    #[cfg(test)]
    pub(crate) fn run_mut(&mut self) -> &mut ZonalRun {
        &mut self.run
    }

    /// Run-end summary for the host's output metadata hook
    pub fn export_metadata(&self, scenes: &[SceneInfo]) -> RunSummary {
        RunSummary::new("wet_dry_snow", self.run.stats.snapshot(), scenes)
    }
}

/// Evaluation session for the terrain-gated binary snow-cover product.
#[derive(Debug, Clone)]
pub struct SnowCoverSession {
    classifier: SnowCoverClassifier,
    run: ZonalRun,
}

impl SnowCoverSession {
    /// Session over the standard alpine zones
    pub fn new() -> SnowResult<Self> {
        Ok(Self::with_zones(ZoneTable::alpine()?))
    }

    pub fn with_zones(zones: ZoneTable) -> Self {
        Self {
            classifier: SnowCoverClassifier::new(),
            run: ZonalRun::new(zones, AggregateKind::Binary),
        }
    }

    /// Classify one pixel: 1 = snow, 0 = valid without snow,
    /// -1 = unclassifiable.
    pub fn evaluate_pixel(
        &mut self,
        terrain: TerrainSample,
        gf: &SampleGroup,
    ) -> SnowResult<ClassValue> {
        self.run.evaluate(&self.classifier, terrain, gf)
    }

    /// Classify a whole tile from its terrain layers and temporal
    /// gap-filled snow cover stack (scene axis first).
    pub fn evaluate_tile(
        &mut self,
        terrain: &TerrainTile,
        gf: &CodeStack,
    ) -> SnowResult<ClassImage> {
        tile::evaluate_stack_tile(&self.classifier, &mut self.run, terrain, gf.view())
    }

    pub fn statistics(&self) -> &ZonalStatistics {
        &self.run.stats
    }

    /// Run-end summary for the host's output metadata hook
    pub fn export_metadata(&self, scenes: &[SceneInfo]) -> RunSummary {
        RunSummary::new("snow_cover_fraction", self.run.stats.snapshot(), scenes)
    }
}

/// Evaluation session for the zonal persistent snow area product.
///
/// Uses the fine 100 m elevation belts; every terrain-valid pixel
/// counts toward its zone and only exact persistent-snow readings add
/// to the running total.
#[derive(Debug, Clone)]
pub struct PersistentSnowSession {
    classifier: PersistentSnowClassifier,
    run: ZonalRun,
}

impl PersistentSnowSession {
    /// Session over the fine alpine zones
    pub fn new() -> SnowResult<Self> {
        Ok(Self::with_zones(ZoneTable::alpine_fine()?))
    }

    pub fn with_zones(zones: ZoneTable) -> Self {
        Self {
            classifier: PersistentSnowClassifier::new(),
            run: ZonalRun::new(zones, AggregateKind::Binary),
        }
    }

    /// Classify one pixel: 1 = persistent snow, 0 = not persistent
    /// snow, -1 = no terrain data or no reading.
    pub fn evaluate_pixel(
        &mut self,
        terrain: TerrainSample,
        psa: &SampleGroup,
    ) -> SnowResult<ClassValue> {
        self.run.evaluate(&self.classifier, terrain, psa)
    }

    /// Classify a whole tile from its terrain layers and the static
    /// persistent snow layer.
    pub fn evaluate_tile(
        &mut self,
        terrain: &TerrainTile,
        psa: &CodeImage,
    ) -> SnowResult<ClassImage> {
        // A static layer is a one-scene stack
        let stack = psa.view().insert_axis(Axis(0));
        tile::evaluate_stack_tile(&self.classifier, &mut self.run, terrain, stack)
    }

    pub fn statistics(&self) -> &ZonalStatistics {
        &self.run.stats
    }

    /// Run-end summary for the host's output metadata hook
    pub fn export_metadata(&self, scenes: &[SceneInfo]) -> RunSummary {
        RunSummary::new("persistent_snow", self.run.stats.snapshot(), scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statistics::ZoneAggregate;
    use crate::core::zones::ZoneKey;

    fn terrain(aspect: f32, elevation: f32) -> TerrainSample {
        TerrainSample::new(aspect, elevation, 1)
    }

    #[test]
    fn test_terrain_gate_skips_statistics() {
        let mut session = WetDrySession::new().unwrap();
        let masked = TerrainSample::new(90.0, 2000.0, 0);

        let value = session
            .evaluate_pixel(masked, &SampleGroup::Stack(vec![110]))
            .unwrap();
        assert_eq!(value, UNCLASSIFIED);

        assert!(session.statistics().iter().all(|(_, r)| r.count == 0));
    }

    #[test]
    fn test_wet_dry_run_accumulates_by_zone() {
        let mut session = WetDrySession::new().unwrap();

        // Dry-then-wet stack on an east-facing pixel at 1750 m
        let value = session
            .evaluate_pixel(terrain(90.0, 1750.0), &SampleGroup::Stack(vec![115, 110]))
            .unwrap();
        assert_eq!(value, 1);

        // Dry-only stack in the same zone
        let value = session
            .evaluate_pixel(terrain(100.0, 1900.0), &SampleGroup::Stack(vec![115, 255]))
            .unwrap();
        assert_eq!(value, 2);

        // No usable reading leaves the zone untouched
        let value = session
            .evaluate_pixel(terrain(95.0, 1800.0), &SampleGroup::Stack(vec![255]))
            .unwrap();
        assert_eq!(value, UNCLASSIFIED);

        let record = session
            .statistics()
            .get(&ZoneKey::new(90, 2000))
            .unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.aggregate, ZoneAggregate::WetDry { wet: 1, dry: 1 });
    }

    #[test]
    fn test_snow_cover_run() {
        let mut session = SnowCoverSession::new().unwrap();

        let value = session
            .evaluate_pixel(terrain(180.0, 2600.0), &SampleGroup::Stack(vec![40, 100]))
            .unwrap();
        assert_eq!(value, 1);

        let value = session
            .evaluate_pixel(terrain(180.0, 2600.0), &SampleGroup::Stack(vec![40, 60]))
            .unwrap();
        assert_eq!(value, 0);

        let record = session
            .statistics()
            .get(&ZoneKey::new(180, 3000))
            .unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.aggregate, ZoneAggregate::Binary { sum: 1 });
    }

    #[test]
    fn test_persistent_snow_counts_every_terrain_valid_pixel() {
        let mut session = PersistentSnowSession::new().unwrap();

        session
            .evaluate_pixel(terrain(0.0, 1540.0), &SampleGroup::Single(1))
            .unwrap();
        session
            .evaluate_pixel(terrain(0.0, 1560.0), &SampleGroup::Single(0))
            .unwrap();
        // A no-data reading still counts toward the zone
        session
            .evaluate_pixel(terrain(0.0, 1580.0), &SampleGroup::Single(255))
            .unwrap();

        let record = session
            .statistics()
            .get(&ZoneKey::new(0, 1600))
            .unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.aggregate, ZoneAggregate::Binary { sum: 1 });
    }

    #[test]
    fn test_export_metadata_scene_coverage() {
        use chrono::{TimeZone, Utc};

        let mut session = WetDrySession::new().unwrap();
        session
            .evaluate_pixel(terrain(45.0, 1600.0), &SampleGroup::Stack(vec![110]))
            .unwrap();

        let scenes = vec![
            SceneInfo {
                id: "S1A_T32TLS_20240105".to_string(),
                acquisition: Utc.with_ymd_and_hms(2024, 1, 5, 5, 30, 0).unwrap(),
            },
            SceneInfo {
                id: "S1A_T32TLS_20240117".to_string(),
                acquisition: Utc.with_ymd_and_hms(2024, 1, 17, 5, 30, 0).unwrap(),
            },
        ];

        let summary = session.export_metadata(&scenes);
        assert_eq!(summary.scene_count, 2);
        assert_eq!(
            summary.first_acquisition.unwrap(),
            scenes[0].acquisition
        );
        assert_eq!(summary.last_acquisition.unwrap(), scenes[1].acquisition);
        assert_eq!(summary.zones["45_2000"].count, 1);
    }
}
