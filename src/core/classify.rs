use crate::core::statistics::Contribution;
use crate::types::{
    ClassValue, MaskedOutput, MaskedReading, SnowCode, GF_FULL_SNOW, NO_DATA, SSC_DRY_SNOW,
    SSC_WET_SNOW,
};

/// Result of reducing one pixel's temporal stack to a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOutcome {
    /// No reading in the stack carried usable data; the host receives
    /// the `-1` sentinel and the pixel is excluded from zonal totals.
    Unusable,
    /// At least one usable reading: the raster output value plus the
    /// pixel's addition to its zone record.
    Valid {
        value: ClassValue,
        contribution: Contribution,
    },
}

/// Shared contract of the temporal-stack classifiers: consume the
/// readings of one pixel in scan order, produce one outcome.
pub trait StackClassifier {
    fn classify<I>(&self, readings: I) -> StackOutcome
    where
        I: IntoIterator<Item = SnowCode>;
}

/// Pixel state lattice for the wet/dry snow product, in ascending
/// priority. A reading can only raise the state, never lower it: a
/// no-data scene after a dry hit does not clear validity, and a wet hit
/// anywhere in the stack overrides an earlier dry hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WetDryState {
    Unusable,
    Bare,
    Dry,
    Wet,
}

/// Ternary wet/dry/none classifier over a wet/dry snow code stack.
///
/// Wet snow has top priority and stops the scan; dry snow is kept but
/// scanning continues so a later wet reading still wins; any other
/// code below the no-data sentinel marks the pixel valid without
/// assigning a snow state.
#[derive(Debug, Clone, Copy)]
pub struct WetDryClassifier {
    pub wet_code: SnowCode,
    pub dry_code: SnowCode,
    pub no_data: SnowCode,
}

impl Default for WetDryClassifier {
    fn default() -> Self {
        Self {
            wet_code: SSC_WET_SNOW,
            dry_code: SSC_DRY_SNOW,
            no_data: NO_DATA,
        }
    }
}

impl WetDryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_of(&self, code: SnowCode) -> WetDryState {
        if code == self.wet_code {
            WetDryState::Wet
        } else if code == self.dry_code {
            WetDryState::Dry
        } else if code < self.no_data {
            WetDryState::Bare
        } else {
            WetDryState::Unusable
        }
    }
}

impl StackClassifier for WetDryClassifier {
    fn classify<I>(&self, readings: I) -> StackOutcome
    where
        I: IntoIterator<Item = SnowCode>,
    {
        let mut state = WetDryState::Unusable;
        for code in readings {
            state = state.max(self.state_of(code));
            if state == WetDryState::Wet {
                // Top of the lattice; later readings cannot change it
                break;
            }
        }

        match state {
            WetDryState::Wet => StackOutcome::Valid {
                value: 1,
                contribution: Contribution::WetDry { wet: 1, dry: 0 },
            },
            WetDryState::Dry => StackOutcome::Valid {
                value: 2,
                contribution: Contribution::WetDry { wet: 0, dry: 1 },
            },
            WetDryState::Bare => StackOutcome::Valid {
                value: 0,
                contribution: Contribution::WetDry { wet: 0, dry: 0 },
            },
            WetDryState::Unusable => StackOutcome::Unusable,
        }
    }
}

/// Binary snow-cover classifier over a gap-filled fractional snow
/// cover stack.
///
/// The full-cover code marks the pixel as snow and stops the scan; any
/// partial cover below it marks the pixel valid without snow; cloud and
/// no-data codes above it are ignored.
#[derive(Debug, Clone, Copy)]
pub struct SnowCoverClassifier {
    pub full_snow_code: SnowCode,
}

impl Default for SnowCoverClassifier {
    fn default() -> Self {
        Self {
            full_snow_code: GF_FULL_SNOW,
        }
    }
}

impl SnowCoverClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StackClassifier for SnowCoverClassifier {
    fn classify<I>(&self, readings: I) -> StackOutcome
    where
        I: IntoIterator<Item = SnowCode>,
    {
        let mut valid = false;
        for code in readings {
            if code == self.full_snow_code {
                return StackOutcome::Valid {
                    value: 1,
                    contribution: Contribution::Binary { sum: 1 },
                };
            } else if code < self.full_snow_code {
                valid = true;
            }
            // Codes above full cover (cloud, no data) are ignored
        }

        if valid {
            StackOutcome::Valid {
                value: 0,
                contribution: Contribution::Binary { sum: 0 },
            }
        } else {
            StackOutcome::Unusable
        }
    }
}

/// Persistent snow area pass-through for the zonal product.
///
/// The static layer delivers one reading per pixel; every terrain-valid
/// pixel counts toward its zone, and only an exact persistent-snow
/// value of 1 adds to the running total. Readings other than 1
/// (including the no-data code) still count, matching the upstream
/// product definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistentSnowClassifier;

impl PersistentSnowClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl StackClassifier for PersistentSnowClassifier {
    fn classify<I>(&self, readings: I) -> StackOutcome
    where
        I: IntoIterator<Item = SnowCode>,
    {
        match readings.into_iter().next() {
            Some(psa) => {
                let snow = u8::from(psa == 1);
                StackOutcome::Valid {
                    value: snow as ClassValue,
                    contribution: Contribution::Binary { sum: snow },
                }
            }
            None => StackOutcome::Unusable,
        }
    }
}

/// Binary snow presence over a gap-filled stack with per-scene masks
/// (non-zonal form, mosaicked directly by the host).
///
/// The pixel is valid if any scene carries data; it is snow if any
/// valid scene reports full cover.
pub fn classify_snow_presence<I>(readings: I) -> MaskedOutput
where
    I: IntoIterator<Item = MaskedReading>,
{
    let mut valid = 0u8;
    let mut snow = 0 as ClassValue;
    for reading in readings {
        if reading.data_mask == 1 {
            valid = 1;
            if reading.value == GF_FULL_SNOW {
                snow = 1;
            }
        }
    }

    MaskedOutput {
        value: snow,
        data_mask: valid,
    }
}

/// Persistent snow area pass-through with mask correction (non-zonal
/// form).
///
/// The scalar is forwarded unchanged, but any value above 1 is not a
/// persistent-snow indicator and forces the validity mask to 0
/// regardless of the upstream flag.
pub fn screen_persistent_snow(reading: MaskedReading) -> MaskedOutput {
    let data_mask = if reading.value > 1 { 0 } else { reading.data_mask };
    MaskedOutput {
        value: reading.value as ClassValue,
        data_mask,
    }
}
