use embedded_hal::adc::{Channel, OneShot};

use crate::config::{SOIL_RAW_DRY, SOIL_RAW_WET};
use crate::remap;

/// Maps a raw capacitive-probe reading onto 0..=100 percent moisture.
/// Readings past either calibration point clamp instead of extrapolating.
pub fn percent(raw: u16) -> u8 {
    let pct = remap(raw as i32, SOIL_RAW_DRY as i32, SOIL_RAW_WET as i32, 0, 100);
    pct.max(0).min(100) as u8
}

/// The three soil probes, one per bed row.
pub struct SoilSensors<P1, P2, P3> {
    probe1: P1,
    probe2: P2,
    probe3: P3,
}

impl<P1, P2, P3> SoilSensors<P1, P2, P3> {
    pub fn new(probe1: P1, probe2: P2, probe3: P3) -> Self {
        SoilSensors {
            probe1,
            probe2,
            probe3,
        }
    }

    /// One-shot conversion of all probes. A failed conversion reads as dry.
    pub fn read_all<AdcDev, ADC>(&mut self, adc: &mut ADC) -> [u8; 3]
    where
        ADC: OneShot<AdcDev, u16, P1> + OneShot<AdcDev, u16, P2> + OneShot<AdcDev, u16, P3>,
        P1: Channel<AdcDev>,
        P2: Channel<AdcDev>,
        P3: Channel<AdcDev>,
    {
        [
            percent(sample(adc, &mut self.probe1)),
            percent(sample(adc, &mut self.probe2)),
            percent(sample(adc, &mut self.probe3)),
        ]
    }
}

fn sample<AdcDev, PIN, ADC>(adc: &mut ADC, pin: &mut PIN) -> u16
where
    ADC: OneShot<AdcDev, u16, PIN>,
    PIN: Channel<AdcDev>,
{
    adc.read(pin).ok().unwrap_or(SOIL_RAW_DRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_linear_between_calibration_points() {
        assert_eq!(percent(SOIL_RAW_DRY), 0);
        assert_eq!(percent(SOIL_RAW_WET), 100);
        assert_eq!(percent(2200), 50);
    }

    #[test]
    fn percent_clamps_out_of_band_readings() {
        assert_eq!(percent(4095), 0);
        assert_eq!(percent(0), 100);
        assert_eq!(percent(500), 100);
    }
}
