use crate::aqi::breakpoints::BreakpointTable;
use crate::error::NoMatchingBand;

/// Converts a concentration into an AQI using the table's breakpoints.
///
/// The reading is rounded to the table's precision before the band lookup,
/// since band edges are published at that granularity. Zero, negative and
/// NaN readings map to 0. Any reading strictly above the last band's upper
/// bound, checked before rounding, returns `last.high_aqi + 1` as an
/// "above scale" marker rather than extrapolating.
pub fn compute_aqi(concentration: f64, table: &BreakpointTable) -> Result<u16, NoMatchingBand> {
    let rounded = table.round(concentration);

    if rounded.is_nan() || rounded <= 0.0 {
        return Ok(0);
    }

    let max_band = table.max_band();
    if concentration > max_band.high_concentration {
        return Ok(max_band.high_aqi + 1);
    }

    let band = table.find_band(rounded).ok_or(NoMatchingBand {
        pollutant: table.pollutant(),
        concentration,
    })?;

    let slope = f64::from(band.high_aqi - band.low_aqi)
        / (band.high_concentration - band.low_concentration);
    let aqi = slope * (rounded - band.low_concentration) + f64::from(band.low_aqi);

    Ok(aqi.round() as u16)
}

/// EPA health category for an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    AboveScale,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            301..=500 => AqiCategory::Hazardous,
            _ => AqiCategory::AboveScale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
            AqiCategory::AboveScale => "Above scale",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::breakpoints::{BreakpointBand, Pollutant};

    fn pm25(c: f64) -> u16 {
        compute_aqi(c, Pollutant::Pm25.table()).unwrap()
    }

    #[test]
    fn test_pm25_reference_values() {
        assert_eq!(pm25(0.0), 0);
        assert_eq!(pm25(12.0), 50);
        assert_eq!(pm25(12.1), 51);
        assert_eq!(pm25(35.4), 100);
        assert_eq!(pm25(35.5), 101);
        assert_eq!(pm25(500.4), 500);
        assert_eq!(pm25(500.5), 501);
    }

    #[test]
    fn test_rounds_before_lookup() {
        assert_eq!(pm25(12.04), pm25(12.0));
        // 12.06 rounds up into the second band instead of falling into the gap
        assert_eq!(pm25(12.06), 51);
        assert_eq!(pm25(500.36), 500);
    }

    #[test]
    fn test_non_positive_is_zero() {
        for c in [0.0, -0.01, -1.0, -500.0, f64::NAN] {
            assert_eq!(pm25(c), 0, "concentration {c}");
        }
        // rounds to 0.0
        assert_eq!(pm25(0.04), 0);
    }

    #[test]
    fn test_above_scale_sentinel() {
        // anything past the top bound, even if it would round back onto it
        for c in [500.41, 500.44, 500.46, 500.5, 501.0, 1000.0, f64::INFINITY] {
            assert_eq!(pm25(c), 501, "concentration {c}");
        }
        let pm10 = Pollutant::Pm10.table();
        assert_eq!(compute_aqi(605.0, pm10), Ok(501));
        assert_eq!(compute_aqi(604.2, pm10), Ok(501));
    }

    #[test]
    fn test_monotonic_and_bounded_up_to_max() {
        let table = Pollutant::Pm25.table();
        let mut previous = 0;
        // every tenth of a microgram from 0.1 to the table maximum
        for tenths in 1..=5004 {
            let c = f64::from(tenths) / 10.0;
            let aqi = compute_aqi(c, table).unwrap();
            assert!(aqi <= 500, "aqi {aqi} for {c}");
            assert!(aqi >= previous, "aqi dropped from {previous} to {aqi} at {c}");
            previous = aqi;
        }
        assert_eq!(previous, 500);
    }

    #[test]
    fn test_pm10_values() {
        let table = Pollutant::Pm10.table();
        assert_eq!(compute_aqi(54.0, table), Ok(50));
        assert_eq!(compute_aqi(54.4, table), Ok(50));
        assert_eq!(compute_aqi(54.6, table), Ok(51));
        assert_eq!(compute_aqi(154.0, table), Ok(100));
        assert_eq!(compute_aqi(604.0, table), Ok(500));
    }

    #[test]
    fn test_gap_in_table_is_reported() {
        let table = BreakpointTable::unchecked(
            Pollutant::Pm25,
            1,
            vec![
                BreakpointBand::new(0.0, 12.0, 0, 50),
                BreakpointBand::new(13.0, 35.4, 51, 100),
            ],
        );
        let err = compute_aqi(12.5, &table).unwrap_err();
        assert_eq!(err.pollutant, Pollutant::Pm25);
        assert_eq!(err.concentration, 12.5);
        assert_eq!(compute_aqi(13.0, &table), Ok(51));
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(500), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_aqi(501), AqiCategory::AboveScale);
    }
}
