use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// https://www3.epa.gov/airnow/aqi-technical-assistance-document-sept2018.pdf
static PM25_TABLE: LazyLock<BreakpointTable> = LazyLock::new(|| {
    BreakpointTable::new(
        Pollutant::Pm25,
        1,
        vec![
            BreakpointBand::new(0.0, 12.0, 0, 50),
            BreakpointBand::new(12.1, 35.4, 51, 100),
            BreakpointBand::new(35.5, 55.4, 101, 150),
            BreakpointBand::new(55.5, 150.4, 151, 200),
            BreakpointBand::new(150.5, 250.4, 201, 300),
            BreakpointBand::new(250.5, 350.4, 301, 400),
            BreakpointBand::new(350.5, 500.4, 401, 500),
        ],
    )
});

static PM10_TABLE: LazyLock<BreakpointTable> = LazyLock::new(|| {
    BreakpointTable::new(
        Pollutant::Pm10,
        0,
        vec![
            BreakpointBand::new(0.0, 54.0, 0, 50),
            BreakpointBand::new(55.0, 154.0, 51, 100),
            BreakpointBand::new(155.0, 254.0, 101, 150),
            BreakpointBand::new(255.0, 354.0, 151, 200),
            BreakpointBand::new(355.0, 424.0, 201, 300),
            BreakpointBand::new(425.0, 504.0, 301, 400),
            BreakpointBand::new(505.0, 604.0, 401, 500),
        ],
    )
});

/// Pollutants with a published breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
}

impl Pollutant {
    /// Fields monitored by a default run, in processing order.
    pub const MONITORED: [Pollutant; 2] = [Pollutant::Pm25, Pollutant::Pm10];

    /// Field key the sensors report this pollutant under.
    pub fn field_name(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm100",
        }
    }

    pub fn table(self) -> &'static BreakpointTable {
        match self {
            Pollutant::Pm25 => &*PM25_TABLE,
            Pollutant::Pm10 => &*PM10_TABLE,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pollutant::Pm25 => f.write_str("PM2.5"),
            Pollutant::Pm10 => f.write_str("PM10"),
        }
    }
}

impl FromStr for Pollutant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" | "pm2_5" => Ok(Pollutant::Pm25),
            "pm10" | "pm100" => Ok(Pollutant::Pm10),
            other => Err(format!("unknown pollutant '{other}' (expected pm25 or pm10)")),
        }
    }
}

/// One concentration range mapped linearly onto an AQI range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakpointBand {
    pub low_concentration: f64,
    pub high_concentration: f64,
    pub low_aqi: u16,
    pub high_aqi: u16,
}

impl BreakpointBand {
    pub const fn new(low_concentration: f64, high_concentration: f64, low_aqi: u16, high_aqi: u16) -> Self {
        Self {
            low_concentration,
            high_concentration,
            low_aqi,
            high_aqi,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, concentration: f64) -> bool {
        concentration >= self.low_concentration && concentration <= self.high_concentration
    }
}

/// Ordered EPA breakpoints for a single pollutant.
///
/// `precision` is the number of decimal places the table's bounds are
/// published at; readings are rounded to it before lookup. Bands must start
/// at zero and be contiguous at that precision, otherwise construction
/// panics.
#[derive(Debug, Clone)]
pub struct BreakpointTable {
    pollutant: Pollutant,
    precision: u32,
    bands: Vec<BreakpointBand>,
}

impl BreakpointTable {
    pub fn new(pollutant: Pollutant, precision: u32, bands: Vec<BreakpointBand>) -> Self {
        assert!(!bands.is_empty(), "{pollutant} breakpoint table has no bands");
        assert!(
            bands[0].low_concentration == 0.0 && bands[0].low_aqi == 0,
            "{pollutant} breakpoint table must start at zero"
        );

        let step = 10f64.powi(-(precision as i32));
        for band in &bands {
            assert!(
                band.low_concentration <= band.high_concentration && band.low_aqi < band.high_aqi,
                "{pollutant} band {band:?} is inverted"
            );
        }
        for pair in bands.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            assert!(
                (next.low_concentration - prev.high_concentration - step).abs() < step / 2.0,
                "{pollutant} bands {prev:?} and {next:?} are not contiguous"
            );
            assert!(
                next.low_aqi == prev.high_aqi + 1,
                "{pollutant} AQI ranges of {prev:?} and {next:?} are not contiguous"
            );
        }

        Self {
            pollutant,
            precision,
            bands,
        }
    }

    /// Skips validation so lookup failures can be exercised.
    #[cfg(test)]
    pub(crate) fn unchecked(pollutant: Pollutant, precision: u32, bands: Vec<BreakpointBand>) -> Self {
        Self {
            pollutant,
            precision,
            bands,
        }
    }

    pub fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    pub fn bands(&self) -> &[BreakpointBand] {
        &self.bands
    }

    pub fn max_band(&self) -> &BreakpointBand {
        // Non-empty is checked in `new`.
        &self.bands[self.bands.len() - 1]
    }

    pub fn max_concentration(&self) -> f64 {
        self.max_band().high_concentration
    }

    /// Rounds half away from zero to the table's published precision.
    pub fn round(&self, concentration: f64) -> f64 {
        let factor = 10f64.powi(self.precision as i32);
        (concentration * factor).round() / factor
    }

    pub fn find_band(&self, concentration: f64) -> Option<&BreakpointBand> {
        self.bands.iter().find(|band| band.contains(concentration))
    }
}
