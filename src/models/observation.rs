use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::POLLUTANT_COUNT;

/// The six pollutants measured at the station, in dataset column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; POLLUTANT_COUNT] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// Column header used in the source CSV
    pub fn column(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeatherVariable {
    Temperature,
    Pressure,
}

impl WeatherVariable {
    pub const ALL: [WeatherVariable; 2] = [WeatherVariable::Temperature, WeatherVariable::Pressure];

    pub fn column(&self) -> &'static str {
        match self {
            WeatherVariable::Temperature => "TEMP",
            WeatherVariable::Pressure => "PRES",
        }
    }
}

impl fmt::Display for WeatherVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Any numeric field of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Pollutant(Pollutant),
    Weather(WeatherVariable),
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Pollutant(Pollutant::Pm25),
        Metric::Pollutant(Pollutant::Pm10),
        Metric::Pollutant(Pollutant::So2),
        Metric::Pollutant(Pollutant::No2),
        Metric::Pollutant(Pollutant::Co),
        Metric::Pollutant(Pollutant::O3),
        Metric::Weather(WeatherVariable::Temperature),
        Metric::Weather(WeatherVariable::Pressure),
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Metric::Pollutant(p) => p.column(),
            Metric::Weather(w) => w.column(),
        }
    }

    /// Position in `Metric::ALL`.
    pub(crate) fn index(&self) -> usize {
        match self {
            Metric::Pollutant(p) => *p as usize,
            Metric::Weather(w) => POLLUTANT_COUNT + *w as usize,
        }
    }
}

impl From<Pollutant> for Metric {
    fn from(pollutant: Pollutant) -> Self {
        Metric::Pollutant(pollutant)
    }
}

impl From<WeatherVariable> for Metric {
    fn from(variable: WeatherVariable) -> Self {
        Metric::Weather(variable)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Sixteen-point compass code as recorded in the `wd` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindDirection {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl WindDirection {
    pub const ALL: [WindDirection; 16] = [
        WindDirection::N,
        WindDirection::Nne,
        WindDirection::Ne,
        WindDirection::Ene,
        WindDirection::E,
        WindDirection::Ese,
        WindDirection::Se,
        WindDirection::Sse,
        WindDirection::S,
        WindDirection::Ssw,
        WindDirection::Sw,
        WindDirection::Wsw,
        WindDirection::W,
        WindDirection::Wnw,
        WindDirection::Nw,
        WindDirection::Nnw,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::Nne => "NNE",
            WindDirection::Ne => "NE",
            WindDirection::Ene => "ENE",
            WindDirection::E => "E",
            WindDirection::Ese => "ESE",
            WindDirection::Se => "SE",
            WindDirection::Sse => "SSE",
            WindDirection::S => "S",
            WindDirection::Ssw => "SSW",
            WindDirection::Sw => "SW",
            WindDirection::Wsw => "WSW",
            WindDirection::W => "W",
            WindDirection::Wnw => "WNW",
            WindDirection::Nw => "NW",
            WindDirection::Nnw => "NNW",
        }
    }
}

impl FromStr for WindDirection {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        WindDirection::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ProcessingError::InvalidWindDirection(code.to_string()))
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Concentrations of the six pollutants, either raw or averaged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct PollutantLevels {
    #[validate(range(min = 0.0))]
    pub pm25: f64,

    #[validate(range(min = 0.0))]
    pub pm10: f64,

    #[validate(range(min = 0.0))]
    pub so2: f64,

    #[validate(range(min = 0.0))]
    pub no2: f64,

    #[validate(range(min = 0.0))]
    pub co: f64,

    #[validate(range(min = 0.0))]
    pub o3: f64,
}

impl PollutantLevels {
    pub fn new(pm25: f64, pm10: f64, so2: f64, no2: f64, co: f64, o3: f64) -> Self {
        Self {
            pm25,
            pm10,
            so2,
            no2,
            co,
            o3,
        }
    }

    /// Build from exactly six values in column order (PM2.5, PM10, SO2, NO2, CO, O3).
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != POLLUTANT_COUNT {
            return Err(ProcessingError::ValueCount {
                expected: POLLUTANT_COUNT,
                found: values.len(),
            });
        }

        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ProcessingError::NonNumeric(format!(
                "{} = {}",
                Pollutant::ALL[i].column(),
                v
            )));
        }

        Ok(Self::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        ))
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::So2 => self.so2,
            Pollutant::No2 => self.no2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        match pollutant {
            Pollutant::Pm25 => self.pm25 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::So2 => self.so2 = value,
            Pollutant::No2 => self.no2 = value,
            Pollutant::Co => self.co = value,
            Pollutant::O3 => self.o3 = value,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// One cleaned hourly record. Identifier columns (`No`, `station`) are not kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    pub timestamp: NaiveDateTime,

    #[validate(nested)]
    pub pollutants: PollutantLevels,

    #[validate(range(min = -60.0, max = 60.0))]
    pub temperature: f64,

    #[validate(range(min = 800.0, max = 1100.0))]
    pub pressure: f64,

    pub wind_direction: WindDirection,
}

impl Observation {
    pub fn new(
        timestamp: NaiveDateTime,
        pollutants: PollutantLevels,
        temperature: f64,
        pressure: f64,
        wind_direction: WindDirection,
    ) -> Self {
        Self {
            timestamp,
            pollutants,
            temperature,
            pressure,
            wind_direction,
        }
    }

    pub fn weather(&self, variable: WeatherVariable) -> f64 {
        match variable {
            WeatherVariable::Temperature => self.temperature,
            WeatherVariable::Pressure => self.pressure,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Pollutant(p) => self.pollutants.get(p),
            Metric::Weather(w) => self.weather(w),
        }
    }
}
