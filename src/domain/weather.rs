//! Weekly temperature readings.

use std::fmt;

use nonempty::NonEmpty;

/// The days of a week, in order.
pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Lowest accepted reading, in °C.
pub const MIN_CELSIUS: f64 = -80.0;
/// Highest accepted reading, in °C.
pub const MAX_CELSIUS: f64 = 60.0;

/// Errors produced while recording or averaging readings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherError {
    /// The reading is not a finite number in the accepted range.
    #[error("temperature out of range (-80 to 60 °C): {0}")]
    OutOfRange(f64),

    /// Strict averaging needs every day filled in.
    #[error("missing temperatures for: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// Lenient averaging needs at least one reading.
    #[error("there are no temperatures to average")]
    Empty,

    /// The day index is not 0..7.
    #[error("no such day: {0}")]
    NoSuchDay(usize),
}

/// A validated temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    /// Validates a reading.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::OutOfRange`] for readings outside
    /// [`MIN_CELSIUS`]..=[`MAX_CELSIUS`] or that are not finite.
    pub fn new(celsius: f64) -> Result<Self, WeatherError> {
        if celsius.is_finite() && (MIN_CELSIUS..=MAX_CELSIUS).contains(&celsius) {
            Ok(Self(celsius))
        } else {
            Err(WeatherError::OutOfRange(celsius))
        }
    }

    /// The reading in °C.
    #[must_use]
    pub const fn celsius(self) -> f64 {
        self.0
    }
}

/// How to treat days without a reading when averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AveragePolicy {
    /// Every day must have a reading.
    #[default]
    Strict,
    /// Days without a reading are ignored.
    Lenient,
}

/// One optional reading per day of the week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Week {
    readings: [Option<Temperature>; 7],
}

impl Week {
    /// A week with no readings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reading for day `index` (0 = Monday).
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::NoSuchDay`] for an index past Sunday.
    pub fn set(&mut self, index: usize, temperature: Temperature) -> Result<(), WeatherError> {
        let slot = self
            .readings
            .get_mut(index)
            .ok_or(WeatherError::NoSuchDay(index))?;
        *slot = Some(temperature);
        Ok(())
    }

    /// Pairs each day name with its reading.
    pub fn days(&self) -> impl Iterator<Item = (&'static str, Option<Temperature>)> + '_ {
        DAYS.iter().copied().zip(self.readings.iter().copied())
    }

    /// The weekly mean under `policy`.
    ///
    /// # Errors
    ///
    /// Strict averaging fails with [`WeatherError::Missing`] naming the empty
    /// days; lenient averaging fails with [`WeatherError::Empty`] only when
    /// there are no readings at all.
    pub fn average(&self, policy: AveragePolicy) -> Result<f64, WeatherError> {
        if policy == AveragePolicy::Strict {
            let missing: Vec<_> = self
                .days()
                .filter(|(_, reading)| reading.is_none())
                .map(|(day, _)| day)
                .collect();
            if !missing.is_empty() {
                return Err(WeatherError::Missing(missing));
            }
        }

        let present: Vec<f64> = self.readings.iter().flatten().map(|t| t.celsius()).collect();
        let present = NonEmpty::from_vec(present).ok_or(WeatherError::Empty)?;

        #[allow(clippy::cast_precision_loss)]
        let count = present.len() as f64;
        Ok(present.iter().sum::<f64>() / count)
    }

    /// The per-day listing followed by the average, or why there is none.
    #[must_use]
    pub const fn summary(&self, policy: AveragePolicy) -> Summary<'_> {
        Summary { week: self, policy }
    }
}

/// Display adapter returned by [`Week::summary`].
#[derive(Debug)]
pub struct Summary<'a> {
    week: &'a Week,
    policy: AveragePolicy,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (day, reading) in self.week.days() {
            match reading {
                Some(t) => writeln!(f, "{day}: {:.2} °C", t.celsius())?,
                None => writeln!(f, "{day}: no reading")?,
            }
        }
        match self.week.average(self.policy) {
            Ok(mean) => write!(f, "Weekly average: {mean:.2} °C"),
            Err(e) => write!(f, "Weekly average unavailable: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_week() -> Week {
        let mut week = Week::new();
        for (i, celsius) in [20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0].into_iter().enumerate() {
            week.set(i, Temperature::new(celsius).unwrap()).unwrap();
        }
        week
    }

    #[test]
    fn full_week_averages_under_both_policies() {
        let week = full_week();
        assert!((week.average(AveragePolicy::Strict).unwrap() - 23.0).abs() < 1e-9);
        assert!((week.average(AveragePolicy::Lenient).unwrap() - 23.0).abs() < 1e-9);
    }

    #[test]
    fn strict_policy_names_missing_days() {
        let mut week = Week::new();
        week.set(0, Temperature::new(22.0).unwrap()).unwrap();

        let error = week.average(AveragePolicy::Strict).unwrap_err();

        match error {
            WeatherError::Missing(days) => assert_eq!(days.len(), 6),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_policy_ignores_missing_days() {
        let mut week = Week::new();
        week.set(0, Temperature::new(22.0).unwrap()).unwrap();
        week.set(1, Temperature::new(24.5).unwrap()).unwrap();

        let mean = week.average(AveragePolicy::Lenient).unwrap();
        assert!((mean - 23.25).abs() < 1e-9);
    }

    #[test]
    fn lenient_policy_needs_one_reading() {
        assert_eq!(
            Week::new().average(AveragePolicy::Lenient),
            Err(WeatherError::Empty)
        );
    }

    #[test]
    fn out_of_range_readings_are_rejected() {
        assert!(Temperature::new(60.0).is_ok());
        assert_eq!(Temperature::new(60.5), Err(WeatherError::OutOfRange(60.5)));
        assert!(Temperature::new(f64::NAN).is_err());
    }

    #[test]
    fn summary_reports_unavailable_average() {
        let text = Week::new().summary(AveragePolicy::Strict).to_string();
        assert!(text.starts_with("Monday: no reading"));
        assert!(text.contains("Weekly average unavailable"));
    }
}
