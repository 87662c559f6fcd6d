//! Body-mass index.

use std::fmt;

/// Age at which a person counts as an adult.
pub const ADULT_AGE: u32 = 18;

/// Inputs to the BMI formula that are outside their domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BmiError {
    /// Height must be strictly positive.
    #[error("height must be greater than zero (got {0} m)")]
    Height(f64),

    /// Weight must be strictly positive.
    #[error("weight must be greater than zero (got {0} kg)")]
    Weight(f64),
}

/// Computes `weight / height²`.
///
/// # Errors
///
/// Returns an error if either input is not a positive finite number.
pub fn bmi(weight_kg: f64, height_m: f64) -> Result<f64, BmiError> {
    if !(height_m.is_finite() && height_m > 0.0) {
        return Err(BmiError::Height(height_m));
    }
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(BmiError::Weight(weight_kg));
    }
    Ok(weight_kg / height_m.powi(2))
}

/// Standard adult BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Below 18.5.
    Underweight,
    /// 18.5 up to 25.
    Normal,
    /// 25 up to 30.
    Overweight,
    /// 30 and above.
    Obese,
}

impl Category {
    /// Places a BMI value in its band.
    #[must_use]
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        })
    }
}

/// Returns `true` from [`ADULT_AGE`] onwards.
#[must_use]
pub const fn is_adult(age: u32) -> bool {
    age >= ADULT_AGE
}

/// Everything the calculator reports about one person.
#[derive(Debug, Clone, PartialEq)]
pub struct BmiReport {
    /// The person's name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Height in metres.
    pub height_m: f64,
    /// The computed index.
    pub bmi: f64,
    /// The band the index falls in.
    pub category: Category,
}

impl BmiReport {
    /// Computes the report for one person.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight or height is invalid.
    pub fn new(name: String, age: u32, weight_kg: f64, height_m: f64) -> Result<Self, BmiError> {
        let bmi = bmi(weight_kg, height_m)?;
        Ok(Self {
            name,
            age,
            weight_kg,
            height_m,
            bmi,
            category: Category::classify(bmi),
        })
    }

    /// See [`is_adult`].
    #[must_use]
    pub const fn is_adult(&self) -> bool {
        is_adult(self.age)
    }
}

impl fmt::Display for BmiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adult = if self.is_adult() { "yes" } else { "no" };
        writeln!(f, "--- BMI report ---")?;
        writeln!(f, "Name           : {}", self.name)?;
        writeln!(f, "Age            : {} years (adult: {adult})", self.age)?;
        writeln!(f, "Weight         : {:.2} kg", self.weight_kg)?;
        writeln!(f, "Height         : {:.2} m", self.height_m)?;
        writeln!(f, "BMI            : {:.2}", self.bmi)?;
        write!(f, "Classification : {}", self.category)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(18.49, Category::Underweight; "just under normal")]
    #[test_case(18.5, Category::Normal; "lower normal bound")]
    #[test_case(24.99, Category::Normal; "upper normal")]
    #[test_case(25.0, Category::Overweight; "lower overweight bound")]
    #[test_case(29.99, Category::Overweight; "upper overweight")]
    #[test_case(30.0, Category::Obese; "lower obese bound")]
    fn classification_bands(value: f64, expected: Category) {
        assert_eq!(Category::classify(value), expected);
    }

    #[test]
    fn computes_index() {
        let value = bmi(70.0, 1.75).unwrap();
        assert!((value - 22.857_142).abs() < 1e-5);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert_eq!(bmi(70.0, 0.0), Err(BmiError::Height(0.0)));
    }

    #[test]
    fn adulthood_starts_at_eighteen() {
        assert!(!is_adult(17));
        assert!(is_adult(18));
    }

    #[test]
    fn report_renders_every_line() {
        let report = BmiReport::new("Ana".to_string(), 30, 70.0, 1.75).unwrap();
        let text = report.to_string();

        assert!(text.contains("Ana"));
        assert!(text.contains("adult: yes"));
        assert!(text.contains("BMI            : 22.86"));
        assert!(text.ends_with("Classification : Normal"));
    }
}
