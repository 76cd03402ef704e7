//! Rate construction from temperature and humidity.

use crate::error::{ModelError, check_num, check_pos};
use serde::{Deserialize, Serialize};

/// Sensitivity coefficients shared by the decay and growth pipelines.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateParams {
    /// Temperature sensitivity `a` (day⁻¹).
    pub sens_temp: f64,
    /// Humidity sensitivity `b` (day⁻¹).
    pub sens_hum: f64,

    /// Reference temperature (°C).
    #[serde(default = "default_temp_ref")]
    pub temp_ref: f64,
    /// Rate change per 10 °C.
    #[serde(default = "default_q10")]
    pub q10: f64,
}

fn default_temp_ref() -> f64 {
    25.0
}

fn default_q10() -> f64 {
    2.0
}

impl RateParams {
    /// Sensitivities with the default reference temperature and Q10.
    #[cfg(test)]
    pub fn new(sens_temp: f64, sens_hum: f64) -> Self {
        Self {
            sens_temp,
            sens_hum,
            temp_ref: default_temp_ref(),
            q10: default_q10(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_num("sens_temp", self.sens_temp, 0.0..)?;
        check_num("sens_hum", self.sens_hum, 0.0..)?;
        check_num("temp_ref", self.temp_ref, f64::MIN..=f64::MAX)?;
        check_pos("q10", self.q10)?;
        Ok(())
    }

    /// Multiplicative Q10 factor: above 1 over the reference temperature, below 1 under it.
    pub fn q10_temp_factor(&self, temp: f64) -> f64 {
        self.q10.powf((temp - self.temp_ref) / 10.0)
    }

    /// Preservation granted by temperature: 0 at the reference, positive when colder.
    pub fn temp_preserve_factor(&self, temp: f64) -> f64 {
        1.0 - self.q10_temp_factor(temp)
    }

    /// Death rate (day⁻¹) at temperature `temp` (°C) and relative humidity `rel_hum` (%).
    ///
    /// Hot and dry maximizes the rate, cold and humid minimizes it.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] if `temp` is not finite or `rel_hum`
    /// is outside `[0, 100]`, and [`ModelError::NumericDegeneracy`] if the rate overflows.
    pub fn death_rate(&self, temp: f64, rel_hum: f64) -> Result<f64, ModelError> {
        check_num("temp", temp, f64::MIN..=f64::MAX)?;
        check_num("rel_hum", rel_hum, 0.0..=100.0)?;
        let tp = self.temp_preserve_factor(temp);
        let rate = self.sens_temp * (1.0 - tp) + self.sens_hum * (1.0 - rel_hum / 100.0);
        if !rate.is_finite() {
            return Err(ModelError::NumericDegeneracy {
                name: "death_rate",
                value: rate,
            });
        }
        Ok(rate)
    }
}
