//! Synthetic reading generation
//!
//! Two independent generators live here:
//! - [`ReadingGenerator`] feeds the ingestion loop. Every field, plant health
//!   included, is drawn uniformly and independently from a fixed range.
//! - [`ConditionsSampler`] feeds the scoring endpoint. It draws soil moisture
//!   and temperature from normal distributions and rainfall from an
//!   exponential one; plant health is then derived by [`crate::scoring`].
//!
//! The two paths are deliberately not unified.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

use crate::error::{CoreError, Result};
use crate::reading::{round2, Reading};
use crate::scoring::ScoringInput;

/// Soil moisture range of ingested readings (percent)
pub const SOIL_MOISTURE_RANGE: RangeInclusive<f64> = 30.0..=80.0;
/// Temperature range of ingested readings (Celsius)
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 20.0..=35.0;
/// Rainfall range of ingested readings (millimeters)
pub const RAINFALL_RANGE: RangeInclusive<f64> = 0.0..=15.0;
/// Plant health range of ingested readings (percent)
pub const PLANT_HEALTH_RANGE: RangeInclusive<f64> = 60.0..=95.0;

/// Uniform generator for the ingestion path
#[derive(Debug)]
pub struct ReadingGenerator {
    rng: StdRng,
}

impl ReadingGenerator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self, range: RangeInclusive<f64>) -> f64 {
        round2(self.rng.gen_range(range))
    }

    /// Produce the reading for `sequence`, every value rounded to 2 decimals
    pub fn generate(&mut self, sequence: u64, source_identifier: &str) -> Reading {
        Reading {
            sequence,
            source_identifier: source_identifier.to_string(),
            soil_moisture_percent: self.draw(SOIL_MOISTURE_RANGE),
            temperature_celsius: self.draw(TEMPERATURE_RANGE),
            rainfall_millimeters: self.draw(RAINFALL_RANGE),
            plant_health_percent: self.draw(PLANT_HEALTH_RANGE),
        }
    }
}

impl Default for ReadingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Conditions sampler for the scoring endpoint.
///
/// - soil moisture: `30 + N(35, 10)`, clamped to `[0, 100]`
/// - temperature: `15 + N(10, 5)`, clamped to `[5, 40]`
/// - rainfall: `Exp(mean = 2)`, floored at 0, unbounded above
#[derive(Debug)]
pub struct ConditionsSampler {
    rng: StdRng,
    soil: Normal<f64>,
    temperature: Normal<f64>,
    rainfall: Exp<f64>,
}

impl ConditionsSampler {
    /// Offset added to the soil moisture draw
    pub const SOIL_OFFSET: f64 = 30.0;
    /// Offset added to the temperature draw
    pub const TEMPERATURE_OFFSET: f64 = 15.0;
    /// Mean rainfall in millimeters
    pub const RAINFALL_MEAN: f64 = 2.0;

    /// Sampler seeded from OS entropy
    pub fn new() -> Result<Self> {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic sampler for tests
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Result<Self> {
        let soil = Normal::new(35.0, 10.0).map_err(|e| CoreError::Distribution(e.to_string()))?;
        let temperature =
            Normal::new(10.0, 5.0).map_err(|e| CoreError::Distribution(e.to_string()))?;
        let rainfall = Exp::new(1.0 / Self::RAINFALL_MEAN)
            .map_err(|e| CoreError::Distribution(e.to_string()))?;

        Ok(Self {
            rng,
            soil,
            temperature,
            rainfall,
        })
    }

    /// Draw one set of conditions
    pub fn sample(&mut self) -> ScoringInput {
        let soil = (Self::SOIL_OFFSET + self.soil.sample(&mut self.rng)).clamp(0.0, 100.0);
        let temperature =
            (Self::TEMPERATURE_OFFSET + self.temperature.sample(&mut self.rng)).clamp(5.0, 40.0);
        let rainfall = self.rainfall.sample(&mut self.rng).max(0.0);

        ScoringInput {
            soil_moisture_percent: soil,
            temperature_celsius: temperature,
            rainfall_millimeters: rainfall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_two_decimals(value: f64) -> bool {
        let scaled = value * 100.0;
        (scaled - scaled.round()).abs() < 1e-6
    }

    #[test]
    fn test_generated_readings_within_ranges() {
        let mut generator = ReadingGenerator::with_seed(7);
        for sequence in 1..=2_000 {
            let r = generator.generate(sequence, "192.168.1.20");
            assert_eq!(r.sequence, sequence);
            assert_eq!(r.source_identifier, "192.168.1.20");
            assert!(SOIL_MOISTURE_RANGE.contains(&r.soil_moisture_percent));
            assert!(TEMPERATURE_RANGE.contains(&r.temperature_celsius));
            assert!(RAINFALL_RANGE.contains(&r.rainfall_millimeters));
            assert!(PLANT_HEALTH_RANGE.contains(&r.plant_health_percent));
        }
    }

    #[test]
    fn test_generated_values_rounded_to_two_decimals() {
        let mut generator = ReadingGenerator::with_seed(11);
        for sequence in 1..=500 {
            let r = generator.generate(sequence, "host");
            assert!(has_two_decimals(r.soil_moisture_percent));
            assert!(has_two_decimals(r.temperature_celsius));
            assert!(has_two_decimals(r.rainfall_millimeters));
            assert!(has_two_decimals(r.plant_health_percent));
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = ReadingGenerator::with_seed(42);
        let mut b = ReadingGenerator::with_seed(42);
        assert_eq!(a.generate(1, "x"), b.generate(1, "x"));
    }

    #[test]
    fn test_sampler_respects_clamps() {
        let mut sampler = ConditionsSampler::with_seed(3).unwrap();
        for _ in 0..5_000 {
            let input = sampler.sample();
            assert!((0.0..=100.0).contains(&input.soil_moisture_percent));
            assert!((5.0..=40.0).contains(&input.temperature_celsius));
            assert!(input.rainfall_millimeters >= 0.0);
            assert!(input.validate().is_ok());
        }
    }

    #[test]
    fn test_sampler_means_are_plausible() {
        let mut sampler = ConditionsSampler::with_seed(99).unwrap();
        let n = 20_000;
        let (mut soil, mut temp, mut rain) = (0.0, 0.0, 0.0);
        for _ in 0..n {
            let input = sampler.sample();
            soil += input.soil_moisture_percent;
            temp += input.temperature_celsius;
            rain += input.rainfall_millimeters;
        }
        let n = n as f64;
        assert!((soil / n - 65.0).abs() < 1.0);
        assert!((temp / n - 25.0).abs() < 0.5);
        assert!((rain / n - 2.0).abs() < 0.2);
    }
}
