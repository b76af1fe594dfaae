use crate::error::{ChartError, Result};
use crate::types::EducationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ChartError::Parse {
                what: "hex color",
                message: format!("expected 6 hex digits, got {:?}", hex),
            });
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|e| ChartError::Parse {
                what: "hex color",
                message: format!("{} in {:?}", e, hex),
            })
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation per channel, `t` in [0, 1].
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Min, arithmetic mean, and max of the education percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EduStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl EduStats {
    pub fn from_records(records: &[EducationRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(ChartError::EmptyDataset);
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for r in records {
            min = min.min(r.bachelors_or_higher);
            max = max.max(r.bachelors_or_higher);
            sum += r.bachelors_or_higher;
        }
        Ok(Self {
            min,
            mean: sum / records.len() as f64,
            max,
        })
    }
}

/// Maps a percentage to a color through three control points: the dataset
/// minimum, mean, and maximum. Using the mean as pivot instead of the midpoint
/// gives better contrast on skewed distributions, so interpolation is
/// piecewise-linear over (min→mean) and (mean→max), not one linear ramp.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stats: EduStats,
    low: Rgb,
    pivot: Rgb,
    high: Rgb,
}

impl ColorScale {
    pub fn new(stats: EduStats, low: Rgb, pivot: Rgb, high: Rgb) -> Self {
        Self {
            stats,
            low,
            pivot,
            high,
        }
    }

    pub fn stats(&self) -> EduStats {
        self.stats
    }

    /// Out-of-range inputs clamp to the nearest control point.
    pub fn color_of(&self, percentage: f64) -> Rgb {
        let EduStats { min, mean, max } = self.stats;
        if percentage <= min {
            self.low
        } else if percentage >= max {
            self.high
        } else if percentage <= mean {
            self.low.lerp(self.pivot, ratio(min, mean, percentage))
        } else {
            self.pivot.lerp(self.high, ratio(mean, max, percentage))
        }
    }
}

fn ratio(lo: f64, hi: f64, v: f64) -> f64 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        0.0
    }
}
