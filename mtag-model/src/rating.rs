use serde::{Deserialize, Serialize};

/// A single rater's opinion of a file. A file may carry several; the first
/// in file order is the "primary" one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Normalized rating in `[0.0, 1.0]`.
    pub rating: f32,
    pub email: Option<String>,
    pub counter: Option<u32>,
}

impl Rating {
    pub fn new(rating: f32) -> Self {
        Rating {
            rating: rating.clamp(0.0, 1.0),
            email: None,
            counter: None,
        }
    }
}

/// ID3v2 POPM breakpoints, ascending by byte value. These six are fixed
/// exactly; everything else is linear interpolation between the nearest
/// pair.
const POPM_BREAKPOINTS: [(u8, f32); 6] = [
    (0, 0.0),
    (1, 0.004),
    (64, 0.25),
    (128, 0.5),
    (196, 0.75),
    (255, 1.0),
];

/// Converts a POPM byte (0-255) into a normalized `[0.0, 1.0]` rating.
pub fn popm_to_rating(popm: u8) -> f32 {
    for window in POPM_BREAKPOINTS.windows(2) {
        let (lo_b, lo_r) = window[0];
        let (hi_b, hi_r) = window[1];
        if popm >= lo_b && popm <= hi_b {
            if hi_b == lo_b {
                return lo_r;
            }
            let t = (popm - lo_b) as f32 / (hi_b - lo_b) as f32;
            return lo_r + t * (hi_r - lo_r);
        }
    }
    // Unreachable: breakpoints span the full u8 range.
    1.0
}

/// Converts a normalized `[0.0, 1.0]` rating into the nearest POPM byte.
pub fn rating_to_popm(rating: f32) -> u8 {
    let rating = rating.clamp(0.0, 1.0);
    for window in POPM_BREAKPOINTS.windows(2) {
        let (lo_b, lo_r) = window[0];
        let (hi_b, hi_r) = window[1];
        if rating >= lo_r && rating <= hi_r {
            if (hi_r - lo_r).abs() < f32::EPSILON {
                return lo_b;
            }
            let t = (rating - lo_r) / (hi_r - lo_r);
            let value = lo_b as f32 + t * (hi_b - lo_b) as f32;
            return value.round().clamp(0.0, 255.0) as u8;
        }
    }
    255
}

/// 5-star scale, rounding to the nearest whole star.
pub fn rating_to_stars5(rating: f32) -> u8 {
    (rating.clamp(0.0, 1.0) * 5.0).round() as u8
}

pub fn stars5_to_rating(stars: u8) -> f32 {
    (stars.min(5) as f32) / 5.0
}

/// 10-star (half-star-precision) scale.
pub fn rating_to_stars10(rating: f32) -> u8 {
    (rating.clamp(0.0, 1.0) * 10.0).round() as u8
}

pub fn stars10_to_rating(stars: u8) -> f32 {
    (stars.min(10) as f32) / 10.0
}

/// Percent scale (0-100).
pub fn rating_to_percent(rating: f32) -> u8 {
    (rating.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn percent_to_rating(percent: u8) -> f32 {
    (percent.min(100) as f32) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popm_breakpoints_round_trip_exactly() {
        for (byte, _) in POPM_BREAKPOINTS {
            let rating = popm_to_rating(byte);
            assert_eq!(rating_to_popm(rating), byte, "breakpoint {byte} didn't round-trip");
        }
    }

    #[test]
    fn popm_round_trip_stays_within_one() {
        for p in 0u8..=255 {
            let rating = popm_to_rating(p);
            let back = rating_to_popm(rating);
            let diff = (back as i16 - p as i16).abs();
            assert!(diff <= 1, "popm {p} round-tripped to {back} (diff {diff})");
        }
    }

    #[test]
    fn popm_midpoint_interpolates_linearly() {
        // Halfway between byte 0 (0.0) and byte 1 (0.004) in byte terms is
        // not meaningful (adjacent integers), so check the 64->128 segment.
        let mid = popm_to_rating(96);
        assert!((mid - 0.375).abs() < 1e-6);
    }

    #[test]
    fn star_scales_round_trip() {
        assert_eq!(rating_to_stars5(stars5_to_rating(4)), 4);
        assert_eq!(rating_to_stars10(stars10_to_rating(7)), 7);
        assert_eq!(rating_to_percent(percent_to_rating(42)), 42);
    }
}
