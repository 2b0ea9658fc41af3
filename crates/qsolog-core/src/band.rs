//! Amateur band plan lookup.
//!
//! Maps a frequency in MHz to the band name used in logbooks. Ranges are
//! inclusive on both ends. Frequencies outside every range map to
//! [`UNKNOWN_BAND`].

/// Band name returned when no range matches.
pub const UNKNOWN_BAND: &str = "Unknown";

/// `(low MHz, high MHz, band)`, ascending.
const BAND_PLAN: &[(f64, f64, &str)] = &[
    (1.8, 2.0, "160m"),
    (3.5, 4.0, "80m"),
    (5.3, 5.4, "60m"),
    (7.0, 7.3, "40m"),
    (10.1, 10.15, "30m"),
    (14.0, 14.35, "20m"),
    (18.068, 18.168, "17m"),
    (21.0, 21.45, "15m"),
    (24.89, 24.99, "12m"),
    (28.0, 29.7, "10m"),
    (50.0, 54.0, "6m"),
    (144.0, 148.0, "2m"),
    (420.0, 450.0, "70cm"),
];

/// Return the band containing `mhz`, or [`UNKNOWN_BAND`].
pub fn band_for_frequency(mhz: f64) -> &'static str {
    BAND_PLAN
        .iter()
        .find(|(low, high, _)| mhz >= *low && mhz <= *high)
        .map(|(_, _, band)| *band)
        .unwrap_or(UNKNOWN_BAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_hf_frequencies() {
        assert_eq!(band_for_frequency(14.205), "20m");
        assert_eq!(band_for_frequency(7.074), "40m");
        assert_eq!(band_for_frequency(3.573), "80m");
        assert_eq!(band_for_frequency(28.4), "10m");
        assert_eq!(band_for_frequency(18.1), "17m");
    }

    #[test]
    fn test_range_edges_are_inclusive() {
        assert_eq!(band_for_frequency(14.0), "20m");
        assert_eq!(band_for_frequency(14.35), "20m");
        assert_eq!(band_for_frequency(1.8), "160m");
        assert_eq!(band_for_frequency(450.0), "70cm");
    }

    #[test]
    fn test_out_of_band_is_unknown() {
        assert_eq!(band_for_frequency(123.45), UNKNOWN_BAND);
        assert_eq!(band_for_frequency(14.36), UNKNOWN_BAND);
        assert_eq!(band_for_frequency(0.0), UNKNOWN_BAND);
    }

    #[test]
    fn test_plan_is_sorted_and_disjoint() {
        for pair in BAND_PLAN.windows(2) {
            assert!(pair[0].0 <= pair[0].1);
            assert!(pair[0].1 < pair[1].0, "{} overlaps {}", pair[0].2, pair[1].2);
        }
    }
}
