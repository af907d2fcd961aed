//! Brightness quantization
//!
//! Cell brightness is reduced from 256 levels to 32 by rounding to the
//! nearest multiple of [`QUANTIZATION_STEP`]. The top level rounds to 256,
//! which is clamped to 255, so the full set of levels a quantized grid can
//! contain is `0, 8, ..., 248, 255`.

/// Step between adjacent quantized brightness levels
pub const QUANTIZATION_STEP: i64 = 8;

/// Round a brightness value to the nearest multiple of 8, ties upward,
/// clamped to `[0, 255]`.
///
/// # Examples
/// ```
/// use mosaic_sheets_core::round_to_multiple_of_8;
///
/// assert_eq!(round_to_multiple_of_8(128), 128);
/// assert_eq!(round_to_multiple_of_8(4), 8);
/// assert_eq!(round_to_multiple_of_8(260), 255);
/// assert_eq!(round_to_multiple_of_8(-5), 0);
/// ```
pub fn round_to_multiple_of_8(value: i64) -> u8 {
    let half = QUANTIZATION_STEP / 2;
    let rounded = (value + half).div_euclid(QUANTIZATION_STEP) * QUANTIZATION_STEP;
    rounded.clamp(0, u8::MAX as i64) as u8
}

/// All levels [`round_to_multiple_of_8`] can produce, ascending.
pub fn quantized_levels() -> Vec<u8> {
    let mut levels: Vec<u8> = (0..=u8::MAX as i64)
        .step_by(QUANTIZATION_STEP as usize)
        .map(|v| v as u8)
        .collect();
    if levels.last() != Some(&u8::MAX) {
        levels.push(u8::MAX);
    }
    levels
}

/// Whether `value` is one of the [`quantized_levels`]
pub fn is_quantized(value: u8) -> bool {
    value == u8::MAX || value as i64 % QUANTIZATION_STEP == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_examples() {
        assert_eq!(round_to_multiple_of_8(0), 0);
        assert_eq!(round_to_multiple_of_8(3), 0);
        assert_eq!(round_to_multiple_of_8(4), 8); // tie rounds up
        assert_eq!(round_to_multiple_of_8(11), 8);
        assert_eq!(round_to_multiple_of_8(12), 16);
        assert_eq!(round_to_multiple_of_8(251), 248);
        assert_eq!(round_to_multiple_of_8(252), 255); // 256 clamped
        assert_eq!(round_to_multiple_of_8(255), 255);
        assert_eq!(round_to_multiple_of_8(260), 255);
        assert_eq!(round_to_multiple_of_8(-5), 0);
        assert_eq!(round_to_multiple_of_8(-4), 0);
    }

    #[test]
    fn test_levels() {
        let levels = quantized_levels();
        assert_eq!(levels.len(), 33);
        assert_eq!(levels.first(), Some(&0));
        assert_eq!(levels[31], 248);
        assert_eq!(levels.last(), Some(&255));
        assert!(levels.iter().all(|&v| is_quantized(v)));
        assert!(!is_quantized(4));
    }

    proptest! {
        #[test]
        fn rounding_lands_on_a_level(v in -1000i64..1000) {
            let q = round_to_multiple_of_8(v);
            prop_assert!(is_quantized(q));
        }

        #[test]
        fn rounding_picks_nearest_multiple(v in 0i64..252) {
            let q = round_to_multiple_of_8(v) as i64;
            prop_assert!((q - v).abs() <= 4);
        }
    }
}
