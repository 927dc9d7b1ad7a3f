//! Clock-time parsing at the boundary.

use medminder_domain::{ClockTime, MedMinderError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn in_range_times_parse_with_or_without_padding(hour in 0u8..24, minute in 0u8..60) {
        let unpadded: ClockTime = format!("{hour}:{minute:02}").parse().unwrap();
        let padded: ClockTime = format!("{hour:02}:{minute:02}").parse().unwrap();

        prop_assert_eq!(unpadded, padded);
        prop_assert_eq!(padded.minutes_of_day(), u32::from(hour) * 60 + u32::from(minute));
        prop_assert_eq!(padded.to_string(), format!("{hour:02}:{minute:02}"));
    }

    #[test]
    fn out_of_range_hours_are_invalid_input(hour in 24u8..100, minute in 0u8..60) {
        let parsed = format!("{hour}:{minute:02}").parse::<ClockTime>();
        prop_assert!(matches!(parsed, Err(MedMinderError::InvalidInput(_))));
    }
}

#[test]
fn single_digit_minutes_are_rejected() {
    assert!("7:5".parse::<ClockTime>().is_err());
    assert!("07".parse::<ClockTime>().is_err());
    assert!("".parse::<ClockTime>().is_err());
}
