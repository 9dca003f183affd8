use super::*;

#[test]
fn timestamp_arithmetic_saturates() {
    let t = Timestamp(u64::MAX - 1);
    assert_eq!(t + Millis(10), Timestamp(u64::MAX));
    assert_eq!(Timestamp(5) - Timestamp(9), Millis::ZERO);
    assert_eq!(Timestamp(3000) - Timestamp(1000), Millis(2000));
}

#[test]
fn host_readings_clamp_and_floor() {
    assert_eq!(Timestamp::from_f64_ms(-4.0), Timestamp::ZERO);
    assert_eq!(Timestamp::from_f64_ms(f64::NAN), Timestamp::ZERO);
    assert_eq!(Timestamp::from_f64_ms(1234.9), Timestamp(1234));
}

#[test]
fn viewport_rounds_to_pixels() {
    let v = Viewport::from_f64(1279.6, 719.2);
    assert_eq!(
        v,
        Viewport {
            width: 1280,
            height: 719
        }
    );
    assert_eq!(Viewport::from_f64(-1.0, f64::INFINITY).width, 0);
}

#[test]
fn millis_serializes_as_plain_number() {
    let s = serde_json::to_string(&Millis::from_secs(3)).unwrap();
    assert_eq!(s, "3000");
}

#[test]
fn millis_from_huge_seconds_saturates() {
    assert_eq!(Millis::from_secs(u64::MAX), Millis(u64::MAX));
    assert_eq!(Millis::from_secs(u64::MAX / 1000 + 1), Millis(u64::MAX));
}
