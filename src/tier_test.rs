use super::*;

#[test]
fn boundaries() {
    assert_eq!(ThreatTier::from_score(0.0), ThreatTier::Low);
    assert_eq!(ThreatTier::from_score(0.399_999), ThreatTier::Low);
    assert_eq!(ThreatTier::from_score(0.4), ThreatTier::Medium);
    assert_eq!(ThreatTier::from_score(0.699_999), ThreatTier::Medium);
    assert_eq!(ThreatTier::from_score(0.7), ThreatTier::High);
    assert_eq!(ThreatTier::from_score(1.0), ThreatTier::High);
}

#[test]
fn monotonic_over_unit_interval() {
    let mut previous = ThreatTier::Low;
    for step in 0..=1000 {
        let tier = ThreatTier::from_score(f64::from(step) / 1000.0);
        assert!(tier >= previous, "tier dropped at step {step}");
        previous = tier;
    }
}

#[test]
fn high_iff_at_least_point_seven() {
    for step in 0..=100 {
        let score = f64::from(step) / 100.0;
        assert_eq!(ThreatTier::from_score(score) == ThreatTier::High, score >= 0.7, "score {score}");
    }
}

#[test]
fn nan_is_low() {
    assert_eq!(ThreatTier::from_score(f64::NAN), ThreatTier::Low);
}

#[test]
fn labels() {
    assert_eq!(ThreatTier::High.to_string(), "high");
    assert_eq!(ThreatTier::Medium.label(), "medium");
    assert_eq!(ThreatTier::Low.label(), "low");
}

#[test]
fn format_percent_one_decimal() {
    assert_eq!(format_percent(0.125), "12.5%");
    assert_eq!(format_percent(0.8), "80.0%");
    assert_eq!(format_percent(0.0), "0.0%");
    assert_eq!(format_percent(1.0), "100.0%");
}
