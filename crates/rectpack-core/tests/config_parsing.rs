use rectpack_core::config::{PruneStrategy, TrackerConfig};

#[test]
fn prune_strategy_from_str() {
    assert_eq!("sweep".parse::<PruneStrategy>(), Ok(PruneStrategy::Sweep));
    assert_eq!("Staged".parse::<PruneStrategy>(), Ok(PruneStrategy::Staged));
    assert_eq!("reference".parse::<PruneStrategy>(), Ok(PruneStrategy::Staged));
    assert!("guillotine".parse::<PruneStrategy>().is_err());
}

#[test]
fn defaults() {
    let cfg = TrackerConfig::default();
    assert_eq!(cfg.prune, PruneStrategy::Sweep);
    assert!(!cfg.verify_invariants);
    assert!(!cfg.parallel);
    assert_eq!(cfg.parallel_threshold, 256);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: TrackerConfig = serde_json::from_str(r#"{"prune":"staged"}"#).unwrap();
    assert_eq!(cfg.prune, PruneStrategy::Staged);
    assert_eq!(cfg.parallel_threshold, 256);
    assert!(!cfg.verify_invariants);
}

#[test]
fn json_round_trip() {
    let cfg = TrackerConfig::builder()
        .prune(PruneStrategy::Staged)
        .verify_invariants(true)
        .parallel(true)
        .parallel_threshold(64)
        .build();
    let s = serde_json::to_string(&cfg).unwrap();
    assert!(s.contains(r#""prune":"staged""#));
    let back: TrackerConfig = serde_json::from_str(&s).unwrap();
    assert_eq!(back, cfg);
}
