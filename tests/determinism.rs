use neardup::{
    run_pipeline, shingle_text, write_csv_report, IngestError, MinHashConfig, MinHasher,
    NearDupConfig, RawRecord, ShingleConfig,
};

fn records() -> Vec<RawRecord> {
    let bodies = [
        "shipping is free on all orders above fifty dollars this week only",
        "Shipping is FREE on all orders above fifty dollars this week only",
        "shipping is free on all orders above sixty dollars this week only",
        "the meeting moved to thursday afternoon in the large conference room",
        "the meeting moved to thursday afternoon in the small conference room",
        "completely unrelated note about watering the office plants daily",
    ];
    (0..40)
        .map(|i| RawRecord::new(format!("r{i}"), bodies[(i * 7) % bodies.len()]))
        .collect()
}

fn csv_for(cfg: &NearDupConfig) -> String {
    let input: Vec<Result<RawRecord, IngestError>> = records().into_iter().map(Ok).collect();
    let report = run_pipeline(input, cfg).expect("pipeline");
    let mut out = Vec::new();
    write_csv_report(&report, &mut out).expect("csv");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let cfg = NearDupConfig::default();
    assert_eq!(csv_for(&cfg), csv_for(&cfg));
}

#[test]
fn parallelism_settings_do_not_change_the_report() {
    let parallel = NearDupConfig::default();

    let mut serial = NearDupConfig::default();
    serial.ingest.use_parallel = false;
    serial.ingest.batch_size = 1;
    serial.minhash.use_parallel = false;
    serial.cluster.signature_batch = 1;

    assert_eq!(csv_for(&parallel), csv_for(&serial));
}

#[test]
fn signatures_depend_only_on_seed_and_shingles() {
    let shingles = shingle_text(
        "the meeting moved to thursday afternoon",
        &ShingleConfig::default(),
    );
    let a = MinHasher::new(&MinHashConfig::default()).unwrap();
    let b = MinHasher::new(&MinHashConfig::default().with_parallel(false)).unwrap();
    let c = MinHasher::new(&MinHashConfig::default().with_seed(72)).unwrap();

    assert_eq!(a.signature(&shingles), b.signature(&shingles));
    assert_ne!(a.signature(&shingles), c.signature(&shingles));
}
