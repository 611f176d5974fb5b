//! Whole-run scenarios over real files in temporary directories.

use std::path::Path;
use std::sync::Arc;

use histmap_core::{IssueType, LogLevel, MemoryLogger, RunId, Year, YearIndex};
use histmap_crypto::TileNameTemplate;
use histmap_pipeline::{
    generate_report, prepare_tile, run_pipeline, run_validate_for_year, ErrorPolicy,
    PipelineConfig, YearConfig, INDEX_FILENAME, PUBLISH_STAGE, REPORT_FILENAME,
};
use serde_json::{json, Value};

fn square_feature(name: Option<&str>, x: f64, closed: bool) -> Value {
    let mut ring = vec![json!([x, 0.0]), json!([x + 1.0, 0.0]), json!([x + 1.0, 1.0]), json!([x, 1.0])];
    if closed {
        ring.push(json!([x, 0.0]));
    }
    let properties = match name {
        Some(n) => json!({"NAME": n}),
        None => json!({}),
    };
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {"type": "Polygon", "coordinates": [ring]}
    })
}

fn collection(features: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({"type": "FeatureCollection", "features": features})).unwrap()
}

fn clean_year(count: usize) -> Vec<u8> {
    collection(
        (0..count)
            .map(|i| square_feature(Some(&format!("T{i}")), i as f64 * 3.0, true))
            .collect(),
    )
}

struct Fixture {
    _dir: tempfile::TempDir,
    config: PipelineConfig,
}

impl Fixture {
    fn new(policy: ErrorPolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            tiles_dir: dir.path().join("tiles"),
            geojson_dir: dir.path().join("merged"),
            output_dir: dir.path().join("public"),
            error_policy: policy,
            concurrency: 2,
            ..PipelineConfig::default()
        };
        std::fs::create_dir_all(&config.tiles_dir).unwrap();
        std::fs::create_dir_all(&config.geojson_dir).unwrap();
        Self { _dir: dir, config }
    }

    fn add_year(&mut self, year: i32, tiles: &[u8], geojson: &[u8]) {
        let year = Year::new(year);
        std::fs::write(self.config.tile_path(year), tiles).unwrap();
        std::fs::write(self.config.geojson_path(year), geojson).unwrap();
        self.config.years.push(YearConfig {
            year,
            countries: Vec::new(),
        });
    }

    fn read_index(&self) -> YearIndex {
        let bytes = std::fs::read(self.config.output_dir.join(INDEX_FILENAME)).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn no_partials(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .unwrap()
        .all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".partial"))
}

#[tokio::test]
async fn prepare_is_idempotent_and_content_addressed() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("world_1500.pmtiles");
    let out = dir.path().join("public");
    std::fs::write(&source, b"archive v1").unwrap();
    let template = TileNameTemplate::default();

    let first = prepare_tile(Year::new(1500), &source, &out, &template).await.unwrap();
    let second = prepare_tile(Year::new(1500), &source, &out, &template).await.unwrap();
    assert_eq!(first, second);

    std::fs::write(&source, b"archive v2").unwrap();
    let changed = prepare_tile(Year::new(1500), &source, &out, &template).await.unwrap();
    assert_ne!(changed.hash, first.hash);
    assert_ne!(changed.hashed_filename, first.hashed_filename);
    assert!(out.join(&first.hashed_filename).exists());
    assert!(out.join(&changed.hashed_filename).exists());
    assert!(no_partials(&out));
}

#[tokio::test]
async fn fatal_year_is_reported_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world_1100.geojson");
    std::fs::write(
        &path,
        collection(vec![
            square_feature(Some("Song"), 0.0, true),
            square_feature(None, 3.0, true),
        ]),
    )
    .unwrap();
    let logger = MemoryLogger::new();

    let result = run_validate_for_year(Year::new(1100), &path, &logger).await.unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].issue_type, IssueType::MissingName);
    let errors = logger.lines_at(LogLevel::Error);
    assert!(errors.iter().any(|l| l.message.starts_with("MISSING_NAME: ")));

    let report = generate_report(RunId::new(), &[result]);
    assert_eq!(report.total_errors, 1);
}

#[tokio::test]
async fn repaired_year_has_one_repair_and_same_feature_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world_900.geojson");
    std::fs::write(
        &path,
        collection(vec![
            square_feature(Some("Wessex"), 0.0, false),
            square_feature(Some("Mercia"), 3.0, true),
        ]),
    )
    .unwrap();
    let logger = MemoryLogger::new();
    let result = run_validate_for_year(Year::new(900), &path, &logger).await.unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(result.feature_count, 2);
    assert_eq!(result.repairs.len(), 1);
    assert_eq!(result.repairs[0].issue_type, IssueType::UnclosedRing);
}

#[tokio::test]
async fn clean_run_publishes_index_and_report() {
    let mut fx = Fixture::new(ErrorPolicy::Halt);
    fx.add_year(1453, b"tiles 1453", &clean_year(5));
    fx.add_year(-500, b"tiles -500", &clean_year(3));
    let logger = Arc::new(MemoryLogger::new());

    let outcome = run_pipeline(&fx.config, logger.clone()).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.report.total_years, 2);
    assert_eq!(outcome.report.total_features, 8);
    // Report keeps configuration order; the index is sorted by year.
    assert_eq!(outcome.report.year_summaries[0].year, Year::new(1453));

    let index = fx.read_index();
    assert_eq!(Some(&index), outcome.index.as_ref());
    let years: Vec<i32> = index.years.iter().map(|e| e.year.value()).collect();
    assert_eq!(years, vec![-500, 1453]);
    assert!(index.years[0].filename.starts_with("world_bc500."));
    for entry in &index.years {
        assert!(fx.config.output_dir.join(&entry.filename).exists());
    }
    assert!(fx.config.output_dir.join(REPORT_FILENAME).exists());
    assert!(no_partials(&fx.config.output_dir));
    assert!(logger.lines_at(LogLevel::Error).is_empty());
}

#[tokio::test]
async fn second_run_keeps_unchanged_filenames() {
    let mut fx = Fixture::new(ErrorPolicy::Halt);
    fx.add_year(1000, b"tiles 1000", &clean_year(2));
    fx.add_year(1200, b"tiles 1200", &clean_year(2));
    let logger: Arc<MemoryLogger> = Arc::new(MemoryLogger::new());

    run_pipeline(&fx.config, logger.clone()).await.unwrap();
    let before = fx.read_index();

    std::fs::write(fx.config.tile_path(Year::new(1200)), b"tiles 1200 revised").unwrap();
    run_pipeline(&fx.config, logger).await.unwrap();
    let after = fx.read_index();

    let y1000 = Year::new(1000);
    let y1200 = Year::new(1200);
    assert_eq!(before.get(y1000).unwrap().filename, after.get(y1000).unwrap().filename);
    assert_ne!(before.get(y1200).unwrap().filename, after.get(y1200).unwrap().filename);
}

#[tokio::test]
async fn halt_policy_writes_report_but_no_index() {
    let mut fx = Fixture::new(ErrorPolicy::Halt);
    fx.add_year(1, b"tiles 1", &clean_year(1));
    fx.add_year(
        2,
        b"tiles 2",
        &collection(vec![square_feature(None, 0.0, true)]),
    );
    let logger = Arc::new(MemoryLogger::new());

    let outcome = run_pipeline(&fx.config, logger.clone()).await.unwrap();
    assert!(!outcome.is_success());
    assert!(outcome.index.is_none());
    assert_eq!(outcome.report.total_errors, 1);
    assert!(!fx.config.output_dir.join(INDEX_FILENAME).exists());
    assert!(fx.config.output_dir.join(REPORT_FILENAME).exists());
    assert!(logger
        .lines_at(LogLevel::Error)
        .iter()
        .any(|l| l.stage == "build" && l.message.contains("index not written")));
}

#[tokio::test]
async fn exclude_policy_drops_failing_years() {
    let mut fx = Fixture::new(ErrorPolicy::Exclude);
    fx.add_year(1, b"tiles 1", &clean_year(1));
    fx.add_year(2, b"tiles 2", &collection(vec![square_feature(None, 0.0, true)]));
    fx.add_year(3, b"tiles 3", &clean_year(1));
    std::fs::remove_file(fx.config.tile_path(Year::new(3))).unwrap();

    let outcome = run_pipeline(&fx.config, Arc::new(MemoryLogger::new())).await.unwrap();
    assert_eq!(outcome.excluded, vec![Year::new(2), Year::new(3)]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].year, Year::new(3));
    assert_eq!(outcome.failures[0].stage, "prepare");
    // Year 3 still validated, so it is in the report.
    assert_eq!(outcome.report.total_years, 3);

    let index = fx.read_index();
    let years: Vec<i32> = index.years.iter().map(|e| e.year.value()).collect();
    assert_eq!(years, vec![1]);
}

#[tokio::test]
async fn repaired_geojson_is_published_for_clean_years() {
    let mut fx = Fixture::new(ErrorPolicy::Halt);
    fx.add_year(
        -50,
        b"tiles -50",
        &collection(vec![square_feature(Some("Gaul"), 0.0, false)]),
    );
    let outcome = run_pipeline(&fx.config, Arc::new(MemoryLogger::new())).await.unwrap();
    assert_eq!(outcome.repaired, vec![fx.config.repaired_path(Year::new(-50))]);

    let repaired: Value =
        serde_json::from_slice(&std::fs::read(&outcome.repaired[0]).unwrap()).unwrap();
    let ring = repaired["features"][0]["geometry"]["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
}

fn block_repaired_dir(config: &PipelineConfig) {
    std::fs::create_dir_all(&config.output_dir).unwrap();
    std::fs::write(config.output_dir.join("geojson"), b"not a directory").unwrap();
}

#[tokio::test]
async fn unwritable_repaired_output_excludes_only_that_year() {
    let mut fx = Fixture::new(ErrorPolicy::Exclude);
    fx.add_year(1, b"tiles 1", &clean_year(1));
    fx.add_year(2, b"tiles 2", &collection(vec![square_feature(Some("Gaul"), 0.0, false)]));
    block_repaired_dir(&fx.config);
    let logger = Arc::new(MemoryLogger::new());

    let outcome = run_pipeline(&fx.config, logger.clone()).await.unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.excluded, vec![Year::new(2)]);
    assert!(outcome.repaired.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.year, Year::new(2));
    assert_eq!(failure.stage, PUBLISH_STAGE);
    assert_eq!(failure.error.year(), Some(Year::new(2)));
    assert!(failure.error.path().starts_with(&fx.config.output_dir));
    assert!(logger
        .lines_at(LogLevel::Error)
        .iter()
        .any(|l| l.stage == PUBLISH_STAGE && l.message.starts_with("year 2: ")));

    let index = fx.read_index();
    let years: Vec<i32> = index.years.iter().map(|e| e.year.value()).collect();
    assert_eq!(years, vec![1]);
}

#[tokio::test]
async fn unwritable_repaired_output_halts_index() {
    let mut fx = Fixture::new(ErrorPolicy::Halt);
    fx.add_year(1, b"tiles 1", &clean_year(1));
    fx.add_year(2, b"tiles 2", &collection(vec![square_feature(Some("Gaul"), 0.0, false)]));
    block_repaired_dir(&fx.config);

    let outcome = run_pipeline(&fx.config, Arc::new(MemoryLogger::new())).await.unwrap();
    assert!(outcome.index.is_none());
    assert!(outcome.excluded.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].stage, PUBLISH_STAGE);
    assert!(!fx.config.output_dir.join(INDEX_FILENAME).exists());
    assert!(fx.config.output_dir.join(REPORT_FILENAME).exists());
}

#[tokio::test]
async fn empty_run_writes_empty_index_and_zero_report() {
    let fx = Fixture::new(ErrorPolicy::Halt);
    let outcome = run_pipeline(&fx.config, Arc::new(MemoryLogger::new())).await.unwrap();
    assert_eq!(outcome.report.total_years, 0);
    assert_eq!(outcome.report.total_errors, 0);
    assert!(fx.read_index().is_empty());
}
