use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use stampname_core::error::MetadataError;
use stampname_core::media::MediaKind;
use stampname_core::reader::{
    MetadataReader, TagMap, TAG_CREATION_TIME, TAG_DATE, TAG_DATE_TIME_ORIGINAL, TAG_TIME_OF_DAY,
};
use stampname_core::writer::DryRun;
use stampname_core::{
    process, process_with_effector, ConflictChooser, Error, PolicyKind, ProcessOptions,
    TimestampToken,
};
use tempfile::tempdir;

/// Tags keyed by the file name the reader is asked about.
#[derive(Default)]
struct FakeReader(HashMap<String, TagMap>);

impl FakeReader {
    fn with(mut self, file: &str, tags: &[(&str, &str)]) -> Self {
        self.0.insert(
            file.to_string(),
            tags.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

impl MetadataReader for FakeReader {
    fn read_tags(&self, path: &Path, _kind: MediaKind) -> Result<TagMap, MetadataError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.0.get(name).cloned().ok_or(MetadataError::Unsupported)
    }
}

struct Always(&'static str);

impl ConflictChooser for Always {
    fn ask(
        &mut self,
        _file: &str,
        _name: &TimestampToken,
        _metadata: &TimestampToken,
    ) -> Result<String, Error> {
        Ok(self.0.to_string())
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        File::create(dir.join(name)).unwrap();
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn live(dir: &Path) -> ProcessOptions {
    let mut options = ProcessOptions::new(dir);
    options.rename = true;
    options
}

#[test]
fn prefixed_name_agreeing_with_exif() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg"]);
    let reader = FakeReader::default().with(
        "IMG_20230401_153000.jpg",
        &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")],
    );

    let result = process(&live(dir.path()), &reader, None).unwrap();

    assert_eq!(result.files_renamed, 1);
    assert_eq!(names_in(dir.path()), vec!["2023-04-01 15-30-00.jpg"]);
}

#[test]
fn collision_with_description_promotes_first_file() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["a.jpg", "b.jpg"]);
    let reader = FakeReader::default()
        .with("a.jpg", &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")])
        .with("b.jpg", &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")]);

    let mut options = live(dir.path());
    options.description = "beach".to_string();
    let result = process(&options, &reader, None).unwrap();

    assert_eq!(result.promotions, 1);
    assert_eq!(
        names_in(dir.path()),
        vec![
            "2023-04-01 15-30-00 00 beach.jpg",
            "2023-04-01 15-30-00 01 beach.jpg",
        ]
    );
}

#[test]
fn whatsapp_without_metadata_keeps_partial_stamp() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG-20230401-WA0007.jpg"]);

    process(&live(dir.path()), &FakeReader::default(), None).unwrap();

    assert_eq!(names_in(dir.path()), vec!["2023-04-01 WA0007.jpg"]);
}

#[test]
fn canonical_file_is_untouched() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["2023-04-01 15-30-00.jpg"]);

    let result = process(&live(dir.path()), &FakeReader::default(), None).unwrap();

    assert_eq!(result.files_skipped, 1);
    assert!(result.plan.ops.is_empty());
    assert_eq!(names_in(dir.path()), vec!["2023-04-01 15-30-00.jpg"]);
}

#[test]
fn second_run_renames_nothing() {
    let dir = tempdir().unwrap();
    touch(
        dir.path(),
        &[
            "20230401_153000.jpg",
            "IMG_20230401_153000.jpg",
            "VID_20230401_153000.mp4",
            "clip.avi",
            "IMG-20230402-WA0001.jpg",
            "2019-06-01 10.00.00.jpg",
        ],
    );
    let reader = FakeReader::default()
        .with(
            "VID_20230401_153000.mp4",
            &[(TAG_CREATION_TIME, "2023-04-01T15:30:00.000000Z")],
        )
        .with(
            "clip.avi",
            &[(TAG_DATE, "2023-04-01"), (TAG_TIME_OF_DAY, "15:30:00")],
        );

    let first = process(&live(dir.path()), &reader, None).unwrap();
    assert_eq!(first.files_renamed, 6);
    assert_eq!(
        names_in(dir.path()),
        vec![
            "2019-06-01 10-00-00.jpg",
            "2023-04-01 15-30-00 00.jpg",
            "2023-04-01 15-30-00 01.jpg",
            "2023-04-01 15-30-00.avi",
            "2023-04-01 15-30-00.mp4",
            "2023-04-02 WA0001.jpg",
        ]
    );

    let second = process(&live(dir.path()), &FakeReader::default(), None).unwrap();
    assert!(second.plan.ops.is_empty());
    assert_eq!(second.files_skipped, 6);
}

#[test]
fn dry_run_reports_the_live_sequence() {
    let setup = |dir: &Path| touch(dir, &["a.jpg", "b.jpg", "c.jpg"]);
    let reader = FakeReader::default()
        .with("a.jpg", &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")])
        .with("b.jpg", &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")])
        .with("c.jpg", &[(TAG_DATE_TIME_ORIGINAL, "2023:04:01 15:30:00")]);

    let dry_dir = tempdir().unwrap();
    setup(dry_dir.path());
    let mut dry = DryRun::default();
    let dry_result =
        process_with_effector(&ProcessOptions::new(dry_dir.path()), &reader, None, &mut dry)
            .unwrap();
    assert_eq!(names_in(dry_dir.path()), vec!["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(dry.renames.len(), 4);

    let live_dir = tempdir().unwrap();
    setup(live_dir.path());
    let live_result = process(&live(live_dir.path()), &reader, None).unwrap();

    assert_eq!(dry_result.plan.ops, live_result.plan.ops);
    assert_eq!(
        names_in(live_dir.path()),
        vec![
            "2023-04-01 15-30-00 00.jpg",
            "2023-04-01 15-30-00 01.jpg",
            "2023-04-01 15-30-00 02.jpg",
        ]
    );
}

#[test]
fn conflict_policies_pick_different_sources() {
    let reader = FakeReader::default().with(
        "IMG_20230401_153000.jpg",
        &[(TAG_DATE_TIME_ORIGINAL, "2020:01:01 08:00:00")],
    );

    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg"]);
    let result = process(&live(dir.path()), &reader, None).unwrap();
    assert_eq!(result.conflicts, 1);
    assert_eq!(names_in(dir.path()), vec!["2020-01-01 08-00-00.jpg"]);

    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg"]);
    let mut options = live(dir.path());
    options.policy = PolicyKind::PreferName;
    process(&options, &reader, None).unwrap();
    assert_eq!(names_in(dir.path()), vec!["2023-04-01 15-30-00.jpg"]);

    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg"]);
    let mut options = live(dir.path());
    options.policy = PolicyKind::Interactive;
    let mut chooser = Always("2");
    process(&options, &reader, Some(&mut chooser)).unwrap();
    assert_eq!(names_in(dir.path()), vec!["2023-04-01 15-30-00.jpg"]);
}

#[test]
fn interactive_without_chooser_is_rejected() {
    let dir = tempdir().unwrap();
    let mut options = live(dir.path());
    options.policy = PolicyKind::Interactive;
    assert!(process(&options, &FakeReader::default(), None).is_err());
}

#[test]
fn undatable_first_file_aborts_before_any_rename() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["DSC00042.jpg", "IMG_20230401_153000.jpg"]);

    let err = process(&live(dir.path()), &FakeReader::default(), None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::NoTimestamp { file }) if file == "DSC00042.jpg"
    ));
    assert_eq!(
        names_in(dir.path()),
        vec!["DSC00042.jpg", "IMG_20230401_153000.jpg"]
    );
}

#[test]
fn undatable_later_file_takes_previous_plus_one_second() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153059.jpg", "b_holiday.jpg"]);

    let result = process(&live(dir.path()), &FakeReader::default(), None).unwrap();

    assert_eq!(result.fallbacks, 1);
    assert_eq!(
        names_in(dir.path()),
        vec!["2023-04-01 15-30-59.jpg", "2023-04-01 15-31-00.jpg"]
    );
}

#[test]
fn unrecognized_file_aborts_the_run() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg", "notes.txt"]);

    let err = process(&live(dir.path()), &FakeReader::default(), None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnrecognizedKind { .. })
    ));
    assert_eq!(
        names_in(dir.path()),
        vec!["IMG_20230401_153000.jpg", "notes.txt"]
    );
}

#[test]
fn strict_mode_uses_underscores() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["20230401_153000.jpg", "IMG_20230401_153000.jpg"]);

    let mut options = live(dir.path());
    options.strict = true;
    options.description = "beach".to_string();
    process(&options, &FakeReader::default(), None).unwrap();

    assert_eq!(
        names_in(dir.path()),
        vec![
            "2023-04-01_15-30-00_00_beach.jpg",
            "2023-04-01_15-30-00_01_beach.jpg",
        ]
    );

    let mut bad = live(dir.path());
    bad.strict = true;
    bad.description = "beach day".to_string();
    assert!(process(&bad, &FakeReader::default(), None).is_err());
}

#[test]
fn report_is_written() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.jpg"]);

    let mut options = ProcessOptions::new(dir.path());
    options.report = Some(out.path().join("report.json"));
    process(&options, &FakeReader::default(), None).unwrap();

    let value: serde_json::Value =
        serde_json::from_reader(File::open(out.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(value["live"], false);
    assert_eq!(value["files"][0]["original"], "IMG_20230401_153000.jpg");
    assert_eq!(value["files"][0]["final_name"], "2023-04-01 15-30-00.jpg");
}

#[test]
fn mixed_case_extensions_share_counters() {
    let dir = tempdir().unwrap();
    touch(dir.path(), &["IMG_20230401_153000.JPG", "VID_20230401_153000.jpg"]);

    let result = process(&live(dir.path()), &FakeReader::default(), None).unwrap();

    assert_eq!(result.promotions, 1);
    assert_eq!(
        names_in(dir.path()),
        vec!["2023-04-01 15-30-00 00.JPG", "2023-04-01 15-30-00 01.jpg"]
    );
}

#[test]
fn report_follows_promotion_of_already_named_file() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    touch(dir.path(), &["2023-04-01 15-30-00.jpg", "IMG_20230401_153000.jpg"]);

    let mut options = live(dir.path());
    options.report = Some(out.path().join("report.json"));
    process(&options, &FakeReader::default(), None).unwrap();

    let value: serde_json::Value =
        serde_json::from_reader(File::open(out.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(value["files"][0]["original"], "2023-04-01 15-30-00.jpg");
    assert_eq!(value["files"][0]["final_name"], "2023-04-01 15-30-00 00.jpg");
    assert_eq!(value["files"][1]["final_name"], "2023-04-01 15-30-00 01.jpg");
    assert_eq!(
        names_in(dir.path()),
        vec!["2023-04-01 15-30-00 00.jpg", "2023-04-01 15-30-00 01.jpg"]
    );
}
