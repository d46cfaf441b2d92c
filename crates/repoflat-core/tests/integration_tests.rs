//! Integration tests for repoflat-core.
//!
//! These tests verify end-to-end workflows with real archives, a real
//! output tree and an on-disk provenance database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use repoflat_core::filter::EntryFilter;
use repoflat_core::filter::FilterRule;
use repoflat_core::test_utils::ZipTestBuilder;
use repoflat_core::test_utils::write_test_zip;
use repoflat_core::{
    BatchConfig, BatchRunner, FlattenError, ProvenanceStore, RepoIndex, UnpackConfig, derive_key,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Collects `bucket/key -> bytes` for every file under `root`.
fn flat_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    if !root.exists() {
        return files;
    }
    for bucket in fs::read_dir(root).unwrap() {
        let bucket = bucket.unwrap();
        assert!(bucket.file_type().unwrap().is_dir(), "only buckets at the root");
        for file in fs::read_dir(bucket.path()).unwrap() {
            let file = file.unwrap();
            assert!(file.file_type().unwrap().is_file(), "buckets are flat");
            let name = format!(
                "{}/{}",
                bucket.file_name().to_string_lossy(),
                file.file_name().to_string_lossy()
            );
            files.insert(name, fs::read(file.path()).unwrap());
        }
    }
    files
}

fn txt_config(limit: u64) -> UnpackConfig {
    UnpackConfig {
        filter: EntryFilter::new().with_rule(FilterRule::include(r"\.txt$").unwrap()),
        max_file_size: limit,
        ..Default::default()
    }
}

fn provenance_config(temp: &TempDir, index_text: &str, unpack: UnpackConfig) -> BatchConfig {
    let index = temp.path().join("repos.lst");
    fs::write(&index, index_text).unwrap();
    BatchConfig {
        dest_root: temp.path().join("flat"),
        unpack,
        repo_index: Some(index),
        provenance_db: Some(temp.path().join("srcmap.db")),
    }
}

const MAIN_TXT: &[u8] = b"public class Main { /* forty bytes */ }\n";

#[test]
fn test_abc123_scenario() {
    let temp = TempDir::new().unwrap();
    assert_eq!(MAIN_TXT.len(), 40);
    let archive = write_test_zip(
        temp.path(),
        "abc123.zip",
        &[
            ("proj-abc123/src/Main.txt", MAIN_TXT),
            ("proj-abc123/.git/config", b"[core]\n\tbare = false"),
        ],
    );

    let config = provenance_config(&temp, "org/proj main abc123\n", txt_config(1000));
    let mut runner = BatchRunner::new(config).unwrap();
    let report = runner.run([&archive]);
    runner.finish().unwrap();

    let summary = report.archives[0].summary();
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.skipped, 1);

    let key = derive_key("src/Main.txt");
    assert!(key.ends_with("_Main.txt"));
    let written = temp.path().join("flat/proj-abc123").join(&key);
    assert_eq!(fs::read(&written).unwrap(), MAIN_TXT);

    let store = ProvenanceStore::open(temp.path().join("srcmap.db")).unwrap();
    let rows = store.lookup(&format!("proj-abc123/{key}")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].repository, "org/proj");
    assert_eq!(rows[0].branch, "main");
    assert_eq!(rows[0].commit_id, "abc123");
    assert_eq!(rows[0].original_path, "src/Main.txt");
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_unknown_commit_skips_only_that_archive() {
    let temp = TempDir::new().unwrap();
    let unknown = write_test_zip(
        temp.path(),
        "abc123.zip",
        &[("proj-abc123/src/Main.txt", MAIN_TXT)],
    );
    let known = write_test_zip(
        temp.path(),
        "def456.zip",
        &[("lib-def456/README.txt", b"readme")],
    );

    let config = provenance_config(&temp, "org/lib main def456\n", txt_config(1000));
    let mut runner = BatchRunner::new(config).unwrap();
    let report = runner.run([&unknown, &known]);
    runner.finish().unwrap();

    assert!(matches!(
        report.archives[0].error(),
        Some(FlattenError::UnknownCommit { commit_id }) if commit_id == "abc123"
    ));
    assert_eq!(report.archives[0].summary().extracted, 0);
    assert!(!temp.path().join("flat/proj-abc123").exists());

    assert_eq!(report.archives[1].summary().extracted, 1);
    let store = ProvenanceStore::open(temp.path().join("srcmap.db")).unwrap();
    let rows = store.records().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].commit_id, "def456");
}

#[test]
fn test_oversized_entry_is_skipped_and_batch_continues() {
    let temp = TempDir::new().unwrap();
    let mixed = write_test_zip(
        temp.path(),
        "aaa111.zip",
        &[
            ("p-aaa111/big.txt", &[b'x'; 2048]),
            ("p-aaa111/small.txt", b"small"),
        ],
    );
    let next = write_test_zip(temp.path(), "bbb222.zip", &[("p-bbb222/n.txt", b"next")]);

    let mut config = BatchConfig::new(temp.path().join("flat"));
    config.unpack = txt_config(1024);
    let mut runner = BatchRunner::new(config).unwrap();
    let report = runner.run([&mixed, &next]);

    let first = report.archives[0].summary();
    assert_eq!(first.attempted, 2);
    assert_eq!(first.extracted, 1);
    assert_eq!(first.skipped, 1);
    assert_eq!(report.archives[1].summary().extracted, 1);

    let tree = flat_tree(&temp.path().join("flat"));
    assert_eq!(tree.len(), 2);
    assert!(!tree.contains_key(&format!("p-aaa111/{}", derive_key("big.txt"))));
}

#[test]
fn test_rerun_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let archive = ZipTestBuilder::new()
        .add_directory("proj-c0ffee/")
        .add_file("proj-c0ffee/src/a/Main.txt", b"first")
        .add_file("proj-c0ffee/src/b/Main.txt", b"second")
        .add_deflated_file("proj-c0ffee/docs/notes.txt", &[b'n'; 10_000])
        .write_to(temp.path(), "c0ffee.zip");

    let dest = temp.path().join("flat");
    let mut config = BatchConfig::new(&dest);
    config.unpack = txt_config(1024 * 1024);

    let mut runner = BatchRunner::new(config.clone()).unwrap();
    runner.run([&archive]);
    let first = flat_tree(&dest);

    let mut runner = BatchRunner::new(config).unwrap();
    runner.run([&archive]);
    let second = flat_tree(&dest);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(
        second[&format!("proj-c0ffee/{}", derive_key("docs/notes.txt"))].len(),
        10_000
    );
}

#[test]
fn test_provenance_completeness() {
    let temp = TempDir::new().unwrap();
    let a = ZipTestBuilder::new()
        .add_file("alpha-111aaa/src/One.txt", b"1")
        .add_file("alpha-111aaa/src/deep/nested/Two.txt", b"2")
        .add_file("alpha-111aaa/src/Skip.rs", b"not text")
        .add_file("alpha-111aaa/.github/ci.txt", b"hidden")
        .add_symlink("alpha-111aaa/src/link.txt", "One.txt")
        .write_to(temp.path(), "111aaa.zip");
    let b = write_test_zip(
        temp.path(),
        "222bbb.zip",
        &[("beta-222bbb/x y.txt", b"spaced"), ("beta-222bbb/é.txt", b"accent")],
    );

    let config = provenance_config(
        &temp,
        "org alpha main 111aaa\norg/beta dev 222bbb\n",
        txt_config(1000),
    );
    let mut runner = BatchRunner::new(config).unwrap();
    let report = runner.run([&a, &b]);
    runner.finish().unwrap();
    assert_eq!(report.archives_failed(), 0);

    let tree = flat_tree(&temp.path().join("flat"));
    let store = ProvenanceStore::open(temp.path().join("srcmap.db")).unwrap();
    let rows = store.records().unwrap();

    assert_eq!(tree.len(), 4);
    assert_eq!(rows.len(), tree.len());
    for name in tree.keys() {
        assert_eq!(store.lookup(name).unwrap().len(), 1, "row for {name}");
    }
    for row in &rows {
        assert!(tree.contains_key(&row.flat_name), "file for {}", row.flat_name);
        let bucket = row.flat_name.split('/').next().unwrap();
        assert_eq!(row.flat_name, format!("{bucket}/{}", derive_key(&row.original_path)));
    }

    let alpha: Vec<_> = rows.iter().filter(|r| r.commit_id == "111aaa").collect();
    assert_eq!(alpha.len(), 2);
    assert!(alpha.iter().all(|r| r.repository == "org/alpha" && r.branch == "main"));
}

#[test]
fn test_corrupt_archive_between_good_ones() {
    let temp = TempDir::new().unwrap();
    let first = write_test_zip(temp.path(), "111aaa.zip", &[("a-111aaa/1.txt", b"1")]);
    let corrupt = temp.path().join("222bbb.zip");
    fs::write(&corrupt, b"PK\x03\x04 truncated").unwrap();
    let last = write_test_zip(temp.path(), "333ccc.zip", &[("c-333ccc/3.txt", b"3")]);

    let config = provenance_config(
        &temp,
        "org/a main 111aaa\norg/b main 222bbb\norg/c main 333ccc\n",
        txt_config(1000),
    );
    let mut runner = BatchRunner::new(config).unwrap();
    let report = runner.run([&first, &corrupt, &last]);
    runner.finish().unwrap();

    assert_eq!(report.archives_failed(), 1);
    assert!(matches!(
        report.archives[1].error(),
        Some(FlattenError::InvalidArchive { .. })
    ));
    assert_eq!(report.totals().extracted, 2);

    let store = ProvenanceStore::open(temp.path().join("srcmap.db")).unwrap();
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn test_store_reused_across_runs() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "abc123.zip", &[("p/a.txt", b"a")]);

    for _ in 0..2 {
        let config = provenance_config(&temp, "org/proj main abc123\n", txt_config(1000));
        let mut runner = BatchRunner::new(config).unwrap();
        runner.run([&archive]);
        runner.finish().unwrap();
    }

    // Append-only: a re-run overwrites the file and adds a second row.
    let store = ProvenanceStore::open(temp.path().join("srcmap.db")).unwrap();
    let rows = store.lookup(&format!("p/{}", derive_key("a.txt"))).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(flat_tree(&temp.path().join("flat")).len(), 1);
}

#[test]
fn test_exclude_then_include_rules() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(
        temp.path(),
        "abc123.zip",
        &[
            ("p/src/main/App.java", b"app"),
            ("p/src/test/AppTest.java", b"test"),
            ("p/build.gradle", b"gradle"),
        ],
    );

    let mut config = BatchConfig::new(temp.path().join("flat"));
    config.unpack.filter = EntryFilter::new()
        .with_rule(FilterRule::exclude("/test/").unwrap())
        .with_rule(FilterRule::include(r"\.java$").unwrap());
    let report = repoflat_core::run_batch(&[archive], config).unwrap();

    let summary = report.archives[0].summary();
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.skipped, 2);
    let tree = flat_tree(&temp.path().join("flat"));
    let names: Vec<&String> = tree.keys().collect();
    assert_eq!(names, vec![&format!("p/{}", derive_key("src/main/App.java"))]);
}

#[test]
fn test_run_batch_rejects_half_provenance() {
    let temp = TempDir::new().unwrap();
    let mut config = BatchConfig::new(temp.path().join("flat"));
    config.repo_index = Some(PathBuf::from("repos.lst"));

    let archives: [&Path; 0] = [];
    let err = repoflat_core::run_batch(&archives, config).unwrap_err();
    assert!(err.is_fatal());
    assert!(!temp.path().join("flat").exists());
}
