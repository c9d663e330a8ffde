//! Selecting tests by number, file name or path

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_case::test_case;

use webtest_e2e::discovery::skip_flaky;
use webtest_e2e::{E2eError, TestDiscovery};

const SUITE: &[&str] = &[
    "00-realm-creation.js",
    "01-login.js",
    "02-site.js",
    "05-settings.js",
    "10-admin.js",
    "12-drafts.js",
    "common.json",
];

fn suite() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in SUITE {
        std::fs::write(dir.path().join(name), "// test\n").unwrap();
    }
    dir
}

fn names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn selectors(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_selectors_selects_every_script_sorted() {
    let dir = suite();
    let discovery = TestDiscovery::new(dir.path(), "js");
    let files = discovery.resolve(&[]).unwrap();

    assert_eq!(
        names(&files),
        vec![
            "00-realm-creation.js",
            "01-login.js",
            "02-site.js",
            "05-settings.js",
            "10-admin.js",
            "12-drafts.js",
        ]
    );
    assert!(files.iter().all(|f| f.is_absolute()));
}

#[test_case(&["05"], &["05-settings.js"] ; "by number")]
#[test_case(&["12", "00"], &["12-drafts.js", "00-realm-creation.js"] ; "input order kept")]
#[test_case(&["01-login.js"], &["01-login.js"] ; "by full name")]
#[test_case(&["02-site"], &["02-site.js"] ; "by name without extension")]
#[test_case(&["1"], &["10-admin.js"] ; "first match by sorted name")]
#[test_case(&["05", "05"], &["05-settings.js", "05-settings.js"] ; "repeats kept")]
fn selectors_resolve_to_exact_subset(raw: &[&str], expected: &[&str]) {
    let dir = suite();
    let discovery = TestDiscovery::new(dir.path(), "js");
    let files = discovery.resolve(&selectors(raw)).unwrap();
    assert_eq!(names(&files), expected);
}

#[test]
fn selector_may_be_a_path() {
    let dir = suite();
    let elsewhere = TempDir::new().unwrap();
    let extra = elsewhere.path().join("99-extra.js");
    std::fs::write(&extra, "").unwrap();

    let discovery = TestDiscovery::new(dir.path(), "js");
    let files = discovery
        .resolve(&[extra.display().to_string()])
        .unwrap();
    assert_eq!(files, vec![extra.canonicalize().unwrap()]);
}

#[test]
fn non_script_in_test_dir_resolves_by_full_name() {
    let dir = suite();
    let discovery = TestDiscovery::new(dir.path(), "js");
    let files = discovery.resolve(&selectors(&["common.json"])).unwrap();
    assert_eq!(names(&files), vec!["common.json"]);
}

#[test]
fn unknown_selector_is_fatal() {
    let dir = suite();
    let discovery = TestDiscovery::new(dir.path(), "js");
    match discovery.resolve(&selectors(&["01", "77-nothing"])) {
        Err(E2eError::TestNotFound(name)) => assert_eq!(name, "77-nothing"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn missing_test_dir_is_fatal() {
    let discovery = TestDiscovery::new(Path::new("/nonexistent/webtest"), "js");
    assert!(matches!(
        discovery.resolve(&selectors(&["00"])),
        Err(E2eError::TestDirMissing(_))
    ));
}

#[test]
fn skip_flaky_after_selection() {
    let dir = suite();
    let discovery = TestDiscovery::new(dir.path(), "js");
    let files = discovery.resolve(&[]).unwrap();
    let kept = skip_flaky(files, &["10-admin".to_string()]);

    assert_eq!(kept.len(), 5);
    assert!(!names(&kept).contains(&"10-admin.js".to_string()));
}
