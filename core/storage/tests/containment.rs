//! Property tests for vault containment.

use docvault_storage::{normalize, PathGuard};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn segment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("notes"),
        Just("ws"),
        Just("a.md"),
        Just("."),
        Just(".."),
        Just("vault-evil"),
    ]
}

/// Outside iff some prefix of the walk climbs above the root.
fn escapes(segments: &[&str]) -> bool {
    let mut depth: i64 = 0;
    for s in segments {
        match *s {
            "." => {}
            ".." => depth -= 1,
            _ => depth += 1,
        }
        if depth < 0 {
            return true;
        }
    }
    false
}

proptest! {
    #[test]
    fn is_safe_matches_walk_model(segments in prop::collection::vec(segment(), 0..12)) {
        let guard = PathGuard::new("/vault").unwrap();
        let mut candidate = PathBuf::from("/vault");
        for s in &segments {
            candidate.push(s);
        }

        prop_assert_eq!(guard.is_safe(&candidate), !escapes(&segments));
        if guard.is_safe(&candidate) {
            prop_assert!(guard.check(&candidate).unwrap().starts_with("/vault"));
        } else {
            prop_assert!(guard.check(&candidate).unwrap_err().is_security_rejection());
        }
    }

    #[test]
    fn backslashes_act_as_separators(segments in prop::collection::vec(segment(), 0..12)) {
        let guard = PathGuard::new("/vault").unwrap();
        let forward = format!("/vault/{}", segments.join("/"));
        let backward = format!("/vault\\{}", segments.join("\\"));

        prop_assert_eq!(guard.is_safe(&forward), guard.is_safe(&backward));
        prop_assert_eq!(normalize(Path::new(&forward)), normalize(Path::new(&backward)));
    }

    #[test]
    fn normalize_is_idempotent(segments in prop::collection::vec(segment(), 0..12)) {
        let path = PathBuf::from(format!("/vault/{}", segments.join("/")));
        let once = normalize(&path);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.components().all(|c| !matches!(
            c,
            std::path::Component::ParentDir | std::path::Component::CurDir
        )));
    }
}

#[test]
fn sibling_with_shared_prefix_is_outside() {
    let guard = PathGuard::new("/vault").unwrap();
    assert!(!guard.is_safe("/vault-evil/x.md"));
    assert!(!guard.is_safe("/vaultx"));
    assert!(guard.is_safe("/vault/vault-evil"));
}

#[test]
fn relative_candidates_are_never_safe() {
    let guard = PathGuard::new("/vault").unwrap();
    assert!(!guard.is_safe("notes/a.md"));
    assert!(!guard.is_safe("./vault"));
    assert!(!guard.is_safe(""));
}
