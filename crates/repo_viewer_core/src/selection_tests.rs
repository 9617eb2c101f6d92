use super::*;
use crate::test_support::{dir_entry, file_entry, MockGateway};
use github_client::{ContentGateway, RepoRef};
use std::sync::Arc;

#[test]
fn test_toggle_adds_then_removes() {
    let mut selection = SelectionSet::new();

    assert!(selection.toggle("src/main.rs"));
    assert!(selection.contains("src/main.rs"));

    assert!(!selection.toggle("src/main.rs"));
    assert!(!selection.contains("src/main.rs"));
    assert!(selection.is_empty());
}

#[test]
fn test_iteration_is_sorted_and_unique() {
    let mut selection: SelectionSet = ["b", "a", "c"].into_iter().collect();
    selection.insert("a");

    let paths: Vec<&str> = selection.iter().collect();

    assert_eq!(paths, vec!["a", "b", "c"]);
    assert_eq!(selection.len(), 3);
}

#[test]
fn test_set_is_idempotent() {
    let mut selection = SelectionSet::new();

    selection.set("docs", true);
    selection.set("docs", true);
    assert_eq!(selection.len(), 1);

    selection.set("docs", false);
    selection.set("missing", false);
    assert!(selection.is_empty());
}

#[test]
fn test_clear() {
    let mut selection: SelectionSet = ["a", "b"].into_iter().collect();

    selection.clear();

    assert_eq!(selection.len(), 0);
}

#[tokio::test]
async fn test_select_all_uses_known_nodes() {
    let gateway: Arc<dyn ContentGateway> = Arc::new(
        MockGateway::new()
            .with_directory("", vec![dir_entry("src"), file_entry("README.md", 1)])
            .with_directory("src", vec![file_entry("src/lib.rs", 1)]),
    );
    let cache = DirectoryCache::new(RepoRef::new("o", "r"), gateway);
    cache.load_root().await.unwrap();

    let mut selection: SelectionSet = ["stale/path"].into_iter().collect();
    selection.select_all(&cache);

    let paths: Vec<&str> = selection.iter().collect();
    assert_eq!(paths, vec!["README.md", "src"]);
}
