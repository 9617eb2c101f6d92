use super::*;
use crate::commands::test_support::ListingGateway;
use github_client::{ContentGateway, RepoRef};
use std::sync::Arc;

fn cache() -> DirectoryCache {
    let gateway: Arc<dyn ContentGateway> = Arc::new(ListingGateway::sample());
    DirectoryCache::new(RepoRef::new("octocat", "hello"), gateway)
}

fn visible_paths(cache: &DirectoryCache) -> Vec<String> {
    cache
        .visible_rows()
        .into_iter()
        .map(|r| r.node.path)
        .collect()
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("/src//bin/"), "src/bin");
    assert_eq!(normalize_path(""), "");
}

#[test]
fn test_ancestors() {
    assert_eq!(ancestors("a/b/c"), vec!["a", "a/b", "a/b/c"]);
    assert!(ancestors("").is_empty());
}

#[tokio::test]
async fn test_open_path_opens_parents() {
    let cache = cache();
    cache.load_root().await.unwrap();

    open_path(&cache, "src/bin/").await.unwrap();

    assert_eq!(
        visible_paths(&cache),
        vec!["src", "src/bin", "src/bin/main.rs", "src/lib.rs", "README.md"]
    );
}

#[tokio::test]
async fn test_open_path_twice_keeps_directory_open() {
    let cache = cache();
    cache.load_root().await.unwrap();

    open_path(&cache, "src").await.unwrap();
    open_path(&cache, "src").await.unwrap();

    assert!(cache.is_expanded("src"));
}

#[tokio::test]
async fn test_open_path_rejects_files() {
    let cache = cache();
    cache.load_root().await.unwrap();

    let result = open_path(&cache, "README.md").await;

    assert!(matches!(result, Err(Error::InvalidArguments(_))));
}

#[tokio::test]
async fn test_load_ancestors_makes_node_known_without_opening() {
    let cache = cache();
    cache.load_root().await.unwrap();

    load_ancestors(&cache, "src/bin/main.rs").await;

    assert!(cache.node("src/bin/main.rs").is_some());
    assert!(!cache.is_expanded("src"));
}

#[tokio::test]
async fn test_open_all_expands_everything() {
    let cache = cache();
    cache.load_root().await.unwrap();

    open_all(&cache).await;

    assert_eq!(visible_paths(&cache).len(), 5);
}

#[tokio::test]
async fn test_render_rows_indents_children() {
    let cache = cache();
    cache.load_root().await.unwrap();
    open_path(&cache, "src").await.unwrap();

    let output = render_rows(&cache.visible_rows());
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("▾ "));
    assert!(lines[0].contains("src"));
    assert!(lines[1].starts_with("  ▸ "));
    assert!(lines[2].contains("lib.rs"));
    assert!(lines[2].contains("2 KB"));
    assert!(lines[3].starts_with("  README.md"));
}
