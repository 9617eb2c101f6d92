use super::*;
use crate::test_support::{dir_entry, file_entry, MockGateway};
use std::time::Duration;

fn sample_gateway() -> MockGateway {
    MockGateway::new()
        .with_directory(
            "",
            vec![
                file_entry("README.md", 10),
                dir_entry("src"),
                dir_entry("docs"),
            ],
        )
        .with_directory(
            "src",
            vec![file_entry("src/main.rs", 20), dir_entry("src/util")],
        )
        .with_directory("src/util", vec![file_entry("src/util/mod.rs", 5)])
        .with_directory("docs", vec![])
}

fn cache_for(gateway: &Arc<MockGateway>) -> DirectoryCache {
    let gateway: Arc<dyn ContentGateway> = gateway.clone();
    DirectoryCache::new(RepoRef::new("octocat", "hello"), gateway)
}

#[tokio::test]
async fn test_load_root_sorts_and_expands_root() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);

    let children = cache.load_root().await.unwrap();

    let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["docs", "src", "README.md"]);
    assert!(cache.is_expanded(ROOT_PATH));
    assert_eq!(cache.node(ROOT_PATH).unwrap().name, "hello");
}

#[tokio::test]
async fn test_expand_fetches_once_then_toggles() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    assert_eq!(cache.expand("src").await.unwrap(), ExpandOutcome::Expanded);
    assert_eq!(cache.expand("src").await.unwrap(), ExpandOutcome::Collapsed);
    assert_eq!(cache.expand("src").await.unwrap(), ExpandOutcome::Expanded);

    // root + src
    assert_eq!(MockGateway::count(&gateway.list_calls), 2);
    assert!(cache.is_expanded("src"));
    assert!(cache.node("src/main.rs").is_some());
}

#[tokio::test]
async fn test_expand_while_loading_is_a_no_op() {
    let gateway = Arc::new(sample_gateway().with_list_delay(Duration::from_millis(50)));
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    let (first, second) = tokio::join!(cache.expand("src"), cache.expand("src"));

    assert_eq!(first.unwrap(), ExpandOutcome::Expanded);
    assert_eq!(second.unwrap(), ExpandOutcome::AlreadyLoading);
    assert_eq!(MockGateway::count(&gateway.list_calls), 2);
    assert!(!cache.is_loading("src"));
}

#[tokio::test]
async fn test_failed_expand_leaves_directory_unresolved() {
    let gateway = Arc::new(sample_gateway().with_failing_directory("src"));
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    let result = cache.expand("src").await;

    assert!(matches!(result, Err(Error::Gateway(_))));
    assert!(!cache.is_expanded("src"));
    assert!(!cache.is_loading("src"));
    assert!(!cache.node("src").unwrap().is_resolved());

    // A retry calls the gateway again.
    let _ = cache.expand("src").await;
    assert_eq!(MockGateway::count(&gateway.list_calls), 3);
}

#[tokio::test]
async fn test_expand_file_and_unknown_path() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    assert_eq!(
        cache.expand("README.md").await.unwrap(),
        ExpandOutcome::NotADirectory
    );
    assert!(matches!(
        cache.expand("nope").await,
        Err(Error::UnknownPath(p)) if p == "nope"
    ));
}

#[tokio::test]
async fn test_empty_directory_resolves_to_no_children() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    assert_eq!(cache.expand("docs").await.unwrap(), ExpandOutcome::Expanded);

    let docs = cache.node("docs").unwrap();
    assert!(docs.is_resolved());
    assert_eq!(docs.child_paths().unwrap().len(), 0);
}

#[tokio::test]
async fn test_ensure_children_does_not_change_expansion() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    let children = cache.ensure_children("src").await.unwrap();
    let again = cache.ensure_children("src").await.unwrap();

    assert_eq!(children.len(), 2);
    assert_eq!(children, again);
    assert!(!cache.is_expanded("src"));
    assert_eq!(MockGateway::count(&gateway.list_calls), 2);
}

#[tokio::test]
async fn test_concurrent_ensure_children_lists_once() {
    let gateway = Arc::new(sample_gateway().with_list_delay(Duration::from_millis(50)));
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    let (first, second) = tokio::join!(cache.ensure_children("src"), cache.ensure_children("src"));

    assert_eq!(first.unwrap().len(), 2);
    assert_eq!(second.unwrap(), cache.ensure_children("src").await.unwrap());
    assert_eq!(MockGateway::count(&gateway.list_calls), 2);
    assert!(!cache.is_loading("src"));
}

#[tokio::test]
async fn test_ensure_children_waits_for_running_expand() {
    let gateway = Arc::new(sample_gateway().with_list_delay(Duration::from_millis(50)));
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    let (expanded, children) = tokio::join!(cache.expand("src"), cache.ensure_children("src"));

    assert_eq!(expanded.unwrap(), ExpandOutcome::Expanded);
    assert_eq!(children.unwrap().len(), 2);
    assert_eq!(MockGateway::count(&gateway.list_calls), 2);
}

#[tokio::test]
async fn test_ensure_children_of_file_is_empty() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();

    assert!(cache.ensure_children("README.md").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_visible_rows_follow_expansion() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();
    cache.expand("src").await.unwrap();
    cache.ensure_children("src/util").await.unwrap();

    let rows: Vec<(String, usize)> = cache
        .visible_rows()
        .into_iter()
        .map(|r| (r.node.path, r.depth))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("docs".to_string(), 0),
            ("src".to_string(), 0),
            ("src/util".to_string(), 1),
            ("src/main.rs".to_string(), 1),
            ("README.md".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn test_known_paths_include_unexpanded_listings() {
    let gateway = Arc::new(sample_gateway());
    let cache = cache_for(&gateway);
    cache.load_root().await.unwrap();
    cache.ensure_children("src").await.unwrap();

    let paths = cache.known_paths();

    assert!(paths.contains(&"src/main.rs".to_string()));
    assert!(!paths.contains(&String::new()));
}
