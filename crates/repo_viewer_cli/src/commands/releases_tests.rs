use super::*;
use github_client::ReleaseAsset;

fn release(tag: &str, name: &str) -> Release {
    Release {
        id: 1,
        tag_name: tag.to_string(),
        name: name.to_string(),
        body: String::new(),
        published_at: "2024-05-01T09:00:00Z".to_string(),
        draft: false,
        prerelease: false,
        assets: Vec::new(),
    }
}

#[test]
fn test_render_releases_empty() {
    let output = render_releases("octocat", "hello", &[], ArchiveFormat::Zip, 10);

    assert!(output.contains("No releases published"));
}

#[test]
fn test_render_releases_links_source_archive() {
    let output = render_releases(
        "octocat",
        "hello",
        &[release("v1.0.0", "v1.0.0")],
        ArchiveFormat::TarGz,
        10,
    );

    assert!(output.contains("v1.0.0"));
    assert!(output.contains("Published: 2024-05-01"));
    assert!(output.contains("https://github.com/octocat/hello/archive/refs/tags/v1.0.0.tar.gz"));
}

#[test]
fn test_render_releases_flags_and_assets() {
    let mut beta = release("v2.0.0-beta", "Second beta");
    beta.prerelease = true;
    beta.assets.push(ReleaseAsset {
        name: "hello-linux.tar.gz".to_string(),
        browser_download_url: "https://example.test/hello-linux.tar.gz".to_string(),
        size: 1536,
        content_type: None,
    });

    let output = render_releases("octocat", "hello", &[beta], ArchiveFormat::Zip, 10);

    assert!(output.contains("Second beta"));
    assert!(output.contains("[pre-release]"));
    assert!(!output.contains("[draft]"));
    assert!(output.contains("hello-linux.tar.gz (1.5 KB)"));
    assert!(output.contains("https://example.test/hello-linux.tar.gz"));
}

#[test]
fn test_render_releases_respects_limit() {
    let releases = vec![
        release("v3", "v3"),
        release("v2", "v2"),
        release("v1", "v1"),
    ];

    let output = render_releases("octocat", "hello", &releases, ArchiveFormat::Zip, 2);

    assert!(output.contains("v3.zip"));
    assert!(output.contains("v2.zip"));
    assert!(!output.contains("v1.zip"));
    assert!(output.contains("... and 1 more"));
}
