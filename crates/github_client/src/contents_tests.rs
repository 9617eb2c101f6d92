use super::*;
use serde_json::from_str;

#[test]
fn test_entry_type_deserialization() {
    assert_eq!(from_str::<EntryType>(r#""file""#).unwrap(), EntryType::File);
    assert_eq!(from_str::<EntryType>(r#""dir""#).unwrap(), EntryType::Dir);
    assert_eq!(
        from_str::<EntryType>(r#""symlink""#).unwrap(),
        EntryType::Symlink
    );
    assert_eq!(
        from_str::<EntryType>(r#""submodule""#).unwrap(),
        EntryType::Submodule
    );
}

#[test]
fn test_content_entry_from_listing_json() {
    // Shape of one element of GET /repos/{owner}/{repo}/contents/{path}
    let json_str = r#"{
        "name": "lib.rs",
        "path": "src/lib.rs",
        "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
        "size": 5362,
        "url": "https://api.github.com/repos/octo/hello/contents/src/lib.rs?ref=main",
        "html_url": "https://github.com/octo/hello/blob/main/src/lib.rs",
        "git_url": "https://api.github.com/repos/octo/hello/git/blobs/3d21ec53",
        "download_url": "https://raw.githubusercontent.com/octo/hello/main/src/lib.rs",
        "type": "file"
    }"#;

    let entry: ContentEntry = from_str(json_str).expect("Failed to deserialize ContentEntry");

    assert_eq!(entry.name, "lib.rs");
    assert_eq!(entry.path, "src/lib.rs");
    assert_eq!(entry.entry_type, EntryType::File);
    assert_eq!(entry.size, 5362);
    assert!(!entry.is_directory());
}

#[test]
fn test_content_entry_missing_size_defaults_to_zero() {
    let json_str = r#"{ "name": "docs", "path": "docs", "type": "dir", "sha": "x" }"#;

    let entry: ContentEntry = from_str(json_str).expect("Failed to deserialize ContentEntry");

    assert_eq!(entry.size, 0);
    assert!(entry.is_directory());
}

#[test]
fn test_submodule_and_symlink_are_not_directories() {
    for kind in [EntryType::Submodule, EntryType::Symlink] {
        let entry = ContentEntry {
            name: "vendor".to_string(),
            path: "vendor".to_string(),
            entry_type: kind,
            sha: String::new(),
            size: 0,
        };
        assert!(!entry.is_directory());
    }
}
