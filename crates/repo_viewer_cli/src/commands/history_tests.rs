use super::*;

#[test]
fn test_render_history_numbers_entries() {
    let entries = vec!["octocat/hello".to_string(), "rust-lang/rust".to_string()];

    let output = render_history(&entries);

    assert_eq!(output, " 1. octocat/hello\n 2. rust-lang/rust\n");
}

#[test]
fn test_render_history_empty() {
    assert!(render_history(&[]).contains("No recent repositories"));
}
