//! Target list loading against real files

use batchloader::queue::parse_target_line;
use batchloader::{load_targets, BatchError, Target};
use proptest::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn missing_file_is_not_found() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("urls.txt");

    let err = load_targets(&path).await.unwrap_err();
    assert!(matches!(err, BatchError::TargetListNotFound(p) if p == path));
}

#[cfg(unix)]
#[tokio::test]
async fn directory_is_unreadable() {
    let temp = TempDir::new().expect("temp dir");

    let err = load_targets(temp.path()).await.unwrap_err();
    assert!(matches!(err, BatchError::TargetListUnreadable { .. }));
}

#[tokio::test]
async fn empty_and_comment_only_files_yield_no_targets() {
    let temp = TempDir::new().expect("temp dir");
    let empty = temp.path().join("empty.txt");
    let comments = temp.path().join("comments.txt");
    std::fs::write(&empty, "").unwrap();
    std::fs::write(&comments, "# nothing yet\n\n   \n# still nothing\n").unwrap();

    assert!(load_targets(&empty).await.unwrap().is_empty());
    assert!(load_targets(&comments).await.unwrap().is_empty());
}

#[tokio::test]
async fn mixed_file_keeps_valid_lines_in_order() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("urls.txt");
    std::fs::write(
        &path,
        "clip1 https://example.com/a\r\n\
         orphan\n\
         # clip0 https://example.com/skipped\n\
         \tclip2\thttps://example.com/b  \n",
    )
    .unwrap();

    let targets = load_targets(&path).await.unwrap();
    assert_eq!(
        targets,
        vec![
            Target::new("clip1", "https://example.com/a"),
            Target::new("clip2", "https://example.com/b"),
        ]
    );
}

proptest! {
    #[test]
    fn well_formed_lines_are_kept(
        name in "[A-Za-z0-9_-]{1,16}",
        url in "https://[a-z]{1,10}\\.com/[A-Za-z0-9/?=&]{0,20}",
        pad in "[ \t]{0,3}",
    ) {
        let line = format!("{pad}{name} {url}{pad}");
        let target = parse_target_line(&line).expect("valid line");
        prop_assert_eq!(target.name, name);
        prop_assert_eq!(target.url, url);
    }

    #[test]
    fn arbitrary_lines_never_panic(line in "\\PC*") {
        if let Some(target) = parse_target_line(&line) {
            prop_assert!(!target.name.is_empty());
            prop_assert!(!target.url.is_empty());
            prop_assert!(!target.name.chars().any(char::is_whitespace));
            prop_assert!(!line.trim_start().starts_with('#'));
        }
    }
}
