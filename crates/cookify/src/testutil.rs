use std::path::PathBuf;

/// A fresh empty directory under the system temp dir, unique per call.
pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cookify-test-{tag}-{}",
        cookify_common::token::new_token()
    ));
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}
