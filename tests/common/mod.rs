use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

/// Create a source directory populated with the given file names.
pub fn setup_source_dir(temp_dir: &TempDir, names: &[&str]) -> ChildPath {
    let source = temp_dir.child("source");
    source.create_dir_all().unwrap();
    for name in names {
        source.child(name).write_str("content").unwrap();
    }
    source
}
