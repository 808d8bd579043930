use std::collections::HashSet;

use graphlaunch::classpath::expand_classpath;
use graphlaunch::fs::mock::MockFileSystem;
use graphlaunch::fs::FileSystem;
use proptest::prelude::*;

const DIRS: [&str; 3] = ["/lib", "/opt/jars", "/share"];
const PATTERNS: [&str; 5] = ["*.jar", "*", "a*", "*.txt", "b.jar"];

// Strategy: a filesystem made of a few files spread over fixed directories,
// plus a raw classpath built from (dir, pattern) entries over the same dirs.
fn fs_and_listing() -> impl Strategy<Value = (Vec<(usize, String)>, Vec<(usize, usize)>)> {
    let files = proptest::collection::vec(
        (0..DIRS.len(), "[ab]{1,2}\\.(jar|txt)"),
        0..12,
    );
    let entries = proptest::collection::vec((0..DIRS.len(), 0..PATTERNS.len()), 0..8);
    (files, entries)
}

fn build(files: &[(usize, String)], entries: &[(usize, usize)]) -> (MockFileSystem, String) {
    let fs = MockFileSystem::new();
    for (dir, name) in files {
        fs.add_file(format!("{}/{}", DIRS[*dir], name), b"".to_vec());
    }
    let raw = entries
        .iter()
        .map(|(dir, pat)| format!("{}/{}", DIRS[*dir], PATTERNS[*pat]))
        .collect::<Vec<_>>()
        .join(":");
    (fs, raw)
}

proptest! {
    #[test]
    fn expansion_is_idempotent_unique_and_existing((files, entries) in fs_and_listing()) {
        let (fs, raw) = build(&files, &entries);

        let first = expand_classpath(&fs, &raw);
        let second = expand_classpath(&fs, &raw);
        prop_assert_eq!(&first, &second);

        let unique: HashSet<_> = first.iter().collect();
        prop_assert_eq!(unique.len(), first.len());

        for path in &first {
            prop_assert!(fs.exists(path), "resolved path does not exist: {:?}", path);
        }
    }
}
