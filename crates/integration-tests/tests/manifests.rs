//! Workspace packaging checks.

use std::path::Path;

#[test]
fn test_every_declared_readme_exists() {
    let crates = Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap();
    let mut checked = 0;
    for entry in std::fs::read_dir(crates).unwrap() {
        let dir = entry.unwrap().path();
        let Ok(manifest) = std::fs::read_to_string(dir.join("Cargo.toml")) else {
            continue;
        };
        for line in manifest.lines() {
            if let Some(value) = line.strip_prefix("readme = ") {
                let readme = dir.join(value.trim().trim_matches('"'));
                assert!(readme.is_file(), "{} is missing", readme.display());
                checked += 1;
            }
        }
    }
    assert!(checked >= 5, "only {checked} crates declare a readme");
}
