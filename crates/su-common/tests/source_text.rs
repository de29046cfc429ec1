use std::{fs, path::Path};

fn rust_sources(dir: &Path, out: &mut Vec<std::path::PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

/// Comments are English; user-facing strings are Korean. Kana belongs to neither.
#[test]
fn sources_contain_no_kana() {
    let mut files = Vec::new();
    rust_sources(&Path::new(env!("CARGO_MANIFEST_DIR")).join("src"), &mut files);
    assert!(!files.is_empty());

    let is_kana = |c: char| ('\u{3040}'..='\u{30ff}').contains(&c);
    for file in files {
        let source = fs::read_to_string(&file).unwrap();
        for (number, line) in source.lines().enumerate() {
            assert!(
                !line.chars().any(is_kana),
                "{}:{} {}",
                file.display(),
                number + 1,
                line
            );
        }
    }
}
