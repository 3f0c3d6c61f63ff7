//! Tag extraction over a library-style fixture

use std::fs;
use std::path::Path;

use estr_core::parser::ParsedFile;
use estr_core::tags::{Tag, extract_tags, tag_file};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

fn library_tags(classic: bool) -> Vec<Tag> {
    let path = Path::new(FIXTURES_DIR).join("tags/library.js");
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    let parsed = ParsedFile::from_source("library.js", &source);
    extract_tags(&parsed, classic).unwrap()
}

fn summary(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .map(|tag| format!("{} {} {} {}", tag.name, tag.kind, tag.line, tag.scope))
        .collect()
}

#[test]
fn default_mode_tags() {
    assert_eq!(
        summary(&library_tags(false)),
        vec![
            "cache v 1 global",
            "lookup f 3 global",
            "key vp 3 3:1-11:1",
            "fallback vp 3 3:1-11:1",
            "hit v 4 3:1-11:1",
            "normalize v 5 3:1-11:1",
            "normalizeKey fe 5 5:19-5:68",
            "raw vp 5 5:19-5:68",
            "failure ve 8 8:5-10:3",
            "Store f 13 global",
            "get prototype 14 global",
            "key vp 14 14:23-14:60",
            "handlers v 16 global",
            "lookup export 22 global",
        ]
    );
}

#[test]
fn classic_mode_adds_assignments_and_properties() {
    let classic = summary(&library_tags(true));
    let default = summary(&library_tags(false));

    let added: Vec<&String> = classic.iter().filter(|tag| !default.contains(tag)).collect();
    assert_eq!(
        added,
        vec![
            "onLoad property 17 global",
            "onSave property 18 global",
            "onError fa 21 global",
        ]
    );
}

#[test]
fn tag_file_orders_by_name_and_keeps_ties_in_source_order() {
    let file = tag_file(library_tags(false));
    let entries: Vec<&str> = file.lines().skip(3).collect();

    assert_eq!(entries.len(), 14);
    assert!(entries[0].starts_with("Store\t"));
    assert_eq!(
        entries
            .iter()
            .filter(|line| line.starts_with("key\t"))
            .copied()
            .collect::<Vec<_>>(),
        vec![
            "key\tlibrary.js\t3;\"\tvp\tlineno:3\tscope:3:1-11:1",
            "key\tlibrary.js\t14;\"\tvp\tlineno:14\tscope:14:23-14:60",
        ]
    );
}
