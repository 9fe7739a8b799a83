//! Property-based tests for conversion round-trips

use pkgsplit::loader::{parse_contents, PackageMap};
use pkgsplit::naming::FileNameCodec;
use pkgsplit::verify::{reconstruct, verify_dir};
use pkgsplit::writer::write_package_dir;
use pkgsplit::{FixedAnswer, Pipeline, SplitConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}/[a-z][a-z0-9+.-]{0,9}"
}

fn flag_strategy() -> impl Strategy<Value = String> {
    "-?[a-z][a-z0-9_+]{0,7}"
}

/// Lines of `<key> <flags>`; keys repeat so consolidation is exercised.
fn lines_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(key_strategy(), 1..6).prop_flat_map(|keys| {
        prop::collection::vec(
            (
                prop::sample::select(keys),
                prop::collection::vec(flag_strategy(), 1..5),
            ),
            1..12,
        )
    })
}

fn render(lines: &[(String, Vec<String>)]) -> String {
    let mut out = String::from("# generated\n");
    for (key, flags) in lines {
        out.push_str(&format!("{}  {}\n", key, flags.join(" ")));
    }
    out
}

fn expected_map(lines: &[(String, Vec<String>)]) -> PackageMap {
    let mut map = PackageMap::new();
    for (key, flags) in lines {
        map.entry(key.clone())
            .or_default()
            .extend(flags.iter().cloned());
    }
    map
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_load_write_reconstruct_round_trips(lines in lines_strategy()) {
        let contents = render(&lines);
        let loaded = parse_contents(&contents);
        prop_assert_eq!(&loaded.packages, &expected_map(&lines));

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("staged");
        let codec = FileNameCodec::default();
        write_package_dir(&loaded.packages, &temp.path().join("package.use"), &dir, &codec).unwrap();

        let reconstruction = reconstruct(&dir, &codec).unwrap();
        let recovered = parse_contents(&reconstruction.lines.join("\n"));
        prop_assert_eq!(&recovered.packages, &loaded.packages);
        prop_assert!(reconstruction.name_mismatches.is_empty());

        let report = verify_dir(&loaded.lines, &dir, &codec).unwrap();
        prop_assert!(report.passed(), "{:?}", report);
    }

    #[test]
    fn prop_union_of_two_lines(
        key in key_strategy(),
        a in prop::collection::btree_set(flag_strategy(), 1..5),
        b in prop::collection::btree_set(flag_strategy(), 1..5),
    ) {
        let contents = format!(
            "{} {}\n{} {}\n",
            key,
            a.iter().cloned().collect::<Vec<_>>().join(" "),
            key,
            b.iter().cloned().collect::<Vec<_>>().join(" "),
        );
        let loaded = parse_contents(&contents);
        let union: BTreeSet<String> = a.union(&b).cloned().collect();
        prop_assert_eq!(loaded.packages.len(), 1);
        prop_assert_eq!(&loaded.packages[&key], &union);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_dry_run_is_idempotent(lines in lines_strategy()) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("package.use");
        let contents = render(&lines);
        fs::write(&source, &contents).unwrap();

        let config = SplitConfig {
            source: source.clone(),
            dry_run: true,
            ..SplitConfig::default()
        };
        let first = Pipeline::new(config.clone())
            .unwrap()
            .run(&mut FixedAnswer(true), |_| Ok(()))
            .unwrap();
        let second = Pipeline::new(config)
            .unwrap()
            .run(&mut FixedAnswer(true), |_| Ok(()))
            .unwrap();

        prop_assert_eq!(&first.packages, &second.packages);
        prop_assert_eq!(first.report.status, second.report.status);
        prop_assert_eq!(fs::read_to_string(&source).unwrap(), contents);
    }
}
