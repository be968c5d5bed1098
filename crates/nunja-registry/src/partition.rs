// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping of discovered templates and scripts into molds.
//!
//! Keys are sorted once into immutable arrays. Molds are visited from the
//! largest mold id down, and each one claims the run of keys at the end of
//! the still-unclaimed range that carries its prefix. Sorted order keeps every
//! mold's keys contiguous, so two cursors moving towards the front are enough.

use std::collections::BTreeMap;
use std::path::PathBuf;

use nunja_core::ResourceMap;

/// Result of partitioning one declaration's resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// `mold_id -> base directory`.
    pub molds: BTreeMap<String, PathBuf>,
    /// `mold_id -> resources belonging to that mold`.
    pub related: BTreeMap<String, ResourceMap>,
    /// Everything no mold claimed.
    pub discard: ResourceMap,
}

impl Partition {
    /// Number of resources across all buckets.
    pub fn resource_count(&self) -> usize {
        self.related.values().map(BTreeMap::len).sum::<usize>() + self.discard.len()
    }
}

/// Partition `template_map` and `script_map` into molds.
///
/// A mold exists for every template key whose marker-stripped form is
/// `prefix/basename/<required_template>`.
pub fn partition(
    template_map: &ResourceMap,
    script_map: &ResourceMap,
    required_template: &str,
    marker_prefix: &str,
) -> Partition {
    let template_keys: Vec<&str> = template_map.keys().map(String::as_str).collect();
    let script_keys: Vec<&str> = script_map.keys().map(String::as_str).collect();

    let mut result = Partition::default();
    let mut templates = Cursor::new(&template_keys);
    let mut scripts = Cursor::new(&script_keys);

    for key in template_keys.iter().rev() {
        let Some(mold_id) = mold_id_of(key, required_template, marker_prefix) else {
            continue;
        };
        let base = template_map[*key]
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        result.molds.insert(mold_id.to_string(), base);

        let mut related = ResourceMap::new();
        let template_prefix = format!("{marker_prefix}{mold_id}/");
        let script_prefix = format!("{mold_id}/");
        templates.claim(&template_prefix, template_map, &mut related, &mut result.discard);
        scripts.claim(&script_prefix, script_map, &mut related, &mut result.discard);
        result.related.insert(mold_id.to_string(), related);
    }

    templates.discard_rest(template_map, &mut result.discard);
    scripts.discard_rest(script_map, &mut result.discard);
    result
}

/// The mold id for a canonical template key, if it is one.
fn mold_id_of<'k>(key: &'k str, required_template: &str, marker_prefix: &str) -> Option<&'k str> {
    let stripped = key.strip_prefix(marker_prefix)?;
    let mut segments = stripped.split('/');
    let (Some(prefix), Some(basename), Some(file), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    if file != required_template || prefix.is_empty() || basename.is_empty() {
        return None;
    }
    Some(&stripped[..prefix.len() + 1 + basename.len()])
}

/// Exclusive end of the unclaimed range of a sorted key array.
struct Cursor<'a> {
    keys: &'a [&'a str],
    end: usize,
}

impl<'a> Cursor<'a> {
    fn new(keys: &'a [&'a str]) -> Self {
        Self {
            keys,
            end: keys.len(),
        }
    }

    fn last(&self) -> Option<&'a str> {
        self.end.checked_sub(1).map(|i| self.keys[i])
    }

    /// Claim the trailing run of keys starting with `prefix`.
    ///
    /// Unclaimed keys sorting after the prefix belong to no remaining mold
    /// (every remaining mold id is smaller) and go to `discard` first.
    fn claim(
        &mut self,
        prefix: &str,
        source: &ResourceMap,
        related: &mut ResourceMap,
        discard: &mut ResourceMap,
    ) {
        while let Some(key) = self.last() {
            if key.starts_with(prefix) || key < prefix {
                break;
            }
            discard.insert(key.to_string(), source[key].clone());
            self.end -= 1;
        }
        while let Some(key) = self.last() {
            if !key.starts_with(prefix) {
                break;
            }
            related.insert(key.to_string(), source[key].clone());
            self.end -= 1;
        }
    }

    fn discard_rest(&mut self, source: &ResourceMap, discard: &mut ResourceMap) {
        for key in &self.keys[..self.end] {
            discard.insert((*key).to_string(), source[*key].clone());
        }
        self.end = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use proptest::prelude::*;

    use super::*;

    fn map(entries: &[(&str, &str)]) -> ResourceMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), PathBuf::from(v)))
            .collect()
    }

    fn keys(map: &ResourceMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn example_button_mold() {
        let templates = map(&[(
            "text!acme.widgets/button/template.nja",
            "/pkg/acme/widgets/button/template.nja",
        )]);
        let scripts = map(&[(
            "acme.widgets/button/index.js",
            "/pkg/acme/widgets/button/index.js",
        )]);

        let result = partition(&templates, &scripts, "template.nja", "text!");
        assert_eq!(result.molds.len(), 1);
        assert_eq!(
            result.molds["acme.widgets/button"],
            Path::new("/pkg/acme/widgets/button")
        );
        assert_eq!(
            keys(&result.related["acme.widgets/button"]),
            vec!["acme.widgets/button/index.js", "text!acme.widgets/button/template.nja"]
        );
        assert!(result.discard.is_empty());
    }

    #[test]
    fn groups_several_molds_and_discards_strays() {
        let templates = map(&[
            ("text!ns/basic/template.nja", "/a/basic/template.nja"),
            ("text!ns/include/empty.nja", "/a/include/empty.nja"),
            ("text!ns/include/template.nja", "/a/include/template.nja"),
            ("text!ns/itemlist/template.nja", "/a/itemlist/template.nja"),
            ("text!ns/nomold/empty.nja", "/a/nomold/empty.nja"),
        ]);
        let scripts = map(&[
            ("ns/include/index.js", "/a/include/index.js"),
            ("ns/itemlist/index.js", "/a/itemlist/index.js"),
            ("ns/nomold/index.js", "/a/nomold/index.js"),
            ("ns/zzz.js", "/a/zzz.js"),
        ]);

        let result = partition(&templates, &scripts, "template.nja", "text!");
        assert_eq!(
            result.molds.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["ns/basic", "ns/include", "ns/itemlist"]
        );
        assert_eq!(
            keys(&result.related["ns/basic"]),
            vec!["text!ns/basic/template.nja"]
        );
        assert_eq!(
            keys(&result.related["ns/include"]),
            vec![
                "ns/include/index.js",
                "text!ns/include/empty.nja",
                "text!ns/include/template.nja",
            ]
        );
        assert_eq!(
            keys(&result.related["ns/itemlist"]),
            vec!["ns/itemlist/index.js", "text!ns/itemlist/template.nja"]
        );
        assert_eq!(
            keys(&result.discard),
            vec!["ns/nomold/index.js", "ns/zzz.js", "text!ns/nomold/empty.nja"]
        );
    }

    #[test]
    fn mold_without_scripts_leaves_smaller_molds_scripts_alone() {
        let templates = map(&[
            ("text!ns/a/template.nja", "/r/a/template.nja"),
            ("text!ns/b/template.nja", "/r/b/template.nja"),
        ]);
        let scripts = map(&[("ns/a/index.js", "/r/a/index.js")]);

        let result = partition(&templates, &scripts, "template.nja", "text!");
        assert_eq!(keys(&result.related["ns/b"]), vec!["text!ns/b/template.nja"]);
        assert_eq!(
            keys(&result.related["ns/a"]),
            vec!["ns/a/index.js", "text!ns/a/template.nja"]
        );
        assert!(result.discard.is_empty());
    }

    #[test]
    fn prefix_matching_is_delimiter_aware() {
        let templates = map(&[
            ("text!ns/a/template.nja", "/r/a/template.nja"),
            ("text!ns/a.b/template.nja", "/r/a.b/template.nja"),
            ("text!ns/ab/template.nja", "/r/ab/template.nja"),
        ]);
        let scripts = map(&[
            ("ns/a/index.js", "/r/a/index.js"),
            ("ns/a.b/index.js", "/r/a.b/index.js"),
            ("ns/ab/index.js", "/r/ab/index.js"),
        ]);

        let result = partition(&templates, &scripts, "template.nja", "text!");
        for mold in ["ns/a", "ns/a.b", "ns/ab"] {
            assert_eq!(
                keys(&result.related[mold]),
                vec![
                    format!("{mold}/index.js").as_str(),
                    format!("text!{mold}/template.nja").as_str(),
                ],
                "mold {mold}"
            );
        }
        assert!(result.discard.is_empty());
    }

    #[test]
    fn deeper_templates_do_not_define_molds() {
        let templates = map(&[
            ("text!ns/outer/inner/template.nja", "/r/outer/inner/template.nja"),
            ("text!ns/outer/xtemplate.nja", "/r/outer/xtemplate.nja"),
            ("text!ns/template.nja", "/r/template.nja"),
        ]);
        let result = partition(&templates, &ResourceMap::new(), "template.nja", "text!");
        assert!(result.molds.is_empty());
        assert_eq!(result.discard.len(), 3);
    }

    #[test]
    fn unmarked_template_keys_are_ignored() {
        let templates = map(&[("ns/plain/template.nja", "/r/plain/template.nja")]);
        let result = partition(&templates, &ResourceMap::new(), "template.nja", "text!");
        assert!(result.molds.is_empty());
        assert_eq!(keys(&result.discard), vec!["ns/plain/template.nja"]);
    }

    #[test]
    fn empty_marker_prefix_still_partitions() {
        let templates = map(&[("ns/m/template.nja", "/r/m/template.nja")]);
        let scripts = map(&[("ns/m/index.js", "/r/m/index.js")]);
        let result = partition(&templates, &scripts, "template.nja", "");
        assert_eq!(
            keys(&result.related["ns/m"]),
            vec!["ns/m/index.js", "ns/m/template.nja"]
        );
    }

    fn resource_names() -> impl Strategy<Value = Vec<String>> {
        let segment = prop::sample::select(vec!["a", "ab", "a.b", "b", "x_y", "template.nja", "index.js"]);
        prop::collection::vec(prop::collection::vec(segment, 1..4), 0..24).prop_map(|paths| {
            paths
                .into_iter()
                .map(|segments| segments.join("/"))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn partition_is_complete_and_disjoint(
            template_names in resource_names(),
            script_names in resource_names(),
        ) {
            let templates: ResourceMap = template_names
                .iter()
                .map(|n| (format!("text!ns/{n}"), PathBuf::from(format!("/r/{n}"))))
                .collect();
            let scripts: ResourceMap = script_names
                .iter()
                .map(|n| (format!("ns/{n}"), PathBuf::from(format!("/r/{n}"))))
                .collect();

            let result = partition(&templates, &scripts, "template.nja", "text!");

            let mut combined = templates.clone();
            combined.extend(scripts.clone());
            prop_assert_eq!(result.resource_count(), combined.len());

            let mut union = result.discard.clone();
            for related in result.related.values() {
                for (k, v) in related {
                    prop_assert!(union.insert(k.clone(), v.clone()).is_none(), "duplicate key {}", k);
                }
            }
            prop_assert_eq!(union, combined);

            for (mold_id, related) in &result.related {
                for key in related.keys() {
                    let bare = key.strip_prefix("text!").unwrap_or(key);
                    let dir = format!("{}/", mold_id);
                    prop_assert!(bare.starts_with(&dir), "{} outside {}", key, dir);
                }
                prop_assert!(result.molds.contains_key(mold_id));
            }
        }
    }
}
