// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical naming scheme for one declaration.
//!
//! Names are derived from the fragments a walk produces: the anchor module's
//! own dotted segments come first and are replaced by the declaration's
//! namespace prefix. The truncation offset depends only on the module depth,
//! so a prefix that differs from the module path acts as an alias.

use std::path::PathBuf;

use nunja_core::{ModuleLocator, PluginDeclaration};
use tracing::warn;

/// Naming functions bound to a single declaration.
#[derive(Debug, Clone)]
pub struct NamingScheme {
    declaration: PluginDeclaration,
    module_depth: usize,
    extension: String,
    marker_prefix: String,
}

impl NamingScheme {
    /// Build the scheme for `declaration`, appending `extension` to template
    /// names and prefixing them with `marker_prefix`.
    pub fn new(
        declaration: &PluginDeclaration,
        extension: impl Into<String>,
        marker_prefix: impl Into<String>,
    ) -> Self {
        Self {
            module_depth: declaration.anchor_module.split('.').count(),
            declaration: declaration.clone(),
            extension: extension.into(),
            marker_prefix: marker_prefix.into(),
        }
    }

    /// Logical name of a template file.
    pub fn template_name(&self, fragments: &[String]) -> String {
        format!(
            "{}{}{}",
            self.marker_prefix,
            self.script_name(fragments),
            self.extension
        )
    }

    /// Logical name of a script file.
    pub fn script_name(&self, fragments: &[String]) -> String {
        let rest = fragments.get(self.module_depth..).unwrap_or_default();
        std::iter::once(self.declaration.namespace_prefix.as_str())
            .chain(rest.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve the anchor directory of `declaration`.
    ///
    /// Returns `None` (with a warning) when the declaration is not the one
    /// this scheme was built for, has no single anchor segment, or its module
    /// cannot be located. Callers drop the declaration in that case.
    pub fn resolve_anchor(
        &self,
        locator: &dyn ModuleLocator,
        declaration: &PluginDeclaration,
    ) -> Option<PathBuf> {
        if declaration.anchor_module != self.declaration.anchor_module
            || declaration.namespace_prefix != self.declaration.namespace_prefix
        {
            warn!(
                expected = %self.declaration,
                got = %declaration,
                "naming scheme created for a different declaration; could not be located as a module"
            );
            return None;
        }

        let Some(segment) = declaration.anchor_segment() else {
            warn!(
                declaration = %declaration,
                "declaration does not name exactly one anchor directory"
            );
            return None;
        };

        match locator.locate(&declaration.anchor_module) {
            Some(dir) => Some(dir.join(segment)),
            None => {
                warn!(
                    module = %declaration.anchor_module,
                    declaration = %declaration,
                    "module does not appear to be a valid module"
                );
                None
            }
        }
    }

    pub fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    pub fn module_depth(&self) -> usize {
        self.module_depth
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;

    use tracing_test::traced_test;

    use super::*;

    fn frags(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    struct MapLocator(HashMap<String, PathBuf>);

    impl ModuleLocator for MapLocator {
        fn locate(&self, module: &str) -> Option<PathBuf> {
            self.0.get(module).cloned()
        }
    }

    #[test]
    fn template_name_replaces_module_path_with_prefix() {
        let decl: PluginDeclaration = "example.package.mold = example.package:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".tmpl", "text!");
        let name = scheme.template_name(&frags(&["example", "package", "table", "template"]));
        assert_eq!(name, "text!example.package.mold/table/template.tmpl");
    }

    #[test]
    fn script_name_has_no_marker_or_extension() {
        let decl: PluginDeclaration = "example.package.mold = example.package:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".tmpl", "text!");
        let name = scheme.script_name(&frags(&["example", "package", "table", "index"]));
        assert_eq!(name, "example.package.mold/table/index");
    }

    #[test]
    fn alias_prefix_is_used_instead_of_module_path() {
        let decl: PluginDeclaration = "example.mold = example.package:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".tmpl", "text!");
        assert_eq!(scheme.module_depth(), 2);
        assert_eq!(
            scheme.template_name(&frags(&["example", "package", "table", "template"])),
            "text!example.mold/table/template.tmpl"
        );
        assert_eq!(
            scheme.script_name(&frags(&["example", "package", "table", "index"])),
            "example.mold/table/index"
        );
    }

    #[test]
    fn short_fragment_list_yields_bare_prefix() {
        let decl: PluginDeclaration = "ns = a.b.c:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".nja", "text!");
        assert_eq!(scheme.script_name(&frags(&["a"])), "ns");
    }

    #[test]
    fn resolve_anchor_joins_subpath() {
        let decl: PluginDeclaration = "nunjatest = nunja.testing:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".nja", "text!");
        let locator = MapLocator(HashMap::from([(
            "nunja.testing".to_string(),
            PathBuf::from("/site/nunja/testing"),
        )]));
        let anchor = scheme.resolve_anchor(&locator, &decl).unwrap();
        assert_eq!(anchor, Path::new("/site/nunja/testing/mold"));
    }

    #[test]
    #[traced_test]
    fn resolve_anchor_unknown_module_is_none() {
        let decl: PluginDeclaration = "example.mold = example.package:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".nja", "text!");
        let locator = MapLocator(HashMap::new());
        assert!(scheme.resolve_anchor(&locator, &decl).is_none());
        assert!(logs_contain("does not appear to be a valid module"));
    }

    #[test]
    #[traced_test]
    fn resolve_anchor_mismatched_declaration_is_none() {
        let decl1: PluginDeclaration = "example.mold = example.package1:mold".parse().unwrap();
        let decl2: PluginDeclaration = "example.mold = example.package2:mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl1, ".nja", "text!");
        let locator = MapLocator(HashMap::from([
            ("example.package1".to_string(), PathBuf::from("/p1")),
            ("example.package2".to_string(), PathBuf::from("/p2")),
        ]));
        assert!(scheme.resolve_anchor(&locator, &decl2).is_none());
        assert!(logs_contain("could not be located as a module"));
        assert!(scheme.resolve_anchor(&locator, &decl1).is_some());
    }

    #[test]
    fn resolve_anchor_requires_single_segment() {
        let decl: PluginDeclaration = "ns = nunja:testing.mold".parse().unwrap();
        let scheme = NamingScheme::new(&decl, ".nja", "text!");
        let locator = MapLocator(HashMap::from([("nunja".to_string(), PathBuf::from("/n"))]));
        assert!(scheme.resolve_anchor(&locator, &decl).is_none());
    }
}
