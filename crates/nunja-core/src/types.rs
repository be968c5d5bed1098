// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, configuration, and CLI crates.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::NunjaError;

/// Mapping from logical name to absolute filesystem path.
///
/// Ordered so iteration follows the sorted-key order the partitioner relies on.
pub type ResourceMap = BTreeMap<String, PathBuf>;

/// Which registry family a declaration group feeds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Molds: a template plus companion scripts per directory.
    Mold,
    /// Server-side only templates.
    Template,
}

impl RegistryKind {
    /// Default registry name for this kind.
    pub fn default_registry_name(self) -> &'static str {
        match self {
            RegistryKind::Mold => "nunja.mold",
            RegistryKind::Template => "nunja.tmpl",
        }
    }
}

/// Which files a resource walk keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// Only files ending with the extension; the extension is stripped from
    /// the final fragment handed to the naming function.
    Only(String),
    /// Every file not ending with the extension, names untouched.
    Except(String),
}

/// One contributor's resource tree, in entry-point form:
/// `<namespace_prefix> = <anchor.module>:<anchor_subpath>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginDeclaration {
    /// Logical name the anchor directory is exposed under.
    pub namespace_prefix: String,
    /// Dotted module reference whose directory holds the anchor.
    pub anchor_module: String,
    /// Attribute segments after the `:`. Registries require exactly one.
    pub anchor_subpath: Vec<String>,
    /// Distribution that contributed the declaration, if known.
    #[serde(default)]
    pub package: Option<String>,
}

impl PluginDeclaration {
    pub fn new(
        namespace_prefix: impl Into<String>,
        anchor_module: impl Into<String>,
        anchor_subpath: impl Into<String>,
    ) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
            anchor_module: anchor_module.into(),
            anchor_subpath: vec![anchor_subpath.into()],
            package: None,
        }
    }

    /// Attach the contributing package name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// The single anchor segment, if the declaration has exactly one.
    pub fn anchor_segment(&self) -> Option<&str> {
        match self.anchor_subpath.as_slice() {
            [segment] => Some(segment.as_str()),
            _ => None,
        }
    }

    /// Dotted segments of the anchor module.
    pub fn module_segments(&self) -> Vec<String> {
        self.anchor_module.split('.').map(str::to_string).collect()
    }

    /// Package name for log output.
    pub fn package_label(&self) -> &str {
        self.package.as_deref().unwrap_or("<unknown>")
    }
}

impl fmt::Display for PluginDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.namespace_prefix, self.anchor_module)?;
        if !self.anchor_subpath.is_empty() {
            write!(f, ":{}", self.anchor_subpath.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for PluginDeclaration {
    type Err = NunjaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| NunjaError::InvalidDeclaration {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (name, target) = input
            .split_once('=')
            .ok_or_else(|| invalid("expected '<prefix> = <module>[:<attr>]'"))?;

        let namespace_prefix = name.trim();
        if namespace_prefix.is_empty() {
            return Err(invalid("namespace prefix must not be empty"));
        }
        if namespace_prefix.contains(['/', '\\']) || namespace_prefix.contains(char::is_whitespace)
        {
            return Err(invalid(
                "namespace prefix must be a single segment without whitespace",
            ));
        }

        let target = target.trim();
        let (module, attrs) = match target.split_once(':') {
            Some((module, attrs)) => (module.trim(), Some(attrs.trim())),
            None => (target, None),
        };

        if module.is_empty() || module.split('.').any(|s| !is_identifier(s)) {
            return Err(invalid("module must be a dotted identifier path"));
        }

        let anchor_subpath = match attrs {
            None => Vec::new(),
            Some(attrs) => {
                let segments: Vec<String> = attrs.split('.').map(str::to_string).collect();
                if segments.iter().any(|s| !is_identifier(s)) {
                    return Err(invalid("attributes must be dotted identifiers"));
                }
                segments
            }
        };

        Ok(PluginDeclaration {
            namespace_prefix: namespace_prefix.to_string(),
            anchor_module: module.to_string(),
            anchor_subpath,
            package: None,
        })
    }
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_declaration() {
        let decl: PluginDeclaration = "nunja.testing.mold = nunja.testing:mold".parse().unwrap();
        assert_eq!(decl.namespace_prefix, "nunja.testing.mold");
        assert_eq!(decl.anchor_module, "nunja.testing");
        assert_eq!(decl.anchor_subpath, vec!["mold"]);
        assert_eq!(decl.anchor_segment(), Some("mold"));
        assert_eq!(decl.module_segments(), vec!["nunja", "testing"]);
    }

    #[test]
    fn parse_without_attrs_has_no_anchor_segment() {
        let decl: PluginDeclaration = "nunja.testing.mold1 = nunja.testing".parse().unwrap();
        assert!(decl.anchor_subpath.is_empty());
        assert_eq!(decl.anchor_segment(), None);
    }

    #[test]
    fn parse_nested_attrs_has_no_anchor_segment() {
        let decl: PluginDeclaration = "nunja.testing.mold2 = nunja:testing.mold".parse().unwrap();
        assert_eq!(decl.anchor_subpath, vec!["testing", "mold"]);
        assert_eq!(decl.anchor_segment(), None);
    }

    #[test]
    fn display_reproduces_textual_form() {
        for input in [
            "ntm = nunja.testing:mold",
            "nunja.testing.mold1 = nunja.testing",
            "nunja.testing.mold2 = nunja:testing.mold",
        ] {
            let decl: PluginDeclaration = input.parse().unwrap();
            assert_eq!(decl.to_string(), input);
        }
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in [
            "no equals sign",
            " = nunja:mold",
            "a/b = nunja:mold",
            "ns = ",
            "ns = nunja..testing:mold",
            "ns = nunja:",
            "ns = nunja:mold.",
        ] {
            let err = input.parse::<PluginDeclaration>().unwrap_err();
            assert!(
                matches!(err, NunjaError::InvalidDeclaration { .. }),
                "expected InvalidDeclaration for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn new_builds_single_segment_declaration() {
        let decl = PluginDeclaration::new("acme.widgets", "acme.widgets", "molds")
            .with_package("acme");
        assert_eq!(decl.anchor_segment(), Some("molds"));
        assert_eq!(decl.package_label(), "acme");
        assert_eq!(decl.to_string(), "acme.widgets = acme.widgets:molds");
    }

    #[test]
    fn registry_kind_round_trip() {
        assert_eq!(RegistryKind::Mold.to_string(), "mold");
        assert_eq!("template".parse::<RegistryKind>().unwrap(), RegistryKind::Template);
        assert_eq!(RegistryKind::Mold.default_registry_name(), "nunja.mold");
        assert_eq!(RegistryKind::Template.default_registry_name(), "nunja.tmpl");
    }
}
