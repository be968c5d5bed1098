// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarations read from configuration.

use nunja_config::model::DeclarationsConfig;
use nunja_core::{PluginDeclaration, RegistryKind};
use tracing::warn;

/// Ordered declaration lists per registry kind.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSource {
    package: Option<String>,
    mold: Vec<String>,
    template: Vec<String>,
}

impl DeclarationSource {
    pub fn from_config(config: &DeclarationsConfig) -> Self {
        Self {
            package: config.package.clone(),
            mold: config.mold.clone(),
            template: config.template.clone(),
        }
    }

    /// Parsed declarations for `kind`, in configuration order.
    ///
    /// Entries that fail to parse are logged and skipped.
    pub fn declarations(&self, kind: RegistryKind) -> Vec<PluginDeclaration> {
        let raw = match kind {
            RegistryKind::Mold => &self.mold,
            RegistryKind::Template => &self.template,
        };
        raw.iter()
            .filter_map(|entry| match entry.parse::<PluginDeclaration>() {
                Ok(decl) => Some(match &self.package {
                    Some(package) => decl.with_package(package.clone()),
                    None => decl,
                }),
                Err(e) => {
                    warn!(entry = %entry, kind = %kind, error = %e, "skipping unparsable declaration");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn parses_in_order_and_skips_bad_entries() {
        let config = DeclarationsConfig {
            package: Some("acme-widgets".into()),
            mold: vec![
                "acme.widgets = acme.widgets:molds".into(),
                "no equals sign".into(),
                "acme.extra = acme.extra:molds".into(),
            ],
            template: vec!["acme.tmpl = acme.widgets:tmpl".into()],
        };
        let source = DeclarationSource::from_config(&config);

        let molds = source.declarations(RegistryKind::Mold);
        assert_eq!(molds.len(), 2);
        assert_eq!(molds[0].namespace_prefix, "acme.widgets");
        assert_eq!(molds[1].namespace_prefix, "acme.extra");
        assert_eq!(molds[0].package_label(), "acme-widgets");
        assert!(logs_contain("skipping unparsable declaration"));

        let templates = source.declarations(RegistryKind::Template);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].anchor_segment(), Some("tmpl"));
    }
}
