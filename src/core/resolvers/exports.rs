// src/core/resolvers/exports.rs

use super::{ResolutionScope, ReverseResolver};
use crate::cloud::{self, CloudError};
use crate::models::Export;
use std::collections::HashMap;

/// Recognises values published as account-wide exports.
///
/// The export listing is fetched on first use and kept for the resolver's lifetime.
#[derive(Debug, Default)]
pub struct ExportResolver {
    exports: Option<HashMap<String, String>>,
}

impl ExportResolver {
    /// Exports are tried first.
    pub const PRECEDENCE: u8 = 10;

    /// A resolver with nothing fetched yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `value -> !stack_export NAME`. The first export of a value wins.
    fn build_lookup(exports: Vec<Export>) -> HashMap<String, String> {
        let mut lookup = HashMap::new();
        for export in exports {
            if lookup.contains_key(&export.value) {
                log::warn!(
                    "Skipping {} export reverse lookup. Duplicate Value={}",
                    export.name,
                    export.value
                );
                continue;
            }
            lookup.insert(export.value, format!("!stack_export {}", export.name));
        }
        log::debug!("Exports: {:?}", lookup);
        lookup
    }
}

impl ReverseResolver for ExportResolver {
    fn name(&self) -> &str {
        "stack_export"
    }

    fn precedence(&self) -> u8 {
        Self::PRECEDENCE
    }

    fn suggest(
        &mut self,
        value: &str,
        scope: &ResolutionScope<'_>,
    ) -> Result<Option<String>, CloudError> {
        if self.exports.is_none() {
            log::debug!("Collecting exports...");
            let exports = cloud::list_all_exports(scope.client)?;
            self.exports = Some(Self::build_lookup(exports));
        }
        Ok(self
            .exports
            .as_ref()
            .and_then(|exports| exports.get(value))
            .cloned())
    }
}
