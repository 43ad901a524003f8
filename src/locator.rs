use std::collections::HashSet;

use tracing::debug;

use crate::config::SelectorConfig;
use crate::document::{Document, Node, Pattern};
use crate::error::Result;

/// Finds the per-film blocks ("candidates") on a listing page.
#[derive(Debug, Clone)]
pub struct ContainerLocator {
    containers: Vec<Pattern>,
    fallback_column: Pattern,
    title_marker: Pattern,
}

impl ContainerLocator {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        let containers = config
            .containers
            .iter()
            .map(|s| Pattern::parse(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            containers,
            fallback_column: Pattern::parse(&config.fallback_column)?,
            title_marker: Pattern::parse(&config.title_marker)?,
        })
    }

    /// Candidate blocks de-duplicated by node identity, returned in document order.
    ///
    /// Every configured container pattern contributes its matches. On top of
    /// that, any fallback column holding a title marker is a candidate too,
    /// which keeps the scan working when the card classes drift. A column is
    /// only passed over when one of its descendants is already a candidate.
    pub fn locate<'a>(&self, document: &'a Document) -> Vec<Node<'a>> {
        let root = document.root();
        let mut seen = HashSet::new();

        for pattern in &self.containers {
            let found = root.select_all(pattern);
            debug!("selector {} matched {} nodes", pattern.as_str(), found.len());
            for node in found {
                seen.insert(node.element().id());
            }
        }

        let columns: Vec<Node<'a>> = root
            .select_all(&self.fallback_column)
            .into_iter()
            .filter(|column| column.first_match(&self.title_marker).is_some())
            .collect();
        let column_ids: HashSet<_> = columns.iter().map(|c| c.element().id()).collect();

        let mut fallback = 0usize;
        for column in columns {
            // Wrapper around cards that are candidates already.
            let wraps_candidate = column.descendants().any(|d| {
                let id = d.element().id();
                seen.contains(&id) || column_ids.contains(&id)
            });
            if !wraps_candidate && seen.insert(column.element().id()) {
                fallback += 1;
            }
        }
        if fallback > 0 {
            debug!("fallback scan added {} columns", fallback);
        }

        document
            .elements()
            .filter(|node| seen.contains(&node.element().id()))
            .collect()
    }
}
