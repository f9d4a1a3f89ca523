//! Hierarchical trace: per-group calibration parameters.

use super::{McmcTrace, TraceTable, GROUP_SEPARATOR};
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::warn;

/// MCMC draws for a hierarchical calibration model.
///
/// Columns are named `{param}__{group}`. The distinct group keys are
/// scanned once at construction and cached.
#[derive(Debug, Clone)]
pub struct HierarchicalTrace {
    table: TraceTable,
    groups: Vec<String>,
}

impl HierarchicalTrace {
    /// Wrap a trace table holding group-namespaced draws.
    #[must_use]
    pub fn new(table: TraceTable) -> Self {
        let groups = table
            .column_names()
            .filter_map(|name| {
                name.rsplit_once(GROUP_SEPARATOR)
                    .map(|(_, group)| group.to_string())
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { table, groups }
    }

    /// Group keys present in the table, sorted
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Copy of the draws for `param` within `group`.
    ///
    /// # Errors
    ///
    /// - [`Error::BadGroup`] if `param` exists for other groups only
    /// - [`Error::KeyNotFound`] if `param` does not exist at all
    pub fn grab(&self, param: &str, group: &str) -> Result<Vec<f64>> {
        let key = format!("{param}{GROUP_SEPARATOR}{group}");
        if let Some(draws) = self.table.column(&key) {
            return Ok(draws);
        }

        let prefix = format!("{param}{GROUP_SEPARATOR}");
        if self
            .table
            .column_names()
            .any(|name| name.starts_with(&prefix))
        {
            warn!(param, group, valid = ?self.groups, "unknown group key");
            return Err(Error::BadGroup {
                group: group.to_string(),
                valid: self.groups.clone(),
            });
        }

        Err(Error::KeyNotFound(key))
    }
}

impl McmcTrace for HierarchicalTrace {
    fn grab(&self, param: &str, group: Option<&str>) -> Result<Vec<f64>> {
        let group = group.ok_or_else(|| Error::MissingGroup(param.to_string()))?;
        Self::grab(self, param, group)
    }

    fn draw_count(&self) -> usize {
        self.table.draw_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchical() -> HierarchicalTrace {
        HierarchicalTrace::new(
            TraceTable::from_columns([
                ("a__G. ruber white", vec![1.0, 1.1]),
                ("b__G. ruber white", vec![2.0, 2.1]),
                ("tau__G. ruber white", vec![3.0, 3.1]),
                ("a__N. incompta", vec![4.0, 4.1]),
                ("b__N. incompta", vec![5.0, 5.1]),
                ("tau__N. incompta", vec![6.0, 6.1]),
                ("mu_a", vec![0.0, 0.0]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_groups_discovered_once_and_sorted() {
        assert_eq!(hierarchical().groups(), ["G. ruber white", "N. incompta"]);
    }

    #[test]
    fn test_grab_per_group() {
        let trace = hierarchical();
        assert_eq!(trace.grab("b", "N. incompta").unwrap(), vec![5.0, 5.1]);
        assert_eq!(trace.grab("tau", "G. ruber white").unwrap(), vec![3.0, 3.1]);
    }

    #[test]
    fn test_bad_group_lists_valid_groups() {
        let err = hierarchical().grab("a", "foobar").unwrap_err();
        match &err {
            Error::BadGroup { group, valid } => {
                assert_eq!(group, "foobar");
                assert_eq!(valid, &["G. ruber white", "N. incompta"]);
            }
            other => panic!("expected BadGroup, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("foobar"));
        assert!(message.contains("G. ruber white, N. incompta"));
    }

    #[test]
    fn test_unknown_param_is_key_not_found() {
        let err = hierarchical().grab("sigma", "N. incompta").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(ref key) if key == "sigma__N. incompta"));
    }

    #[test]
    fn test_prefix_match_is_anchored() {
        // `a__` appears inside `tau__...` but `a` itself is the only match that counts
        let trace = HierarchicalTrace::new(
            TraceTable::from_columns([("tau__x", vec![1.0])]).unwrap(),
        );
        assert!(matches!(trace.grab("a", "y"), Err(Error::KeyNotFound(_))));
        assert!(matches!(trace.grab("tau", "y"), Err(Error::BadGroup { .. })));
    }

    #[test]
    fn test_trait_requires_group() {
        let trace = hierarchical();
        assert!(matches!(
            McmcTrace::grab(&trace, "a", None),
            Err(Error::MissingGroup(_))
        ));
        assert_eq!(
            McmcTrace::grab(&trace, "a", Some("N. incompta")).unwrap(),
            vec![4.0, 4.1]
        );
    }
}
