//! Merge-target lookup.
//!
//! Incoming records are folded into the first known artifact that shares a
//! coordinate with them. Records without a match are appended.

use crate::model::{find_first_match_mut, Artifact, ArtifactCoordinates, MergePolicy};

/// Where an incoming record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Merged into the artifact at this index
    Merged(usize),
    /// Appended at this index
    Added(usize),
}

/// Counters over a batch of incoming records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub merged: usize,
}

impl ReconcileSummary {
    fn record(&mut self, outcome: ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Merged(_) => self.merged += 1,
            ReconcileOutcome::Added(_) => self.added += 1,
        }
    }
}

/// Merge `incoming` into the first artifact sharing one of its coordinates,
/// or append it.
pub fn reconcile_into(artifacts: &mut Vec<Artifact>, incoming: Artifact) -> ReconcileOutcome {
    let coordinates = ArtifactCoordinates::from_artifact(&incoming);
    match find_first_match_mut(&coordinates, artifacts) {
        Some((index, target)) => {
            target.merge_with(incoming);
            ReconcileOutcome::Merged(index)
        }
        None => {
            artifacts.push(incoming);
            ReconcileOutcome::Added(artifacts.len() - 1)
        }
    }
}

/// Reconcile a batch of records, in order.
pub fn reconcile_all<I>(artifacts: &mut Vec<Artifact>, incoming: I) -> ReconcileSummary
where
    I: IntoIterator<Item = Artifact>,
{
    let mut summary = ReconcileSummary::default();
    for artifact in incoming {
        summary.record(reconcile_into(artifacts, artifact));
    }
    summary
}

/// Combine artifact lists from several sources into one.
///
/// Sources are applied in order, so with [`MergePolicy::Overwrite`] later
/// sources win conflicting scalar facts.
pub fn merge_sources<I>(sources: I, policy: MergePolicy) -> (Vec<Artifact>, ReconcileSummary)
where
    I: IntoIterator<Item = Vec<Artifact>>,
{
    let mut merged: Vec<Artifact> = Vec::new();
    let mut summary = ReconcileSummary::default();
    for source in sources {
        let incoming = source
            .into_iter()
            .map(|artifact| artifact.with_merge_policy(policy));
        let batch = reconcile_all(&mut merged, incoming);
        summary.added += batch.added;
        summary.merged += batch.merged;
    }
    tracing::info!(
        "Reconciled {} records into {} artifacts ({} merged)",
        summary.added + summary.merged,
        merged.len(),
        summary.merged
    );
    (merged, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactSourceUrl, Coordinate};

    fn artifact(name: &str, url: &str) -> Artifact {
        let mut artifact = Artifact::new("test");
        artifact
            .add_coordinate(Coordinate::of("maven", "org.example", name, "1.0"))
            .add_fact(ArtifactSourceUrl::new(url));
        artifact
    }

    #[test]
    fn test_reconcile_merges_on_shared_coordinate() {
        let mut artifacts = vec![artifact("a", "https://one.example")];
        let outcome = reconcile_into(&mut artifacts, artifact("a", "https://two.example"));

        assert_eq!(outcome, ReconcileOutcome::Merged(0));
        assert_eq!(artifacts.len(), 1);
        assert_eq!(
            artifacts[0].ask_for_get::<ArtifactSourceUrl>(),
            Some("https://two.example")
        );
    }

    #[test]
    fn test_reconcile_appends_unknown() {
        let mut artifacts = vec![artifact("a", "https://one.example")];
        let summary = reconcile_all(
            &mut artifacts,
            vec![artifact("b", "https://b.example"), artifact("a", "https://a.example")],
        );
        assert_eq!(summary, ReconcileSummary { added: 1, merged: 1 });
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_records_without_coordinates_never_merge() {
        let mut artifacts = vec![Artifact::new("x")];
        let outcome = reconcile_into(&mut artifacts, Artifact::new("y"));
        assert_eq!(outcome, ReconcileOutcome::Added(1));
    }

    #[test]
    fn test_merge_sources_respects_policy() {
        let first = vec![artifact("a", "https://first.example")];
        let second = vec![artifact("a", "https://second.example")];

        let (merged, _) =
            merge_sources(vec![first.clone(), second.clone()], MergePolicy::KeepExisting);
        assert_eq!(
            merged[0].ask_for_get::<ArtifactSourceUrl>(),
            Some("https://first.example")
        );

        let (merged, summary) = merge_sources(vec![first, second], MergePolicy::Overwrite);
        assert_eq!(
            merged[0].ask_for_get::<ArtifactSourceUrl>(),
            Some("https://second.example")
        );
        assert_eq!(summary.merged, 1);
    }
}
