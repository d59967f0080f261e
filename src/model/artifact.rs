//! The artifact aggregate and its reconciliation logic.

use crate::model::coordinate::Coordinate;
use crate::model::facts::{
    ArtifactFact, ConfiguredLicenseInformation, DeclaredLicenseInformation, Fact, FactKind,
    MergeOutcome, MergeRule, ObservedLicenseInformation, OverriddenLicenseInformation,
};
use crate::model::license::{LicenseInformation, LicenseOperator, LicenseStatement};
use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use thiserror::Error;

/// Boolean markers on an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFlag {
    Proprietary,
    IgnoreForDownload,
    IgnoreForSourceResolving,
}

impl ArtifactFlag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proprietary => "proprietary",
            Self::IgnoreForDownload => "ignore_for_download",
            Self::IgnoreForSourceResolving => "ignore_for_source_resolving",
        }
    }
}

/// How scalar facts are reconciled when a value is already present.
///
/// Only kinds whose own rule is [`MergeRule::Overwrite`] are affected;
/// union, multi-valued and ordered kinds keep their rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The incoming value silently replaces the existing one.
    #[default]
    Overwrite,
    /// The existing value stays; incoming values only fill gaps.
    KeepExisting,
    /// A differing incoming value is reported as a conflict.
    Strict,
}

impl MergePolicy {
    /// The effective merge rule for a fact kind under this policy.
    #[must_use]
    pub const fn rule_for(self, kind: FactKind) -> MergeRule {
        match (kind.merge_rule(), self) {
            (MergeRule::Overwrite, Self::KeepExisting) => MergeRule::KeepExisting,
            (MergeRule::Overwrite, Self::Strict) => MergeRule::RejectOnConflict,
            (rule, _) => rule,
        }
    }
}

/// An incoming fact that was rejected because it disagrees with the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting {kind}: kept '{existing}', rejected '{incoming}'")]
pub struct FactConflict {
    pub kind: FactKind,
    pub existing: ArtifactFact,
    pub incoming: ArtifactFact,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum FactSlot {
    One(ArtifactFact),
    Many(Vec<ArtifactFact>),
}

impl FactSlot {
    fn iter(&self) -> std::slice::Iter<'_, ArtifactFact> {
        match self {
            Self::One(fact) => std::slice::from_ref(fact).iter(),
            Self::Many(facts) => facts.iter(),
        }
    }

    fn first(&self) -> Option<&ArtifactFact> {
        self.iter().next()
    }

    fn same_contents(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::One(a), Self::One(b)) => a == b,
            _ => {
                let a: Vec<&ArtifactFact> = self.iter().collect();
                let b: Vec<&ArtifactFact> = other.iter().collect();
                a.len() == b.len() && a.iter().all(|fact| b.contains(fact))
            }
        }
    }
}

/// One third-party component as known to the pipeline.
///
/// An artifact holds a set of coordinates, at most one fact per
/// [`FactKind`] (multi-valued kinds accumulate distinct instances), boolean
/// flags and a free-text label naming the source that produced it.
///
/// Mutation is in place and not synchronised. Callers that need a snapshot
/// clone explicitly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Artifact {
    analysis_source: String,
    coordinates: IndexSet<Coordinate>,
    facts: IndexMap<FactKind, FactSlot>,
    flags: BTreeMap<ArtifactFlag, bool>,
    #[serde(skip)]
    merge_policy: MergePolicy,
}

impl Artifact {
    /// Create an empty artifact labelled with the source that produced it.
    pub fn new(analysis_source: impl Into<String>) -> Self {
        Self {
            analysis_source: analysis_source.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.merge_policy = policy;
    }

    #[must_use]
    pub const fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    #[must_use]
    pub fn analysis_source(&self) -> &str {
        &self.analysis_source
    }

    // ========================================================================
    // Facts
    // ========================================================================

    /// Insert a fact, or merge it with the stored fact of the same kind.
    ///
    /// Conflicts under [`MergePolicy::Strict`] keep the stored value and are
    /// logged; use [`Self::try_add_fact`] to observe them.
    pub fn add_fact(&mut self, fact: impl Into<ArtifactFact>) -> &mut Self {
        let result = self.try_add_fact(fact).map(|_| ());
        if let Err(conflict) = result {
            tracing::warn!("{}: {conflict}", self);
        }
        self
    }

    /// Insert a fact, or merge it with the stored fact of the same kind,
    /// reporting a rejected value.
    pub fn try_add_fact(
        &mut self,
        fact: impl Into<ArtifactFact>,
    ) -> Result<&mut Self, FactConflict> {
        let fact = fact.into();
        let kind = fact.kind();

        if kind.is_multi_valued() {
            match self.facts.get_mut(&kind) {
                Some(FactSlot::Many(existing)) => {
                    if !existing.contains(&fact) {
                        existing.push(fact);
                    }
                }
                _ => {
                    self.facts.insert(kind, FactSlot::Many(vec![fact]));
                }
            }
            return Ok(self);
        }

        let rule = self.merge_policy.rule_for(kind);
        let outcome = match self.facts.get(&kind).and_then(FactSlot::first) {
            None => MergeOutcome::Replace(fact),
            Some(existing) => fact.merge_with(existing, rule),
        };

        match outcome {
            MergeOutcome::Replace(merged) => {
                tracing::debug!("{kind}: storing '{merged}' ({rule:?})");
                self.facts.insert(kind, FactSlot::One(merged));
                Ok(self)
            }
            MergeOutcome::Keep => Ok(self),
            MergeOutcome::Conflict(incoming) => {
                let existing = self
                    .facts
                    .get(&kind)
                    .and_then(FactSlot::first)
                    .cloned()
                    .unwrap_or_else(|| incoming.clone());
                Err(FactConflict {
                    kind,
                    existing,
                    incoming,
                })
            }
        }
    }

    /// Store a fact regardless of merge rules and policy.
    ///
    /// For multi-valued kinds every stored instance is replaced by this one.
    pub fn override_fact(&mut self, fact: impl Into<ArtifactFact>) -> &mut Self {
        let fact = fact.into();
        let kind = fact.kind();
        let slot = if kind.is_multi_valued() {
            FactSlot::Many(vec![fact])
        } else {
            FactSlot::One(fact)
        };
        self.facts.insert(kind, slot);
        self
    }

    /// Remove every fact of a kind, returning what was stored.
    pub fn remove_facts(&mut self, kind: FactKind) -> Vec<ArtifactFact> {
        match self.facts.shift_remove(&kind) {
            Some(FactSlot::One(fact)) => vec![fact],
            Some(FactSlot::Many(facts)) => facts,
            None => Vec::new(),
        }
    }

    /// The fact of type `F`, or the first one for multi-valued kinds.
    #[must_use]
    pub fn ask_for<F: Fact>(&self) -> Option<&F> {
        self.fact(F::KIND).and_then(F::from_fact)
    }

    /// Payload of the fact of type `F`.
    #[must_use]
    pub fn ask_for_get<'a, F: Fact + 'a>(&'a self) -> Option<&'a F::Payload> {
        self.ask_for::<F>().map(F::payload)
    }

    /// Every fact of type `F`.
    #[must_use]
    pub fn ask_for_all<F: Fact>(&self) -> Vec<&F> {
        self.facts_of(F::KIND).filter_map(F::from_fact).collect()
    }

    /// The stored fact of a kind, or the first one for multi-valued kinds.
    #[must_use]
    pub fn fact(&self, kind: FactKind) -> Option<&ArtifactFact> {
        self.facts.get(&kind).and_then(FactSlot::first)
    }

    pub fn facts_of(&self, kind: FactKind) -> impl Iterator<Item = &ArtifactFact> {
        self.facts.get(&kind).into_iter().flat_map(FactSlot::iter)
    }

    /// All facts in insertion order of their kinds.
    pub fn facts(&self) -> impl Iterator<Item = &ArtifactFact> {
        self.facts.values().flat_map(FactSlot::iter)
    }

    #[must_use]
    pub fn has_fact(&self, kind: FactKind) -> bool {
        self.facts.contains_key(&kind)
    }

    /// Every license fact, whatever its kind.
    #[must_use]
    pub fn license_facts(&self) -> Vec<&ArtifactFact> {
        self.facts().filter(|fact| fact.kind().is_license()).collect()
    }

    /// The license that applies to the artifact.
    ///
    /// An overridden license wins, then a configured one. Otherwise declared
    /// and observed licenses are combined with `AND`.
    #[must_use]
    pub fn effective_license(&self) -> Option<LicenseInformation> {
        if let Some(overridden) = self
            .ask_for_get::<OverriddenLicenseInformation>()
            .filter(|license| !license.is_empty())
        {
            return Some(overridden.clone());
        }
        if let Some(configured) = self
            .ask_for_get::<ConfiguredLicenseInformation>()
            .filter(|license| !license.is_empty())
        {
            return Some(configured.clone());
        }

        let declared = self
            .ask_for_get::<DeclaredLicenseInformation>()
            .filter(|license| !license.is_empty());
        let observed = self
            .ask_for_get::<ObservedLicenseInformation>()
            .filter(|license| !license.is_empty());
        match (declared, observed) {
            (Some(declared), Some(observed)) if declared == observed => Some(declared.clone()),
            (Some(declared), Some(observed)) => Some(
                LicenseStatement::with_licenses(
                    vec![declared.clone(), observed.clone()],
                    LicenseOperator::And,
                )
                .into(),
            ),
            (Some(license), None) | (None, Some(license)) => Some(license.clone()),
            (None, None) => None,
        }
    }

    // ========================================================================
    // Flags
    // ========================================================================

    /// Flag value; unset flags read as `false`.
    #[must_use]
    pub fn flag(&self, flag: ArtifactFlag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, flag: ArtifactFlag, value: bool) -> &mut Self {
        self.flags.insert(flag, value);
        self
    }

    pub fn set_proprietary(&mut self, value: bool) -> &mut Self {
        self.set_flag(ArtifactFlag::Proprietary, value)
    }

    #[must_use]
    pub fn is_proprietary(&self) -> bool {
        self.flag(ArtifactFlag::Proprietary)
    }

    fn active_flags(&self) -> impl Iterator<Item = ArtifactFlag> + '_ {
        self.flags
            .iter()
            .filter(|(_, value)| **value)
            .map(|(flag, _)| *flag)
    }

    // ========================================================================
    // Coordinates
    // ========================================================================

    /// Add a coordinate; equal coordinates are stored once.
    pub fn add_coordinate(&mut self, coordinate: Coordinate) -> &mut Self {
        self.coordinates.insert(coordinate);
        self
    }

    #[must_use]
    pub fn coordinates(&self) -> &IndexSet<Coordinate> {
        &self.coordinates
    }

    /// The first coordinate in insertion order.
    #[must_use]
    pub fn main_coordinate(&self) -> Option<&Coordinate> {
        self.coordinates.first()
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Fold another record of the same component into this one.
    ///
    /// Every fact of `other` goes through [`Self::add_fact`], so `other`
    /// wins wherever the merge rule overwrites. Coordinates and flags are
    /// unioned. The merge is not atomic: facts are applied one by one.
    pub fn merge_with(&mut self, other: Artifact) -> &mut Self {
        tracing::debug!("merging {} into {}", other, self);
        let Artifact {
            coordinates,
            facts,
            flags,
            ..
        } = other;

        for coordinate in coordinates {
            self.coordinates.insert(coordinate);
        }
        for slot in facts.into_values() {
            match slot {
                FactSlot::One(fact) => {
                    self.add_fact(fact);
                }
                FactSlot::Many(many) => {
                    for fact in many {
                        self.add_fact(fact);
                    }
                }
            }
        }
        for (flag, value) in flags {
            let merged = self.flag(flag) || value;
            self.flags.insert(flag, merged);
        }
        self
    }

    /// Multi-line diagnostic rendering.
    #[must_use]
    pub fn pretty_print(&self) -> String {
        let mut out = String::from("Artifact");
        if !self.analysis_source.is_empty() {
            let _ = write!(out, " (from {})", self.analysis_source);
        }
        out.push('\n');

        if !self.coordinates.is_empty() {
            let coordinates: Vec<String> =
                self.coordinates.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "  Coordinates: {}", coordinates.join(", "));
        }
        for fact in self.facts() {
            let rendered = fact.to_string().replace('\n', " / ");
            let _ = writeln!(out, "  {}: {rendered}", fact.name());
        }
        let flags: Vec<&str> = self.active_flags().map(ArtifactFlag::as_str).collect();
        if !flags.is_empty() {
            let _ = writeln!(out, "  Flags: {}", flags.join(", "));
        }
        out
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(coordinate) = self.main_coordinate() {
            return write!(f, "{coordinate}");
        }
        match self
            .ask_for_all::<crate::model::facts::ArtifactFilename>()
            .iter()
            .find_map(|fact| fact.filename())
        {
            Some(filename) => write!(f, "{filename}"),
            None => write!(f, "<unidentified artifact>"),
        }
    }
}

// Coordinates compare as a set, multi-valued facts ignore order, unset and
// false flags are the same, and the source label is not identity.
impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        if self.coordinates.len() != other.coordinates.len()
            || !self
                .coordinates
                .iter()
                .all(|coordinate| other.coordinates.contains(coordinate))
        {
            return false;
        }

        if self.facts.len() != other.facts.len()
            || !self.facts.iter().all(|(kind, slot)| {
                other
                    .facts
                    .get(kind)
                    .is_some_and(|theirs| slot.same_contents(theirs))
            })
        {
            return false;
        }

        self.active_flags().eq(other.active_flags())
    }
}

impl Eq for Artifact {}
