//! Configuration-driven edits to an artifact list.
//!
//! Each handler applies one section of [`AntennaConfig`]. Selectors and
//! templates are compiled when a handler is built, so a handler that exists
//! can always run.

use crate::config::{
    AntennaConfig, ArtifactTemplate, OverrideRule, SelectorConfig, CONFIGURATION_SOURCE,
};
use crate::error::{ErrorContext, OptionContext, Result};
use crate::model::{
    parse_license_expression, Artifact, ArtifactChangeStatus, ArtifactClearingState, ArtifactCpe,
    ArtifactFact, ArtifactFilename, ArtifactFlag, ArtifactMatcher, ArtifactMatchingMetadata,
    ArtifactReleaseTagUrl, ArtifactSelector, ArtifactSoftwareHeritageId, ArtifactSourceUrl,
    ConfiguredLicenseInformation, Coordinate, CopyrightStatement, DeclaredLicenseInformation,
    LicenseInformation, MatchState, ObservedLicenseInformation, OverriddenLicenseInformation,
};

/// One configuration step over the artifact list.
pub trait ConfigurationHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the step, returning how many artifacts were touched.
    fn process(&self, artifacts: &mut Vec<Artifact>) -> usize;
}

// ============================================================================
// Compiled templates
// ============================================================================

/// Coordinates, facts and flags taken from an [`ArtifactTemplate`].
#[derive(Debug, Clone, Default)]
pub struct ArtifactPatch {
    coordinates: Vec<Coordinate>,
    facts: Vec<ArtifactFact>,
    flags: Vec<(ArtifactFlag, bool)>,
}

impl ArtifactPatch {
    /// Parse every value of a template.
    pub fn from_template(template: &ArtifactTemplate) -> Result<Self> {
        let mut patch = Self::default();

        for raw in &template.coordinates {
            let coordinate =
                Coordinate::parse(raw).with_context(|| format!("coordinate '{raw}'"))?;
            patch.coordinates.push(coordinate);
        }

        match (&template.filename, &template.hash) {
            (Some(name), Some(hash)) => patch.push(ArtifactFilename::with_hash(name, hash)),
            (Some(name), None) => patch.push(ArtifactFilename::new(name)),
            (None, Some(hash)) => patch.push(ArtifactFilename::hash_only(hash)),
            (None, None) => {}
        }

        if let Some(expression) = &template.declared_license {
            patch.push(DeclaredLicenseInformation::new(license(expression)?));
        }
        if let Some(expression) = &template.observed_license {
            patch.push(ObservedLicenseInformation::new(license(expression)?));
        }
        if let Some(expression) = &template.overridden_license {
            patch.push(OverriddenLicenseInformation::new(license(expression)?));
        }
        if let Some(expression) = &template.configured_license {
            patch.push(ConfiguredLicenseInformation::new(license(expression)?));
        }
        if let Some(copyrights) = &template.copyrights {
            patch.push(CopyrightStatement::new(copyrights));
        }
        if let Some(url) = &template.source_url {
            patch.push(ArtifactSourceUrl::new(url.as_str()));
        }
        if let Some(url) = &template.release_tag_url {
            patch.push(ArtifactReleaseTagUrl::new(url.as_str()));
        }
        if let Some(id) = &template.software_heritage_id {
            patch.push(ArtifactSoftwareHeritageId::new(id)?);
        }
        if let Some(state) = template.clearing_state {
            patch.push(ArtifactClearingState::new(state));
        }
        if let Some(status) = template.change_status {
            patch.push(ArtifactChangeStatus::new(status));
        }
        if let Some(cpe) = &template.cpe {
            let fact = ArtifactCpe::parse(cpe)
                .with_context_none(|| format!("'{cpe}' is not a CPE identifier"))?;
            patch.push(fact);
        }

        if let Some(value) = template.proprietary {
            patch.flags.push((ArtifactFlag::Proprietary, value));
        }
        if let Some(value) = template.ignore_for_download {
            patch.flags.push((ArtifactFlag::IgnoreForDownload, value));
        }

        Ok(patch)
    }

    fn push(&mut self, fact: impl Into<ArtifactFact>) {
        self.facts.push(fact.into());
    }

    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    #[must_use]
    pub fn facts(&self) -> &[ArtifactFact] {
        &self.facts
    }

    /// Force the patch onto an artifact, replacing stored values.
    pub fn apply_override(&self, artifact: &mut Artifact) {
        for coordinate in &self.coordinates {
            artifact.add_coordinate(coordinate.clone());
        }
        for fact in &self.facts {
            artifact.override_fact(fact.clone());
        }
        for &(flag, value) in &self.flags {
            artifact.set_flag(flag, value);
        }
    }

    /// A fresh artifact carrying the patch.
    #[must_use]
    pub fn to_artifact(&self, analysis_source: &str) -> Artifact {
        let mut artifact = Artifact::new(analysis_source);
        artifact.add_fact(ArtifactMatchingMetadata::new(MatchState::Exact));
        self.apply_override(&mut artifact);
        artifact
    }
}

fn license(expression: &str) -> Result<LicenseInformation> {
    parse_license_expression(expression).with_context(|| format!("license '{expression}'"))
}

fn compile_override(rule: &OverrideRule) -> Result<(ArtifactSelector, ArtifactPatch)> {
    Ok((rule.selector.to_selector()?, ArtifactPatch::from_template(&rule.set)?))
}

fn compile_selectors(selectors: &[SelectorConfig]) -> Result<Vec<ArtifactSelector>> {
    selectors.iter().map(SelectorConfig::to_selector).collect()
}

fn matches_any(selectors: &[ArtifactSelector], artifact: &Artifact) -> bool {
    selectors.iter().any(|selector| selector.matches(artifact))
}

// ============================================================================
// Handlers
// ============================================================================

/// Forces configured facts onto matching artifacts.
#[derive(Debug, Clone)]
pub struct OverrideHandler {
    rules: Vec<(ArtifactSelector, ArtifactPatch)>,
}

impl OverrideHandler {
    pub fn new(config: &AntennaConfig) -> Result<Self> {
        let rules = config
            .overrides
            .iter()
            .enumerate()
            .map(|(idx, rule)| compile_override(rule).with_context(|| format!("overrides[{idx}]")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }
}

impl ConfigurationHandler for OverrideHandler {
    fn name(&self) -> &'static str {
        "override"
    }

    fn process(&self, artifacts: &mut Vec<Artifact>) -> usize {
        let mut touched = 0;
        for artifact in artifacts.iter_mut() {
            let mut matched = false;
            for (selector, patch) in &self.rules {
                if selector.matches(artifact) {
                    tracing::debug!("Overriding facts of {artifact} ({selector})");
                    patch.apply_override(artifact);
                    matched = true;
                }
            }
            touched += usize::from(matched);
        }
        touched
    }
}

/// Appends artifacts declared in configuration.
#[derive(Debug, Clone)]
pub struct AddHandler {
    additions: Vec<ArtifactPatch>,
}

impl AddHandler {
    pub fn new(config: &AntennaConfig) -> Result<Self> {
        let additions = config
            .additions
            .iter()
            .enumerate()
            .map(|(idx, template)| {
                ArtifactPatch::from_template(template).with_context(|| format!("additions[{idx}]"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { additions })
    }
}

impl ConfigurationHandler for AddHandler {
    fn name(&self) -> &'static str {
        "add"
    }

    fn process(&self, artifacts: &mut Vec<Artifact>) -> usize {
        for patch in &self.additions {
            let artifact = patch.to_artifact(CONFIGURATION_SOURCE);
            tracing::debug!("Adding configured artifact {artifact}");
            artifacts.push(artifact);
        }
        self.additions.len()
    }
}

/// Drops artifacts matched by any removal selector.
#[derive(Debug, Clone)]
pub struct RemoveHandler {
    selectors: Vec<ArtifactSelector>,
}

impl RemoveHandler {
    pub fn new(config: &AntennaConfig) -> Result<Self> {
        let selectors = compile_selectors(&config.removals).context("removals")?;
        Ok(Self { selectors })
    }
}

impl ConfigurationHandler for RemoveHandler {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn process(&self, artifacts: &mut Vec<Artifact>) -> usize {
        let before = artifacts.len();
        artifacts.retain(|artifact| {
            let remove = matches_any(&self.selectors, artifact);
            if remove {
                tracing::debug!("Removing {artifact}");
            }
            !remove
        });
        before - artifacts.len()
    }
}

/// Marks matching artifacts as not to be downloaded.
#[derive(Debug, Clone)]
pub struct IgnoreForDownloadHandler {
    selectors: Vec<ArtifactSelector>,
}

impl IgnoreForDownloadHandler {
    pub fn new(config: &AntennaConfig) -> Result<Self> {
        let selectors =
            compile_selectors(&config.ignore_for_download).context("ignore_for_download")?;
        Ok(Self { selectors })
    }
}

impl ConfigurationHandler for IgnoreForDownloadHandler {
    fn name(&self) -> &'static str {
        "ignore-for-download"
    }

    fn process(&self, artifacts: &mut Vec<Artifact>) -> usize {
        let mut touched = 0;
        for artifact in artifacts.iter_mut() {
            if matches_any(&self.selectors, artifact) {
                artifact.set_flag(ArtifactFlag::IgnoreForDownload, true);
                touched += 1;
            }
        }
        touched
    }
}

// ============================================================================
// Running a configuration
// ============================================================================

/// Handlers for every non-empty configuration section, in application
/// order: removals, overrides, additions, ignore-for-download.
pub fn handlers_from_config(config: &AntennaConfig) -> Result<Vec<Box<dyn ConfigurationHandler>>> {
    let mut handlers: Vec<Box<dyn ConfigurationHandler>> = Vec::new();
    if !config.removals.is_empty() {
        handlers.push(Box::new(RemoveHandler::new(config)?));
    }
    if !config.overrides.is_empty() {
        handlers.push(Box::new(OverrideHandler::new(config)?));
    }
    if !config.additions.is_empty() {
        handlers.push(Box::new(AddHandler::new(config)?));
    }
    if !config.ignore_for_download.is_empty() {
        handlers.push(Box::new(IgnoreForDownloadHandler::new(config)?));
    }
    Ok(handlers)
}

/// Apply every configured handler, returning the total number of artifacts
/// touched.
pub fn apply_configuration(artifacts: &mut Vec<Artifact>, config: &AntennaConfig) -> Result<usize> {
    let handlers = handlers_from_config(config)?;
    let mut total = 0;
    for handler in &handlers {
        let touched = handler.process(artifacts);
        tracing::info!("Configuration step '{}' touched {touched} artifacts", handler.name());
        total += touched;
    }
    Ok(total)
}
