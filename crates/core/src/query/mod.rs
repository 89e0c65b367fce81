//! Query validation against a project context.
//!
//! A query language hands out validation resources bound to a project. Each
//! validation run owns one ephemeral resource and releases it on every exit
//! path, including errors and panics.

mod checker;

pub use checker::BuiltinQueryLanguage;

use crate::error::CoreResult;
use crate::workspace::Project;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One finding. Positions are present only when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            column: None,
            offset: None,
        }
    }

    /// Attach raw engine positions. Lines and columns count from 1, offsets
    /// from 0; anything outside that range means unknown.
    pub fn at(mut self, line: i64, column: i64, offset: i64) -> Self {
        self.line = u32::try_from(line).ok().filter(|l| *l > 0);
        self.column = u32::try_from(column).ok().filter(|c| *c > 0);
        self.offset = u32::try_from(offset).ok();
        self
    }
}

/// Factory for validation resources.
pub trait QueryLanguage: Send + Sync + fmt::Debug {
    fn create_resource(
        &self,
        project: &Project,
        uri: &str,
        dcs_mode: bool,
    ) -> CoreResult<Box<dyn QueryResource>>;
}

/// A parsed query held by the language engine.
pub trait QueryResource: Send {
    fn load(&mut self, text: &str) -> CoreResult<()>;

    /// Diagnostics produced while parsing.
    fn syntax_diagnostics(&self) -> Vec<Diagnostic>;

    /// Full semantic validation against the project.
    fn validate(&self, project: &Project) -> CoreResult<Vec<Diagnostic>>;

    fn unload(&mut self);
}

/// Validation resource scoped to a single call. Dropping it unloads the
/// resource and detaches it from its project.
pub struct EphemeralResource<'p> {
    project: &'p Project,
    uri: String,
    resource: Box<dyn QueryResource>,
}

impl<'p> EphemeralResource<'p> {
    pub fn create(
        language: &dyn QueryLanguage,
        project: &'p Project,
        dcs_mode: bool,
    ) -> CoreResult<Self> {
        let uri = format!(
            "/{}/mcp_validate_query_{}.qldcs",
            project.name(),
            Uuid::new_v4().simple()
        );
        let resource = language.create_resource(project, &uri, dcs_mode)?;
        project.attach_resource(&uri);
        debug!(uri = %uri, "Validation resource attached");
        Ok(Self {
            project,
            uri,
            resource,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn load(&mut self, text: &str) -> CoreResult<()> {
        self.resource.load(text)
    }

    pub fn syntax_diagnostics(&self) -> Vec<Diagnostic> {
        self.resource.syntax_diagnostics()
    }

    pub fn validate(&self) -> CoreResult<Vec<Diagnostic>> {
        self.resource.validate(self.project)
    }
}

impl Drop for EphemeralResource<'_> {
    fn drop(&mut self) {
        self.resource.unload();
        self.project.detach_resource(&self.uri);
        debug!(uri = %self.uri, "Validation resource released");
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub success: bool,
    /// True only when no diagnostic of any severity was reported.
    pub valid: bool,
    pub dcs_mode: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub issues: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(dcs_mode: bool, issues: Vec<Diagnostic>) -> Self {
        let count = |severity: Severity| issues.iter().filter(|d| d.severity == severity).count();
        Self {
            success: true,
            valid: issues.is_empty(),
            dcs_mode,
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            issues,
        }
    }
}

/// Validate `text` in the context of `project`.
///
/// Syntax diagnostics come first, followed by semantic ones.
pub fn validate_query(
    language: &dyn QueryLanguage,
    project: &Project,
    text: &str,
    dcs_mode: bool,
) -> CoreResult<ValidationReport> {
    let mut resource = EphemeralResource::create(language, project, dcs_mode)?;
    resource.load(text)?;
    let mut issues = resource.syntax_diagnostics();
    issues.extend(resource.validate()?);
    Ok(ValidationReport::new(dcs_mode, issues))
}
