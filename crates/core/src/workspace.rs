//! Projects loaded from a workspace directory.
//!
//! Layout: `<workspace>/<project>/project.json`, one descriptor per project.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{MdObject, PropertyValue};
use crate::query::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const PROJECT_FILE: &str = "project.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Configuration,
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Incremental,
    /// Drop previous results and rebuild everything.
    Clean,
}

impl BuildKind {
    pub fn label(self) -> &'static str {
        match self {
            BuildKind::Incremental => "INCREMENTAL",
            BuildKind::Clean => "CLEAN",
        }
    }
}

/// A problem recorded against a project by a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub severity: Severity,
    pub object: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildState {
    pub revision: u64,
    pub last_kind: Option<BuildKind>,
    pub finished_at: Option<DateTime<Utc>>,
    pub markers: Vec<Marker>,
}

#[derive(Deserialize)]
struct ProjectFile {
    name: Option<String>,
    kind: ProjectKind,
    #[serde(default = "default_open")]
    open: bool,
    configuration: MdObject,
}

fn default_open() -> bool {
    true
}

#[derive(Debug)]
pub struct Project {
    name: String,
    kind: ProjectKind,
    open: bool,
    configuration: MdObject,
    resources: Mutex<BTreeSet<String>>,
    build: Mutex<BuildState>,
}

impl Project {
    pub fn new(name: impl Into<String>, kind: ProjectKind, configuration: MdObject) -> Self {
        Self {
            name: name.into(),
            kind,
            open: true,
            configuration,
            resources: Mutex::new(BTreeSet::new()),
            build: Mutex::new(BuildState::default()),
        }
    }

    pub fn closed(mut self) -> Self {
        self.open = false;
        self
    }

    /// Load a project descriptor. `fallback_name` is used when the file has no name.
    pub fn from_file(path: &Path, fallback_name: &str) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: ProjectFile = serde_json::from_str(&raw).map_err(|source| CoreError::ProjectFile {
            path: path.display().to_string(),
            source,
        })?;
        let mut project = Project::new(
            file.name.unwrap_or_else(|| fallback_name.to_string()),
            file.kind,
            file.configuration,
        );
        project.open = file.open;
        Ok(project)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn configuration(&self) -> &MdObject {
        &self.configuration
    }

    /// Language code of the configuration's default language.
    ///
    /// Uses the referenced language's `languageCode` when the language is
    /// defined in the configuration, otherwise the referenced name itself.
    pub fn default_language(&self) -> Option<String> {
        let target = self.configuration.reference("defaultLanguage")?;
        let code = self
            .configuration
            .all_children()
            .find(|child| child.type_name == "Language" && child.name == target.name)
            .and_then(|language| match language.property("languageCode") {
                Some(PropertyValue::Text(code)) if !code.is_empty() => Some(code.clone()),
                _ => None,
            });
        Some(code.unwrap_or_else(|| target.name.clone()))
    }

    /// Find a top-level object. The type matches case-insensitively, the name exactly.
    pub fn find_object(&self, type_name: &str, name: &str) -> Option<&MdObject> {
        if self.configuration.type_name.eq_ignore_ascii_case(type_name)
            && self.configuration.name == name
        {
            return Some(&self.configuration);
        }
        self.configuration
            .all_children()
            .find(|obj| obj.type_name.eq_ignore_ascii_case(type_name) && obj.name == name)
    }

    /// Attach a resource URI. Returns false if it was already attached.
    pub fn attach_resource(&self, uri: &str) -> bool {
        lock(&self.resources).insert(uri.to_string())
    }

    /// Detach a resource URI. Returns false if it was not attached.
    pub fn detach_resource(&self, uri: &str) -> bool {
        lock(&self.resources).remove(uri)
    }

    pub fn attached_resources(&self) -> Vec<String> {
        lock(&self.resources).iter().cloned().collect()
    }

    pub fn build_state(&self) -> BuildState {
        lock(&self.build).clone()
    }

    /// Check the configuration and record markers.
    pub fn build(&self, kind: BuildKind) -> BuildState {
        let mut state = lock(&self.build);
        state.markers = check_configuration(&self.configuration);
        state.revision += 1;
        state.last_kind = Some(kind);
        state.finished_at = Some(Utc::now());
        info!(
            project = %self.name,
            build = kind.label(),
            revision = state.revision,
            markers = state.markers.len(),
            "Project build finished"
        );
        state.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_configuration(configuration: &MdObject) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut seen: BTreeMap<(String, &str), (String, usize)> = BTreeMap::new();
    for obj in configuration.all_children() {
        if obj.name.is_empty() {
            markers.push(Marker {
                severity: Severity::Error,
                object: obj.type_name.clone(),
                message: format!("{} has an empty name", obj.type_name),
            });
            continue;
        }
        seen.entry((obj.type_name.to_ascii_lowercase(), obj.name.as_str()))
            .or_insert_with(|| (obj.fqn().to_string(), 0))
            .1 += 1;
    }
    for (fqn, count) in seen.into_values().filter(|(_, n)| *n > 1) {
        markers.push(Marker {
            severity: Severity::Error,
            message: format!("Duplicate object name {fqn} ({count} definitions)"),
            object: fqn,
        });
    }
    markers
}

/// All projects known to the host.
#[derive(Debug, Default)]
pub struct Workspace {
    projects: Vec<Arc<Project>>,
}

impl Workspace {
    pub fn new(projects: impl IntoIterator<Item = Project>) -> Self {
        Self {
            projects: projects.into_iter().map(Arc::new).collect(),
        }
    }

    /// Discover every `<dir>/<project>/project.json`. A missing directory yields an empty workspace.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        if !dir.exists() {
            warn!(dir = %dir.display(), "Workspace directory not found, starting with no projects");
            return Ok(Self::default());
        }

        let mut projects = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != PROJECT_FILE {
                continue;
            }
            let dir_name = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let project = Project::from_file(entry.path(), &dir_name)?;
            debug!(project = %project.name, kind = ?project.kind, "Loaded project");
            projects.push(project);
        }

        info!(dir = %dir.display(), count = projects.len(), "Workspace loaded");
        Ok(Self::new(projects))
    }

    pub fn project(&self, name: &str) -> Option<Arc<Project>> {
        self.projects.iter().find(|p| p.name == name).cloned()
    }

    pub fn projects(&self) -> &[Arc<Project>] {
        &self.projects
    }

    /// First open configuration project, in load order.
    pub fn first_configuration_project(&self) -> Option<Arc<Project>> {
        self.projects
            .iter()
            .find(|p| p.open && p.kind == ProjectKind::Configuration)
            .cloned()
    }
}
