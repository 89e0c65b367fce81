//! Handles to the host state shared by every tool.

use crate::error::CoreResult;
use crate::owner::OwnerContext;
use crate::query::{BuiltinQueryLanguage, QueryLanguage};
use crate::workspace::Workspace;
use std::sync::Arc;

/// Language used for display strings when neither the caller nor the
/// configuration names one.
pub const FALLBACK_LANGUAGE: &str = "ru";

#[derive(Debug, Clone)]
pub struct Host {
    pub workspace: Arc<Workspace>,
    /// Exclusive-access context for workspace state.
    pub owner: OwnerContext,
    pub query_language: Arc<dyn QueryLanguage>,
    pub default_language: String,
}

impl Host {
    /// Start the owner context and use the built-in query checker.
    pub fn start(workspace: Workspace) -> CoreResult<Self> {
        Ok(Self {
            workspace: Arc::new(workspace),
            owner: OwnerContext::start("mdbridge-owner")?,
            query_language: Arc::new(BuiltinQueryLanguage),
            default_language: FALLBACK_LANGUAGE.to_string(),
        })
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_query_language(mut self, language: Arc<dyn QueryLanguage>) -> Self {
        self.query_language = language;
        self
    }
}
