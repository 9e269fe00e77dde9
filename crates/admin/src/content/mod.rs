//! Content types and their integration protocol.
//!
//! Each content type is an independent manager. Managers never import each
//! other: cross-references flow through provider capabilities exchanged at
//! startup by the [`registry::ContentTypeRegistry`], so either manager runs
//! alone with providers defaulting to empty.

pub mod agenda;
pub mod reconcile;
pub mod registry;
pub mod speakers;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use agenda::AgendaManager;
pub use registry::ContentTypeRegistry;
pub use speakers::SpeakerManager;

/// Minimal agenda reference exchanged between content types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaRef {
    pub id: i32,
    pub title: String,
}

/// Minimal speaker reference exchanged between content types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerRef {
    pub id: i32,
    pub name: String,
}

/// Source of agenda references for peer content types.
///
/// Async resolution covers both eagerly-known and store-backed providers;
/// callers await uniformly either way.
#[async_trait]
pub trait AgendaProvider: Send + Sync {
    async fn agendas(&self, only: Option<&[i32]>) -> Result<Vec<AgendaRef>>;
}

/// Source of speaker references for peer content types.
#[async_trait]
pub trait SpeakerProvider: Send + Sync {
    async fn speakers(&self, only: Option<&[i32]>) -> Result<Vec<SpeakerRef>>;
}

/// A provider handle one content type offers its peers.
#[derive(Clone)]
pub enum Capability {
    Agendas(Arc<dyn AgendaProvider>),
    Speakers(Arc<dyn SpeakerProvider>),
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Agendas(_) => f.write_str("Capability::Agendas"),
            Capability::Speakers(_) => f.write_str("Capability::Speakers"),
        }
    }
}

/// Contract every content type implements.
///
/// The HTTP layer talks to the concrete managers; this trait carries what
/// the registry and the page-assembly dispatch need.
#[async_trait]
pub trait ContentManager: Send + Sync {
    /// Machine name of this content type.
    fn id(&self) -> &'static str;

    /// Machine names of peer content types this manager integrates with.
    fn integrates_with(&self) -> &'static [&'static str] {
        &[]
    }

    /// Provider handles this manager offers to integrating peers.
    fn capabilities(self: Arc<Self>) -> Vec<Capability> {
        Vec::new()
    }

    /// Receive a capability offered by a peer; unknown kinds are ignored.
    fn accept(&self, _capability: Capability) {}

    /// Published data shaped for the page-assembly layer.
    async fn render_data(&self, page: Option<i32>) -> Result<serde_json::Value>;

    /// Admin form definition with choice lists resolved.
    async fn form_definition(&self) -> Result<crate::form::Form>;
}

/// Invoke every registered agenda provider and merge the results.
pub async fn collect_agendas(
    providers: &[Arc<dyn AgendaProvider>],
    only: Option<&[i32]>,
) -> Result<Vec<AgendaRef>> {
    let mut all = Vec::new();
    for provider in providers {
        all.extend(provider.agendas(only).await?);
    }
    Ok(all)
}

/// Invoke every registered speaker provider and merge the results.
pub async fn collect_speakers(
    providers: &[Arc<dyn SpeakerProvider>],
    only: Option<&[i32]>,
) -> Result<Vec<SpeakerRef>> {
    let mut all = Vec::new();
    for provider in providers {
        all.extend(provider.speakers(only).await?);
    }
    Ok(all)
}
