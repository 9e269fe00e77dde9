//! Content type registry and startup wiring.

use std::sync::Arc;

use tracing::info;

use super::ContentManager;

/// Registry of content type managers.
///
/// Managers register here at startup; [`wire_integrations`] then pairs every
/// manager with every other, offering capabilities where an integration is
/// declared. Wiring is driven entirely by the declarations, so registration
/// order does not matter and no manager imports another.
///
/// [`wire_integrations`]: ContentTypeRegistry::wire_integrations
#[derive(Default)]
pub struct ContentTypeRegistry {
    managers: Vec<Arc<dyn ContentManager>>,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content type manager.
    pub fn register(&mut self, manager: Arc<dyn ContentManager>) {
        info!(content_type = manager.id(), "registered content type");
        self.managers.push(manager);
    }

    /// Get a manager by its machine name.
    pub fn get(&self, id: &str) -> Option<Arc<dyn ContentManager>> {
        self.managers.iter().find(|m| m.id() == id).cloned()
    }

    /// Machine names of all registered content types.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.managers.iter().map(|m| m.id()).collect()
    }

    /// Exchange capabilities between every integrating pair.
    ///
    /// When manager `a` declares an integration with `b`, each of `a`'s
    /// capabilities is offered to `b`; `b` keeps the kinds it consumes and
    /// ignores the rest.
    pub fn wire_integrations(&self) {
        for a in &self.managers {
            for b in &self.managers {
                if a.id() == b.id() || !a.integrates_with().contains(&b.id()) {
                    continue;
                }
                for capability in Arc::clone(a).capabilities() {
                    info!(
                        from = a.id(),
                        to = b.id(),
                        capability = ?capability,
                        "wired content type integration"
                    );
                    b.accept(capability);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::{
        AgendaProvider, AgendaRef, Capability, SpeakerProvider, SpeakerRef, collect_agendas,
        collect_speakers,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use parking_lot::RwLock;

    /// Stand-in agenda-side manager: offers agenda refs, consumes speakers.
    struct FakeAgenda {
        speaker_providers: RwLock<Vec<Arc<dyn SpeakerProvider>>>,
    }

    impl FakeAgenda {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                speaker_providers: RwLock::new(Vec::new()),
            })
        }

        fn providers(&self) -> Vec<Arc<dyn SpeakerProvider>> {
            self.speaker_providers.read().clone()
        }
    }

    #[async_trait]
    impl AgendaProvider for FakeAgenda {
        async fn agendas(&self, _only: Option<&[i32]>) -> Result<Vec<AgendaRef>> {
            Ok(vec![AgendaRef {
                id: 1,
                title: "Opening".to_string(),
            }])
        }
    }

    #[async_trait]
    impl ContentManager for FakeAgenda {
        fn id(&self) -> &'static str {
            "agenda"
        }

        fn integrates_with(&self) -> &'static [&'static str] {
            &["speakers"]
        }

        fn capabilities(self: Arc<Self>) -> Vec<Capability> {
            vec![Capability::Agendas(self)]
        }

        fn accept(&self, capability: Capability) {
            if let Capability::Speakers(provider) = capability {
                self.speaker_providers.write().push(provider);
            }
        }

        async fn render_data(&self, _page: Option<i32>) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        async fn form_definition(&self) -> Result<crate::form::Form> {
            Ok(crate::form::Form::new("fake", "/"))
        }
    }

    /// Stand-in speaker-side manager: offers speaker refs, consumes agendas.
    struct FakeSpeakers {
        agenda_providers: RwLock<Vec<Arc<dyn AgendaProvider>>>,
    }

    impl FakeSpeakers {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                agenda_providers: RwLock::new(Vec::new()),
            })
        }

        fn providers(&self) -> Vec<Arc<dyn AgendaProvider>> {
            self.agenda_providers.read().clone()
        }
    }

    #[async_trait]
    impl SpeakerProvider for FakeSpeakers {
        async fn speakers(&self, _only: Option<&[i32]>) -> Result<Vec<SpeakerRef>> {
            Ok(vec![SpeakerRef {
                id: 9,
                name: "Ada".to_string(),
            }])
        }
    }

    #[async_trait]
    impl ContentManager for FakeSpeakers {
        fn id(&self) -> &'static str {
            "speakers"
        }

        fn integrates_with(&self) -> &'static [&'static str] {
            &["agenda"]
        }

        fn capabilities(self: Arc<Self>) -> Vec<Capability> {
            vec![Capability::Speakers(self)]
        }

        fn accept(&self, capability: Capability) {
            if let Capability::Agendas(provider) = capability {
                self.agenda_providers.write().push(provider);
            }
        }

        async fn render_data(&self, _page: Option<i32>) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        async fn form_definition(&self) -> Result<crate::form::Form> {
            Ok(crate::form::Form::new("fake", "/"))
        }
    }

    #[tokio::test]
    async fn wiring_exchanges_capabilities_both_ways() {
        let agenda = FakeAgenda::new();
        let speakers = FakeSpeakers::new();

        let mut registry = ContentTypeRegistry::new();
        registry.register(agenda.clone());
        registry.register(speakers.clone());
        registry.wire_integrations();

        let speaker_refs = collect_speakers(&agenda.providers(), None).await.unwrap();
        assert_eq!(speaker_refs.len(), 1);
        assert_eq!(speaker_refs[0].name, "Ada");

        let agenda_refs = collect_agendas(&speakers.providers(), None).await.unwrap();
        assert_eq!(agenda_refs.len(), 1);
        assert_eq!(agenda_refs[0].title, "Opening");
    }

    #[tokio::test]
    async fn registration_order_does_not_matter() {
        let agenda = FakeAgenda::new();
        let speakers = FakeSpeakers::new();

        let mut registry = ContentTypeRegistry::new();
        registry.register(speakers.clone());
        registry.register(agenda.clone());
        registry.wire_integrations();

        assert_eq!(agenda.providers().len(), 1);
        assert_eq!(speakers.providers().len(), 1);
    }

    #[tokio::test]
    async fn lone_manager_defaults_to_empty_providers() {
        let speakers = FakeSpeakers::new();

        let mut registry = ContentTypeRegistry::new();
        registry.register(speakers.clone());
        registry.wire_integrations();

        assert!(speakers.providers().is_empty());
        let refs = collect_agendas(&speakers.providers(), None).await.unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn get_finds_managers_by_id() {
        let mut registry = ContentTypeRegistry::new();
        registry.register(FakeAgenda::new());

        assert!(registry.get("agenda").is_some());
        assert!(registry.get("sponsors").is_none());
        assert_eq!(registry.type_names(), vec!["agenda"]);
    }
}
