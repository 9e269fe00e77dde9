//! Speakers content type manager.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::form::{Form, FormElement, SpeakerSubmission};
use crate::models::{ImageChange, NewSpeaker, Speaker, SpeakerAgenda, SpeakerChanges};
use crate::services::images::{ImageHost, ImageUploadProfile};

use super::{
    AgendaProvider, AgendaRef, Capability, ContentManager, SpeakerProvider, SpeakerRef,
    collect_agendas,
};

/// Manages the speakers content type: CRUD, agenda associations, and the
/// provider side of the agenda integration.
pub struct SpeakerManager {
    pool: PgPool,
    images: Arc<ImageHost>,
    multipage: bool,
    agenda_providers: RwLock<Vec<Arc<dyn AgendaProvider>>>,
}

impl SpeakerManager {
    pub fn new(pool: PgPool, images: Arc<ImageHost>, multipage: bool) -> Self {
        Self {
            pool,
            images,
            multipage,
            agenda_providers: RwLock::new(Vec::new()),
        }
    }

    /// Whether speaker listings are split across pages.
    pub fn supports_multipage(&self) -> bool {
        self.multipage
    }

    /// Register a source of agenda references.
    pub fn add_agenda_provider(&self, provider: Arc<dyn AgendaProvider>) {
        self.agenda_providers.write().push(provider);
    }

    fn agenda_providers(&self) -> Vec<Arc<dyn AgendaProvider>> {
        self.agenda_providers.read().clone()
    }

    /// Agenda references from every registered provider.
    pub async fn agendas(&self, only: Option<&[i32]>) -> Result<Vec<AgendaRef>> {
        collect_agendas(&self.agenda_providers(), only).await
    }

    /// Page filter for listings: pinned to a page only in multi-page mode.
    fn page_filter(&self, page: Option<i32>) -> Option<i32> {
        self.multipage.then(|| page.unwrap_or(0))
    }

    /// List speakers for the admin, ordered by name.
    pub async fn list(&self, page: Option<i32>) -> Result<Vec<serde_json::Value>> {
        let speakers = Speaker::list(&self.pool, self.page_filter(page), None).await?;

        let mut entries = Vec::with_capacity(speakers.len());
        for speaker in speakers {
            let id = speaker.id;
            let mut entry = speaker.into_value();
            entry["related_agendas"] = json!(self.related_agendas(id).await?);
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Fetch one speaker with agenda associations, shaped for the admin
    /// form. Returns `None` when the id is unknown.
    pub async fn get(&self, id: i32) -> Result<Option<serde_json::Value>> {
        let Some(speaker) = Speaker::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let associations = SpeakerAgenda::for_speaker(&self.pool, id).await?;

        let mut value = speaker.into_value();
        value["related_agendas"] = json!(
            associations
                .iter()
                .map(|row| row.agenda)
                .collect::<Vec<i32>>()
        );

        Ok(Some(value))
    }

    /// Create or update a speaker from a validated submission.
    ///
    /// The association reconcile and the row write run concurrently and are
    /// jointly awaited, with the same no-rollback caveat as agenda saves.
    pub async fn save(&self, submission: SpeakerSubmission) -> Result<i32> {
        if let Some(id) = submission.id {
            let replace_image = submission.image.clone();
            let drop_old_asset = submission.delete_image || replace_image.is_some();

            let changes = SpeakerChanges {
                page: submission.page,
                name: submission.name,
                description: submission.description,
                links: submission.links,
                published: submission.published,
                image: if submission.delete_image {
                    ImageChange::Clear
                } else if let Some(reference) = replace_image {
                    ImageChange::Replace(reference)
                } else {
                    ImageChange::Keep
                },
                data: submission.data,
            };

            tokio::try_join!(
                async {
                    if drop_old_asset {
                        self.remove_stored_image(id).await
                    } else {
                        Ok(())
                    }
                },
                SpeakerAgenda::reconcile_for_speaker(&self.pool, id, &submission.related_agendas),
                Speaker::update(&self.pool, id, &changes),
            )?;

            info!(speaker = id, "speaker updated");
            Ok(id)
        } else {
            let input = NewSpeaker {
                page: submission.page,
                name: submission.name,
                description: submission.description,
                links: submission.links,
                published: submission.published,
                image: submission.image,
                data: submission.data,
            };

            let id = Speaker::insert(&self.pool, &input).await?;
            SpeakerAgenda::reconcile_for_speaker(&self.pool, id, &submission.related_agendas)
                .await?;

            info!(speaker = id, "speaker created");
            Ok(id)
        }
    }

    /// Delete a speaker and clean up their hosted image.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        self.remove_stored_image(id).await?;
        let deleted = Speaker::delete(&self.pool, id).await?;
        if deleted {
            info!(speaker = id, "speaker deleted");
        }
        Ok(deleted)
    }

    /// Delete every speaker on a listing page (multi-page teardown).
    pub async fn delete_page(&self, page: i32) -> Result<u64> {
        let speakers = Speaker::list(&self.pool, Some(page), None).await?;
        for speaker in &speakers {
            if let Some(reference) = &speaker.image {
                self.images.destroy_detached(reference.clone());
            }
        }

        let removed = Speaker::delete_by_page(&self.pool, page).await?;
        info!(page, removed, "speaker page deleted");
        Ok(removed)
    }

    /// Agenda references associated with one speaker.
    pub async fn related_agendas(&self, id: i32) -> Result<Vec<AgendaRef>> {
        let associations = SpeakerAgenda::for_speaker(&self.pool, id).await?;
        let ids: Vec<i32> = associations.iter().map(|row| row.agenda).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.agendas(Some(&ids)).await
    }

    /// Transform preset the upload widget applies on the asset host.
    pub fn upload_profile(&self) -> ImageUploadProfile {
        ImageUploadProfile::standard("speakers")
    }

    async fn remove_stored_image(&self, id: i32) -> Result<()> {
        if let Some(reference) = Speaker::image_ref(&self.pool, id).await? {
            self.images.destroy_detached(reference);
        }
        Ok(())
    }
}

#[async_trait]
impl SpeakerProvider for SpeakerManager {
    async fn speakers(&self, only: Option<&[i32]>) -> Result<Vec<SpeakerRef>> {
        // Providers see every page: a session can reference speakers from
        // any listing page.
        let speakers = Speaker::list(&self.pool, None, only).await?;
        Ok(speakers
            .into_iter()
            .map(|speaker| SpeakerRef {
                id: speaker.id,
                name: speaker.name,
            })
            .collect())
    }
}

#[async_trait]
impl ContentManager for SpeakerManager {
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
            self.add_agenda_provider(provider);
        }
    }

    /// Published speakers with their agenda references, for the
    /// page-assembly layer.
    async fn render_data(&self, page: Option<i32>) -> Result<serde_json::Value> {
        let speakers = Speaker::list_published(&self.pool, self.page_filter(page)).await?;

        let mut entries = Vec::with_capacity(speakers.len());
        for speaker in speakers {
            let id = speaker.id;
            let mut entry = speaker.into_value();
            entry["agendas"] = json!(self.related_agendas(id).await?);
            entries.push(entry);
        }

        Ok(json!({
            "template": "speakers",
            "speakers": entries,
        }))
    }

    async fn form_definition(&self) -> Result<Form> {
        let agendas = self.agendas(None).await?;
        let agenda_options = agendas
            .into_iter()
            .map(|a| (a.id.to_string(), a.title))
            .collect();

        Ok(Form::new("speaker_form", "/admin/speakers")
            .element(FormElement::hidden("id"))
            .element(FormElement::textfield("name").label("Name").required())
            .element(FormElement::textarea("description").label("Introduction"))
            .element(FormElement::image("image").label("Image"))
            .element(FormElement::hidden("delete_image"))
            .element(FormElement::textfield("twitter").label("Twitter"))
            .element(FormElement::textfield("github").label("GitHub"))
            .element(FormElement::textfield("linkedin").label("LinkedIn"))
            .element(FormElement::textfield("dribbble").label("Dribbble"))
            .element(FormElement::textfield("video").label("Video"))
            .element(FormElement::textfield("blog").label("Blog"))
            .element(FormElement::checkbox("published").label("Published").default(true))
            .element(
                FormElement::multi_select("related_agendas", agenda_options)
                    .label("Related sessions"),
            ))
    }
}
