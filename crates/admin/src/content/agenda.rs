//! Agenda content type manager.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::form::{AgendaSubmission, Form, FormElement};
use crate::models::{
    AgendaChanges, AgendaItem, AgendaRelationship, ImageChange, NewAgendaItem, SpeakerAgenda, tag,
};
use crate::services::images::{ImageHost, ImageUploadProfile};

use super::{
    AgendaProvider, AgendaRef, Capability, ContentManager, SpeakerProvider, SpeakerRef,
    collect_speakers,
};

/// Manages the agenda content type: CRUD, relationship reconciliation, and
/// the provider side of the speakers integration.
pub struct AgendaManager {
    pool: PgPool,
    images: Arc<ImageHost>,
    tracks: Vec<String>,
    speaker_providers: RwLock<Vec<Arc<dyn SpeakerProvider>>>,
}

impl AgendaManager {
    pub fn new(pool: PgPool, images: Arc<ImageHost>, tracks: Vec<String>) -> Self {
        Self {
            pool,
            images,
            tracks,
            speaker_providers: RwLock::new(Vec::new()),
        }
    }

    /// Configured track labels, indexed by the stored category value.
    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    /// Register a source of speaker references.
    pub fn add_speaker_provider(&self, provider: Arc<dyn SpeakerProvider>) {
        self.speaker_providers.write().push(provider);
    }

    fn speaker_providers(&self) -> Vec<Arc<dyn SpeakerProvider>> {
        self.speaker_providers.read().clone()
    }

    /// Speaker references from every registered provider.
    pub async fn speakers(&self, only: Option<&[i32]>) -> Result<Vec<SpeakerRef>> {
        collect_speakers(&self.speaker_providers(), only).await
    }

    /// List agenda items for the admin, ordered by start, track, and title.
    ///
    /// Unless excluded, each entry carries its related speaker references,
    /// related agenda ids, and tags.
    pub async fn list(
        &self,
        only: Option<&[i32]>,
        exclude_relationships: bool,
    ) -> Result<Vec<serde_json::Value>> {
        let items = AgendaItem::list(&self.pool, only).await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id;
            let mut entry = item.into_value();
            if !exclude_relationships {
                let (speakers, related, tags) = tokio::try_join!(
                    self.related_speakers(id),
                    self.related_agenda_ids(id),
                    tag::for_agenda(&self.pool, id),
                )?;
                entry["related_speakers"] = json!(speakers);
                entry["related_agendas"] = json!(related);
                entry["tags"] = json!(tags);
            }
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Fetch one agenda item with its relationships, shaped for the admin
    /// form. Returns `None` when the id is unknown.
    pub async fn get(&self, id: i32) -> Result<Option<serde_json::Value>> {
        let Some(item) = AgendaItem::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let (relationships, associations, tags) = tokio::try_join!(
            AgendaRelationship::for_agenda(&self.pool, id),
            SpeakerAgenda::for_agenda(&self.pool, id),
            tag::for_agenda(&self.pool, id),
        )?;

        let mut value = item.into_value();
        value["related_agendas"] = json!(
            relationships
                .iter()
                .map(|row| row.pair().other(id))
                .collect::<Vec<i32>>()
        );
        value["speakers"] = json!(
            associations
                .iter()
                .map(|row| row.speaker)
                .collect::<Vec<i32>>()
        );
        value["tags"] = json!(tags.join(", "));

        Ok(Some(value))
    }

    /// Create or update an agenda item from a validated submission.
    ///
    /// Relationship, association, and tag reconciliation run concurrently
    /// with the row write and are jointly awaited; a failure in any part
    /// fails the save without undoing the parts that already committed.
    pub async fn save(&self, submission: AgendaSubmission) -> Result<i32> {
        if let Some(id) = submission.id {
            let replace_image = submission.image.clone();
            let drop_old_asset = submission.delete_image || replace_image.is_some();

            let changes = AgendaChanges {
                title: submission.title,
                start: submission.start,
                stop: submission.stop,
                category: submission.category,
                description: submission.description,
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
                AgendaRelationship::reconcile(&self.pool, id, &submission.related_agendas),
                SpeakerAgenda::reconcile_for_agenda(&self.pool, id, &submission.speakers),
                tag::reconcile_for_agenda(&self.pool, id, &submission.tags),
                AgendaItem::update(&self.pool, id, &changes),
            )?;

            info!(agenda = id, "agenda item updated");
            Ok(id)
        } else {
            let input = NewAgendaItem {
                title: submission.title,
                start: submission.start,
                stop: submission.stop,
                category: submission.category,
                description: submission.description,
                published: submission.published,
                image: submission.image,
                data: submission.data,
            };

            let id = AgendaItem::insert(&self.pool, &input).await?;

            tokio::try_join!(
                AgendaRelationship::reconcile(&self.pool, id, &submission.related_agendas),
                SpeakerAgenda::reconcile_for_agenda(&self.pool, id, &submission.speakers),
                tag::reconcile_for_agenda(&self.pool, id, &submission.tags),
            )?;

            info!(agenda = id, "agenda item created");
            Ok(id)
        }
    }

    /// Delete an agenda item and clean up its hosted image.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        self.remove_stored_image(id).await?;
        let deleted = AgendaItem::delete(&self.pool, id).await?;
        if deleted {
            info!(agenda = id, "agenda item deleted");
        }
        Ok(deleted)
    }

    /// Speaker references related to one agenda item.
    pub async fn related_speakers(&self, id: i32) -> Result<Vec<SpeakerRef>> {
        let associations = SpeakerAgenda::for_agenda(&self.pool, id).await?;
        let ids: Vec<i32> = associations.iter().map(|row| row.speaker).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.speakers(Some(&ids)).await
    }

    /// Ids of the agenda items related to the given one, from either side of
    /// the stored pair.
    pub async fn related_agenda_ids(&self, id: i32) -> Result<Vec<i32>> {
        let relationships = AgendaRelationship::for_agenda(&self.pool, id).await?;
        Ok(relationships.iter().map(|row| row.pair().other(id)).collect())
    }

    /// Transform preset the upload widget applies on the asset host.
    pub fn upload_profile(&self) -> ImageUploadProfile {
        ImageUploadProfile::standard("agendas")
    }

    /// Queue destruction of the stored image asset, if any.
    ///
    /// Reading the reference can fail and does; the destruction itself is
    /// detached and never will.
    async fn remove_stored_image(&self, id: i32) -> Result<()> {
        if let Some(reference) = AgendaItem::image_ref(&self.pool, id).await? {
            self.images.destroy_detached(reference);
        }
        Ok(())
    }
}

#[async_trait]
impl AgendaProvider for AgendaManager {
    async fn agendas(&self, only: Option<&[i32]>) -> Result<Vec<AgendaRef>> {
        let items = AgendaItem::list(&self.pool, only).await?;
        Ok(items
            .into_iter()
            .map(|item| AgendaRef {
                id: item.id,
                title: item.title,
            })
            .collect())
    }
}

#[async_trait]
impl ContentManager for AgendaManager {
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
            self.add_speaker_provider(provider);
        }
    }

    /// Published agenda entries with their relationships, for the
    /// page-assembly layer.
    async fn render_data(&self, _page: Option<i32>) -> Result<serde_json::Value> {
        let items = AgendaItem::list_published(&self.pool).await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id;
            let (speakers, related, tags) = tokio::try_join!(
                self.related_speakers(id),
                self.related_agenda_ids(id),
                tag::for_agenda(&self.pool, id),
            )?;
            let mut entry = item.into_value();
            entry["related_speakers"] = json!(speakers);
            entry["related_agendas"] = json!(related);
            entry["tags"] = json!(tags);
            entries.push(entry);
        }

        Ok(json!({
            "template": "agenda",
            "agenda": entries,
        }))
    }

    async fn form_definition(&self) -> Result<Form> {
        let (agendas, speakers) = tokio::try_join!(self.agendas(None), self.speakers(None))?;

        let track_options = self
            .tracks
            .iter()
            .enumerate()
            .map(|(index, label)| (index.to_string(), label.clone()))
            .collect();
        let agenda_options = agendas
            .into_iter()
            .map(|a| (a.id.to_string(), a.title))
            .collect();
        let speaker_options = speakers
            .into_iter()
            .map(|s| (s.id.to_string(), s.name))
            .collect();

        Ok(Form::new("agenda_form", "/admin/agenda")
            .element(FormElement::hidden("id"))
            .element(FormElement::textfield("title").label("Title").required())
            .element(FormElement::textfield("start").label("Starts").required())
            .element(FormElement::textfield("stop").label("Ends").required())
            .element(
                FormElement::radios("category", track_options)
                    .label("Track")
                    .required(),
            )
            .element(FormElement::multi_select("speakers", speaker_options).label("Speakers"))
            .element(
                FormElement::multi_select("related_agendas", agenda_options)
                    .label("Related sessions"),
            )
            .element(FormElement::textarea("description").label("Description"))
            .element(FormElement::image("image").label("Image"))
            .element(FormElement::hidden("delete_image"))
            .element(FormElement::textfield("tags").label("Tags"))
            .element(FormElement::checkbox("published").label("Published").default(true)))
    }
}
