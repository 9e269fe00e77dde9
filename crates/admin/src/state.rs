//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::content::{AgendaManager, ContentTypeRegistry, SpeakerManager};
use crate::db;
use crate::services::images::ImageHost;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Remote image-asset host client.
    images: Arc<ImageHost>,

    /// Agenda content type manager.
    agenda: Arc<AgendaManager>,

    /// Speakers content type manager.
    speakers: Arc<SpeakerManager>,

    /// Content type registry, wired at startup.
    registry: ContentTypeRegistry,
}

impl AppState {
    /// Create new application state: pool, migrations, managers, and
    /// content type wiring.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        let images = Arc::new(ImageHost::new(
            config.image_host_url.clone(),
            config.image_host_key.clone(),
        ));
        if config.image_host_url.is_none() {
            info!("IMAGE_HOST_URL not set, image asset destruction disabled");
        }

        let agenda = Arc::new(AgendaManager::new(
            db.clone(),
            images.clone(),
            config.tracks.clone(),
        ));
        let speakers = Arc::new(SpeakerManager::new(
            db.clone(),
            images.clone(),
            config.speakers_multipage,
        ));

        // Content types never import each other: all cross-references go
        // through capabilities exchanged here.
        let mut registry = ContentTypeRegistry::new();
        registry.register(agenda.clone());
        registry.register(speakers.clone());
        registry.wire_integrations();

        info!(
            content_types = ?registry.type_names(),
            "content types registered and wired"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                images,
                agenda,
                speakers,
                registry,
            }),
        })
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the image-asset host client.
    pub fn images(&self) -> &Arc<ImageHost> {
        &self.inner.images
    }

    /// Get the agenda manager.
    pub fn agenda(&self) -> &Arc<AgendaManager> {
        &self.inner.agenda
    }

    /// Get the speakers manager.
    pub fn speakers(&self) -> &Arc<SpeakerManager> {
        &self.inner.speakers
    }

    /// Get the content type registry.
    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.inner.registry
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
