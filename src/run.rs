use crate::cache::TranslationCache;
use crate::config::Config;
use crate::content::Node;
use crate::schema::SchemaRegistry;
use crate::storyblok::{ContentStore, Story, StorySummary};
use crate::translation::Translator;
use crate::walker::{WalkSettings, Walker};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Stories walked
    pub stories_processed: usize,
    /// Stories saved (or, in dry-run mode, that would have been saved)
    pub stories_updated: usize,
    /// Stories that needed no update
    pub stories_unchanged: usize,
    pub billed_characters: u64,
    pub translation_calls: usize,
    pub cache_hits: usize,
    pub elapsed: Duration,
}

/// Whether a listed story is selected for processing
pub fn is_eligible(config: &Config, story: &StorySummary) -> bool {
    if story.is_folder {
        return false;
    }

    let type_matches = match (&config.content_types, &story.content_type) {
        (None, _) => true,
        (Some(types), Some(content_type)) => types.contains(content_type),
        (Some(_), None) => false,
    };

    let skipped = config.skip_stories.contains(&story.full_slug);
    let included = config.only_stories.is_empty() || config.only_stories.contains(&story.full_slug);

    type_matches && !skipped && included
}

/// Translate asset meta data for every eligible story of the configured space.
///
/// Any error aborts the run; stories saved before the failure stay saved.
pub async fn run<S, T>(config: &Config, store: &S, translator: T) -> Result<RunReport>
where
    S: ContentStore,
    T: Translator,
{
    let started = Instant::now();

    let mut locales = config.locales.clone();
    if locales.is_empty() {
        info!("No locales stated. Fetching space locales...");
        locales = store
            .space_languages(&config.space_id)
            .await
            .context("Failed to fetch space languages")?;
    }

    log_settings(config, &locales);

    info!("Fetching stories...");
    let summaries = store
        .list_stories(&config.space_id)
        .await
        .context("Failed to list stories")?;

    let mut stories = Vec::new();
    for summary in summaries.iter().filter(|s| is_eligible(config, s)) {
        let story = store
            .fetch_story(&config.space_id, summary.id)
            .await
            .with_context(|| format!("Failed to fetch story {}", summary.full_slug))?;
        stories.push(story);
    }
    info!("Selected {} of {} stories", stories.len(), summaries.len());

    info!("Fetching components...");
    let components = store
        .fetch_components(&config.space_id)
        .await
        .context("Failed to fetch components")?;
    let schemas = SchemaRegistry::new(components);
    debug!("Loaded {} component schemas", schemas.len());

    let settings = WalkSettings {
        locales,
        fields: config.fields.clone(),
        overwrite: config.overwrite,
    };
    let mut cache = TranslationCache::new(translator, config.source_lang.clone());
    let mut report = RunReport::default();

    info!("Processing stories...");
    for mut story in stories {
        debug!("Slug \"{}\" / Name \"{}\"", story.full_slug, story.name);

        let slug = story.full_slug.clone();
        let changed = process_story(&mut story, &schemas, &mut cache, &settings)
            .await
            .with_context(|| format!("Failed to process story {}", slug))?;
        report.stories_processed += 1;

        if !changed {
            debug!("No update required.");
            report.stories_unchanged += 1;
            continue;
        }

        report.stories_updated += 1;

        if config.dry_run {
            info!("Dry-run: story \"{}\" would be updated", story.full_slug);
            continue;
        }

        store
            .update_story(&config.space_id, &story, config.publish)
            .await?;
        info!("Story \"{}\" successfully updated", story.full_slug);
    }

    report.billed_characters = cache.billed_characters();
    report.translation_calls = cache.api_calls();
    report.cache_hits = cache.cache_hits();
    report.elapsed = started.elapsed();

    Ok(report)
}

/// Walk one story's content, writing the result back into the story.
/// Returns whether the story changed.
async fn process_story<T: Translator>(
    story: &mut Story,
    schemas: &SchemaRegistry,
    cache: &mut TranslationCache<T>,
    settings: &WalkSettings,
) -> Result<bool> {
    let mut content = Node::from(story.content.take());
    let result = Walker::new(schemas, cache, settings)
        .walk_document(&mut content)
        .await;
    story.content = content.into();
    result
}

fn log_settings(config: &Config, locales: &[String]) {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    info!("Performing translation of asset meta data for space {}:", config.space_id);
    info!("- region: {:?} ({})", config.region, config.storyblok_api_url);
    info!("- mode: {}", if config.dry_run { "dry-run" } else { "live" });
    info!("- publish: {}", yes_no(config.publish));
    info!("- overwrite: {}", yes_no(config.overwrite));
    info!("- fields: {}", config.fields.join(", "));
    info!(
        "- source locale: {}",
        config.source_lang.as_deref().unwrap_or("auto-detect")
    );
    info!("- target locales: {}", locales.join(", "));
    info!(
        "- content types: {}",
        config
            .content_types
            .as_ref()
            .map(|t| t.join(", "))
            .unwrap_or_else(|| "all".to_string())
    );
    if !config.skip_stories.is_empty() {
        info!("- skipped stories: {}", config.skip_stories.join(", "));
    }
    if !config.only_stories.is_empty() {
        info!("- only stories: {}", config.only_stories.join(", "));
    }
}
