//! Recursive content walker.
//!
//! Visits every field of a story's content depth-first. Translatable asset
//! fields get per-locale shadow copies with translated meta data; all other
//! objects and arrays are descended into. Shadow fields themselves are never
//! visited, so repeated runs cannot produce shadows of shadows.

use crate::cache::TranslationCache;
use crate::content::{shadow_key, Asset, ContentNode, Node};
use crate::schema::SchemaRegistry;
use crate::shadow::prepare_shadows;
use crate::translation::Translator;
use anyhow::Result;
use futures::future::BoxFuture;
use tracing::debug;

/// What to translate and where to.
#[derive(Debug, Clone)]
pub struct WalkSettings {
    pub locales: Vec<String>,
    pub fields: Vec<String>,
    pub overwrite: bool,
}

pub struct Walker<'a, T> {
    schemas: &'a SchemaRegistry,
    cache: &'a mut TranslationCache<T>,
    settings: &'a WalkSettings,
    dirty: bool,
}

impl<'a, T: Translator> Walker<'a, T> {
    pub fn new(
        schemas: &'a SchemaRegistry,
        cache: &'a mut TranslationCache<T>,
        settings: &'a WalkSettings,
    ) -> Self {
        Self {
            schemas,
            cache,
            settings,
            dirty: false,
        }
    }

    /// Walk one story's content in place.
    ///
    /// Returns whether any shadow field received translated text, i.e.
    /// whether the story needs saving.
    pub async fn walk_document(&mut self, content: &mut Node) -> Result<bool> {
        self.dirty = false;
        self.walk(content).await?;
        Ok(self.dirty)
    }

    fn walk<'b>(&'b mut self, node: &'b mut Node) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            match node {
                Node::Map(map) => self.walk_map(map).await,
                Node::List(items) => {
                    for item in items.iter_mut() {
                        self.walk(item).await?;
                    }
                    Ok(())
                }
                Node::Scalar(_) | Node::Asset(_) | Node::Assets(_) => Ok(()),
            }
        })
    }

    async fn walk_map(&mut self, map: &mut ContentNode) -> Result<()> {
        // Shadows added below are appended past this bound
        let count = map.len();

        for index in 0..count {
            if map.key_at(index).is_shadow() {
                continue;
            }

            let value = map.value_at(index);
            if matches!(value, Node::Asset(_) | Node::Assets(_)) {
                let field = map.key_at(index).name().to_string();
                self.translate_asset_field(map, index, &field).await?;
            } else if matches!(value, Node::Map(_) | Node::List(_)) {
                self.walk(map.value_at_mut(index)).await?;
            }
        }

        Ok(())
    }

    async fn translate_asset_field(
        &mut self,
        map: &mut ContentNode,
        index: usize,
        field: &str,
    ) -> Result<()> {
        let settings = self.settings;
        let source = map.value_at(index).clone();

        let assets: Vec<(Option<usize>, &Asset)> = match &source {
            Node::Asset(asset) => {
                debug!("- Single asset field \"{}\":", field);
                vec![(None, asset)]
            }
            Node::Assets(items) => {
                debug!("- Multi asset field \"{}\":", field);
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| item.as_asset().map(|asset| (Some(i), asset)))
                    .collect()
            }
            _ => return Ok(()),
        };

        if !self.schemas.is_translatable(map.component(), field)? {
            debug!("  Field is not marked as translatable. Skipping.");
            return Ok(());
        }

        let locales = prepare_shadows(map, field, &source, &settings.locales, settings.overwrite);
        if locales.is_empty() {
            return Ok(());
        }

        for (position, asset) in assets {
            debug!("  - Asset {}:", asset.filename());

            for meta_field in &settings.fields {
                debug!("    - Field \"{}\":", meta_field);
                let Some(text) = asset.meta_value(meta_field) else {
                    debug!("      Not set in default language. Skipping.");
                    continue;
                };
                debug!("      Default value: {}", text);

                for locale in &locales {
                    let translated = self.cache.translate(text, locale).await?;
                    debug!("      Translation to \"{}\": {}", locale, translated);

                    if let Some(target) = map
                        .get_mut(&shadow_key(field, locale))
                        .and_then(|shadow| shadow.asset_mut(position))
                    {
                        target.set_meta_value(meta_field, &translated);
                    }
                    self.dirty = true;
                }
            }
        }

        Ok(())
    }
}
