use crate::content::{shadow_key, ContentNode, Node};
use tracing::debug;

/// Select the locales of `field` that need translating and install their
/// shadow copies.
///
/// A locale whose shadow already exists is skipped unless `overwrite` is set.
/// Every selected locale gets a fresh clone of `source` right away, so a run
/// that fails halfway still leaves structurally valid shadows behind.
pub fn prepare_shadows(
    node: &mut ContentNode,
    field: &str,
    source: &Node,
    locales: &[String],
    overwrite: bool,
) -> Vec<String> {
    let mut selected = Vec::new();

    for locale in locales {
        let key = shadow_key(field, locale);
        if node.contains_key(&key) && !overwrite {
            debug!(
                "  Translation already exists for language \"{}\". Use parameter --overwrite to force translation.",
                locale
            );
            continue;
        }

        node.insert(&key, source.clone());
        selected.push(locale.clone());
    }

    selected
}
