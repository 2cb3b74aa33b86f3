use anyhow::Result;
use clap::Parser;
use storyblok_translate_asset_meta::config::{Cli, Config};
use storyblok_translate_asset_meta::run;
use storyblok_translate_asset_meta::storyblok::StoryblokClient;
use storyblok_translate_asset_meta::translation::DeeplTranslator;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_cli(Cli::parse())?;

    // Initialize logging; --verbose adds per-asset detail
    let level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("storyblok_translate_asset_meta={}", level).parse()?),
        )
        .init();

    let client = reqwest::Client::new();
    let store = StoryblokClient::new(client.clone(), &config.storyblok_api_url, &config.oauth_token);
    let translator = DeeplTranslator::new(client, &config.deepl_api_url, &config.deepl_api_key);

    let report = run::run(&config, &store, translator).await?;

    info!(
        "Process successfully finished in {} seconds.",
        report.elapsed.as_secs()
    );
    info!(
        "Stories processed: {} ({} updated{}, {} unchanged)",
        report.stories_processed,
        report.stories_updated,
        if config.dry_run { " in dry-run" } else { "" },
        report.stories_unchanged
    );
    info!(
        "DeepL requests: {}, cache hits: {}",
        report.translation_calls, report.cache_hits
    );
    info!("Total DeepL billed characters: {}", report.billed_characters);

    Ok(())
}
