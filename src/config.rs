use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

const DEFAULT_FIELDS: &str = "alt,title,copyright,source";

/// Storyblok space region
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    Eu,
    Us,
    Ap,
    Ca,
    Cn,
}

impl Region {
    /// Management API base URL for this region
    pub fn api_url(self) -> &'static str {
        match self {
            Region::Eu => "https://mapi.storyblok.com/v1",
            Region::Us => "https://api-us.storyblok.com/v1",
            Region::Ap => "https://api-ap.storyblok.com/v1",
            Region::Ca => "https://api-ca.storyblok.com/v1",
            Region::Cn => "https://app.storyblokchina.cn/v1",
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(
    name = "storyblok-translate-asset-meta",
    version,
    about = "Translate the meta data of Storyblok assets into per-locale shadow fields using DeepL"
)]
pub struct Cli {
    /// Personal OAuth access token of a Storyblok user (not a space access token)
    #[arg(long, env = "STORYBLOK_OAUTH_TOKEN", hide_env_values = true)]
    pub token: String,

    /// ID of the space to process
    #[arg(long, env = "STORYBLOK_SPACE_ID")]
    pub space: String,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    pub deepl_api_key: String,

    /// Region of the space
    #[arg(long, env = "STORYBLOK_REGION", value_enum, default_value_t = Region::Eu)]
    pub region: Region,

    /// Comma separated list of meta data fields to translate
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_FIELDS)]
    pub fields: Vec<String>,

    /// Source locale to translate from; auto-detected when omitted
    #[arg(long)]
    pub source_lang: Option<String>,

    /// Comma separated list of content types to process (default: all)
    #[arg(long, value_delimiter = ',')]
    pub content_types: Vec<String>,

    /// Comma separated full slugs of stories to skip
    #[arg(long, value_delimiter = ',')]
    pub skip_stories: Vec<String>,

    /// Comma separated full slugs of stories to limit processing to
    #[arg(long, value_delimiter = ',')]
    pub only_stories: Vec<String>,

    /// Comma separated locales to process (default: all space languages)
    #[arg(long, value_delimiter = ',')]
    pub locales: Vec<String>,

    /// Overwrite existing translations
    #[arg(long)]
    pub overwrite: bool,

    /// Publish stories after updating (may publish previously unpublished stories)
    #[arg(long)]
    pub publish: bool,

    /// Only display the changes instead of performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Show detailed output for every processed asset
    #[arg(long)]
    pub verbose: bool,

    /// Override the Storyblok Management API base URL
    #[arg(long, env = "STORYBLOK_API_URL", hide = true)]
    pub storyblok_api_url: Option<String>,

    /// Override the DeepL API base URL
    #[arg(long, env = "DEEPL_API_URL", hide = true)]
    pub deepl_api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Storyblok
    pub oauth_token: String,
    pub space_id: String,
    pub region: Region,
    pub storyblok_api_url: String,

    // DeepL
    pub deepl_api_key: String,
    pub deepl_api_url: String,

    // Translation
    pub fields: Vec<String>,
    pub source_lang: Option<String>,
    /// Empty means: fetch the space languages
    pub locales: Vec<String>,
    pub overwrite: bool,

    // Story selection
    /// `None` means all content types
    pub content_types: Option<Vec<String>>,
    pub skip_stories: Vec<String>,
    pub only_stories: Vec<String>,

    // Run mode
    pub publish: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let oauth_token = cli.token.trim().to_string();
        if oauth_token.is_empty() {
            bail!("State your oauth token via the --token argument or the environment variable STORYBLOK_OAUTH_TOKEN");
        }
        let space_id = cli.space.trim().to_string();
        if space_id.is_empty() {
            bail!("State your space id via the --space argument or the environment variable STORYBLOK_SPACE_ID");
        }
        let deepl_api_key = cli.deepl_api_key.trim().to_string();
        if deepl_api_key.is_empty() {
            bail!("State your DeepL API key via the --deepl-api-key argument or the environment variable DEEPL_API_KEY");
        }

        let fields = clean_list(cli.fields);
        if fields.is_empty() {
            bail!("No meta data fields stated via --fields");
        }

        let content_types = Some(clean_list(cli.content_types)).filter(|t| !t.is_empty());

        let storyblok_api_url = cli
            .storyblok_api_url
            .unwrap_or_else(|| cli.region.api_url().to_string());
        let deepl_api_url = cli
            .deepl_api_url
            .unwrap_or_else(|| crate::translation::default_api_url(&deepl_api_key).to_string());

        Ok(Self {
            oauth_token,
            space_id,
            region: cli.region,
            storyblok_api_url,
            deepl_api_key,
            deepl_api_url,
            fields,
            source_lang: cli
                .source_lang
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            locales: clean_list(cli.locales),
            overwrite: cli.overwrite,
            content_types,
            skip_stories: clean_list(cli.skip_stories),
            only_stories: clean_list(cli.only_stories),
            publish: cli.publish,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }
}

/// Trim entries and drop empty ones
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 6] = [
        "STORYBLOK_OAUTH_TOKEN",
        "STORYBLOK_SPACE_ID",
        "DEEPL_API_KEY",
        "STORYBLOK_REGION",
        "STORYBLOK_API_URL",
        "DEEPL_API_URL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn parse(args: &[&str]) -> Result<Config> {
        let cli = Cli::try_parse_from(
            std::iter::once("storyblok-translate-asset-meta").chain(args.iter().copied()),
        )?;
        Config::from_cli(cli)
    }

    const REQUIRED: [&str; 6] = ["--token", "tok", "--space", "123", "--deepl-api-key", "key"];

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = parse(&REQUIRED).expect("valid config");

        assert_eq!(config.oauth_token, "tok");
        assert_eq!(config.space_id, "123");
        assert_eq!(config.region, Region::Eu);
        assert_eq!(config.storyblok_api_url, "https://mapi.storyblok.com/v1");
        assert_eq!(config.deepl_api_url, "https://api.deepl.com");
        assert_eq!(config.fields, vec!["alt", "title", "copyright", "source"]);
        assert_eq!(config.source_lang, None);
        assert!(config.locales.is_empty());
        assert!(config.content_types.is_none());
        assert!(config.skip_stories.is_empty());
        assert!(config.only_stories.is_empty());
        assert!(!config.overwrite);
        assert!(!config.publish);
        assert!(!config.dry_run);
        assert!(!config.verbose);
    }

    #[test]
    #[serial]
    fn test_all_options() {
        clear_env();
        let mut args = REQUIRED.to_vec();
        args.extend([
            "--region",
            "us",
            "--fields",
            "alt, title",
            "--source-lang",
            "en",
            "--content-types",
            "page,news-article",
            "--skip-stories",
            "home",
            "--only-stories",
            "about-us,",
            "--locales",
            "de,fr",
            "--overwrite",
            "--publish",
            "--dry-run",
            "--verbose",
        ]);

        let config = parse(&args).expect("valid config");

        assert_eq!(config.region, Region::Us);
        assert_eq!(config.storyblok_api_url, "https://api-us.storyblok.com/v1");
        assert_eq!(config.fields, vec!["alt", "title"]);
        assert_eq!(config.source_lang.as_deref(), Some("en"));
        assert_eq!(
            config.content_types,
            Some(vec!["page".to_string(), "news-article".to_string()])
        );
        assert_eq!(config.skip_stories, vec!["home"]);
        assert_eq!(config.only_stories, vec!["about-us"]);
        assert_eq!(config.locales, vec!["de", "fr"]);
        assert!(config.overwrite && config.publish && config.dry_run && config.verbose);
    }

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        clear_env();
        std::env::set_var("STORYBLOK_OAUTH_TOKEN", "env-token");
        std::env::set_var("STORYBLOK_SPACE_ID", "42");
        std::env::set_var("DEEPL_API_KEY", "free-key:fx");
        std::env::set_var("STORYBLOK_REGION", "ap");

        let result = parse(&[]);
        clear_env();
        let config = result.expect("valid config");

        assert_eq!(config.oauth_token, "env-token");
        assert_eq!(config.space_id, "42");
        assert_eq!(config.region, Region::Ap);
        assert_eq!(config.deepl_api_url, "https://api-free.deepl.com");
    }

    #[test]
    #[serial]
    fn test_missing_token_is_error() {
        clear_env();
        let result = parse(&["--space", "123", "--deepl-api-key", "key"]);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_invalid_region_is_error() {
        clear_env();
        let mut args = REQUIRED.to_vec();
        args.extend(["--region", "mars"]);
        assert!(parse(&args).is_err());
    }

    #[test]
    #[serial]
    fn test_empty_fields_is_error() {
        clear_env();
        let mut args = REQUIRED.to_vec();
        args.extend(["--fields", " , "]);
        let err = parse(&args).expect_err("should fail");
        assert!(err.to_string().contains("--fields"));
    }

    #[test]
    #[serial]
    fn test_api_url_overrides() {
        clear_env();
        std::env::set_var("STORYBLOK_API_URL", "http://localhost:1234");
        std::env::set_var("DEEPL_API_URL", "http://localhost:5678");

        let result = parse(&REQUIRED);
        clear_env();
        let config = result.expect("valid config");

        assert_eq!(config.storyblok_api_url, "http://localhost:1234");
        assert_eq!(config.deepl_api_url, "http://localhost:5678");
    }

    #[test]
    fn test_region_urls() {
        assert_eq!(Region::Ca.api_url(), "https://api-ca.storyblok.com/v1");
        assert_eq!(Region::Cn.api_url(), "https://app.storyblokchina.cn/v1");
    }
}
