//! Illustration prompts and image-service URLs for proverbs.
//!
//! Nothing here performs a network call; the URL is handed to clients, which
//! fetch the rendered image themselves.

use crate::config::ImageryConfig;
use crate::text;

const DEFAULT_STYLE: &str = "Romanian folk art illustration, traditional motifs, vibrant colors";

/// Style hints keyed by folded category name.
const CATEGORY_STYLES: &[(&str, &str)] = &[
    ("familie", "warm family gathering, generations together, traditional Romanian heritage"),
    ("filozofie", "contemplative wisdom, Romanian folk symbols, sacred geometry"),
    ("munca", "honest labor in a traditional Romanian village, rustic crafts"),
    ("natura", "Romanian countryside landscape, forests and mountains, pastoral scene"),
    ("prietenie", "friendship bonds, village community gathering, unity and trust"),
    ("dragoste", "tender moments, embroidered heart motifs, warm colors"),
    ("intelepciune", "wise elder by the hearth, old scrolls, soft enlightening light"),
    ("viata", "life journey through the seasons, growth and transformation"),
];

pub fn category_style(category: Option<&str>) -> &'static str {
    let Some(category) = category else {
        return DEFAULT_STYLE;
    };
    let key = text::fold(category.trim());
    CATEGORY_STYLES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, style)| *style)
        .unwrap_or(DEFAULT_STYLE)
}

/// Prompt describing a folk-art illustration of the proverb.
pub fn folk_art_prompt(proverb_text: &str, category: Option<&str>, region: Option<&str>) -> String {
    let region_context = region
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!(", from the {} region of Romania", r))
        .unwrap_or_default();

    format!(
        "Illustrate the Romanian proverb \"{}\". Style: traditional Romanian folk art, watercolor, \
         warm earthy colors. Context: {}{}. Detailed illustration, cultural heritage",
        proverb_text.trim(),
        category_style(category),
        region_context
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub model: String,
    pub nologo: bool,
    pub enhance: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            seed: None,
            model: "flux".to_string(),
            nologo: true,
            enhance: false,
        }
    }
}

impl From<&ImageryConfig> for ImageOptions {
    fn from(config: &ImageryConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            seed: None,
            model: config.model.clone(),
            nologo: config.nologo,
            enhance: config.enhance,
        }
    }
}

/// `{base}/{encoded prompt}?width=..&height=..[&seed=..]&model=..[&nologo=true][&enhance=true]`
pub fn image_url(base_url: &str, prompt: &str, options: &ImageOptions) -> String {
    let mut url = format!(
        "{}/{}?width={}&height={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(prompt),
        options.width,
        options.height
    );
    if let Some(seed) = options.seed {
        url.push_str(&format!("&seed={}", seed));
    }
    url.push_str("&model=");
    url.push_str(&urlencoding::encode(&options.model));
    if options.nologo {
        url.push_str("&nologo=true");
    }
    if options.enhance {
        url.push_str("&enhance=true");
    }
    url
}

/// Prompt and URL for a proverb, as stored in `image_prompt` / `image_url`.
pub fn illustrate(
    config: &ImageryConfig,
    proverb_text: &str,
    category: Option<&str>,
    region: Option<&str>,
) -> (String, String) {
    let prompt = folk_art_prompt(proverb_text, category, region);
    let url = image_url(&config.base_url, &prompt, &ImageOptions::from(config));
    (prompt, url)
}
