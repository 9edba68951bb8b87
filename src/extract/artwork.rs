//! Image URL extraction from an artwork page.
//!
//! Best-effort heuristics over markup the site does not guarantee: every
//! failure yields an empty list, nothing here returns an error or panics.

use regex::Regex;
use scraper::{Html, Selector};

/// Host serving original image assets.
pub const IMAGE_HOST: &str = "i.pximg.net";

/// Upper bound on gallery size; pixiv allows at most 200 pages per artwork.
/// Larger counts read from the markup are clamped to it.
pub const MAX_PAGES: u32 = 200;

/// Extension assumed when only the `og:image` fallback is available.
pub const DEFAULT_EXTENSION: &str = "png";

const ORIGINAL_IMAGE_PATTERN: &str = r"https://i\.pximg\.net/img-original/img/\d{4}/\d{2}/\d{2}/\d{2}/\d{2}/\d{2}/(\d+_p\d+\.(png|jpg|jpeg|gif))";

const DATE_PATH_PATTERN: &str = r"img/(\d{4}/\d{2}/\d{2}/\d{2}/\d{2}/\d{2})";

/// Derive the ordered original-image URLs of an artwork page.
///
/// Returns an empty list when no usable URL pattern is found.
pub fn extract_image_urls(html: &str, artwork_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let og_image = og_image(&document);

    let mut page_count = preview_page_count(&document).unwrap_or(1);
    if page_count > 1 {
        tracing::info!("Detected {} pages from Preview div for {}", page_count, artwork_url);
    }

    if page_count == 1 {
        if let Some(count) = og_image.as_deref().and_then(og_image_page_count) {
            if count > page_count {
                page_count = count;
                tracing::info!("Adjusted page_count to {} from og:image for {}", page_count, artwork_url);
            }
        }
    }

    let Some((base, ext)) = original_image_base(html)
        .or_else(|| fallback_image_base(og_image.as_deref(), artwork_url))
    else {
        return Vec::new();
    };

    if page_count > MAX_PAGES {
        tracing::warn!(
            "Page count {} for {} exceeds {}, clamping",
            page_count,
            artwork_url,
            MAX_PAGES
        );
        page_count = MAX_PAGES;
    }

    let urls = image_urls(&base, &ext, page_count);
    tracing::info!("Generated {} image URLs for {}", urls.len(), artwork_url);
    urls
}

/// Build `{base}_p{i}.{ext}` for every page index, at most `MAX_PAGES`.
pub fn image_urls(base: &str, ext: &str, page_count: u32) -> Vec<String> {
    (0..page_count.min(MAX_PAGES))
        .map(|i| format!("{}_p{}.{}", base, i, ext))
        .collect()
}

/// Read the `i/N` indicator of the gallery preview.
fn preview_page_count(document: &Html) -> Option<u32> {
    let preview = Selector::parse(r#"div[aria-label="Preview"]"#).ok()?;
    let span = Selector::parse("span").ok()?;

    let text: String = document
        .select(&preview)
        .next()?
        .select(&span)
        .next()?
        .text()
        .collect();

    let (_, total) = text.split_once('/')?;
    total.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn og_image(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("content")
        .map(str::to_string)
}

/// Page count implied by a `_pN.` suffix on an image-host `og:image`.
fn og_image_page_count(content: &str) -> Option<u32> {
    if !content.contains(IMAGE_HOST) {
        return None;
    }
    let pattern = Regex::new(r"_p(\d+)\.").ok()?;
    let index: u32 = pattern.captures(content)?.get(1)?.as_str().parse().ok()?;
    index.checked_add(1)
}

/// Base path and extension from an original-image URL anywhere in the markup.
fn original_image_base(html: &str) -> Option<(String, String)> {
    let pattern = Regex::new(ORIGINAL_IMAGE_PATTERN).ok()?;
    let captures = pattern.captures(html)?;
    let full = captures.get(0)?.as_str();
    let (base, _) = full.rsplit_once("_p")?;
    let ext = captures.get(2)?.as_str();
    Some((base.to_string(), ext.to_string()))
}

/// Reconstruct the base path from the `og:image` date segment.
fn fallback_image_base(og_image: Option<&str>, artwork_url: &str) -> Option<(String, String)> {
    let Some(content) = og_image.filter(|c| c.contains(IMAGE_HOST)) else {
        tracing::error!("No valid image URL pattern found for {}", artwork_url);
        return None;
    };

    let pattern = Regex::new(DATE_PATH_PATTERN).ok()?;
    let Some(date_path) = pattern.captures(content).and_then(|c| c.get(1)) else {
        tracing::error!("No date path found in og:image for {}", artwork_url);
        return None;
    };

    let illust_id = artwork_url.trim_end_matches('/').rsplit('/').next()?;
    if illust_id.is_empty() {
        return None;
    }

    Some((
        format!(
            "https://{}/img-original/img/{}/{}",
            IMAGE_HOST,
            date_path.as_str(),
            illust_id
        ),
        DEFAULT_EXTENSION.to_string(),
    ))
}
