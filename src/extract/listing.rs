//! Profile and artwork-listing page parsing.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};

/// Heading preceding the artwork counter on a profile page.
const ARTWORKS_HEADING: &str = "Illustrations and Manga";

/// Artwork links found on a listing page, absolutized against `base_url`,
/// in document order and without duplicates.
pub fn artwork_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let Ok(href_pattern) = Regex::new(r"^/en/artworks/\d+$") else {
        return Vec::new();
    };
    let base_url = base_url.trim_end_matches('/');

    let mut seen = HashSet::new();
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href_pattern.is_match(href))
        .map(|href| format!("{}{}", base_url, href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Total artwork count shown on a user's profile page.
pub fn artwork_count(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h2, span").ok()?;

    // Selection is in document order: find the heading, then the next span.
    let mut after_heading = false;
    for element in document.select(&selector) {
        let text: String = element.text().collect();
        match element.value().name() {
            "h2" if text.trim() == ARTWORKS_HEADING => after_heading = true,
            "span" if after_heading => {
                let text = text.trim();
                if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                    return text.parse().ok();
                }
                return None;
            }
            _ => {}
        }
    }
    None
}

/// Href of the link advancing the listing to page `next`.
pub fn next_page_href(html: &str, next: u32) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    let needle = format!("?p={}", next);

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href_has_page(href, &needle))
        .map(str::to_string)
}

// "?p=1" must not match "?p=12".
fn href_has_page(href: &str, needle: &str) -> bool {
    href.match_indices(needle).any(|(idx, _)| {
        !href[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// Whether the listing's pagination container is present.
pub fn has_paginator(html: &str, selector: &str) -> bool {
    let Ok(selector) = Selector::parse(selector) else {
        tracing::warn!("Invalid paginator selector: {}", selector);
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

/// Profile page URL of a user.
pub fn user_url(base_url: &str, user_id: &str) -> String {
    format!("{}/en/users/{}", base_url.trim_end_matches('/'), user_id)
}

/// Artwork listing URL of a user.
pub fn artworks_url(base_url: &str, user_id: &str) -> String {
    format!("{}/artworks", user_url(base_url, user_id))
}

/// URL of one listing page (1-based).
pub fn listing_page_url(base_url: &str, user_id: &str, page: u32) -> String {
    format!("{}?p={}", artworks_url(base_url, user_id), page)
}

/// Canonical artwork URL for an artwork ID.
pub fn artwork_url(base_url: &str, artwork_id: &str) -> String {
    format!("{}/en/artworks/{}", base_url.trim_end_matches('/'), artwork_id)
}
