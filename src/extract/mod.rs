//! Page extraction module.
//!
//! This module provides:
//! - Original image URL derivation from artwork pages
//! - Artwork link, counter and pagination lookups on listing pages

pub mod artwork;
pub mod listing;

pub use artwork::{extract_image_urls, image_urls, DEFAULT_EXTENSION, IMAGE_HOST};
pub use listing::{
    artwork_count, artwork_links, artwork_url, artworks_url, has_paginator, listing_page_url,
    next_page_href, user_url,
};
