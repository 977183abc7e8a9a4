//! Built-in result renderers.
//!
//! - `docs`: article list for documentation pages.
//! - `cards`: card layout for blogs, with a tag chip for blog posts.

use crate::{
    config::Config,
    hit::{FIELD_BODY, FIELD_PATH, FIELD_TITLE, Hit},
};

/// Registry name of [`render_docs`].
pub const DOCS: &str = "docs";
/// Registry name of [`render_cards`].
pub const CARDS: &str = "cards";

/// Render a hit as a documentation article.
pub fn render_docs(hit: &Hit, config: &Config) -> String {
    let path = hit.relative_path();
    let link = config.link_for(&format!("{path}.html"));
    let title = hit.highlighted_or_field(FIELD_TITLE).unwrap_or_default();

    let preview_html = match hit.highlight(FIELD_BODY) {
        Some(preview) if config.show_preview() && !preview.is_empty() => {
            format!(r#"<p class="ps-preview">{preview}</p>"#)
        }
        _ => String::new(),
    };

    let score_html = if config.show_score() {
        format!(r#"<span class="ps-score">score: {:.4}</span>"#, hit.score)
    } else {
        String::new()
    };

    let path_html = if config.show_path() {
        format!(r#"<span class="ps-path">{path}</span>"#)
    } else {
        String::new()
    };

    let meta_html = if config.show_score() || config.show_path() {
        format!(r#"<footer class="ps-meta">{score_html}{path_html}</footer>"#)
    } else {
        String::new()
    };

    format!(
        r#"
<article class="ps-result">
  <header>
    <a href="{link}">{title}</a>
  </header>
  {preview_html}
  {meta_html}
</article>"#
    )
}

/// Render a hit as a card, tagging posts under `/blog`.
pub fn render_cards(hit: &Hit, config: &Config) -> String {
    let path = hit.field(FIELD_PATH).unwrap_or_default();
    let link = config.link_for(&format!("{}.html", hit.relative_path()));
    let title = hit.highlighted_or_field(FIELD_TITLE).unwrap_or_default();

    let tags = if path.starts_with("/blog") {
        r#"<span class="ps-tag">blog</span>"#
    } else {
        ""
    };

    let preview_html = match hit.highlight(FIELD_BODY) {
        Some(preview) if config.show_preview() => format!("<p>{preview}</p>"),
        _ => String::new(),
    };

    format!(
        r#"
<div class="ps-card">
  <div class="ps-card-content">
    <a class="ps-card-title" href="{link}">{title}</a>
    &nbsp;{tags}
    {preview_html}
  </div>
</div>"#
    )
}
