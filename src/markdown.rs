//! Markdown to HTML for the chat scrollback
//!
//! Model output is untrusted: raw HTML in the source is emitted as escaped
//! text rather than passed through, and link or image destinations with a
//! scheme other than http, https or mailto are replaced by `#`.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

pub fn to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn neutralise(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_destination(&dest) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

/// Relative URLs and the allowed schemes pass; everything else is rejected
fn is_safe_destination(dest: &str) -> bool {
    // Browsers drop control characters and whitespace inside a scheme
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let Some((before, _)) = cleaned.split_once(':') else {
        return true;
    };
    if before.contains(['/', '?', '#']) {
        // The colon is past the scheme position, so this is a relative URL
        return true;
    }
    SAFE_SCHEMES
        .iter()
        .any(|scheme| before.eq_ignore_ascii_case(scheme))
}
