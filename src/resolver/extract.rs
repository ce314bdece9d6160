use scraper::{ElementRef, Html, Selector};

/// What a page says about itself. Missing or whitespace-only tags are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedMetadata {
    pub title: Option<String>,
    pub image: Option<String>,
}

/// Parse Open Graph tags from `html`.
///
/// The title falls back to the `<title>` element. Anything that is not HTML
/// (or is truncated) parses as a document with no tags, never as an error.
pub fn extract_og_data(html: &str) -> ScrapedMetadata {
    let document = Html::parse_document(html);
    let og = |property: &str| {
        first_value(
            &document,
            &format!(r#"meta[property="{property}"]"#),
            |el| el.value().attr("content").map(str::to_string),
        )
    };

    ScrapedMetadata {
        title: og("og:title")
            .or_else(|| first_value(&document, "title", |el| Some(el.text().collect()))),
        image: og("og:image"),
    }
}

/// Trimmed value read from the first element matching `css`; blank is `None`.
fn first_value<F>(doc: &Html, css: &str, read: F) -> Option<String>
where
    F: FnOnce(ElementRef<'_>) -> Option<String>,
{
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .next()
        .and_then(read)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
