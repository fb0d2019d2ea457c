//! Projection of the results container into display cards.

use shared::domain::SearchResult;

pub const RESULTS_HEADING: &str = "Similar Faces Found";
pub const SOURCE_LINK_LABEL: &str = "View Source";
pub const IMAGE_LOAD_ERROR_LABEL: &str = "Image Load Error";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub image_url: String,
    pub alt_text: String,
    pub badge: String,
    /// `None` when the service sent no usable link; no `View Source` is shown.
    pub source_url: Option<String>,
}

/// `92.345` → `"92.3% Match"`. Out-of-range scores are shown as received.
pub fn format_similarity(similarity: f64) -> String {
    format!("{similarity:.1}% Match")
}

pub fn project_cards(results: &[SearchResult]) -> Vec<ResultCard> {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| ResultCard {
            image_url: result.url.clone(),
            alt_text: format!("Match {}", index + 1),
            badge: format_similarity(result.similarity),
            source_url: result
                .source_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        })
        .collect()
}

/// Plain-text gallery; empty when there are no cards.
pub fn render_text(cards: &[ResultCard]) -> String {
    if cards.is_empty() {
        return String::new();
    }

    let mut out = format!("{RESULTS_HEADING}\n");
    for (index, card) in cards.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<12} {}\n",
            format!("{}.", index + 1),
            card.badge,
            card.image_url,
        ));
        if let Some(source_url) = &card.source_url {
            out.push_str(&format!("      {SOURCE_LINK_LABEL}: {source_url}\n"));
        }
    }
    out
}
