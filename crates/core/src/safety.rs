//! Emergency keyword detection.

/// Returns `true` when `text` mentions any of the emergency `keywords`.
///
/// Keywords are expected in lowercase; the text is lowercased before matching.
pub fn is_emergency(text: &str, keywords: &[String]) -> bool {
    let lowered = text.to_lowercase();
    let hit = keywords.iter().find(|k| lowered.contains(k.as_str()));
    if let Some(keyword) = hit {
        tracing::info!(keyword = %keyword, "emergency keyword detected");
    }
    hit.is_some()
}
