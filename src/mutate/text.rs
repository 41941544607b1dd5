//! Text replacement.
//!
//! The first run of the first paragraph is taken to carry the template's
//! style: it keeps its run properties and receives the new text, everything
//! after it is dropped.
use crate::error::{DeckError, Result};
use crate::key::{self, PrimaryKey};
use crate::ooxml::pptx::Package;
use crate::ooxml::pptx::shapes::textframe;
use serde::{Deserialize, Serialize};

/// What to do when a text frame holds more than one run's worth of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPolicy {
    /// Keep the first paragraph and its first run, drop the rest
    #[default]
    Collapse,
    /// Refuse with [`DeckError::WouldDiscardContent`] instead of dropping
    Strict,
}

/// Replace the text of the shape at `key`.
pub fn replace_text(
    pkg: &mut Package,
    key: &PrimaryKey,
    content: &str,
    policy: TextPolicy,
) -> Result<()> {
    let (slide, shape) = key::resolve(pkg, key)?;
    if !shape.has_text_frame() {
        return Err(DeckError::NoTextFrame(key.to_string()));
    }

    if let (TextPolicy::Strict, Some(frame)) = (policy, shape.text_frame()) {
        let paragraphs = frame.paragraph_count();
        let runs = frame.first_paragraph_content_count();
        if paragraphs > 1 || runs > 1 {
            return Err(DeckError::WouldDiscardContent {
                key: key.to_string(),
                paragraphs,
                runs,
            });
        }
    }

    let position = shape.position();
    let a = slide.prefixes().a;

    let slide = pkg
        .slide_mut(key.slide_id)
        .ok_or_else(|| DeckError::slide_not_found(key.slide_id))?;
    let tx_body = slide
        .text_body_mut(position)?
        .ok_or_else(|| DeckError::NoTextFrame(key.to_string()))?;
    textframe::collapse_into_first_run(tx_body, &a, content);

    tracing::debug!(%key, chars = content.chars().count(), "replaced text");
    Ok(())
}
