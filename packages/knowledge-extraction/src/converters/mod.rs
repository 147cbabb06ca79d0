//! Markup-to-text conversion.
//!
//! Conversion is CPU-bound and may be slow on hostile input, so the
//! pipeline runs it on the blocking pool under a wall-clock deadline and
//! falls back to [`strip_tags`] when the deadline passes.

pub mod html;

pub use html::HtmlTextConverter;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::pipeline::context::strip_tags;

/// Turns structured markup into a flat text stream.
pub trait TextConverter: Send + Sync {
    fn convert(&self, markup: &str) -> String;
}

/// Convert `markup` on the blocking pool, giving up after `timeout`.
///
/// On timeout, worker failure, or empty output the result of
/// [`strip_tags`] is returned instead. A late conversion is discarded.
pub async fn convert_with_timeout(
    converter: Arc<dyn TextConverter>,
    markup: &str,
    timeout: Duration,
) -> String {
    let owned = markup.to_owned();
    let worker = tokio::task::spawn_blocking(move || converter.convert(&owned));

    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            debug!(chars = text.len(), "markup converted");
            text
        }
        Ok(Ok(_)) => {
            debug!("converter returned no text, using fallback stripper");
            strip_tags(markup)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "converter task failed, using fallback stripper");
            strip_tags(markup)
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs_f64(), "conversion timed out, using fallback stripper");
            strip_tags(markup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl TextConverter for Slow {
        fn convert(&self, _markup: &str) -> String {
            std::thread::sleep(Duration::from_millis(500));
            "late".to_string()
        }
    }

    struct Blank;

    impl TextConverter for Blank {
        fn convert(&self, _markup: &str) -> String {
            String::new()
        }
    }

    struct Panics;

    impl TextConverter for Panics {
        fn convert(&self, _markup: &str) -> String {
            panic!("parser bug")
        }
    }

    #[tokio::test]
    async fn test_converter_result_is_used() {
        let text = convert_with_timeout(
            Arc::new(HtmlTextConverter::new()),
            "<p>Jane Doe</p>",
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(text.trim(), "Jane Doe");
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_strip_tags() {
        let text = convert_with_timeout(Arc::new(Slow), "<b>Jane</b> Doe", Duration::from_millis(20)).await;
        assert_eq!(text, "Jane Doe");
    }

    #[tokio::test]
    async fn test_empty_or_failed_conversion_falls_back() {
        let markup = "<i>x</i>yz";
        assert_eq!(convert_with_timeout(Arc::new(Blank), markup, Duration::from_secs(1)).await, "xyz");
        assert_eq!(convert_with_timeout(Arc::new(Panics), markup, Duration::from_secs(1)).await, "xyz");
    }
}
