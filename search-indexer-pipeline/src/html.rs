//! Cleaning text destined for the all-text aggregates.

use lazy_static::lazy_static;
use regex::Regex;

/// Words longer than this are dropped from all-text values.
pub const DEFAULT_LONG_WORD_LIMIT: usize = 256;

lazy_static! {
    static ref SCRIPT_BLOCK: Regex =
        Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid script pattern");
    static ref STYLE_BLOCK: Regex =
        Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid style pattern");
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern");
}

/// Strips markup and overlong words from indexed text.
#[derive(Debug, Clone)]
pub struct HtmlTagHelper {
    long_word_limit: usize,
}

impl Default for HtmlTagHelper {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_WORD_LIMIT)
    }
}

impl HtmlTagHelper {
    pub fn new(long_word_limit: usize) -> Self {
        Self { long_word_limit }
    }

    pub fn long_word_limit(&self) -> usize {
        self.long_word_limit
    }

    /// Remove tags (and script/style contents) and collapse whitespace.
    /// Adjacent tags leave a space so words do not glue. Entities are kept
    /// as written, so escaped markup never turns into tags.
    pub fn strip_tags(&self, value: &str) -> String {
        let value = SCRIPT_BLOCK.replace_all(value, " ");
        let value = STYLE_BLOCK.replace_all(&value, " ");
        let value = TAG.replace_all(&value, " ");

        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn strip_long_words(&self, value: &str) -> String {
        value
            .split_whitespace()
            .filter(|word| word.chars().count() <= self.long_word_limit)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        let helper = HtmlTagHelper::default();
        assert_eq!(helper.strip_tags("<p>Red</p><p>Shirt</p>"), "Red Shirt");
        assert_eq!(helper.strip_tags("<b>Tom</b> &amp; Jerry"), "Tom &amp; Jerry");
        assert_eq!(
            helper.strip_tags("Soft <script>alert('x')</script><style>p{}</style>cotton"),
            "Soft cotton"
        );
    }

    #[test]
    fn test_escaped_markup_stays_escaped() {
        let helper = HtmlTagHelper::default();
        let escaped = "&lt;b&gt;bold&lt;/b&gt; shirt";

        let stripped = helper.strip_tags(escaped);

        assert_eq!(stripped, escaped);
        assert_eq!(helper.strip_tags(&stripped), stripped);
    }

    #[test]
    fn test_strip_long_words() {
        let helper = HtmlTagHelper::new(5);
        assert_eq!(helper.strip_long_words("short loooooong words"), "short words");
        assert_eq!(helper.strip_long_words("fünff"), "fünff");
    }
}
