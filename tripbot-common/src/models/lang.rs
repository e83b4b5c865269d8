// File: tripbot-common/src/models/lang.rs

/// Language replies are authored in, and the fallback when detection fails.
pub const DEFAULT_LANG: &str = "th";

/// Text tagged with the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub text: String,
    pub lang: String,
}

impl Localized {
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self { text: text.into(), lang: lang.into() }
    }
}

/// Normalizes detector output such as `en-US` or `TH` to a bare lowercase code.
pub fn base_lang(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(DEFAULT_LANG)
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_suffix_is_dropped() {
        assert_eq!(base_lang("en-US"), "en");
        assert_eq!(base_lang("zh_TW"), "zh");
        assert_eq!(base_lang("TH"), "th");
    }
}
