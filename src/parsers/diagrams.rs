use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::Config;

/// Characters escaped in the trailing filename segment. `%` is left alone so
/// already-encoded names are not encoded twice.
const FILENAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

pub const DEFAULT_EDUCATIONAL_MARKER: &str = "/qns/";
pub const DEFAULT_AD_URL_KEYWORDS: &[&str] = &["banner", "ad", "sponsor", "promo"];

/// Filters advertisement images out of a question's image list.
#[derive(Debug, Clone)]
pub struct DiagramResolver {
    educational_marker: String,
    ad_keywords: Vec<String>,
}

impl Default for DiagramResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_EDUCATIONAL_MARKER,
            DEFAULT_AD_URL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        )
    }
}

impl DiagramResolver {
    pub fn new(educational_marker: impl Into<String>, ad_keywords: Vec<String>) -> Self {
        Self {
            educational_marker: educational_marker.into(),
            ad_keywords: ad_keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.educational_path_marker.clone(), config.ad_url_keywords.clone())
    }

    /// A URL under the educational path is never an ad; anything else is an
    /// ad when it contains one of the keywords.
    pub fn is_advertisement(&self, url: &str) -> bool {
        if url.contains(&self.educational_marker) {
            return false;
        }
        let lower = url.to_lowercase();
        self.ad_keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
    }

    /// Drop ads and blanks, percent-encode filenames and remove duplicates,
    /// keeping first-seen order.
    pub fn resolve<S: AsRef<str>>(&self, urls: &[S]) -> Vec<String> {
        let mut diagrams: Vec<String> = Vec::new();
        for url in urls {
            let url = url.as_ref().trim();
            if url.is_empty() || self.is_advertisement(url) {
                continue;
            }
            let encoded = encode_filename(url);
            if !diagrams.contains(&encoded) {
                diagrams.push(encoded);
            }
        }
        diagrams
    }
}

/// Percent-encode only the part after the last `/`.
pub fn encode_filename(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((prefix, filename)) => {
            format!("{}/{}", prefix, utf8_percent_encode(filename, FILENAME_ENCODE_SET))
        }
        None => utf8_percent_encode(url, FILENAME_ENCODE_SET).to_string(),
    }
}
