use mindful_storage::Settings;
use regex::Regex;
use std::sync::OnceLock;

/// Decides whether a hostname falls under the block list
#[derive(Debug, Clone, Default)]
pub struct BlockFilter {
    block_list: Vec<String>,
}

impl BlockFilter {
    #[must_use]
    pub fn new(block_list: Vec<String>) -> Self {
        Self { block_list }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.block_list.clone())
    }

    /// Check if a hostname is blocked.
    ///
    /// Matching is plain substring containment of each entry in the hostname,
    /// so "facebook.com" also blocks "facebook.com.evil.com" and
    /// "notfacebook.com".
    #[must_use]
    pub fn is_blocked(&self, hostname: &str) -> bool {
        self.block_list
            .iter()
            .any(|site| hostname.contains(site.as_str()))
    }
}

/// Strip a single leading `www.` label.
#[must_use]
pub fn normalize_domain(hostname: &str) -> &str {
    hostname.strip_prefix("www.").unwrap_or(hostname)
}

/// Turn user input such as `https://www.Example.com/path` into `example.com`.
#[must_use]
pub fn clean_domain(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);

    without_www
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z]{2,})+$").unwrap()
    })
}

/// Accepts `label(.tld)+` where the first label is alphanumeric with inner
/// hyphens and every following label is alphabetic.
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    domain_pattern().is_match(domain)
}
