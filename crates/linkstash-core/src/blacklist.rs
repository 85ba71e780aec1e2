use url::Url;

/// Domain substrings whose hosts are rejected on add.
///
/// Matching is a case-insensitive substring test against the URL host, so an
/// entry `google.com` also rejects `maps.google.com`. Entries are stored
/// trimmed and lowercased. Hosts are compared as submitted; punycode/IDN
/// forms are not normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blacklist {
    domains: Vec<String>,
}

impl Blacklist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Parses the blacklist file format: one domain per line, `#` starts a
    /// comment, blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(|line| line.split('#').next().unwrap_or_default()),
        )
    }

    /// True when the URL host contains any configured domain.
    pub fn is_blacklisted(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.domains.iter().any(|domain| host.contains(domain.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn matches_host_substring_case_insensitively() {
        let blacklist = Blacklist::new(["google.com"]);
        assert!(blacklist.is_blacklisted(&url("https://MAPS.Google.com/x")));
        assert!(blacklist.is_blacklisted(&url("http://google.com")));
        assert!(!blacklist.is_blacklisted(&url("https://example.com/google.com")));
    }

    #[test]
    fn path_and_scheme_do_not_matter() {
        let blacklist = Blacklist::new(["google.com"]);
        assert!(blacklist.is_blacklisted(&url("ftp://files.google.com/a/b?c=d")));
        assert!(!blacklist.is_blacklisted(&url("https://example.com/?q=google.com")));
    }

    #[test]
    fn empty_blacklist_rejects_nothing() {
        let blacklist = Blacklist::default();
        assert!(!blacklist.is_blacklisted(&url("https://google.com")));
        assert!(blacklist.is_empty());
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let blacklist = Blacklist::parse("google.com\n# tracker hosts\n\n  Example.ORG  # inline\n");
        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.is_blacklisted(&url("https://www.example.org")));
        assert!(!blacklist.is_blacklisted(&url("https://tracker.net")));
    }
}
