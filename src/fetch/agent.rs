// src/fetch/agent.rs
// =============================================================================
// User-agent selection.
//
//   --user-agent web   -> a random desktop browser UA per request (default)
//   --user-agent mobi  -> a random mobile browser UA per request
//   anything else      -> sent verbatim
// =============================================================================

const WEB_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

const MOBILE_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    Web,
    Mobile,
    Fixed(String),
}

impl UserAgent {
    pub fn parse(value: &str) -> UserAgent {
        match value.trim().to_ascii_lowercase().as_str() {
            "web" => UserAgent::Web,
            "mobi" => UserAgent::Mobile,
            _ => UserAgent::Fixed(value.trim().to_string()),
        }
    }

    /// The header value for the next request
    pub fn pick(&self) -> &str {
        match self {
            UserAgent::Web => WEB_AGENTS[fastrand::usize(..WEB_AGENTS.len())],
            UserAgent::Mobile => MOBILE_AGENTS[fastrand::usize(..MOBILE_AGENTS.len())],
            UserAgent::Fixed(agent) => agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(UserAgent::parse("web"), UserAgent::Web);
        assert_eq!(UserAgent::parse("MOBI"), UserAgent::Mobile);
        assert_eq!(UserAgent::parse("my-scanner/1.0"), UserAgent::Fixed("my-scanner/1.0".to_string()));
    }

    #[test]
    fn test_pick_stays_in_its_pool() {
        for _ in 0..20 {
            assert!(WEB_AGENTS.contains(&UserAgent::Web.pick()));
            assert!(MOBILE_AGENTS.contains(&UserAgent::Mobile.pick()));
        }
        assert_eq!(UserAgent::Fixed("x".to_string()).pick(), "x");
    }
}
