use rand::seq::IndexedRandom;

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Fixed pool of browser user-agent strings. One is picked at random for
/// every fetch attempt.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl UserAgentPool {
    /// A pool over `agents`; an empty list falls back to the built-in pool.
    #[must_use]
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            Self::default()
        } else {
            Self { agents }
        }
    }

    #[must_use]
    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .map_or(DEFAULT_USER_AGENTS[0], String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
