/// SupportCrew centralized constants.
/// Model ids, endpoints, limits and environment variable names live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_CHAT_MODEL: &str = "mistral-small";
    pub const DEFAULT_EMBED_MODEL: &str = "mistral-embed";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
    pub const EMBEDDINGS_PATH: &str = "/v1/embeddings";

    /// Documentation page the support representative scrapes for answers.
    pub const CREW_DOCS_URL: &str =
        "https://docs.crewai.com/how-to/Creating-a-Crew-and-kick-it-off/";
}

// ─── Environment ──────────────────────────────────────────────────────────────

pub mod env {
    pub const API_KEY: &str = "MISTRAL_API_KEY";
    pub const MODEL: &str = "SUPPORTCREW_MODEL";
    pub const EMBED_MODEL: &str = "SUPPORTCREW_EMBED_MODEL";
    pub const BASE_URL: &str = "SUPPORTCREW_BASE_URL";
    pub const TIMEOUT_SECS: &str = "SUPPORTCREW_TIMEOUT_SECS";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    /// Per-task deadline enforced by the crew runner.
    pub const TASK_TIMEOUT_SECS: u64 = 300;
    /// Per-request deadline for the HTTP client.
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
    pub const MAX_ITERATIONS: usize = 15;
    pub const SCRAPE_TIMEOUT_SECS: u64 = 30;
    pub const MAX_SCRAPE_BYTES: usize = 50_000;
    pub const USER_AGENT: &str = "SupportCrew/0.1";
}
