use anyhow::{Context, Result};

/// Opens the call-to-action destination in the user's browser
pub struct RedirectService {
    url: String,
}

impl RedirectService {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn open(&self) -> Result<()> {
        log::info!("Redirecting to {}", self.url);
        webbrowser::open(&self.url)
            .with_context(|| format!("Failed to open {} in the browser", self.url))
    }
}
