use std::path::PathBuf;

/// The input to a pipeline run. Exactly one variant is active per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A local PDF document; the path must exist at time of use.
    Pdf(PathBuf),
    /// A web page to extract.
    Url(String),
    /// A company to research via the generative model.
    CompanyName(String),
    /// Raw text supplied directly.
    RawText(String),
}

impl ContentSource {
    /// Short tag used in log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Url(_) => "url",
            Self::CompanyName(_) => "company",
            Self::RawText(_) => "text",
        }
    }
}
