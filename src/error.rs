use crate::model::SiteId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A computed or mutated layout broke the no-overlap or size-floor invariant.
    #[error("layout constraint violated for site {site_id}: {reason}")]
    LayoutConstraint { site_id: SiteId, reason: String },

    #[error("site {0} is not part of the layout")]
    UnknownSite(SiteId),

    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn constraint(site_id: SiteId, reason: impl Into<String>) -> Self {
        Self::LayoutConstraint {
            site_id,
            reason: reason.into(),
        }
    }
}
