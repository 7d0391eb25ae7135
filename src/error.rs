use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    #[error("font cannot be rendered at size {size}: {reason}")]
    UnrenderableFont { size: u32, reason: String },
}

impl RenderError {
    pub(crate) fn unrenderable(size: u32, reason: impl Into<String>) -> Self {
        Self::UnrenderableFont {
            size,
            reason: reason.into(),
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
