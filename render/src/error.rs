use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("institution name is empty")]
    EmptyInstitution,

    #[error("invalid page size {width}x{height}")]
    InvalidPageSize { width: u16, height: u16 },

    #[error("layout error: {0}")]
    Layout(String),
}
