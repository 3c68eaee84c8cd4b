use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion error: {0}")]
    Convert(#[from] vodmux_engine::ConvertError),
}

pub type Result<T> = std::result::Result<T, AppError>;
