use super::calculator::TotalsError;
use super::session::SessionError;
use crate::models::ValidationError;
use service_core::error::AppError;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<TotalsError> for AppError {
    fn from(err: TotalsError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownRow(_)
            | SessionError::UnknownProduct(_)
            | SessionError::UnknownParty(_) => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            SessionError::TooManyRows(_) | SessionError::RowIdsExhausted => {
                AppError::ValidationError(err.to_string())
            }
            SessionError::Validation(e) => e.into(),
            SessionError::Totals(e) => e.into(),
        }
    }
}
