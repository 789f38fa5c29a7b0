use orders_client::ClientError;
use orders_types::domain::order::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a bulk action is already in progress")]
    BulkActionPending,
}

impl ControllerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ControllerError::Validation(_))
    }
}
