use std::{future::Future, time::Duration};

use crate::common::error::RepositoryError;

// Toda chamada ao repositório tem prazo: é o único ponto de suspensão do
// núcleo. Sem retentativas.
pub(crate) async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(RepositoryError::Timeout(limit)),
    }
}
