//! Mutate operations and batch execution
//!
//! A `mutate` call sends a list of [`Operation`]s and gets back one
//! [`OperationResult`] per operation, in the same order. [`BatchMutator`]
//! splits large lists into chunks the server will accept and stitches the
//! per-chunk results back together so every result still lines up with its
//! original input index.
//!
//! Mutations are never retried automatically: a failed mutate call may or
//! may not have been applied server-side, and replaying it blindly could
//! double-apply writes. The one exception is the single refresh-and-retry
//! on a rejected access token, which happens before the server processes
//! the operations.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiErrorReason, ClientError, ClientResult};
use crate::service::ServiceProxy;

/// What a mutate operation does to its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Create the operand
    Add,
    /// Update the operand in place
    Set,
    /// Delete the entity the operand identifies
    Remove,
}

/// One mutate operation: an operator applied to an operand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation<T> {
    pub operator: Operator,
    pub operand: T,
}

impl<T> Operation<T> {
    pub fn add(operand: T) -> Self {
        Self { operator: Operator::Add, operand }
    }

    pub fn set(operand: T) -> Self {
        Self { operator: Operator::Set, operand }
    }

    pub fn remove(operand: T) -> Self {
        Self { operator: Operator::Remove, operand }
    }
}

/// Per-operation outcome of a mutate call
///
/// Externally tagged on the wire: `{"value": ...}` for success,
/// `{"error": ...}` for failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationResult<T> {
    Value(T),
    Error(ApiError),
}

impl<T> OperationResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Aggregated outcome of a batched mutate
///
/// Indices refer to positions in the original operation list, across all
/// chunks.
#[derive(Debug)]
pub struct BatchResult<T> {
    /// Successful operations: original index and the resulting entity
    pub succeeded: Vec<(usize, T)>,
    /// Failed operations: original index and the error that rejected them
    pub failed: Vec<(usize, ApiError)>,
    /// Total number of operations submitted
    pub total: usize,
}

impl<T> BatchResult<T> {
    /// Whether every operation succeeded
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.succeeded.len() == self.total
    }
}

/// Executes large mutate batches in chunks
#[derive(Debug, Clone)]
pub struct BatchMutator {
    chunk_size: usize,
}

impl BatchMutator {
    /// Create a mutator sending at most `chunk_size` operations per call
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }

    /// Create a mutator using the proxy session's configured chunk size
    pub fn for_proxy(proxy: &ServiceProxy) -> Self {
        Self::new(proxy.session().mutate_chunk_size())
    }

    /// Execute all operations through the given proxy
    ///
    /// Chunks are sent strictly in order, one at a time. A chunk whose whole
    /// call fails with a classified API error marks every operation in that
    /// chunk as failed and the batch continues; a timeout or cancellation
    /// aborts the batch with an error instead, because the chunk's outcome
    /// on the server is unknown.
    ///
    /// # Errors
    /// Returns the underlying error when a chunk's outcome cannot be
    /// determined (timeout, cancellation, transport or credential failure).
    pub async fn mutate_all<T>(
        &self,
        proxy: &ServiceProxy,
        operations: Vec<Operation<T>>,
    ) -> ClientResult<BatchResult<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let total = operations.len();
        let mut result = BatchResult { succeeded: Vec::new(), failed: Vec::new(), total };

        if operations.is_empty() {
            debug!("Empty operation list, skipping mutate entirely");
            return Ok(result);
        }

        let mut base_index = 0usize;
        let chunks: Vec<Vec<Operation<T>>> = {
            let mut chunks = Vec::new();
            let mut operations = operations;
            while !operations.is_empty() {
                let rest = operations.split_off(operations.len().min(self.chunk_size));
                chunks.push(operations);
                operations = rest;
            }
            chunks
        };

        debug!(total, chunks = chunks.len(), chunk_size = self.chunk_size, "Executing mutate batch");

        for chunk in chunks {
            let chunk_len = chunk.len();
            match proxy.mutate(&chunk).await {
                Ok(results) => {
                    for (offset, outcome) in results.into_iter().enumerate() {
                        let index = base_index + offset;
                        match outcome {
                            OperationResult::Value(value) => result.succeeded.push((index, value)),
                            OperationResult::Error(error) => result.failed.push((index, error)),
                        }
                    }
                }
                Err(ClientError::Api(exception)) => {
                    // The server judged the whole chunk; attribute the
                    // rejection to each operation in it.
                    warn!(%exception, base_index, chunk_len, "Whole mutate chunk rejected");
                    let error = exception.errors.first().cloned().unwrap_or_else(|| {
                        ApiError::new(ApiErrorReason::Unknown, "chunk rejected without detail")
                    });
                    for offset in 0..chunk_len {
                        result.failed.push((base_index + offset, error.clone()));
                    }
                }
                Err(err) => {
                    // Timeout, cancellation, transport: the chunk may have
                    // been applied. Surface the error rather than guessing.
                    warn!(error = %err, base_index, "Mutate batch aborted with unknown chunk outcome");
                    return Err(err);
                }
            }
            base_index += chunk_len;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests operation results round-trip through the externally tagged wire
    /// form.
    #[test]
    fn test_operation_result_wire_format() {
        let ok: OperationResult<serde_json::Value> =
            serde_json::from_value(serde_json::json!({"value": {"id": 7}})).unwrap();
        assert!(ok.is_success());

        let err: OperationResult<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "error": {"reason": "INVALID_ARGUMENT", "errorString": "bad name"}
        }))
        .unwrap();
        assert!(!err.is_success());
    }

    /// Tests operations serialize with camelCase keys and screaming-case
    /// operators.
    #[test]
    fn test_operation_wire_format() {
        let op = Operation::add(serde_json::json!({"name": "Campaign A"}));
        let value = serde_json::to_value(&op).unwrap();

        assert_eq!(value["operator"], "ADD");
        assert_eq!(value["operand"]["name"], "Campaign A");
    }

    /// Tests `BatchResult::is_complete_success` accounting.
    #[test]
    fn test_batch_result_accounting() {
        let complete = BatchResult::<u32> { succeeded: vec![(0, 1), (1, 2)], failed: vec![], total: 2 };
        assert!(complete.is_complete_success());

        let partial = BatchResult::<u32> {
            succeeded: vec![(0, 1)],
            failed: vec![(1, ApiError::new(ApiErrorReason::InvalidArgument, "nope"))],
            total: 2,
        };
        assert!(!partial.is_complete_success());
    }

    /// Tests the chunk splitter arithmetic on the mutator itself.
    #[test]
    fn test_chunk_size_floor() {
        let mutator = BatchMutator::new(0);
        assert_eq!(mutator.chunk_size, 1);
    }
}
