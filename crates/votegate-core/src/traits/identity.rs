//! Identity store contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// View of the eligible-requester registry.
///
/// The admission engine asks two questions: does the proof match the
/// identity, and has this identity already finished voting. The only write
/// is recording completion once a session is marked completed.
#[async_trait]
pub trait IdentityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Check whether `proof` is the valid credential for `identity`.
    ///
    /// Unknown identities verify as `false`.
    async fn verify(&self, identity: &str, proof: &str) -> AppResult<bool>;

    /// Check whether `identity` has already completed voting.
    async fn has_completed(&self, identity: &str) -> AppResult<bool>;

    /// Record that `identity` has finished voting.
    async fn mark_completed(&self, identity: &str) -> AppResult<()>;
}
