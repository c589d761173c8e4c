//! StatusSource trait - authoritative time source abstraction
//!
//! Decouples the polling loop from the concrete transport. The HTTP client
//! and the test mocks implement the same interface.

use crate::{ClockStatus, ContractError};

/// Authoritative clock status source.
#[trait_variant::make(StatusSource: Send)]
pub trait LocalStatusSource {
    /// Fetch one status report.
    ///
    /// # Errors
    /// Transport failure, non-success response, or an undecodable body.
    async fn fetch(&mut self) -> Result<ClockStatus, ContractError>;
}
