/// Group session state machine.
///
/// A session tracks one Burmester–Desmedt run: the member ring, each member's
/// round-1 and round-2 broadcast, the finalized group address, and an
/// append-only log of member actions.
///
/// # Module structure
/// - `ids`: Identity and SessionId
/// - `group`: GroupSession, Slot, Round, SessionPhase, StateTransition
/// - `verifier`: SignatureVerifier capability and its implementations
/// - `store`: SessionStore, the validated mutation surface
/// - `request`: typed Action / Query decoding
pub mod group;
pub mod ids;
pub mod request;
pub mod store;
pub mod verifier;

pub use group::{GroupSession, Round, SessionPhase, Slot, StateTransition};
pub use ids::{Identity, SessionId};
pub use request::{Action, Query, RequestError};
pub use store::{SessionError, SessionPolicy, SessionStore, SlotPolicy};
pub use verifier::{sign_for_identity, RsaIdentityVerifier, SenderAuthenticated, SignatureVerifier};
