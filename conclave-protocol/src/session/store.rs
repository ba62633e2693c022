/// Session store: the single owner of all group sessions and their action logs.
///
/// Every mutation flows through a `submit_*` method, which validates in a fixed
/// order (signature, session lookup, membership, policy) and writes only after
/// every check has passed. A failed call leaves the store untouched.
///
/// **Determinism:** identifiers come from a creation counter and the member
/// list, and both tables are `BTreeMap`s, so replicas fed the same ordered
/// inputs serialize byte-identical state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding;
use crate::session::group::{GroupSession, Round, SessionPhase, Slot, StateTransition};
use crate::session::ids::{Identity, SessionId};
use crate::session::verifier::{RsaIdentityVerifier, SignatureVerifier};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Unauthorized: {0} is not a member of the session")]
    Unauthorized(Identity),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot {index} of {round} is already filled")]
    SlotAlreadyFilled { round: Round, index: usize },

    #[error("{0} is not open yet")]
    RoundNotReady(Round),
}

pub type Result<T> = std::result::Result<T, SessionError>;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What happens when a member submits to a slot that is already filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Last write wins.
    #[default]
    Overwrite,
    /// Re-submission fails with [`SessionError::SlotAlreadyFilled`].
    WriteOnce,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    pub slot_policy: SlotPolicy,
    /// Reject round-2 submissions until round 1 is complete.
    pub enforce_round_order: bool,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

pub struct SessionStore {
    sessions: BTreeMap<SessionId, GroupSession>,
    transitions: BTreeMap<SessionId, Vec<StateTransition>>,
    policy: SessionPolicy,
    verifier: Box<dyn SignatureVerifier + Send + Sync>,
    /// Number of sessions ever created; feeds identifier derivation.
    created: u64,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("policy", &self.policy)
            .field("created", &self.created)
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionPolicy::default(), RsaIdentityVerifier)
    }
}

impl SessionStore {
    pub fn new<V>(policy: SessionPolicy, verifier: V) -> Self
    where
        V: SignatureVerifier + Send + Sync + 'static,
    {
        SessionStore {
            sessions: BTreeMap::new(),
            transitions: BTreeMap::new(),
            policy,
            verifier: Box::new(verifier),
            created: 0,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Full session table, keyed and ordered by identifier.
    pub fn sessions(&self) -> &BTreeMap<SessionId, GroupSession> {
        &self.sessions
    }

    pub fn get(&self, id: &SessionId) -> Option<&GroupSession> {
        self.sessions.get(id)
    }

    fn lookup(&self, id: &SessionId) -> Result<&GroupSession> {
        self.sessions
            .get(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))
    }

    /// Action log of one session.
    pub fn transitions(&self, id: &SessionId) -> Result<&[StateTransition]> {
        self.transitions
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))
    }

    pub fn phase(&self, id: &SessionId) -> Result<SessionPhase> {
        Ok(self.lookup(id)?.phase())
    }

    /// True iff every slot of `round` is filled.
    pub fn is_complete(&self, id: &SessionId, round: Round) -> Result<bool> {
        Ok(self.lookup(id)?.is_complete(round))
    }

    /// Open a new session over `members`, in ring order.
    pub fn create(&mut self, members: Vec<Identity>) -> Result<SessionId> {
        if members.is_empty() {
            return Err(SessionError::InvalidInput("member list is empty".into()));
        }
        let mut seen = BTreeSet::new();
        for m in &members {
            if !seen.insert(m.normalized()) {
                return Err(SessionError::InvalidInput(format!(
                    "duplicate member {}",
                    m
                )));
            }
        }

        let id = SessionId::derive(self.created, &members);
        if self.sessions.contains_key(&id) {
            return Err(SessionError::InvalidInput(format!("session {} already exists", id)));
        }

        log::info!("Created session {} with {} members", id, members.len());

        self.created += 1;
        self.sessions.insert(id.clone(), GroupSession::new(members));
        self.transitions.insert(id.clone(), Vec::new());
        Ok(id)
    }

    /// Resolve `signer` in session `id` after checking `signature` over
    /// `message`. Returns the signer's ring index.
    fn authorize(
        &self,
        id: &SessionId,
        message: &str,
        signer: &Identity,
        signature: &str,
    ) -> Result<usize> {
        // 1. Signature
        if !self.verifier.verify(message, signer, signature) {
            log::warn!("Rejected signature from {} on session {}", signer, id);
            return Err(SessionError::InvalidSignature);
        }

        // 2. Session
        let session = self.lookup(id)?;

        // 3. Membership
        session
            .index_of(signer)
            .ok_or_else(|| SessionError::Unauthorized(signer.clone()))
    }

    fn submit_round(
        &mut self,
        round: Round,
        id: &SessionId,
        value: &BigUint,
        signer: &Identity,
        signature: &str,
    ) -> Result<()> {
        let encoded = encoding::biguint_to_b64(value);
        let index = self.authorize(id, &encoded, signer, signature)?;

        // 4. Policy
        let session = self.lookup(id)?;
        if round == Round::Two
            && self.policy.enforce_round_order
            && !session.is_complete(Round::One)
        {
            return Err(SessionError::RoundNotReady(Round::Two));
        }
        if self.policy.slot_policy == SlotPolicy::WriteOnce
            && session.slots(round)[index].is_filled()
        {
            return Err(SessionError::SlotAlreadyFilled { round, index });
        }

        // 5. Write
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
        session.slots_mut(round)[index] = Slot::Filled(encoded);

        log::debug!("Session {}: member {} submitted {}", id, index, round);
        if session.is_complete(round) {
            log::info!("Session {}: {} complete", id, round);
        }
        Ok(())
    }

    /// Store `value` as the signer's round-1 share. The signed message is the
    /// value's canonical base64 encoding.
    pub fn submit_round1(
        &mut self,
        id: &SessionId,
        value: &BigUint,
        signer: &Identity,
        signature: &str,
    ) -> Result<()> {
        self.submit_round(Round::One, id, value, signer, signature)
    }

    pub fn submit_round2(
        &mut self,
        id: &SessionId,
        value: &BigUint,
        signer: &Identity,
        signature: &str,
    ) -> Result<()> {
        self.submit_round(Round::Two, id, value, signer, signature)
    }

    /// Record the finalized group address. The signed message is the address.
    pub fn submit_group_address(
        &mut self,
        id: &SessionId,
        address: &str,
        signer: &Identity,
        signature: &str,
    ) -> Result<()> {
        if address.is_empty() {
            return Err(SessionError::InvalidInput("group address is empty".into()));
        }
        self.authorize(id, address, signer, signature)?;

        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
        session.group_address = Some(address.to_string());

        log::info!("Session {}: group address set by {}", id, signer);
        Ok(())
    }

    /// Append to the session's action log. Membership only; allowed at any
    /// phase.
    pub fn submit_transition(
        &mut self,
        id: &SessionId,
        action: &str,
        author: &Identity,
        timestamp: i64,
    ) -> Result<()> {
        let session = self.lookup(id)?;
        if session.index_of(author).is_none() {
            return Err(SessionError::Unauthorized(author.clone()));
        }

        self.transitions
            .entry(id.clone())
            .or_default()
            .push(StateTransition {
                action: action.to_string(),
                author: author.clone(),
                timestamp,
            });
        Ok(())
    }
}
