//! Rollup request handler.
//!
//! Advance requests carry actions that mutate the session store; inspect
//! requests carry read-only queries. Every request is handled to completion
//! and yields the notices/reports to publish, or an error that makes the
//! runner finish the request with `reject`.

use serde::Serialize;
use thiserror::Error;

use conclave_protocol::session::request::{self, RequestError};
use conclave_protocol::session::{
    Action, GroupSession, Identity, Query, SessionError, SessionId, SessionStore,
};

use crate::rollup::payload::{self, PayloadError};
use crate::rollup::types::{AdvanceRequest, InspectRequest, Output, RollupRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
    #[error("Decode error: {0}")]
    Payload(#[from] PayloadError),
    #[error("{0}")]
    Request(#[from] RequestError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("Cannot serialize output: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Notice emitted when a session is created.
#[derive(Serialize)]
struct CreatedNotice<'a> {
    group: &'a GroupSession,
    id: &'a SessionId,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| HandlerError::Encode(e.to_string()))
}

#[derive(Debug, Default)]
pub struct DappHandler {
    store: SessionStore,
}

impl DappHandler {
    pub fn new(store: SessionStore) -> Self {
        DappHandler { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn handle(&mut self, req: &RollupRequest) -> Result<Vec<Output>> {
        match req {
            RollupRequest::AdvanceState(a) => self.handle_advance(a),
            RollupRequest::InspectState(i) => self.handle_inspect(i),
        }
    }

    pub fn handle_advance(&mut self, req: &AdvanceRequest) -> Result<Vec<Output>> {
        let json = payload::decode(&req.payload)?;
        log::info!(
            "Advance input {} from {}",
            req.metadata.input_index,
            req.metadata.msg_sender
        );
        log::debug!("Advance payload: {}", json);

        let action = Action::from_json(&json)?;
        let sender = Identity::new(req.metadata.msg_sender.clone());
        let timestamp = i64::try_from(req.metadata.timestamp).unwrap_or(i64::MAX);
        self.apply_action(action, &sender, timestamp)
    }

    pub fn handle_inspect(&self, req: &InspectRequest) -> Result<Vec<Output>> {
        let json = payload::decode(&req.payload)?;
        log::info!("Inspect: {}", json);
        let query = Query::from_json(&json)?;
        self.answer_query(&query)
    }

    /// Apply one decoded action on behalf of `sender`.
    pub fn apply_action(
        &mut self,
        action: Action,
        sender: &Identity,
        timestamp: i64,
    ) -> Result<Vec<Output>> {
        match action {
            Action::CreateGroup { members } => {
                let id = self.store.create(members)?;
                let group = self
                    .store
                    .get(&id)
                    .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
                let notice = to_json(&CreatedNotice { group, id: &id })?;
                Ok(vec![Output::Notice(notice)])
            }
            Action::SubmitR1 { id, r1_value, signature } => {
                let value = request::parse_value(&r1_value)?;
                self.store.submit_round1(&id, &value, sender, &signature)?;
                Ok(Vec::new())
            }
            Action::SubmitR2 { id, r2_value, signature } => {
                let value = request::parse_value(&r2_value)?;
                self.store.submit_round2(&id, &value, sender, &signature)?;
                Ok(Vec::new())
            }
            Action::SubmitGroupAddress {
                id,
                group_address,
                signature,
            } => {
                self.store
                    .submit_group_address(&id, &group_address, sender, &signature)?;
                Ok(Vec::new())
            }
            Action::SubmitTransition { id, action } => {
                self.store.submit_transition(&id, &action, sender, timestamp)?;
                Ok(Vec::new())
            }
            Action::Unknown => {
                log::debug!("Ignoring unknown action method");
                Ok(Vec::new())
            }
        }
    }

    pub fn answer_query(&self, query: &Query) -> Result<Vec<Output>> {
        match query {
            Query::Groups => Ok(vec![Output::Report(to_json(self.store.sessions())?)]),
            Query::Transitions { id } => {
                let log = self.store.transitions(id)?;
                Ok(vec![Output::Report(to_json(&log)?)])
            }
            Query::Unknown => {
                log::debug!("Ignoring unknown query method");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::rollup::types::AdvanceMetadata;
    use conclave_protocol::session::{SenderAuthenticated, SessionPolicy};

    fn handler() -> DappHandler {
        DappHandler::new(SessionStore::new(SessionPolicy::default(), SenderAuthenticated))
    }

    fn advance(sender: &str, json: &str) -> RollupRequest {
        RollupRequest::AdvanceState(AdvanceRequest {
            metadata: AdvanceMetadata {
                msg_sender: sender.to_string(),
                timestamp: 1_000,
                ..AdvanceMetadata::default()
            },
            payload: payload::encode(json),
        })
    }

    fn inspect(json: &str) -> RollupRequest {
        RollupRequest::InspectState(InspectRequest {
            payload: payload::encode(json),
        })
    }

    fn create(h: &mut DappHandler, members: &str) -> String {
        let out = h
            .handle(&advance("0xA", &format!(r#"{{"method":"CreateGroup","members":{}}}"#, members)))
            .unwrap();
        match &out[..] {
            [Output::Notice(n)] => {
                let v: serde_json::Value = serde_json::from_str(n).unwrap();
                v["id"].as_str().unwrap().to_string()
            }
            other => panic!("expected one notice, got {:?}", other),
        }
    }

    #[test]
    fn test_create_emits_notice() {
        let mut h = handler();
        let out = h
            .handle(&advance("0xA", r#"{"method":"CreateGroup","members":["0xA","0xB"]}"#))
            .unwrap();
        let Output::Notice(n) = &out[0] else { panic!("expected notice") };
        let v: serde_json::Value = serde_json::from_str(n).unwrap();
        assert_eq!(v["group"]["Members"], serde_json::json!(["0xA", "0xB"]));
        assert_eq!(v["group"]["R1"], serde_json::json!([null, null]));
        assert!(v["id"].is_string());
    }

    #[test]
    fn test_submit_uses_msg_sender() {
        let mut h = handler();
        let id = create(&mut h, r#"["0xA","0xB"]"#);
        let out = h
            .handle(&advance(
                "0xb",
                &format!(r#"{{"method":"SubmitR1","id":"{}","r1Value":"AQAB"}}"#, id),
            ))
            .unwrap();
        assert!(out.is_empty());
        let g = h.store().get(&SessionId::from(id.as_str())).unwrap();
        assert_eq!(g.r1[1].value(), Some("AQAB"));
    }

    #[test]
    fn test_non_member_rejected() {
        let mut h = handler();
        let id = create(&mut h, r#"["0xA","0xB"]"#);
        let err = h
            .handle(&advance(
                "0xC",
                &format!(r#"{{"method":"SubmitR2","id":"{}","r2Value":"AQ=="}}"#, id),
            ))
            .unwrap_err();
        assert!(matches!(err, HandlerError::Session(SessionError::Unauthorized(_))));
    }

    #[test]
    fn test_default_config_accepts_member_submissions() {
        let alice = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        let bob = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
        let mut h = DappHandler::new(NodeConfig::default().session_store());
        let id = create(&mut h, &format!(r#"["{}","{}"]"#, alice, bob));

        for (sender, method, field, value) in [
            (alice, "SubmitR1", "r1Value", "AQAB"),
            (bob, "SubmitR1", "r1Value", "AQAC"),
            (alice, "SubmitR2", "r2Value", "EQ=="),
            (bob, "SubmitR2", "r2Value", "CQ=="),
        ] {
            let json = format!(
                r#"{{"method":"{}","id":"{}","{}":"{}","signature":"c2lnbmF0dXJl"}}"#,
                method, id, field, value
            );
            assert!(h.handle(&advance(&sender.to_lowercase(), &json)).unwrap().is_empty());
        }
        h.handle(&advance(
            alice,
            &format!(
                r#"{{"method":"SubmitGroupAddress","id":"{}","groupAddress":"0xabc","signature":""}}"#,
                id
            ),
        ))
        .unwrap();

        let g = h.store().get(&SessionId::from(id.as_str())).unwrap();
        assert_eq!(g.r1[0].value(), Some("AQAB"));
        assert_eq!(g.r2[1].value(), Some("CQ=="));
        assert_eq!(g.group_address.as_deref(), Some("0xabc"));

        let err = h
            .handle(&advance(
                "0x0000000000000000000000000000000000000001",
                &format!(r#"{{"method":"SubmitR1","id":"{}","r1Value":"AQAB"}}"#, id),
            ))
            .unwrap_err();
        assert!(matches!(err, HandlerError::Session(SessionError::Unauthorized(_))));
    }

    #[test]
    fn test_bad_payloads() {
        let mut h = handler();
        let bad_hex = RollupRequest::InspectState(InspectRequest { payload: "0xnothex".into() });
        assert_eq!(
            h.handle(&bad_hex).unwrap_err(),
            HandlerError::Payload(PayloadError::Hex(hex::FromHexError::InvalidHexCharacter {
                c: 'n',
                index: 0
            }))
        );
        assert!(matches!(
            h.handle(&advance("0xA", "not json")),
            Err(HandlerError::Request(RequestError::Decode(_)))
        ));
        assert!(matches!(
            h.handle(&advance("0xA", r#"{"method":"SubmitR1","id":"x","r1Value":"%%%"}"#)),
            Err(HandlerError::Request(RequestError::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_unknown_method_no_effect() {
        let mut h = handler();
        create(&mut h, r#"["0xA"]"#);
        let before = serde_json::to_string(h.store().sessions()).unwrap();
        let out = h
            .handle(&advance("0xA", r#"{"method":"DropTables"}"#))
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(serde_json::to_string(h.store().sessions()).unwrap(), before);
        assert!(h.handle(&inspect(r#"{"method":"everything"}"#)).unwrap().is_empty());
    }

    #[test]
    fn test_queries() {
        let mut h = handler();
        let id = create(&mut h, r#"["0xA","0xB"]"#);
        h.handle(&advance(
            "0xA",
            &format!(r#"{{"method":"SubmitTransition","id":"{}","action":"rotate"}}"#, id),
        ))
        .unwrap();

        let out = h.handle(&inspect(r#"{"method":"groups"}"#)).unwrap();
        let Output::Report(r) = &out[0] else { panic!("expected report") };
        let v: serde_json::Value = serde_json::from_str(r).unwrap();
        assert!(v.get(id.as_str()).is_some());

        let out = h
            .handle(&inspect(&format!(r#"{{"method":"transitions","id":"{}"}}"#, id)))
            .unwrap();
        let Output::Report(r) = &out[0] else { panic!("expected report") };
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(r).unwrap(),
            serde_json::json!([{"Action": "rotate", "Author": "0xA", "Timestamp": 1000}])
        );

        assert!(matches!(
            h.handle(&inspect(r#"{"method":"transitions","id":"nope"}"#)),
            Err(HandlerError::Session(SessionError::SessionNotFound(_)))
        ));
    }
}
