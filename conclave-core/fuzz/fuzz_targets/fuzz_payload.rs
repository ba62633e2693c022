#![no_main]
use libfuzzer_sys::fuzz_target;

use conclave::rollup::payload;
use conclave::rollup::types::{AdvanceMetadata, AdvanceRequest, InspectRequest, RollupRequest};
use conclave::DappHandler;
use conclave::session::{SenderAuthenticated, SessionPolicy, SessionStore};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Arbitrary hex / JSON must never panic the decoders
    let _ = payload::decode(&text);
    let _ = conclave::Action::from_json(&text);
    let _ = conclave::Query::from_json(&text);
    let _ = serde_json::from_slice::<RollupRequest>(data);

    // Drive a full handler with the input as an advance payload
    let mut handler = DappHandler::new(SessionStore::new(
        SessionPolicy::default(),
        SenderAuthenticated,
    ));
    let _ = handler.handle(&RollupRequest::AdvanceState(AdvanceRequest {
        metadata: AdvanceMetadata {
            msg_sender: "0xA".into(),
            ..AdvanceMetadata::default()
        },
        payload: payload::encode(&text),
    }));
    let _ = handler.handle(&RollupRequest::InspectState(InspectRequest {
        payload: payload::encode(&text),
    }));
});
