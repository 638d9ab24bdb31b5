//! Property-based tests for frame encoding/decoding.
//!
//! These tests verify decoder totality and encode/decode agreement for ALL
//! inputs, not just specific examples.

use banter_proto::{ClientFrame, ServerFrame};
use proptest::prelude::*;

#[test]
fn prop_decode_never_panics() {
    proptest!(|(text in ".{0,256}")| {
        // Totality: arbitrary input is a typed frame or a typed error.
        let _ = ServerFrame::decode(&text);
    });
}

#[test]
fn prop_unknown_tags_are_preserved() {
    proptest!(|(kind in "[A-Z_]{1,16}")| {
        prop_assume!(!["PARTICIPANTS", "ENTER", "LEAVE", "TALK", "ERROR"].contains(&kind.as_str()));

        let text = format!(r#"{{"type":"{kind}","whatever":1}}"#);
        prop_assert_eq!(
            ServerFrame::decode(&text).unwrap(),
            ServerFrame::Unknown { kind }
        );
    });
}

#[test]
fn prop_outbound_talk_survives_the_wire() {
    proptest!(|(sender in "[a-zA-Z0-9]{1,12}", content in ".{0,64}", time in "[0-2][0-9]:[0-5][0-9]")| {
        let frame = ClientFrame::Talk {
            sender: sender.clone(),
            content: content.clone(),
            time: time.clone(),
        };

        // What the client sends, a peer client must read back verbatim.
        let decoded = ServerFrame::decode(&frame.encode().unwrap()).unwrap();
        prop_assert_eq!(
            decoded,
            ServerFrame::Talk { sender, content, time: Some(time), bad_word_count: None }
        );
    });
}

#[test]
fn prop_outbound_enter_survives_the_wire() {
    proptest!(|(sender in "[a-zA-Z0-9]{1,12}")| {
        let frame = ClientFrame::Enter { sender: sender.clone() };
        let decoded = ServerFrame::decode(&frame.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, ServerFrame::Enter { sender, time: None });
    });
}
