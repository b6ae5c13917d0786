mod common;

use futures::executor::block_on;

use common::{named, request, MockApi, ME};
use tsync_sdk::error::Error;
use tsync_sdk::model::event::{decode_frame, RelationshipEvent};
use tsync_sdk::model::friend::Friend;
use tsync_sdk::model::relationship::{RelationshipState, RelationshipStatus};
use tsync_sdk::state::{EventOutcome, RelationshipChange, RelationshipStore};

fn store_with(api: &MockApi) -> RelationshipStore {
    RelationshipStore::new(ME, api.boxed())
}

#[test]
fn empty_refresh_means_no_relationship() {
    let api = MockApi::new();
    let store = store_with(&api);

    block_on(store.refresh()).unwrap();

    assert_eq!(store.get_status("u1"), RelationshipState::none());
    assert_eq!(api.reads(), 3);
    assert!(store.last_error().is_none());
}

#[test]
fn sent_request_is_pending_with_server_id() {
    let api = MockApi::new();
    api.backend.borrow_mut().next_ids.push("r1".into());
    let store = store_with(&api);

    let created = block_on(store.send_request(&"u1".to_string())).unwrap();

    assert_eq!(created.id, "r1");
    assert_eq!(store.get_status("u1"), RelationshipState::pending("r1"));
    assert_eq!(store.sent().len(), 1);
}

#[test]
fn received_event_then_accept_makes_friends() {
    let api = MockApi::new();
    let store = store_with(&api);

    let event = RelationshipEvent::RequestReceived(request("r2", "u2", ME));
    assert_eq!(store.apply_event(event), EventOutcome::Applied);
    assert_eq!(store.get_status("u2"), RelationshipState::incoming("r2"));
    assert_eq!(store.pending_count(), 1);

    block_on(store.accept_request(&"r2".to_string())).unwrap();

    assert_eq!(store.get_status("u2"), RelationshipState::friends());
    assert!(store.friends().contains_key("u2"));
    assert!(store.received().is_empty());
    // the request was known locally, no refresh needed
    assert_eq!(api.reads(), 0);
}

#[test]
fn cancel_then_duplicate_cancel_event_is_a_no_op() {
    let api = MockApi::new();
    api.backend.borrow_mut().next_ids.push("r1".into());
    let store = store_with(&api);
    block_on(store.send_request(&"u1".to_string())).unwrap();

    block_on(store.cancel_request(&"r1".to_string())).unwrap();
    assert_eq!(store.get_status("u1"), RelationshipState::none());

    let before = store.lists().clone();
    let outcome = store.apply_event(RelationshipEvent::RequestCanceled {
        request_id: "r1".into(),
    });
    assert_eq!(outcome, EventOutcome::Duplicate);
    assert_eq!(*store.lists(), before);
}

#[test]
fn failed_refresh_keeps_previous_lists() {
    let api = MockApi::new();
    api.backend.borrow_mut().friends.push(Friend::with_id("u3"));
    let store = store_with(&api);
    block_on(store.refresh()).unwrap();

    {
        let mut backend = api.backend.borrow_mut();
        backend.friends.clear();
        backend.fail_read = Some("*");
    }
    let err = block_on(store.refresh()).unwrap_err();

    assert!(matches!(err, Error::Fetch(_)), "{err:?}");
    assert_eq!(store.last_error(), Some(err));
    assert_eq!(store.friends().keys().collect::<Vec<_>>(), vec!["u3"]);
    assert_eq!(store.get_status("u3"), RelationshipState::friends());

    api.backend.borrow_mut().fail_read = None;
    block_on(store.refresh()).unwrap();
    assert!(store.last_error().is_none());
    assert_eq!(store.get_status("u3"), RelationshipState::none());
}

#[test]
fn one_failing_read_replaces_nothing() {
    let api = MockApi::new();
    let store = store_with(&api);
    {
        let mut backend = api.backend.borrow_mut();
        backend.friends.push(Friend::with_id("u1"));
        backend.received.push(request("r2", "u2", ME));
        backend.fail_read = Some("get_sent_requests");
    }

    assert!(block_on(store.refresh()).is_err());
    assert!(store.friends().is_empty());
    assert!(store.received().is_empty());
}

#[test]
fn send_then_accepted_frame_round_trip() {
    let api = MockApi::new();
    api.backend.borrow_mut().next_ids.push("r7".into());
    let store = store_with(&api);
    block_on(store.send_request(&"ana".to_string())).unwrap();

    let frame = r#"{"event":"FRIEND_ACCEPTED","data":{"requestId":"r7","friend":{"_id":"ana","name":"Ana"}}}"#;
    let outcome = store.apply_event(decode_frame(frame).unwrap());

    assert_eq!(outcome, EventOutcome::Applied);
    assert_eq!(store.get_status("ana"), RelationshipState::friends());
    assert!(store.sent().is_empty());
    assert_eq!(store.display_name("ana"), "Ana");
}

#[test]
fn rejected_send_leaves_lists_untouched() {
    let api = MockApi::new();
    api.backend.borrow_mut().reject_next = Some("Friend request already sent".into());
    let store = store_with(&api);

    let err = block_on(store.send_request(&"u1".to_string())).unwrap_err();

    match &err {
        Error::Request(api_err) => {
            assert_eq!(api_err.status, 409);
            assert_eq!(err.user_message(), "Friend request already sent");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(store.sent().is_empty());
    assert_eq!(store.get_status("u1"), RelationshipState::none());
}

#[test]
fn local_guards_do_not_reach_the_server() {
    let api = MockApi::new();
    let store = store_with(&api);
    store.apply_event(RelationshipEvent::RequestReceived(request("r1", "u1", ME)));

    let to_self = block_on(store.send_request(&ME.to_string())).unwrap_err();
    assert!(matches!(to_self, Error::Request(_)));

    let crossing = block_on(store.send_request(&"u1".to_string())).unwrap_err();
    assert_eq!(
        crossing,
        Error::InvalidTransition {
            from: RelationshipStatus::IncomingRequest,
            to: RelationshipStatus::Pending,
        }
    );
    assert!(api.calls().is_empty());
}

#[test]
fn accepting_an_unknown_request_falls_back_to_refresh() {
    let api = MockApi::new();
    api.backend
        .borrow_mut()
        .received
        .push(request("r5", "u5", ME));
    let store = store_with(&api);

    block_on(store.accept_request(&"r5".to_string())).unwrap();

    assert_eq!(api.calls()[0], "accept_request r5");
    assert_eq!(api.reads(), 3);
    assert_eq!(store.get_status("u5"), RelationshipState::friends());
}

#[test]
fn rejecting_an_unknown_request_falls_back_to_refresh() {
    let api = MockApi::new();
    api.backend
        .borrow_mut()
        .received
        .push(request("r5", "u5", ME));
    let store = store_with(&api);

    block_on(store.reject_request(&"r5".to_string())).unwrap();

    assert_eq!(api.calls()[0], "reject_request r5");
    assert_eq!(api.reads(), 3);
    assert_eq!(store.get_status("u5"), RelationshipState::none());
}

#[test]
fn canceling_an_unknown_request_falls_back_to_refresh() {
    let api = MockApi::new();
    {
        let mut backend = api.backend.borrow_mut();
        backend.sent.push(request("r6", ME, "u6"));
        backend.sent.push(request("r7", ME, "u7"));
    }
    let store = store_with(&api);

    block_on(store.cancel_request(&"r6".to_string())).unwrap();

    assert_eq!(api.calls()[0], "cancel_request r6");
    assert_eq!(api.reads(), 3);
    assert_eq!(store.get_status("u6"), RelationshipState::none());
    // the refresh also picked up what this session had missed
    assert_eq!(store.get_status("u7"), RelationshipState::pending("r7"));
}

#[test]
fn cancel_event_from_another_session_clears_my_pending_request() {
    let api = MockApi::new();
    api.backend.borrow_mut().next_ids.push("r1".into());
    let store = store_with(&api);
    let mut changes = store.subscribe();
    block_on(store.send_request(&"u1".to_string())).unwrap();
    assert_eq!(store.get_status("u1"), RelationshipState::pending("r1"));

    let event = RelationshipEvent::RequestCanceled {
        request_id: "r1".into(),
    };
    assert_eq!(store.apply_event(event.clone()), EventOutcome::Applied);
    assert_eq!(store.get_status("u1"), RelationshipState::none());
    assert!(store.sent().is_empty());
    assert_eq!(store.apply_event(event), EventOutcome::Duplicate);

    changes.try_next().unwrap();
    assert_eq!(
        changes.try_next().unwrap(),
        Some(RelationshipChange::Updated {
            user_id: "u1".into(),
            state: RelationshipState::none(),
        })
    );
}

#[test]
fn failed_mutation_keeps_state() {
    let api = MockApi::new();
    let store = store_with(&api);
    store.apply_event(RelationshipEvent::RequestReceived(request("r1", "u1", ME)));
    api.backend.borrow_mut().reject_next = Some("Request not found".into());

    assert!(block_on(store.reject_request(&"r1".to_string())).is_err());
    assert_eq!(store.get_status("u1"), RelationshipState::incoming("r1"));
}

#[test]
fn unfriend_is_idempotent_across_rest_and_event() {
    let api = MockApi::new();
    api.backend.borrow_mut().friends.push(named("u4", "Kai"));
    let store = store_with(&api);
    block_on(store.refresh()).unwrap();

    block_on(store.remove_friend(&"u4".to_string())).unwrap();
    let outcome = store.apply_event(RelationshipEvent::FriendRemoved {
        user_id: "u4".into(),
    });

    assert_eq!(outcome, EventOutcome::Duplicate);
    assert_eq!(store.get_status("u4"), RelationshipState::none());
}

#[test]
fn subscribers_see_each_change() {
    let api = MockApi::new();
    let store = store_with(&api);
    let mut changes = store.subscribe();

    block_on(store.refresh()).unwrap();
    store.apply_event(RelationshipEvent::RequestReceived(request("r1", "u1", ME)));
    store.apply_event(RelationshipEvent::RequestReceived(request("r1", "u1", ME)));

    assert_eq!(changes.try_next().unwrap(), Some(RelationshipChange::Refreshed));
    assert_eq!(
        changes.try_next().unwrap(),
        Some(RelationshipChange::Updated {
            user_id: "u1".into(),
            state: RelationshipState::incoming("r1"),
        })
    );
    // the duplicate published nothing
    assert!(changes.try_next().is_err());

    store.clear();
    assert_eq!(changes.try_next().unwrap(), Some(RelationshipChange::Cleared));
    assert_eq!(changes.try_next().unwrap(), None);
}
