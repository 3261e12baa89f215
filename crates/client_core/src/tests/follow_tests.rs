use super::*;

use std::sync::Arc;

use crate::test_support::{context, gated_transport, http_error, post, profile, ScriptedTransport};

const TEACHER: i64 = 50;

fn session_for(id: i64, account_type: AccountType) -> Session {
    Session::authenticated("token", profile(id, account_type))
}

fn teacher_post() -> PostResponse {
    post(1, &profile(TEACHER, AccountType::Teacher), false, 0)
}

#[tokio::test]
async fn duplicate_follow_while_pending_sends_one_request() {
    let (transport, mut requests) = gated_transport();
    let toggle = Arc::new(FollowToggle::new(
        context(transport, session_for(7, AccountType::Student)),
        &teacher_post(),
    ));
    assert!(toggle.is_available());

    let first = {
        let toggle = Arc::clone(&toggle);
        tokio::spawn(async move { toggle.toggle().await })
    };
    let (request, reply) = requests.recv().await.expect("follow request");
    assert_eq!(request, MutationRequest::Follow(UserId(TEACHER)));
    assert!(toggle.state().following);

    let second = toggle.toggle().await.expect("second trigger");
    assert!(second.is_skipped());
    assert!(requests.try_recv().is_err());

    reply.send(Ok(())).expect("reply");
    assert!(first.await.expect("join").expect("toggle").is_confirmed());
    assert!(toggle.state().following);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn failed_unfollow_restores_following() {
    let transport = ScriptedTransport::new(vec![Err(http_error(500))]);
    let toggle = FollowToggle::with_state(
        context(transport.clone(), session_for(7, AccountType::Student)),
        UserId(TEACHER),
        AccountType::Teacher,
        FollowState::new(true),
    );

    let settlement = toggle.toggle().await.expect("toggle");
    assert!(settlement.is_reverted());
    assert_eq!(toggle.state(), FollowState::new(true));
    assert_eq!(
        transport.calls().await,
        vec![MutationRequest::Unfollow(UserId(TEACHER))]
    );
}

#[tokio::test]
async fn ineligible_pairs_are_rejected_without_requests() {
    let transport = ScriptedTransport::new(Vec::new());

    let teacher_viewer = FollowToggle::new(
        context(transport.clone(), session_for(8, AccountType::Teacher)),
        &teacher_post(),
    );
    let student_author = FollowToggle::new(
        context(transport.clone(), session_for(7, AccountType::Student)),
        &post(2, &profile(9, AccountType::Student), false, 0),
    );
    let own_post = FollowToggle::with_state(
        context(transport.clone(), session_for(7, AccountType::Student)),
        UserId(7),
        AccountType::Teacher,
        FollowState::new(false),
    );
    let no_profile = FollowToggle::new(
        context(transport.clone(), Session::with_token("token")),
        &teacher_post(),
    );

    for toggle in [&teacher_viewer, &student_author, &own_post, &no_profile] {
        assert!(!toggle.is_available());
        assert!(matches!(
            toggle.toggle().await,
            Err(MutationError::NotEligible(_))
        ));
        assert!(!toggle.state().following);
    }
    assert!(transport.calls().await.is_empty());
}

#[tokio::test]
async fn server_sync_stops_after_viewer_toggles() {
    let transport = ScriptedTransport::new(vec![Ok(())]);
    let toggle = FollowToggle::new(
        context(transport, session_for(7, AccountType::Student)),
        &teacher_post(),
    );

    let mut refreshed = teacher_post();
    refreshed.following_author = Some(true);
    assert!(toggle.sync_from_server(&refreshed));
    assert!(toggle.state().following);

    toggle.toggle().await.expect("unfollow");
    assert!(!toggle.state().following);

    assert!(!toggle.sync_from_server(&refreshed));
    assert!(!toggle.state().following);
}
