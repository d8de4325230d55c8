//! End-to-end gating scenarios
//!
//! Drives the full `Eula` service against an in-memory record store and a
//! recording messenger, the way a host would.

use eula_config::{AgreementConfig, CommandFilter, Locale};
use eula_core::test_support::{RecordingMessenger, UnavailableStore};
use eula_core::{
    CommandRef, Eula, GateError, GateEvent, GateOutcome, GateResult, Invocation,
    MemoryRecordStore, RecordStore, Session, StaticLocalizer, StoreError, UserId, UserRecord,
    Verdict,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

struct Harness {
    gate: Arc<Eula>,
    memory: Arc<MemoryRecordStore>,
    messenger: Arc<RecordingMessenger>,
}

fn harness(config: AgreementConfig) -> Harness {
    let memory = Arc::new(MemoryRecordStore::new());
    let messenger = Arc::new(RecordingMessenger::new());
    let gate = Eula::new(
        config,
        memory.clone(),
        messenger.clone(),
        Arc::new(StaticLocalizer::new(Locale::En)),
    )
    .unwrap();
    Harness {
        gate: Arc::new(gate),
        memory,
        messenger,
    }
}

fn yes_config() -> AgreementConfig {
    AgreementConfig {
        accept: vec!["yes".into()],
        wait_time: 30,
        ..Default::default()
    }
}

fn session(user: i64) -> Session {
    Session::new(UserId(user), "group-1", "test", "bot")
}

fn draw(user: i64) -> Invocation {
    Invocation::new(session(user), CommandRef::new("draw", 1))
}

fn spawn_intercept(gate: &Arc<Eula>, invocation: Invocation) -> JoinHandle<GateResult<Verdict>> {
    let gate = gate.clone();
    tokio::spawn(async move { gate.intercept(&invocation).await })
}

#[tokio::test]
async fn accept_then_reinvoke_proceeds() {
    let h = harness(yes_config());

    let task = spawn_intercept(&h.gate, draw(1));
    let shown = h.messenger.wait_for_agreement().await;
    assert!(shown.confirm.contains("\"yes\""));
    assert!(h.gate.deliver_reply(&session(1), "yes"));

    // The original command is not resumed
    let verdict = task.await.unwrap().unwrap();
    assert_eq!(verdict, Verdict::Suppressed(GateOutcome::Accepted));
    assert_eq!(
        h.messenger.texts(),
        vec!["You accepted the EULA. Commands are now available.".to_string()]
    );
    assert!(h.gate.verify(UserId(1)).await.unwrap());

    let verdict = h.gate.intercept(&draw(1)).await.unwrap();
    assert_eq!(verdict, Verdict::Proceed);
    assert_eq!(h.messenger.agreements().len(), 1);
}

#[tokio::test]
async fn wrong_reply_records_rejection() {
    let h = harness(yes_config());

    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(1), "no");

    let verdict = task.await.unwrap().unwrap();
    assert_eq!(verdict, Verdict::Suppressed(GateOutcome::Rejected));
    let record = h.memory.get(UserId(1)).await.unwrap().unwrap();
    assert!(!record.eula);
    assert_eq!(h.messenger.texts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_leaves_record_unchanged_and_regates() {
    let h = harness(yes_config());

    let verdict = h.gate.intercept(&draw(1)).await.unwrap();
    assert_eq!(verdict, Verdict::Suppressed(GateOutcome::TimedOut));
    assert!(h.memory.get(UserId(1)).await.unwrap().is_none());
    assert_eq!(
        h.messenger.texts(),
        vec!["No reply in time. Please send the command again.".to_string()]
    );

    // A reply arriving after the deadline is not consumed
    assert!(!h.gate.deliver_reply(&session(1), "yes"));
    assert!(!h.gate.verify(UserId(1)).await.unwrap());

    let verdict = h.gate.intercept(&draw(1)).await.unwrap();
    assert_eq!(verdict, Verdict::Suppressed(GateOutcome::TimedOut));
    assert_eq!(h.messenger.agreements().len(), 2);
}

#[tokio::test]
async fn mention_prefixed_reply_is_accepted() {
    let h = harness(AgreementConfig::default());

    let task = spawn_intercept(&h.gate, draw(1));
    let shown = h.messenger.wait_for_agreement().await;
    assert!(shown.confirm.contains("同意"));
    h.gate.deliver_reply(&session(1), "@bot 同意");

    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
    assert!(h.gate.verify(UserId(1)).await.unwrap());
}

#[tokio::test]
async fn element_mention_reply_is_accepted() {
    let h = harness(yes_config());

    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(1), r#"<at id="bot"/> yes"#);

    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
}

#[tokio::test]
async fn allow_list_only_gates_listed_commands() {
    let h = harness(AgreementConfig {
        commands: CommandFilter::allow(["foo"]),
        ..yes_config()
    });

    let bar = Invocation::new(session(1), CommandRef::new("bar", 1));
    assert_eq!(h.gate.intercept(&bar).await.unwrap(), Verdict::Proceed);
    assert!(h.messenger.sent().is_empty());

    let foo = Invocation::new(session(1), CommandRef::new("foo", 1));
    let task = spawn_intercept(&h.gate, foo);
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(1), "yes");
    assert!(!task.await.unwrap().unwrap().should_proceed());
}

#[tokio::test]
async fn deny_list_exempts_listed_commands() {
    let h = harness(AgreementConfig {
        commands: CommandFilter::deny(["foo"]),
        ..yes_config()
    });

    let foo = Invocation::new(session(1), CommandRef::new("foo", 1));
    assert_eq!(h.gate.intercept(&foo).await.unwrap(), Verdict::Proceed);
    assert!(h.messenger.sent().is_empty());
}

#[tokio::test]
async fn authority_threshold_boundaries() {
    let h = harness(AgreementConfig {
        reply_authority: 2,
        ..yes_config()
    });
    h.memory
        .insert(UserRecord::new(UserId(3)).with_authority(3));

    // Above the threshold
    assert_eq!(h.gate.intercept(&draw(3)).await.unwrap(), Verdict::Proceed);

    // Public command
    let help = Invocation::new(session(1), CommandRef::new("help", 0));
    assert_eq!(h.gate.intercept(&help).await.unwrap(), Verdict::Proceed);
    assert!(h.messenger.sent().is_empty());

    // At the threshold
    h.memory
        .insert(UserRecord::new(UserId(2)).with_authority(2));
    let task = spawn_intercept(&h.gate, draw(2));
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(2), "yes");
    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
}

#[tokio::test]
async fn second_invocation_while_pending_is_refused() {
    let h = harness(yes_config());

    let first = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    assert_eq!(h.gate.pending_prompts(), 1);

    let second = h.gate.intercept(&draw(1)).await.unwrap();
    assert_eq!(second, Verdict::Suppressed(GateOutcome::AlreadyPending));
    assert_eq!(h.messenger.agreements().len(), 1);
    assert_eq!(
        h.messenger.texts(),
        vec!["Please answer the pending agreement prompt first.".to_string()]
    );

    h.gate.deliver_reply(&session(1), "yes");
    assert_eq!(
        first.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
    assert_eq!(h.gate.pending_prompts(), 0);
}

#[tokio::test]
async fn prompts_are_independent_per_channel() {
    let h = harness(yes_config());
    let elsewhere = Session::new(UserId(1), "group-2", "test", "bot");

    let first = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreements(1).await;
    let second = spawn_intercept(
        &h.gate,
        Invocation::new(elsewhere.clone(), CommandRef::new("draw", 1)),
    );
    h.messenger.wait_for_agreements(2).await;

    // A reply in one channel does not answer the other
    assert!(h.gate.deliver_reply(&elsewhere, "no"));
    assert_eq!(
        second.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Rejected)
    );
    assert!(h.gate.deliver_reply(&session(1), "yes"));
    assert_eq!(
        first.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
}

#[tokio::test]
async fn store_unavailable_refuses_command() {
    let messenger = Arc::new(RecordingMessenger::new());
    let gate = Eula::new(
        yes_config(),
        Arc::new(UnavailableStore),
        messenger.clone(),
        Arc::new(StaticLocalizer::default()),
    )
    .unwrap();

    let err = gate.intercept(&draw(1)).await.unwrap_err();

    assert!(matches!(err, GateError::Store(StoreError::Unavailable(_))));
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn events_report_checks_and_decisions() {
    let h = harness(yes_config());
    let mut events = h.gate.subscribe();

    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(1), "yes");
    task.await.unwrap().unwrap();

    match events.recv().await.unwrap() {
        GateEvent::Before { invocation } => assert_eq!(invocation, draw(1)),
        other => panic!("Expected before event, got {:?}", other),
    }
    match events.recv().await.unwrap() {
        GateEvent::Update { session: s, accepted } => {
            assert_eq!(s, session(1));
            assert!(accepted);
        }
        other => panic!("Expected update event, got {:?}", other),
    }
}

#[tokio::test]
async fn shutdown_cancels_pending_prompt() {
    let h = harness(yes_config());

    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    h.gate.shutdown();

    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Cancelled)
    );
    assert!(h.messenger.texts().is_empty());
    assert!(h.memory.is_empty());
    assert_eq!(h.gate.pending_prompts(), 0);
}

#[tokio::test]
async fn no_prompt_is_sent_after_shutdown() {
    let h = harness(yes_config());
    h.gate.shutdown();

    let verdict = h.gate.intercept(&draw(1)).await.unwrap();

    assert_eq!(verdict, Verdict::Suppressed(GateOutcome::Cancelled));
    assert!(h.messenger.sent().is_empty());
    assert!(h.memory.is_empty());
    assert_eq!(h.gate.pending_prompts(), 0);
}

#[tokio::test]
async fn abandoned_prompt_records_nothing() {
    let h = harness(yes_config());

    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreement().await;
    assert!(h.gate.cancel_prompt(&session(1)));

    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Cancelled)
    );
    assert!(h.messenger.texts().is_empty());
    assert!(h.memory.is_empty());
    assert_eq!(h.gate.pending_prompts(), 0);

    // The gate itself keeps working
    assert!(!h.gate.is_shut_down());
    let task = spawn_intercept(&h.gate, draw(1));
    h.messenger.wait_for_agreements(2).await;
    h.gate.deliver_reply(&session(1), "yes");
    assert_eq!(
        task.await.unwrap().unwrap(),
        Verdict::Suppressed(GateOutcome::Accepted)
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_does_not_revoke_acceptance() {
    let h = harness(yes_config());
    h.memory.insert(UserRecord::new(UserId(1)).with_eula(true));

    let outcome = h.gate.agreement_command(&session(1)).await.unwrap();

    assert_eq!(outcome, GateOutcome::TimedOut);
    assert!(h.gate.verify(UserId(1)).await.unwrap());
    assert!(h.memory.get(UserId(1)).await.unwrap().unwrap().eula);
}

#[tokio::test]
async fn agreement_command_can_revoke_acceptance() {
    let h = harness(yes_config());
    h.memory.insert(UserRecord::new(UserId(1)).with_eula(true));

    let gate = h.gate.clone();
    let task = tokio::spawn(async move { gate.agreement_command(&session(1)).await });
    h.messenger.wait_for_agreement().await;
    h.gate.deliver_reply(&session(1), "nope");

    assert_eq!(task.await.unwrap().unwrap(), GateOutcome::Rejected);
    assert!(!h.gate.verify(UserId(1)).await.unwrap());
}

#[tokio::test]
async fn agreement_command_itself_is_never_gated() {
    let h = harness(yes_config());
    let invocation = Invocation::new(session(1), Eula::command());

    assert_eq!(h.gate.intercept(&invocation).await.unwrap(), Verdict::Proceed);

    // Even when the host declares it with a non-zero authority
    let invocation = Invocation::new(session(1), CommandRef::new("eula", 1));
    assert_eq!(h.gate.intercept(&invocation).await.unwrap(), Verdict::Proceed);
}

#[tokio::test]
async fn legacy_records_are_revised() {
    let h = harness(yes_config());
    h.memory
        .insert(UserRecord::new(UserId(7)).with_authority(2).with_eula(true));

    assert_eq!(h.gate.admin().revise_legacy().await.unwrap(), 1);

    let record = h.gate.admin().status(UserId(7)).await.unwrap();
    assert_eq!(record.authority, 1);
    assert!(!record.eula);
}
