use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use parlance_dialog::{
    DialogEngine, DialogSession, DialogState, EngineConfig, EntityMap, EntityTemplate,
    EntityValue, IntentRegistry, IntentSpec, Outcome, PromptTemplate, ValueKind, handler_fn,
};
use pretty_assertions::assert_eq;

/// Records every invocation of a handler.
#[derive(Default)]
struct Calls {
    count: AtomicUsize,
    last: Mutex<Option<EntityMap>>,
}

fn meeting_engine(calls: Arc<Calls>) -> Result<DialogEngine> {
    let mut registry = IntentRegistry::new();
    registry.register(
        handler_fn(move |entities: &EntityMap| {
            calls.count.fetch_add(1, Ordering::SeqCst);
            *calls.last.lock().unwrap() = Some(entities.clone());
            Ok(format!(
                "Meeting with {} at {}",
                entities["person"], entities["start"]
            ))
        }),
        IntentSpec::new("meeting", "schedule [a] meeting [with {person}] [at {start}]")
            .entity(EntityTemplate::new("person", "+ [+]").required())
            .entity(EntityTemplate::new("start", "{time}").kind(ValueKind::Time).required())
            .prompt(PromptTemplate::new("person", "[with] {person}", "Who is the meeting with?"))
            .prompt(PromptTemplate::new("start", "[at] {start}", "When does it start?")),
    )?;
    Ok(DialogEngine::new(registry, EngineConfig::default())?)
}

#[test]
fn it_prompts_for_each_required_entity_in_order() -> Result<()> {
    let calls = Arc::new(Calls::default());
    let engine = meeting_engine(calls.clone())?;
    let mut session = DialogSession::new();

    let reply = engine.decide_intent(&mut session, "schedule a meeting");
    assert_eq!(reply.outcome, Outcome::Prompted);
    assert_eq!(reply.text, "Who is the meeting with?");
    assert_eq!(session.state(), DialogState::AwaitingSlot("person".into()));

    let reply = engine.process_intent(&mut session, "with Ada Lovelace")?;
    assert_eq!(reply.text, "When does it start?");
    assert_eq!(session.state(), DialogState::AwaitingSlot("start".into()));
    assert_eq!(calls.count.load(Ordering::SeqCst), 0);

    let reply = engine.process_intent(&mut session, "at quarter to five pm")?;
    assert_eq!(reply.outcome, Outcome::Completed);
    assert_eq!(reply.text, "Meeting with Ada Lovelace at 16:45");
    assert!(session.is_idle());

    assert_eq!(calls.count.load(Ordering::SeqCst), 1);
    let mut expected = EntityMap::new();
    expected.insert("person".into(), EntityValue::Text("Ada Lovelace".into()));
    expected.insert("start".into(), EntityValue::Time { hour: 16, minute: 45 });
    assert_eq!(calls.last.lock().unwrap().clone(), Some(expected.clone()));
    assert_eq!(reply.entities, expected);
    Ok(())
}

#[test]
fn it_completes_when_the_utterance_carries_everything() -> Result<()> {
    let calls = Arc::new(Calls::default());
    let engine = meeting_engine(calls.clone())?;
    let mut session = DialogSession::new();

    let reply = engine.decide_intent(&mut session, "schedule meeting with Grace at 9 x 30");
    assert_eq!(reply.text, "Meeting with Grace at 09:30");
    assert_eq!(calls.count.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn it_skips_prompts_for_entities_already_captured() -> Result<()> {
    let engine = meeting_engine(Arc::new(Calls::default()))?;
    let mut session = DialogSession::new();

    let reply = engine.decide_intent(&mut session, "schedule a meeting at seven o'clock");
    assert_eq!(reply.text, "Who is the meeting with?");
    assert_eq!(
        session.value("start"),
        Some(&EntityValue::Time { hour: 7, minute: 0 })
    );
    Ok(())
}

#[test]
fn it_quits_from_any_pending_slot() -> Result<()> {
    let calls = Arc::new(Calls::default());
    let engine = meeting_engine(calls.clone())?;

    for (answers, quit) in [
        (vec![], "cancel"),
        (vec![], "please stop it now"),
        (vec!["Ada"], "never mind"),
        (vec!["Ada"], "oh forget it"),
    ] {
        let mut session = DialogSession::new();
        engine.decide_intent(&mut session, "schedule a meeting");
        for answer in answers {
            engine.process_intent(&mut session, answer)?;
        }
        assert!(!session.is_idle());

        let reply = engine.process_intent(&mut session, quit)?;
        assert_eq!(reply.outcome, Outcome::Cancelled, "{quit}");
        assert_eq!(reply.text, engine.config().cancelled);
        assert_eq!(session.state(), DialogState::Idle);
        assert!(session.intent().is_none());
    }

    assert_eq!(calls.count.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn it_repeats_the_same_prompt_on_unusable_answers() -> Result<()> {
    let engine = meeting_engine(Arc::new(Calls::default()))?;
    let mut session = DialogSession::new();

    engine.decide_intent(&mut session, "schedule a meeting with Ada");
    assert_eq!(session.pending_entity(), Some("start"));

    for answer in ["banana", "at noonish maybe", ""] {
        let reply = engine.process_intent(&mut session, answer)?;
        assert_eq!(reply.outcome, Outcome::Prompted);
        assert_eq!(reply.text, "When does it start?");
        assert_eq!(session.pending_entity(), Some("start"));
    }
    assert_eq!(
        session.value("person"),
        Some(&EntityValue::Text("Ada".into()))
    );
    Ok(())
}

#[test]
fn it_does_not_understand_noise() -> Result<()> {
    let engine = meeting_engine(Arc::new(Calls::default()))?;
    let mut session = DialogSession::new();

    let reply = engine.decide_intent(&mut session, "the weather is nice today");
    assert_eq!(reply.outcome, Outcome::NotUnderstood);
    assert!(engine.config().not_understood.contains(&reply.text));
    assert!(session.is_idle());
    Ok(())
}

#[test]
fn it_abandons_a_pending_intent_on_decide() -> Result<()> {
    let engine = meeting_engine(Arc::new(Calls::default()))?;
    let mut session = DialogSession::new();

    engine.decide_intent(&mut session, "schedule a meeting");
    let reply = engine.decide_intent(&mut session, "what is this");
    assert_eq!(reply.outcome, Outcome::NotUnderstood);
    assert!(session.is_idle());
    Ok(())
}

#[test]
fn it_trims_noise_around_the_command() -> Result<()> {
    let mut registry = IntentRegistry::new();
    registry.register(
        handler_fn(|entities: &EntityMap| Ok(format!("Timer for {} minutes", entities["minutes"]))),
        IntentSpec::new("timer", "set [a] timer for {minutes} minutes")
            .entity(EntityTemplate::new("minutes", "#").kind(ValueKind::Number).required()),
    )?;
    let engine = DialogEngine::new(registry, EngineConfig::default())?;
    let mut session = DialogSession::new();

    let reply = engine.decide_intent(
        &mut session,
        "um okay so set a timer for twenty five minutes thanks a lot",
    );
    assert_eq!(reply.text, "Timer for 25 minutes");
    assert_eq!(reply.entities["minutes"], EntityValue::Number(25));
    Ok(())
}

#[test]
fn it_prefers_the_first_registered_intent() -> Result<()> {
    let mut registry = IntentRegistry::new();
    registry.register(
        handler_fn(|_| Ok("lights".to_string())),
        IntentSpec::new("lights", "turn on [the] +"),
    )?;
    registry.register(
        handler_fn(|_| Ok("radio".to_string())),
        IntentSpec::new("radio", "turn on [the] radio"),
    )?;
    let engine = DialogEngine::new(registry, EngineConfig::default())?;
    let mut session = DialogSession::new();

    assert_eq!(engine.decide_intent(&mut session, "turn on the radio").text, "lights");
    Ok(())
}

#[test]
fn it_stems_with_the_configured_language() -> Result<()> {
    let mut registry = IntentRegistry::new();
    registry.register(
        handler_fn(|_| Ok("playing".to_string())),
        IntentSpec::new("music", "play [some] song"),
    )?;
    let config = EngineConfig::from_json(r#"{ "language": "english" }"#)?;
    let engine = DialogEngine::new(registry, config)?;
    let mut session = DialogSession::new();

    assert_eq!(engine.decide_intent(&mut session, "playing some songs").outcome, Outcome::Completed);
    Ok(())
}

#[test]
fn it_lists_possible_grammars() -> Result<()> {
    let engine = meeting_engine(Arc::new(Calls::default()))?;
    let grammars: Vec<String> = engine.possible_grammars().map(|g| g.to_string()).collect();
    assert_eq!(
        grammars,
        vec!["schedule [a] meeting [with {person}] [at {start}]"]
    );
    Ok(())
}
