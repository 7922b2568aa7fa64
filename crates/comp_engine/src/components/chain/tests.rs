use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::core::SceneConfig;

/// Counts its updates and optionally finishes itself
#[derive(Default)]
struct Probe {
    updates: Rc<Cell<u32>>,
    finish_after: Option<u32>,
}

impl Probe {
    fn finishing_after(updates: u32) -> Self {
        Self {
            finish_after: Some(updates),
            ..Self::default()
        }
    }
}

impl Component for Probe {
    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _delta: f32, _absolute: f32) -> EngineResult<()> {
        self.updates.set(self.updates.get() + 1);
        if self.finish_after == Some(self.updates.get()) {
            ctx.finish();
        }
        Ok(())
    }
}

fn setup() -> (Scene, ObjectId) {
    let mut scene = Scene::default();
    let holder = scene.add_global_object(GameObject::new("holder")).unwrap();
    (scene, holder)
}

fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

fn bump(counter: &Rc<Cell<u32>>) -> impl FnMut(&mut ChainStep<'_, '_>) + 'static {
    let counter = counter.clone();
    move |_| counter.set(counter.get() + 1)
}

fn record(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> impl FnMut(&mut ChainStep<'_, '_>) + 'static {
    let log = log.clone();
    move |_| log.borrow_mut().push(label)
}

fn add_error(scene: &mut Scene, holder: ObjectId, chain: ChainComponent) -> ChainError {
    match scene.add_component(holder, chain) {
        Err(EngineError::InvalidChain(error)) => error,
        other => panic!("expected an invalid chain, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_execute_runs_in_one_frame() {
    let (mut scene, holder) = setup();
    let count = counter();
    let mut chain = ChainComponent::new();
    chain.execute(bump(&count)).execute(bump(&count)).execute(bump(&count));
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 3);
    assert!(scene.is_finished(id));
    assert!(!scene.contains_component(id));
}

#[test]
fn test_empty_chain_finishes_on_first_update() {
    let (mut scene, holder) = setup();
    let id = scene.add_component(holder, ChainComponent::new()).unwrap();
    assert!(scene.is_component_attached(id));

    scene.step(1.0).unwrap();
    assert!(scene.is_finished(id));
}

#[test]
fn test_repeat_literal_and_producer() {
    let (mut scene, holder) = setup();
    let literal = counter();
    let produced = counter();

    let mut chain = ChainComponent::new();
    chain.begin_repeat(3).execute(bump(&literal)).end_repeat();
    chain.begin_repeat_with(|_| 3).execute(bump(&produced)).end_repeat();
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(literal.get(), 3);
    assert_eq!(produced.get(), 3);
}

#[test]
fn test_nested_repeat_reevaluates_inner_count() {
    let (mut scene, holder) = setup();
    let count = counter();
    let evaluations = counter();
    let seen = evaluations.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_repeat(2)
        .begin_repeat_with(move |_| {
            seen.set(seen.get() + 1);
            3
        })
        .execute(bump(&count))
        .end_repeat()
        .end_repeat();
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 6);
    assert_eq!(evaluations.get(), 2);
}

#[test]
fn test_while_loop() {
    let (mut scene, holder) = setup();
    let count = counter();
    let after = counter();
    let watched = count.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_while(move |_| watched.get() < 3)
        .execute(bump(&count))
        .end_while()
        .begin_while(|_| false)
        .execute(bump(&count))
        .end_while()
        .execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    // the second loop's predicate is only checked after its first pass
    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 4);
    assert_eq!(after.get(), 1);
}

#[test]
fn test_while_body_runs_once_when_predicate_starts_false() {
    let (mut scene, holder) = setup();
    let count = counter();
    let checks = counter();
    let seen = checks.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_while(move |_| {
            seen.set(seen.get() + 1);
            false
        })
        .execute(bump(&count))
        .end_while();
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(checks.get(), 1);
    assert!(scene.is_finished(id));
}

#[test]
fn test_infinite_repeat_ends_only_by_finish() {
    let (mut scene, holder) = setup();
    let count = counter();
    let after = counter();
    let watched = count.clone();
    let at_finish = Rc::new(Cell::new(0_u64));
    let recorded = at_finish.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_repeat(0)
        .execute(bump(&count))
        .wait_frames(1)
        .begin_if(move |_| watched.get() == 4)
        .execute(move |step| {
            recorded.set(step.scene().frame());
            step.finish();
        })
        .end_if()
        .end_repeat()
        .execute(bump(&after));
    let id = scene.add_component(holder, chain).unwrap();

    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(count.get(), 3);
    assert!(!scene.is_finished(id));

    for _ in 0..5 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(count.get(), 4);
    assert_eq!(after.get(), 0);
    assert_eq!(at_finish.get(), 5);
    assert!(scene.is_finished(id));
}

#[test]
fn test_interval_fires_every_period() {
    let (mut scene, holder) = setup();
    let count = counter();
    let watched = count.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_interval(3.0)
        .execute(bump(&count))
        .begin_if(move |_| watched.get() == 3)
        .execute(|step| step.finish())
        .end_if()
        .end_interval();
    let id = scene.add_component(holder, chain).unwrap();

    // armed at t=1
    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(count.get(), 0);

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 1);

    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(count.get(), 2);
    assert!(!scene.is_finished(id));

    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(count.get(), 3);
    assert!(scene.is_finished(id));
}

#[test]
fn test_interval_reevaluates_period_each_round() {
    let (mut scene, holder) = setup();
    let fired = Rc::new(RefCell::new(Vec::new()));
    let log = fired.clone();
    let mut periods = vec![4.0, 3.0, 2.0].into_iter();

    let mut chain = ChainComponent::new();
    chain
        .begin_interval_with(move |_| periods.next().unwrap_or(2.0))
        .execute(move |step| log.borrow_mut().push(step.scene().absolute_time()))
        .end_interval();
    scene.add_component(holder, chain).unwrap();

    for _ in 0..10 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(*fired.borrow(), vec![5.0, 8.0, 10.0]);
}

#[test]
fn test_if_else_branches() {
    let (mut scene, holder) = setup();
    let then_branch = counter();
    let else_branch = counter();

    let mut chain = ChainComponent::new();
    chain
        .begin_if(|_| true)
        .execute(bump(&then_branch))
        .otherwise()
        .execute(bump(&else_branch))
        .end_if()
        .begin_if(|_| false)
        .execute(bump(&then_branch))
        .otherwise()
        .execute(bump(&else_branch))
        .end_if()
        .begin_if(|_| false)
        .execute(bump(&then_branch))
        .end_if();
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(then_branch.get(), 1);
    assert_eq!(else_branch.get(), 1);
}

#[test]
fn test_nested_conditionals_skip_inner_else() {
    let (mut scene, holder) = setup();
    let hits = Rc::new(RefCell::new(Vec::new()));
    let mark = |label| record(&hits, label);

    let mut chain = ChainComponent::new();
    chain
        .begin_if(|_| false)
        .begin_if(|_| true)
        .execute(mark("p"))
        .otherwise()
        .execute(mark("q"))
        .end_if()
        .otherwise()
        .begin_if(|_| true)
        .execute(mark("x"))
        .otherwise()
        .execute(mark("y"))
        .end_if()
        .end_if()
        .execute(mark("z"));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(*hits.borrow(), vec!["x", "z"]);
}

#[test]
fn test_conditional_loop_driven_by_message() {
    let (mut scene, holder) = setup();
    let rounds = counter();
    let branch = counter();
    let watched = rounds.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_while(move |_| watched.get() < 3)
        .execute(bump(&rounds))
        .begin_if(|scene| scene.global_attribute::<bool>("alarm").is_some())
        .execute(bump(&branch))
        .otherwise()
        .wait_for_message("MOJO")
        .end_if()
        .end_while();
    let id = scene.add_component(holder, chain).unwrap();
    scene.add_pending_invocation(2.0, |scene| {
        scene.add_global_attribute("alarm", true);
        scene.send_tag("MOJO")
    });

    scene.step(1.0).unwrap();
    assert_eq!(rounds.get(), 1);
    assert_eq!(branch.get(), 0);

    // the invocation raises the alarm and releases the message wait
    scene.step(1.0).unwrap();
    assert_eq!(rounds.get(), 3);
    assert_eq!(branch.get(), 2);
    assert!(scene.is_finished(id));
}

#[test]
fn test_add_component_literal_and_factory() {
    let (mut scene, holder) = setup();
    let found = Rc::new(Cell::new(false));
    let check = found.clone();

    let mut chain = ChainComponent::new();
    chain
        .add_component(Probe::default())
        .execute(move |step| {
            let owner = step.owner_id();
            check.set(step.scene().find_component(owner, "Probe").is_some());
        })
        .add_component_with(|_| Box::new(Probe::default()));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert!(found.get());
    let components = scene.object(holder).unwrap().components().to_vec();
    assert_eq!(components.len(), 2);
    assert!(components.iter().all(|id| scene.component::<Probe>(*id).is_some()));
}

#[test]
fn test_add_component_to_other_targets() {
    let (mut scene, holder) = setup();
    let other = scene.add_global_object(GameObject::new("other")).unwrap();
    let gone = scene.add_global_object(GameObject::new("gone")).unwrap();
    scene.remove_object(gone).unwrap();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain
        .add_component_to(Probe::default(), Target::tagged("other"))
        .add_component_to(Probe::default(), gone)
        .execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert!(scene.find_component(other, "Probe").is_some());
    assert!(scene.find_component(holder, "Probe").is_none());
    assert_eq!(after.get(), 1);
}

#[test]
fn test_literal_component_attaches_only_once() {
    let (mut scene, holder) = setup();
    let mut chain = ChainComponent::new();
    chain.begin_repeat(2).add_component(Probe::default()).end_repeat();
    scene.add_component(holder, chain).unwrap();

    let result = scene.step(1.0);
    assert!(matches!(
        result,
        Err(EngineError::InvalidChain(ChainError::ComponentAlreadyConsumed))
    ));
}

#[test]
fn test_factory_component_attaches_every_visit() {
    let (mut scene, holder) = setup();
    let mut chain = ChainComponent::new();
    chain
        .begin_repeat(2)
        .add_component_with(|_| Box::new(Probe::default()))
        .end_repeat();
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(scene.object(holder).unwrap().components().len(), 2);
}

#[test]
fn test_add_component_and_wait_for_external_finish() {
    let (mut scene, holder) = setup();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain.add_component_and_wait(Probe::default()).execute(bump(&after));
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 0);

    let probe = scene.find_component(holder, "Probe").unwrap();
    assert!(scene.is_component_attached(probe));
    scene.finish_component(probe).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
    assert!(!scene.contains_component(probe));
    assert!(!scene.contains_component(id));
}

#[test]
fn test_add_component_and_wait_for_self_finish() {
    let (mut scene, holder) = setup();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain
        .add_component_and_wait(Probe::finishing_after(2))
        .execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    // attached at t=1, updates at t=2 and t=3, detached at the end of t=3
    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(after.get(), 0);
    assert!(scene.find_component(holder, "Probe").is_none());

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
}

#[test]
fn test_wait_time_literal_and_producer() {
    let (mut scene, holder) = setup();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain
        .wait_time(0.8)
        .execute(bump(&count))
        .wait_time_with(|_| 1.5)
        .execute(bump(&count));
    scene.add_component(holder, chain).unwrap();

    let mut seen = Vec::new();
    for absolute in [1.0, 2.0, 3.0, 4.0] {
        scene.update(1.0, absolute).unwrap();
        seen.push(count.get());
    }
    assert_eq!(seen, vec![0, 1, 1, 2]);
}

#[test]
fn test_wait_time_zero_takes_one_frame() {
    let (mut scene, holder) = setup();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain.wait_time(0.0).execute(bump(&count));
    scene.add_component(holder, chain).unwrap();

    scene.step(0.5).unwrap();
    assert_eq!(count.get(), 0);
    scene.step(0.5).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_wait_for_finish_by_name() {
    let (mut scene, holder) = setup();
    let probe = scene.add_component(holder, Probe::default()).unwrap();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain
        .wait_for_finish("Probe")
        .execute(bump(&after))
        .wait_for_finish("Missing")
        .execute(bump(&after));
    let id = scene.add_component(holder, chain).unwrap();

    for absolute in [1.0, 2.0, 3.0] {
        scene.update(1.0, absolute).unwrap();
    }
    assert_eq!(after.get(), 0);

    scene.finish_component(probe).unwrap();
    scene.update(1.0, 4.0).unwrap();
    assert_eq!(after.get(), 2);
    assert!(scene.is_finished(id));
}

#[test]
fn test_wait_for_finish_with_producer() {
    let (mut scene, holder) = setup();
    let probe = scene.add_component(holder, Probe::finishing_after(2)).unwrap();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain.wait_for_finish_with(move |_| Some(probe)).execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 0);
    // the probe runs first and finishes before the chain looks at it
    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
}

#[test]
fn test_wait_until_predicate_turns_false() {
    let (mut scene, holder) = setup();
    let animation = scene.add_component(holder, Probe::finishing_after(2)).unwrap();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain
        .wait_until(move |scene| !scene.is_finished(animation))
        .execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 0);
    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
}

#[test]
fn test_wait_frames() {
    let (mut scene, holder) = setup();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain.wait_frames(5).execute(bump(&count));
    scene.add_component(holder, chain).unwrap();

    for _ in 0..5 {
        scene.step(0.1).unwrap();
    }
    assert_eq!(count.get(), 0);
    scene.step(0.1).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_wait_for_message_sequence() {
    let (mut scene, holder) = setup();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain
        .wait_for_message("MOJO")
        .execute(bump(&count))
        .wait_for_message("DOJO")
        .execute(bump(&count));
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert!(scene.is_subscribed(id, "MOJO"));
    // not awaited yet, so it is lost
    scene.send_tag("DOJO").unwrap();
    scene.send_tag("MOJO").unwrap();
    assert_eq!(count.get(), 0);

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 1);
    assert!(!scene.is_subscribed(id, "MOJO"));
    assert!(scene.is_subscribed(id, "DOJO"));

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 1);

    scene.send_tag("DOJO").unwrap();
    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 2);
    assert!(scene.is_finished(id));
}

#[test]
fn test_remove_component_by_name_and_handle() {
    let (mut scene, holder) = setup();
    let named = scene.add_component(holder, Probe::default()).unwrap();
    let other = scene.add_global_object(GameObject::new("other")).unwrap();
    let by_handle = scene.add_component(other, Probe::default()).unwrap();

    let mut chain = ChainComponent::new();
    chain
        .wait_time(0.5)
        .remove_component("Probe")
        .remove_component_from(by_handle, other);
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert!(scene.contains_component(named));

    scene.step(1.0).unwrap();
    assert!(!scene.contains_component(named));
    assert!(!scene.contains_component(by_handle));
}

#[test]
fn test_remove_game_object_by_tag_and_handle() {
    let (mut scene, holder) = setup();
    let tagged = scene.add_global_object(GameObject::new("victim")).unwrap();
    let handled = scene.add_global_object(GameObject::new("bystander")).unwrap();

    let mut chain = ChainComponent::new();
    chain
        .wait_time(1.0)
        .remove_game_object_by_tag("victim")
        .remove_game_object(handled)
        .remove_game_object_by_tag("nobody");
    scene.add_component(holder, chain).unwrap();

    scene.update(1.0, 1.0).unwrap();
    assert!(scene.contains_object(tagged));

    scene.update(1.5, 2.5).unwrap();
    assert!(scene.find_object_by_tag("victim").is_none());
    assert!(!scene.contains_object(tagged));
    assert!(!scene.contains_object(handled));
}

#[test]
fn test_remove_stale_object_is_skipped() {
    let (mut scene, holder) = setup();
    let gone = scene.add_global_object(GameObject::new("gone")).unwrap();
    scene.remove_object(gone).unwrap();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain.remove_game_object(gone).execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
}

#[test]
fn test_remove_previous_unlinks_predecessor() {
    let (mut scene, holder) = setup();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain
        .remove_previous()
        .begin_repeat(2)
        .execute(bump(&count))
        .execute(bump(&count))
        .remove_previous()
        .execute(bump(&count))
        .end_repeat();
    scene.add_component(holder, chain).unwrap();

    // each pass unlinks the instruction right before remove_previous
    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 5);
}

#[test]
fn test_remove_previous_cannot_unlink_open_scope() {
    let (mut scene, holder) = setup();
    let mut chain = ChainComponent::new();
    chain.begin_repeat(2).remove_previous().end_repeat();
    scene.add_component(holder, chain).unwrap();

    assert!(matches!(
        scene.step(1.0),
        Err(EngineError::InvalidChain(ChainError::ScopeNodeRemoved))
    ));
}

#[test]
fn test_runtime_appends_run_next_in_order() {
    let (mut scene, holder) = setup();
    let order = Rc::new(RefCell::new(Vec::new()));
    let log = order.clone();
    let tail = order.clone();

    let mut chain = ChainComponent::new();
    chain
        .execute(move |step| {
            log.borrow_mut().push("a");
            let (b, c) = (log.clone(), log.clone());
            step.chain()
                .execute(move |_| b.borrow_mut().push("b"))
                .execute(move |_| c.borrow_mut().push("c"));
        })
        .execute(move |_| tail.borrow_mut().push("d"))
        .wait_frames(1);
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(*order.borrow(), vec!["a", "b", "c", "d"]);
    let chain = scene.component::<ChainComponent>(id).unwrap();
    assert_eq!(
        chain.instruction_names(),
        vec!["execute", "execute", "execute", "execute", "wait_frames"]
    );
    assert!(chain.is_running());
}

#[test]
fn test_runtime_append_error_is_reported() {
    let (mut scene, holder) = setup();
    let mut chain = ChainComponent::new();
    chain.execute(|step| {
        step.chain().end_repeat();
    });
    scene.add_component(holder, chain).unwrap();

    assert!(matches!(
        scene.step(1.0),
        Err(EngineError::InvalidChain(ChainError::UnopenedScope("end_repeat")))
    ));
}

#[test]
fn test_step_limit_suspends_runaway_loop() {
    let mut scene = Scene::new(SceneConfig::default().with_chain_step_limit(10));
    let holder = scene.add_global_object(GameObject::new("holder")).unwrap();
    let count = counter();

    let mut chain = ChainComponent::new();
    chain.begin_repeat(0).execute(bump(&count)).end_repeat();
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 3);
    scene.step(1.0).unwrap();
    assert_eq!(count.get(), 7);
    assert!(!scene.is_finished(id));
}

#[test]
fn test_authoring_errors() {
    let (mut scene, holder) = setup();

    let mut chain = ChainComponent::new();
    chain.begin_repeat(1).end_while();
    assert_eq!(
        add_error(&mut scene, holder, chain),
        ChainError::UnbalancedScope {
            expected: "end_repeat",
            found: "end_while"
        }
    );

    let mut chain = ChainComponent::new();
    chain.end_if();
    assert_eq!(add_error(&mut scene, holder, chain), ChainError::UnopenedScope("end_if"));

    let mut chain = ChainComponent::new();
    chain.begin_repeat(1).otherwise().end_repeat();
    assert_eq!(add_error(&mut scene, holder, chain), ChainError::ElseWithoutIf);

    let mut chain = ChainComponent::new();
    chain.begin_if(|_| true).otherwise().otherwise().end_if();
    assert_eq!(add_error(&mut scene, holder, chain), ChainError::DuplicateElse);

    let mut chain = ChainComponent::new();
    chain.wait_time(-1.0);
    assert_eq!(add_error(&mut scene, holder, chain), ChainError::InvalidDuration(-1.0));

    let mut chain = ChainComponent::new();
    chain.begin_interval(f32::NAN).end_interval();
    assert!(matches!(
        add_error(&mut scene, holder, chain),
        ChainError::InvalidDuration(_)
    ));

    let mut chain = ChainComponent::new();
    chain.begin_repeat(2).add_component(Probe::default());
    assert_eq!(
        add_error(&mut scene, holder, chain),
        ChainError::UnclosedScope("begin_repeat")
    );

    assert_eq!(scene.object(holder).unwrap().components().len(), 0);
}

#[test]
fn test_first_authoring_error_wins() {
    let mut chain = ChainComponent::new();
    chain.otherwise().end_while().wait_time(-2.0);
    assert!(matches!(
        chain.validate(),
        Err(EngineError::InvalidChain(ChainError::ElseWithoutIf))
    ));
}

#[test]
fn test_chain_is_named_and_debuggable() {
    let mut chain = ChainComponent::named("intro");
    chain.wait_frames(1).execute(|_| {});
    assert_eq!(chain.name(), "intro");
    assert_eq!(chain.len(), 2);
    assert!(!chain.is_running());
    assert!(format!("{:?}", chain).contains("wait_frames"));
}

#[test]
fn test_add_component_and_wait_with_factory_per_iteration() {
    let (mut scene, holder) = setup();
    let built = counter();
    let after = counter();
    let factory_count = built.clone();

    let mut chain = ChainComponent::new();
    chain
        .begin_repeat(2)
        .add_component_and_wait_with(move |_| {
            factory_count.set(factory_count.get() + 1);
            Box::new(Probe::finishing_after(1)) as Box<dyn Component>
        })
        .end_repeat()
        .execute(bump(&after));
    let id = scene.add_component(holder, chain).unwrap();

    scene.step(1.0).unwrap();
    assert_eq!(scene.component::<ChainComponent>(id).map(ChainComponent::scope_depth), Some(1));
    for _ in 0..3 {
        scene.step(1.0).unwrap();
    }
    assert_eq!(built.get(), 2);
    assert_eq!(after.get(), 0);

    scene.step(1.0).unwrap();
    assert_eq!(after.get(), 1);
    assert!(scene.is_finished(id));
}

#[test]
fn test_try_execute_error_is_returned_from_update() {
    let (mut scene, holder) = setup();
    let before = counter();
    let after = counter();

    let mut chain = ChainComponent::new();
    chain
        .execute(bump(&before))
        .try_execute(|_| Err(EngineError::Application("boom".to_string())))
        .execute(bump(&after));
    scene.add_component(holder, chain).unwrap();

    let result = scene.step(1.0);
    assert!(matches!(result, Err(EngineError::Application(ref text)) if text == "boom"));
    assert_eq!(before.get(), 1);
    assert_eq!(after.get(), 0);
}
