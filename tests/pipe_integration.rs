//! Integration tests for operator chains and pipes.
//!
//! Covers composition, ordering and error aggregation across whole chains,
//! the replay rules of every multicast strategy, and concurrent ingestion.

use std::{collections::VecDeque, thread};

use futures::channel::oneshot;
use rxflow::{observer::ObserverAll, ops::Direct, prelude::*};

type Log<T, E = RxError> = MutArc<Vec<Result<Option<T>, E>>>;

/// Records values as `Ok(Some(_))`, completion as `Ok(None)` and errors.
fn recorder<T: Send + 'static, E: Send + 'static>(log: &Log<T, E>) -> impl Observer<T, E> {
  let (n, e, c) = (log.clone(), log.clone(), log.clone());
  ObserverAll::new(
    move |v| n.rc_deref_mut().push(Ok(Some(v))),
    move |err| e.rc_deref_mut().push(Err(err)),
    move || c.rc_deref_mut().push(Ok(None)),
  )
}

fn log<T, E>() -> Log<T, E> { MutArc::own(vec![]) }

fn err(msg: &str) -> RxError { RxError::source_error(msg) }

#[rxflow_macro::test]
fn lifting_twice_equals_lifting_the_composition() {
  let ctx = TestScheduler::new().context();
  let double = MapOp::new(|v: i32| v * 2);
  let explode = ConcatMapOp::<_, FailFast, Direct>::new(|v: i32| from_iter::<_, RxError>(0..v));

  let chained = log();
  from_iter::<_, RxError>(1..=3)
    .lift(double.clone())
    .lift(explode.clone())
    .subscribe(recorder(&chained), &ctx);

  let composed = log();
  from_iter::<_, RxError>(1..=3)
    .lift(compose(double, explode))
    .subscribe(recorder(&composed), &ctx);

  assert_eq!(*chained.rc_deref_mut(), *composed.rc_deref_mut());
  assert_eq!(chained.rc_deref_mut().len(), 2 + 4 + 6 + 1);
}

#[rxflow_macro::test]
fn concat_order_ignores_completion_timing() {
  let scheduler = TestScheduler::new();
  let ctx = scheduler.context();
  let (tx1, rx1) = oneshot::channel::<i32>();
  let (tx2, rx2) = oneshot::channel::<i32>();
  let receivers = MutArc::own(VecDeque::from([rx1, rx2]));

  let seen = log();
  from_iter::<_, RxError>([1, 2])
    .concat_map_future(move |_| {
      let rx = receivers.rc_deref_mut().pop_front();
      async move {
        match rx {
          Some(rx) => rx.await.map_err(|_| err("cancelled")),
          None => Err(err("no receiver")),
        }
      }
    })
    .subscribe(recorder(&seen), &ctx);

  // The second inner finishes first.
  let _ = tx2.send(20);
  scheduler.run_until_idle();
  assert!(seen.rc_deref_mut().is_empty());

  let _ = tx1.send(10);
  scheduler.run_until_idle();
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(10)), Ok(Some(20)), Ok(None)]);
}

#[rxflow_macro::test]
fn delay_error_reports_every_cause_after_all_inners_finish() {
  let ctx = TestScheduler::new().context();
  let upstream = PublishSubject::<i32, RxError>::new();
  let inners = vec![PublishSubject::<i32, RxError>::new(), PublishSubject::new()];
  let c_inners = inners.clone();

  let seen = log();
  upstream
    .clone()
    .concat_map_delay_error(move |i| c_inners[i as usize].clone())
    .subscribe(recorder(&seen), &ctx);

  let mut input = upstream.clone();
  let _ = input.next(0);
  inners[0].clone().error(err("e2"));
  let _ = input.next(1);
  let mut second = inners[1].clone();
  let _ = second.next(5);
  input.error(err("e1"));
  // The second inner is still running: nothing but its value so far.
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(5))]);

  second.error(err("e3"));
  let expected: CompositeError<RxError> =
    vec![err("e2"), err("e1"), err("e3")].into_iter().collect();
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(5)), Err(expected)]);
}

#[rxflow_macro::test]
fn behavior_pipe_replays_the_latest_value() {
  let scheduler = TestScheduler::new();
  let ctx = scheduler.context();
  let (mut input, output) = SubjectPipe::<i32, RxError>::behavior(0).multicast(&ctx);

  let early = log();
  output.clone().subscribe(recorder(&early), &ctx);
  scheduler.run_until_idle();
  assert_eq!(*early.rc_deref_mut(), vec![Ok(Some(0))]);

  let _ = input.next(1);
  let _ = input.next(2);
  scheduler.run_until_idle();

  let late = log();
  output.subscribe(recorder(&late), &ctx);
  let _ = input.next(3);
  scheduler.run_until_idle();

  assert_eq!(*early.rc_deref_mut(), vec![Ok(Some(0)), Ok(Some(1)), Ok(Some(2)), Ok(Some(3))]);
  assert_eq!(*late.rc_deref_mut(), vec![Ok(Some(2)), Ok(Some(3))]);
}

#[rxflow_macro::test]
fn replay_limited_pipe_keeps_the_last_values() {
  let scheduler = TestScheduler::new();
  let ctx = scheduler.context();
  let (mut input, output) = SubjectPipe::<i32, RxError>::replay_limited(2).unicast();
  for v in 1..=3 {
    let _ = input.next(v);
  }

  let seen = log();
  output.subscribe(recorder(&seen), &ctx);
  scheduler.run_until_idle();
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(2)), Ok(Some(3))]);

  let _ = input.next(4);
  scheduler.run_until_idle();
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(2)), Ok(Some(3)), Ok(Some(4))]);
}

#[rxflow_macro::test]
fn async_pipe_emits_only_the_last_value() {
  let ctx = TestScheduler::new().context();
  let (mut input, output) = SubjectPipe::<i32, RxError>::asynchronous().multicast(&ctx);
  let (a, b) = (log(), log());
  output.clone().subscribe(recorder(&a), &ctx);
  output.subscribe(recorder(&b), &ctx);

  for v in 1..=3 {
    let _ = input.next(v);
  }
  assert!(a.rc_deref_mut().is_empty());
  input.complete();

  assert_eq!(*a.rc_deref_mut(), vec![Ok(Some(3)), Ok(None)]);
  assert_eq!(*b.rc_deref_mut(), vec![Ok(Some(3)), Ok(None)]);
}

#[rxflow_macro::test]
fn async_pipe_error_discards_the_value() {
  let ctx = TestScheduler::new().context();
  let (mut input, output) = SubjectPipe::<i32, RxError>::asynchronous().multicast(&ctx);
  let seen = log();
  output.subscribe(recorder(&seen), &ctx);

  let _ = input.next(1);
  input.error(err("boom"));
  assert_eq!(*seen.rc_deref_mut(), vec![Err(err("boom"))]);
}

#[rxflow_macro::test]
fn multicast_serves_every_strategy_to_many_subscribers() {
  let strategies = [
    MulticastStrategy::Publish,
    MulticastStrategy::Behavior(0),
    MulticastStrategy::Replay,
    MulticastStrategy::ReplayPopulated(vec![-1]),
    MulticastStrategy::ReplayLimited(1),
  ];
  for strategy in strategies {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let pipe = SubjectPipe::<i32, RxError>::from_strategy(strategy).lift(MapOp::new(|v: i32| v + 1));
    let (mut input, output) = pipe.multicast(&ctx);
    scheduler.run_until_idle();

    let logs: Vec<Log<i32>> = (0..3).map(|_| log()).collect();
    for seen in &logs {
      output.clone().subscribe(recorder(seen), &ctx);
    }
    scheduler.run_until_idle();
    for seen in &logs {
      seen.rc_deref_mut().clear();
    }

    let _ = input.next(10);
    input.complete();
    scheduler.run_until_idle();
    for seen in &logs {
      assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(11)), Ok(None)]);
    }
  }
}

#[rxflow_macro::test]
fn unsubscribing_a_chain_cancels_the_active_inner() {
  let ctx = TestScheduler::new().context();
  let inner = PublishSubject::<i32, RxError>::new();
  let c_inner = inner.clone();
  let pipe = SubjectPipe::<i32, RxError>::publish().transform(move |output| {
    let inner = c_inner.clone();
    output.concat_map(move |_| inner.clone())
  });
  let (mut input, output) = pipe.unicast();

  let seen = log();
  let subscription = output.subscribe(recorder(&seen), &ctx);
  let _ = input.next(1);
  assert_eq!(inner.observer_count(), 1);

  subscription.unsubscribe();
  assert_eq!(inner.observer_count(), 0);
  let _ = inner.clone().next(7);
  assert!(seen.rc_deref_mut().is_empty());
}

#[rxflow_macro::test]
fn fail_policy_surfaces_an_overflow_and_stops() {
  let scheduler = TestScheduler::new();
  let ctx = scheduler.context();
  let (input, output) =
    SubjectPipe::<i32, RxError>::publish().concurrent(OverflowStrategy::Fail(2), &ctx);
  let seen = log();
  output.subscribe(recorder(&seen), &ctx);

  // The scheduler is not running: the consumer cannot keep pace.
  let mut writer = input.clone();
  let accepted = thread::spawn(move || {
    let mut accepted = 0;
    for v in 1..=10 {
      if writer.next(v).now() == Some(Ack::Stop) {
        break;
      }
      accepted += 1;
    }
    accepted
  })
  .join()
  .unwrap();
  assert_eq!(accepted, 2);

  scheduler.run_until_idle();
  let overflow = RxError::Overflow(BufferOverflowError { capacity: 2 });
  assert_eq!(*seen.rc_deref_mut(), vec![Ok(Some(1)), Ok(Some(2)), Err(overflow)]);
  assert_eq!(input.clone().next(11).now(), Some(Ack::Stop));
}

#[rxflow_macro::test(shared)]
async fn concurrent_pipe_on_the_thread_pool() {
  let ctx = ExecutionContext::thread_pool();
  let (input, output) =
    SubjectPipe::<usize, RxError>::replay().concurrent(OverflowStrategy::Unbounded, &ctx);

  let (done_tx, done_rx) = oneshot::channel();
  let sum = MutArc::own(0);
  let c_sum = sum.clone();
  output.subscribe(
    ObserverAll::new(
      move |v: usize| *c_sum.rc_deref_mut() += v,
      |_: RxError| {},
      move || {
        let _ = done_tx.send(());
      },
    ),
    &ctx,
  );

  let writers: Vec<_> = (0..4)
    .map(|t| {
      let mut input = input.clone();
      thread::spawn(move || {
        for v in 0..100 {
          let _ = input.next(t * 100 + v);
        }
      })
    })
    .collect();
  for writer in writers {
    writer.join().unwrap();
  }
  input.complete();

  assert!(done_rx.await.is_ok());
  assert_eq!(*sum.rc_deref_mut(), (0..400).sum::<usize>());
}
