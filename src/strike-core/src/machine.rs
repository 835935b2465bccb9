//! Runtime shared by the SIWB and auth state machines.
//!
//! A machine is plain data plus a synchronous transition function. The
//! runtime task owns the machine, feeds it events in arrival order, and keeps
//! at most one pending asynchronous operation. When an operation finishes its
//! outcome is fed back as an input. Dropping the pending operation detaches
//! it: it may still run to completion, but its result is never observed.
use async_trait::async_trait;
use slog::{debug, trace, warn, Logger};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

const EMISSION_CAPACITY: usize = 64;

pub enum Input<E, O> {
    Event(E),
    Done(O),
}

/// What a transition asks the runtime to do.
pub struct Step<Op, Em> {
    /// The event was not accepted in the current state and changed nothing.
    pub ignored: bool,
    /// Drop the pending operation without waiting for it.
    pub cancel_pending: bool,
    pub operation: Option<Op>,
    pub emissions: Vec<Em>,
}

impl<Op, Em> Step<Op, Em> {
    pub fn ignored() -> Self {
        Step {
            ignored: true,
            cancel_pending: false,
            operation: None,
            emissions: vec![],
        }
    }

    pub fn to(operation: Option<Op>) -> Self {
        Step {
            ignored: false,
            cancel_pending: false,
            operation,
            emissions: vec![],
        }
    }

    pub fn emit(mut self, emission: Em) -> Self {
        self.emissions.push(emission);
        self
    }

    pub fn cancelling(mut self) -> Self {
        self.cancel_pending = true;
        self
    }
}

pub trait Machine: Send + 'static {
    type Event: Debug + Send + 'static;
    type Outcome: Send + 'static;
    type Operation: Debug + Send + 'static;
    type Emission: Clone + Debug + Send + 'static;
    type Snapshot: Clone + Send + Sync + 'static;

    fn state_name(&self) -> &'static str;

    fn handle(
        &mut self,
        input: Input<Self::Event, Self::Outcome>,
    ) -> Step<Self::Operation, Self::Emission>;

    fn snapshot(&self) -> Self::Snapshot;

    /// The outcome fed back when an operation task dies without producing one.
    fn aborted(reason: String) -> Self::Outcome;
}

/// Performs the side effects a machine asks for.
#[async_trait]
pub trait OperationRunner<Op, Out>: Send + Sync + 'static {
    async fn run(&self, operation: Op) -> Out;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineStopped;

/// Cheap, cloneable access to a running machine.
pub struct MachineHandle<M: Machine> {
    events: mpsc::UnboundedSender<M::Event>,
    emissions: broadcast::Sender<M::Emission>,
    snapshot: watch::Receiver<M::Snapshot>,
}

impl<M: Machine> Clone for MachineHandle<M> {
    fn clone(&self) -> Self {
        MachineHandle {
            events: self.events.clone(),
            emissions: self.emissions.clone(),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<M: Machine> MachineHandle<M> {
    pub fn send(&self, event: M::Event) -> Result<(), MachineStopped> {
        self.events.send(event).map_err(|_| MachineStopped)
    }

    /// Emissions produced after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<M::Emission> {
        self.emissions.subscribe()
    }

    pub fn snapshot(&self) -> M::Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<M::Snapshot> {
        self.snapshot.clone()
    }

    /// Resolves with the first snapshot matching `predicate`, current one included.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<M::Snapshot, MachineStopped>
    where
        F: FnMut(&M::Snapshot) -> bool,
    {
        let mut receiver = self.snapshot.clone();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| MachineStopped)?;
        Ok(snapshot.clone())
    }
}

/// Starts the runtime task. `initial` is the operation of the initial state.
pub fn spawn_machine<M, R>(
    machine: M,
    initial: Option<M::Operation>,
    runner: Arc<R>,
    logger: Logger,
) -> MachineHandle<M>
where
    M: Machine,
    R: OperationRunner<M::Operation, M::Outcome>,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (emissions_tx, _) = broadcast::channel(EMISSION_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

    let handle = MachineHandle {
        events: events_tx,
        emissions: emissions_tx.clone(),
        snapshot: snapshot_rx,
    };

    tokio::spawn(run_machine(
        machine,
        initial,
        runner,
        events_rx,
        emissions_tx,
        snapshot_tx,
        logger,
    ));
    handle
}

async fn run_machine<M, R>(
    mut machine: M,
    initial: Option<M::Operation>,
    runner: Arc<R>,
    mut events: mpsc::UnboundedReceiver<M::Event>,
    emissions: broadcast::Sender<M::Emission>,
    snapshot: watch::Sender<M::Snapshot>,
    logger: Logger,
) where
    M: Machine,
    R: OperationRunner<M::Operation, M::Outcome>,
{
    let mut pending = initial.map(|operation| start(&runner, operation, &logger));

    loop {
        let input = tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    trace!(logger, "Received event"; "state" => machine.state_name(), "event" => ?event);
                    Input::Event(event)
                }
                None => break,
            },
            outcome = wait_pending(&mut pending) => {
                pending = None;
                match outcome {
                    Ok(outcome) => Input::Done(outcome),
                    Err(err) => {
                        warn!(logger, "Operation task failed: {}", err);
                        Input::Done(M::aborted(err.to_string()))
                    }
                }
            }
        };

        let from = machine.state_name();
        let step = machine.handle(input);
        if step.ignored {
            debug!(logger, "Input ignored"; "state" => from);
            continue;
        }
        debug!(logger, "Transition"; "from" => from, "to" => machine.state_name());

        if step.cancel_pending && pending.take().is_some() {
            debug!(logger, "Detached pending operation");
        }
        if let Some(operation) = step.operation {
            pending = Some(start(&runner, operation, &logger));
        }

        snapshot.send_replace(machine.snapshot());
        for emission in step.emissions {
            trace!(logger, "Emit"; "emission" => ?emission);
            // No subscribers is fine.
            let _ = emissions.send(emission);
        }
    }
    debug!(logger, "Machine stopped"; "state" => machine.state_name());
}

fn start<Op, Out, R>(runner: &Arc<R>, operation: Op, logger: &Logger) -> JoinHandle<Out>
where
    Op: Debug + Send + 'static,
    Out: Send + 'static,
    R: OperationRunner<Op, Out>,
{
    trace!(logger, "Starting operation"; "operation" => ?operation);
    let runner = runner.clone();
    tokio::spawn(async move { runner.run(operation).await })
}

async fn wait_pending<T>(
    pending: &mut Option<JoinHandle<T>>,
) -> Result<T, tokio::task::JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
