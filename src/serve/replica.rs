//! Replica sets: each deployment runs a fixed number of replica tasks that own
//! their component and drain a command queue one command at a time. A
//! `ReplicaSet` is the cloneable sending side of those queues.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::DeploymentConfig;
use crate::error::{Result, ServeError};

const QUEUE_CAPACITY: usize = 64;

/// Reply channel carried by every command
pub type Reply<T> = oneshot::Sender<Result<T>>;

/// A component instance hosted by a replica task
#[async_trait]
pub trait Replica: Send + 'static {
    type Command: Send + 'static;

    /// Process one command. The next command is not taken off the queue
    /// until this returns.
    async fn handle(&mut self, command: Self::Command);

    /// Called once after the replica stops taking commands
    async fn drain(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub request_timeout: Duration,
    pub reconfigure_timeout: Duration,
}

impl From<&DeploymentConfig> for CallOptions {
    fn from(config: &DeploymentConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            reconfigure_timeout: config.reconfigure_timeout(),
        }
    }
}

pub struct ReplicaSet<C> {
    deployment: &'static str,
    senders: Arc<Vec<mpsc::Sender<C>>>,
    next: Arc<AtomicUsize>,
    options: CallOptions,
}

impl<C> Clone for ReplicaSet<C> {
    fn clone(&self) -> Self {
        Self {
            deployment: self.deployment,
            senders: self.senders.clone(),
            next: self.next.clone(),
            options: self.options,
        }
    }
}

impl<C: Send + 'static> ReplicaSet<C> {
    /// Spawn one task per replica onto `tasks`. Every task stops once
    /// `shutdown` flips to `true` or all senders are dropped.
    pub fn start<R>(
        deployment: &'static str,
        replicas: Vec<R>,
        options: CallOptions,
        shutdown: watch::Receiver<bool>,
        tasks: &mut JoinSet<()>,
    ) -> Self
    where
        R: Replica<Command = C>,
    {
        let mut senders = Vec::with_capacity(replicas.len());
        for (index, replica) in replicas.into_iter().enumerate() {
            let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
            senders.push(tx);
            tasks.spawn(run_replica(deployment, index, replica, rx, shutdown.clone()));
        }
        info!("Started {} replica(s) of {}", senders.len(), deployment);

        Self {
            deployment,
            senders: Arc::new(senders),
            next: Arc::new(AtomicUsize::new(0)),
            options,
        }
    }

    pub fn num_replicas(&self) -> usize {
        self.senders.len()
    }

    pub fn request_timeout(&self) -> Duration {
        self.options.request_timeout
    }

    /// Send a command to the next replica (round-robin) and wait for its
    /// reply, bounded by the request timeout.
    pub async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> C) -> Result<T> {
        self.call_with_timeout(self.options.request_timeout, make).await
    }

    /// Like `call`, with an explicit bound in place of the request timeout
    pub async fn call_with_timeout<T>(
        &self,
        timeout: Duration,
        make: impl FnOnce(Reply<T>) -> C,
    ) -> Result<T> {
        if self.senders.is_empty() {
            return Err(ServeError::DeploymentUnavailable(self.deployment));
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        let (tx, rx) = oneshot::channel();
        dispatch(
            self.deployment,
            &self.senders[index],
            make(tx),
            rx,
            timeout,
        )
        .await
    }

    /// Send a command to every replica and wait for all replies, bounded by
    /// the reconfigure timeout. The first error wins.
    pub async fn broadcast<T>(&self, make: impl Fn(Reply<T>) -> C) -> Result<Vec<T>> {
        if self.senders.is_empty() {
            return Err(ServeError::DeploymentUnavailable(self.deployment));
        }
        let calls = self.senders.iter().map(|sender| {
            let (tx, rx) = oneshot::channel();
            dispatch(
                self.deployment,
                sender,
                make(tx),
                rx,
                self.options.reconfigure_timeout,
            )
        });
        futures::future::join_all(calls).await.into_iter().collect()
    }
}

async fn dispatch<C, T>(
    deployment: &'static str,
    sender: &mpsc::Sender<C>,
    command: C,
    reply: oneshot::Receiver<Result<T>>,
    timeout: Duration,
) -> Result<T> {
    let exchange = async {
        sender
            .send(command)
            .await
            .map_err(|_| ServeError::DeploymentUnavailable(deployment))?;
        reply
            .await
            .map_err(|_| ServeError::DeploymentUnavailable(deployment))?
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| ServeError::Timeout {
            deployment,
            timeout_ms: timeout.as_millis(),
        })?
}

async fn run_replica<R: Replica>(
    deployment: &'static str,
    index: usize,
    mut replica: R,
    mut commands: mpsc::Receiver<R::Command>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("{} replica {} accepting requests", deployment, index);
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => replica.handle(command).await,
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    replica.drain().await;
    debug!("{} replica {} stopped", deployment, index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    enum CounterCommand {
        Whoami(Reply<usize>),
        Sleep(Duration, Reply<()>),
        Fail(Reply<()>),
    }

    struct Counter {
        id: usize,
    }

    #[async_trait]
    impl Replica for Counter {
        type Command = CounterCommand;

        async fn handle(&mut self, command: CounterCommand) {
            match command {
                CounterCommand::Whoami(reply) => {
                    let _ = reply.send(Ok(self.id));
                }
                CounterCommand::Sleep(duration, reply) => {
                    tokio::time::sleep(duration).await;
                    let _ = reply.send(Ok(()));
                }
                CounterCommand::Fail(reply) => {
                    let _ = reply.send(Err(ServeError::Inference("boom".to_string())));
                }
            }
        }
    }

    fn options(request_ms: u64) -> CallOptions {
        CallOptions {
            request_timeout: Duration::from_millis(request_ms),
            reconfigure_timeout: Duration::from_secs(5),
        }
    }

    fn start(count: usize, request_ms: u64) -> (ReplicaSet<CounterCommand>, watch::Sender<bool>, JoinSet<()>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();
        let replicas: Vec<Counter> = (0..count).map(|id| Counter { id }).collect();
        let set = ReplicaSet::start("counter", replicas, options(request_ms), shutdown_rx, &mut tasks);
        (set, shutdown_tx, tasks)
    }

    #[tokio::test]
    async fn calls_are_spread_round_robin() {
        let (set, _shutdown, _tasks) = start(3, 1_000);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(set.call(CounterCommand::Whoami).await.unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2]);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_replica() {
        let (set, _shutdown, _tasks) = start(4, 1_000);
        let mut ids = set.broadcast(CounterCommand::Whoami).await.unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn slow_replica_times_out() {
        let (set, _shutdown, _tasks) = start(1, 20);
        let err = set
            .call(|reply| CounterCommand::Sleep(Duration::from_secs(5), reply))
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::Timeout { deployment: "counter", timeout_ms: 20 }));
    }

    #[tokio::test]
    async fn explicit_timeout_overrides_request_timeout() {
        let (set, _shutdown, _tasks) = start(1, 20);
        set.call_with_timeout(Duration::from_secs(2), |reply| {
            CounterCommand::Sleep(Duration::from_millis(100), reply)
        })
        .await
        .unwrap();
        assert_eq!(set.request_timeout(), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn replica_errors_are_returned_to_caller() {
        let (set, _shutdown, _tasks) = start(1, 1_000);
        let err = set.call(CounterCommand::Fail).await.unwrap_err();
        assert_eq!(err.to_string(), "inference failed: boom");
    }

    #[tokio::test]
    async fn stopped_replicas_are_unavailable() {
        let (set, shutdown, mut tasks) = start(2, 1_000);
        shutdown.send(true).unwrap();
        while tasks.join_next().await.is_some() {}

        let err = set.call(CounterCommand::Whoami).await.unwrap_err();
        assert!(matches!(err, ServeError::DeploymentUnavailable("counter")));
    }

    #[tokio::test]
    async fn empty_set_is_unavailable() {
        let (set, _shutdown, _tasks) = start(0, 1_000);
        assert_eq!(set.num_replicas(), 0);
        assert!(matches!(
            set.call(CounterCommand::Whoami).await,
            Err(ServeError::DeploymentUnavailable("counter"))
        ));
    }
}
