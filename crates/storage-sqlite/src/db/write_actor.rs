use super::DbPool;
use crate::config::DEFAULT_OP_TIMEOUT;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use goalledger_core::errors::{DatabaseError, Error, Result};
use log::error;
use std::any::Any;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// A write job runs against the actor's connection and answers with a core
// Result, which is what repository callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
    op_timeout: Duration,
}

impl WriteHandle {
    /// Bounds how long `exec` waits for a job, queueing time included.
    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Executes a database job on the writer actor's dedicated connection,
    /// inside an immediate transaction.
    ///
    /// Returns `DatabaseError::Timeout` when no answer arrives within the
    /// operation timeout. The job may still run afterwards; callers treat a
    /// timed-out write as having an unknown outcome.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        let erased: ErasedJob =
            Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>));

        let round_trip = async {
            if self.tx.send((erased, ret_tx)).await.is_err() {
                return Err(Error::from(DatabaseError::ConnectionFailed(
                    "writer actor has stopped".to_string(),
                )));
            }
            match ret_rx.await {
                Ok(reply) => reply,
                Err(_) => Err(Error::from(DatabaseError::Internal(
                    "writer actor dropped the reply".to_string(),
                ))),
            }
        };

        let boxed = tokio::time::timeout(self.op_timeout, round_trip)
            .await
            .map_err(|_| {
                DatabaseError::Timeout(format!(
                    "write did not complete within {} ms",
                    self.op_timeout.as_millis()
                ))
            })??;

        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("writer actor returned an unexpected type".to_string()))
    }
}

/// Spawns a background Tokio task that acts as a single writer to the database.
/// This actor owns one database connection from the pool and processes write
/// jobs serially, each in its own immediate transaction.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a connection: {}", e);
                // Fail every queued and future job instead of leaving callers waiting.
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(DatabaseError::ConnectionFailed(e.to_string()).into()));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The requester may have timed out and gone away.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle {
        tx,
        op_timeout: DEFAULT_OP_TIMEOUT,
    }
}
