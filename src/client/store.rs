use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use crate::models::Shift;

pub type ShiftSnapshot = Arc<Vec<Shift>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("shift list store has shut down")]
pub struct StoreClosed;

/// Mutations applied by the store task, one at a time, in arrival order.
#[derive(Debug)]
pub enum StoreCommand {
    /// Wholesale replacement from a listener push.
    Replace {
        shifts: Vec<Shift>,
        done: oneshot::Sender<()>,
    },
    /// Replies with the removed shift and the index it occupied.
    Remove {
        id: Uuid,
        done: oneshot::Sender<Option<(usize, Shift)>>,
    },
    /// Puts a shift back at `index`, clamped to the list length. A shift whose
    /// id is already present is left alone.
    Restore {
        index: usize,
        shift: Shift,
        done: oneshot::Sender<()>,
    },
    Upsert {
        shift: Shift,
        done: oneshot::Sender<()>,
    },
}

/// Handle to a list of shifts owned by a single task.
///
/// Readers get immutable snapshots; every change goes through a command, so
/// a listener push and an optimistic rollback never interleave mid-update.
#[derive(Clone)]
pub struct ShiftListStore {
    commands: mpsc::Sender<StoreCommand>,
    snapshots: watch::Receiver<ShiftSnapshot>,
}

impl ShiftListStore {
    /// Spawns the owning task on the current tokio runtime. The task exits
    /// once every handle is dropped.
    pub fn spawn() -> Self {
        Self::spawn_with(Vec::new())
    }

    pub fn spawn_with(initial: Vec<Shift>) -> Self {
        let (commands, mut inbox) = mpsc::channel::<StoreCommand>(64);
        let (publisher, snapshots) = watch::channel::<ShiftSnapshot>(Arc::new(initial));

        tokio::spawn(async move {
            while let Some(command) = inbox.recv().await {
                apply(&publisher, command);
            }
            tracing::debug!("Shift list store stopped");
        });

        Self { commands, snapshots }
    }

    pub fn snapshot(&self) -> ShiftSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified after every applied change.
    pub fn subscribe(&self) -> watch::Receiver<ShiftSnapshot> {
        self.snapshots.clone()
    }

    pub async fn replace(&self, shifts: Vec<Shift>) -> Result<(), StoreClosed> {
        let (done, reply) = oneshot::channel();
        self.send(StoreCommand::Replace { shifts, done }).await?;
        reply.await.map_err(|_| StoreClosed)
    }

    pub async fn remove(&self, id: Uuid) -> Result<Option<(usize, Shift)>, StoreClosed> {
        let (done, reply) = oneshot::channel();
        self.send(StoreCommand::Remove { id, done }).await?;
        reply.await.map_err(|_| StoreClosed)
    }

    pub async fn restore(&self, index: usize, shift: Shift) -> Result<(), StoreClosed> {
        let (done, reply) = oneshot::channel();
        self.send(StoreCommand::Restore { index, shift, done }).await?;
        reply.await.map_err(|_| StoreClosed)
    }

    pub async fn upsert(&self, shift: Shift) -> Result<(), StoreClosed> {
        let (done, reply) = oneshot::channel();
        self.send(StoreCommand::Upsert { shift, done }).await?;
        reply.await.map_err(|_| StoreClosed)
    }

    async fn send(&self, command: StoreCommand) -> Result<(), StoreClosed> {
        self.commands.send(command).await.map_err(|_| StoreClosed)
    }
}

fn apply(publisher: &watch::Sender<ShiftSnapshot>, command: StoreCommand) {
    let current = publisher.borrow().clone();

    match command {
        StoreCommand::Replace { shifts, done } => {
            publisher.send_replace(Arc::new(shifts));
            let _ = done.send(());
        }
        StoreCommand::Remove { id, done } => {
            let position = current.iter().position(|s| s.id == Some(id));
            let removed = position.map(|index| {
                let mut next = current.as_ref().clone();
                let shift = next.remove(index);
                publisher.send_replace(Arc::new(next));
                (index, shift)
            });
            let _ = done.send(removed);
        }
        StoreCommand::Restore { index, shift, done } => {
            let present = shift.id.is_some() && current.iter().any(|s| s.id == shift.id);
            if !present {
                let mut next = current.as_ref().clone();
                next.insert(index.min(next.len()), shift);
                publisher.send_replace(Arc::new(next));
            }
            let _ = done.send(());
        }
        StoreCommand::Upsert { shift, done } => {
            let mut next = current.as_ref().clone();
            match next.iter_mut().find(|s| s.id.is_some() && s.id == shift.id) {
                Some(existing) => *existing = shift,
                None => next.push(shift),
            }
            publisher.send_replace(Arc::new(next));
            let _ = done.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle;
    use chrono::{TimeZone, Utc};

    fn shift(hour: u32) -> Shift {
        let now = Utc.with_ymd_and_hms(2030, 3, 1, hour, 0, 0).unwrap();
        lifecycle::publish(lifecycle::new_draft("U1", now), Uuid::new_v4(), "U1", now)
    }

    fn ids(snapshot: &ShiftSnapshot) -> Vec<Option<Uuid>> {
        snapshot.iter().map(|s| s.id).collect()
    }

    #[tokio::test]
    async fn test_remove_then_restore_keeps_position() {
        let list = vec![shift(1), shift(2), shift(3)];
        let before = ids(&Arc::new(list.clone()));
        let store = ShiftListStore::spawn_with(list);

        let middle = before[1].unwrap();
        let (index, removed) = store.remove(middle).await.unwrap().unwrap();
        assert_eq!(index, 1);
        assert_eq!(store.snapshot().len(), 2);

        store.restore(index, removed).await.unwrap();
        assert_eq!(ids(&store.snapshot()), before);
    }

    #[tokio::test]
    async fn test_restore_skips_shift_already_pushed_back() {
        let list = vec![shift(1), shift(2)];
        let store = ShiftListStore::spawn_with(list.clone());

        let (index, removed) = store.remove(list[0].id.unwrap()).await.unwrap().unwrap();
        // A listener push re-delivers the full set before the rollback lands.
        store.replace(list.clone()).await.unwrap();
        store.restore(index, removed).await.unwrap();

        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let list = vec![shift(1), shift(2)];
        let store = ShiftListStore::spawn_with(list.clone());

        let mut edited = list[1].clone();
        edited.location = "Gate 9".to_string();
        store.upsert(edited).await.unwrap();
        store.upsert(shift(5)).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[1].location, "Gate 9");
    }

    #[tokio::test]
    async fn test_unknown_remove_is_none() {
        let store = ShiftListStore::spawn();
        assert!(store.remove(Uuid::new_v4()).await.unwrap().is_none());
    }
}
