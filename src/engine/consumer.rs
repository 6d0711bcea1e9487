// Consumer - 並列ワーカー機能
// 作業チャンネルからタスクを取り出し、先行タスクの完了を待ってから実行する

use crate::core::{ExportError, TaskExecutor, TaskId, TaskOutcome, TaskReport, TaskSpec, TaskState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

/// 作業チャンネルを流れるタスク
#[derive(Debug)]
pub(crate) struct WorkItem {
    pub id: TaskId,
    pub spec: TaskSpec,
}

struct TaskSlot {
    state: watch::Sender<TaskState>,
    cancelled: bool,
}

/// タスクごとの状態と完了通知
///
/// ロックを保持したまま `.await` しないこと
#[derive(Default)]
pub(crate) struct TaskRegistry {
    slots: Mutex<HashMap<TaskId, TaskSlot>>,
}

impl TaskRegistry {
    fn slots(&self) -> MutexGuard<'_, HashMap<TaskId, TaskSlot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, id: TaskId) {
        let (state, _) = watch::channel(TaskState::Pending);
        self.slots().insert(
            id,
            TaskSlot {
                state,
                cancelled: false,
            },
        );
    }

    pub fn remove(&self, id: TaskId) {
        self.slots().remove(&id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.slots().get(&id).map(|slot| *slot.state.borrow())
    }

    pub fn subscribe(&self, id: TaskId) -> Option<watch::Receiver<TaskState>> {
        self.slots().get(&id).map(|slot| slot.state.subscribe())
    }

    /// 開始前のタスクだけをキャンセルできる。キャンセルした時点で完了扱い
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(&id) else {
            return false;
        };
        let pending = *slot.state.borrow() == TaskState::Pending;
        if pending {
            slot.cancelled = true;
            slot.state.send_replace(TaskState::Completed);
        }
        pending
    }

    /// Pending -> Running。キャンセル済みなら `false`
    pub fn begin(&self, id: TaskId) -> bool {
        let slots = self.slots();
        match slots.get(&id) {
            Some(slot) if !slot.cancelled => {
                slot.state.send_replace(TaskState::Running);
                true
            }
            _ => false,
        }
    }

    pub fn complete(&self, id: TaskId) {
        if let Some(slot) = self.slots().get(&id) {
            slot.state.send_replace(TaskState::Completed);
        }
    }
}

/// 先行タスクが完了するまで待つ。未登録なら待たない
async fn wait_for_predecessor(registry: &TaskRegistry, predecessor: TaskId) {
    let Some(mut state) = registry.subscribe(predecessor) else {
        return;
    };
    // 送信側はレジストリが保持しているので閉じない
    let _ = state
        .wait_for(|state| *state == TaskState::Completed)
        .await;
}

/// タスク本体を別タスクで実行し、パニックも失敗として扱う
async fn run_task<X>(executor: &Arc<X>, spec: &TaskSpec) -> TaskOutcome
where
    X: TaskExecutor + 'static,
{
    let executor = Arc::clone(executor);
    let spec = spec.clone();
    match tokio::spawn(async move { executor.execute(&spec).await }).await {
        Ok(outcome) => outcome,
        Err(e) => TaskOutcome::Failed {
            error: ExportError::from(e).to_string(),
        },
    }
}

/// 単一Consumerワーカー
pub(crate) fn spawn_single_consumer<X>(
    worker_id: usize,
    executor: Arc<X>,
    registry: Arc<TaskRegistry>,
    work_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<WorkItem>>>,
    result_tx: mpsc::UnboundedSender<TaskReport>,
) -> tokio::task::JoinHandle<()>
where
    X: TaskExecutor + 'static,
{
    tokio::spawn(async move {
        loop {
            // 次の作業を取得
            let WorkItem { id, spec } = {
                let mut rx = work_rx.lock().await;
                match rx.recv().await {
                    Some(item) => item,
                    None => break, // チャンネル終了
                }
            };

            if let Some(predecessor) = spec.depends_on {
                wait_for_predecessor(&registry, predecessor).await;
            }

            let started_at = Instant::now();
            let outcome = if registry.begin(id) {
                trace!(worker_id, task = %id, kind = spec.kind.label(), "タスク開始");
                run_task(&executor, &spec).await
            } else {
                TaskOutcome::Cancelled
            };
            let finished_at = Instant::now();
            registry.complete(id);

            debug!(
                worker_id,
                task = %id,
                kind = spec.kind.label(),
                image = %spec.kind.image_path().display(),
                success = outcome.is_success(),
                "タスク完了"
            );

            let report = TaskReport {
                id,
                spec,
                outcome,
                started_at,
                finished_at,
            };
            if result_tx.send(report).is_err() {
                // 結果チャンネルが閉じられた場合は終了
                break;
            }
        }
    })
}

/// Consumers: 並列ワーカープール
pub(crate) fn spawn_consumers<X>(
    executor: Arc<X>,
    registry: Arc<TaskRegistry>,
    work_rx: mpsc::Receiver<WorkItem>,
    result_tx: mpsc::UnboundedSender<TaskReport>,
    worker_count: usize,
) -> Vec<tokio::task::JoinHandle<()>>
where
    X: TaskExecutor + 'static,
{
    let work_rx = Arc::new(tokio::sync::Mutex::new(work_rx));

    (0..worker_count)
        .map(|worker_id| {
            spawn_single_consumer(
                worker_id,
                Arc::clone(&executor),
                Arc::clone(&registry),
                Arc::clone(&work_rx),
                result_tx.clone(),
            )
        })
        .collect()
}
