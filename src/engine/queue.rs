// TaskQueue - 依存関係付きタスクキュー
// 固定数のワーカーがFIFOでタスクを取り出す

use super::consumer::{spawn_consumers, TaskRegistry, WorkItem};
use crate::core::{
    ExportConfig, ExportError, ExportResult, TaskExecutor, TaskId, TaskReport, TaskSpec,
    TaskState,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// 有界の作業チャンネルとワーカープールからなるタスクキュー
///
/// 先行タスクは必ず先に投入されている必要がある。FIFOで取り出されるため、
/// 先行タスクを待つワーカーが先行タスク自身の実行を妨げることはない。
/// 状態はドレインされるまでレジストリに残り、ドレイン後は完了として扱う。
pub struct TaskQueue {
    work_tx: Option<mpsc::Sender<WorkItem>>,
    result_rx: mpsc::UnboundedReceiver<TaskReport>,
    registry: Arc<TaskRegistry>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    next_id: u64,
    outstanding: usize,
}

impl TaskQueue {
    /// ワーカーを起動してキューを作成
    ///
    /// tokio ランタイム内で呼び出すこと
    pub fn new<X, C>(executor: Arc<X>, config: &C) -> ExportResult<Self>
    where
        X: TaskExecutor + 'static,
        C: ExportConfig + ?Sized,
    {
        let worker_count = config.max_concurrent_tasks();
        if worker_count == 0 {
            return Err(ExportError::configuration(
                "並列タスク数は1以上である必要があります",
            ));
        }
        let buffer_size = config.channel_buffer_size();
        if buffer_size == 0 {
            return Err(ExportError::configuration(
                "バッファサイズは1以上である必要があります",
            ));
        }

        let (work_tx, work_rx) = mpsc::channel(buffer_size);
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(TaskRegistry::default());

        let workers = spawn_consumers(
            executor,
            Arc::clone(&registry),
            work_rx,
            result_tx,
            worker_count,
        );
        debug!(worker_count, buffer_size, "タスクキューを起動しました");

        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            registry,
            workers,
            next_id: 0,
            outstanding: 0,
        })
    }

    /// タスクを投入して識別子を返す
    ///
    /// 作業チャンネルが満杯の間は待機する
    pub async fn submit(&mut self, spec: TaskSpec) -> ExportResult<TaskId> {
        if let Some(predecessor) = spec.depends_on {
            // ドレイン済みのタスクはレジストリにないが完了している
            if predecessor.get() >= self.next_id {
                return Err(ExportError::UnknownDependency { id: predecessor });
            }
        }
        let work_tx = self.work_tx.as_ref().ok_or(ExportError::QueueClosed)?;

        let id = TaskId::new(self.next_id);
        self.registry.register(id);
        if work_tx.send(WorkItem { id, spec }).await.is_err() {
            self.registry.remove(id);
            return Err(ExportError::QueueClosed);
        }

        self.next_id += 1;
        self.outstanding += 1;
        Ok(id)
    }

    /// 開始前のタスクをキャンセルする。キャンセルできた場合 `true`
    pub fn cancel(&self, id: TaskId) -> bool {
        self.registry.cancel(id)
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.registry
            .state(id)
            .or_else(|| (id.get() < self.next_id).then_some(TaskState::Completed))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// これまでに投入した全タスクの完了を待ち、報告を識別子順に返す
    pub async fn drain(&mut self) -> Vec<TaskReport> {
        let mut reports = Vec::with_capacity(self.outstanding);
        while self.outstanding > 0 {
            match self.result_rx.recv().await {
                Some(report) => {
                    self.registry.remove(report.id);
                    reports.push(report);
                    self.outstanding -= 1;
                }
                None => break, // 全ワーカーが終了
            }
        }

        reports.sort_by_key(|report| report.id);
        reports
    }

    /// 作業チャンネルを閉じ、全ワーカーの終了を待つ
    pub async fn shutdown(mut self) -> ExportResult<()> {
        self.work_tx.take();
        for worker in self.workers.drain(..) {
            worker.await?;
        }
        Ok(())
    }
}
