//! 并行求值：数据源被切分为编号批次，固定数量的工作任务从共享的数据源中争抢批次，
//! 每个任务持有自己的累加结果，最后按批次编号合并。

use crate::pipe::PipeIter;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// 默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// 并行配置
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct ParConfig {
    /// 工作任务数，未指定时取rayon全局线程池的线程数。
    workers: Option<usize>,
    /// 每个批次的元素数量，未指定时取[`DEFAULT_BATCH_SIZE`]。
    batch_size: Option<usize>,
}

impl ParConfig {
    pub fn new() -> ParConfig {
        ParConfig::default()
    }

    /// 设置工作任务数，至少为1。
    pub fn workers(mut self, workers: usize) -> ParConfig {
        self.workers = Some(workers.max(1));
        self
    }

    /// 设置批次大小，至少为1。
    pub fn batch_size(mut self, batch_size: usize) -> ParConfig {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(rayon::current_num_threads).max(1)
    }

    pub fn batch_len(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }
}

/// 带编号的批次，编号按遇见顺序从0递增。
pub(crate) type Batch<T> = (usize, PipeIter<T>);

type NextBatch<T> = dyn Fn() -> Option<Batch<T>> + Send + Sync;

struct SharedSource<T> {
    source: PipeIter<T>,
    next_no: usize,
    exhausted: bool,
}

/// 批次分发器。
///
/// 内部是一个“取下一批次”的函数：最底层从加锁的数据源中按顺序取出一批元素，
/// 每个无状态阶段在其外再包装一层，对取出的批次惰性地套上该阶段。
pub(crate) struct Splitter<T> {
    next: Arc<NextBatch<T>>,
    config: ParConfig,
}

impl<T: Send + 'static> Splitter<T> {
    pub(crate) fn new(source: PipeIter<T>, config: ParConfig) -> Splitter<T> {
        let batch_size = config.batch_len();
        let shared = Mutex::new(SharedSource { source, next_no: 0, exhausted: false });
        let next = move || {
            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.exhausted {
                return None;
            }
            let batch = guard.source.by_ref().take(batch_size).collect::<Vec<_>>();
            if batch.len() < batch_size {
                guard.exhausted = true;
            }
            if batch.is_empty() {
                None
            } else {
                let no = guard.next_no;
                guard.next_no += 1;
                Some((no, Box::new(batch.into_iter()) as PipeIter<T>))
            }
        };
        Splitter { next: Arc::new(next), config }
    }

    /// 先分发`head`的全部批次，再分发`tail`的批次，编号连续递增。
    pub(crate) fn chain(head: Splitter<T>, tail: Splitter<T>, config: ParConfig) -> Splitter<T> {
        // (head是否已取尽, 下一个编号)
        let state = Mutex::new((false, 0usize));
        let next = move || {
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            let (head_done, next_no) = &mut *guard;
            let mut batch = None;
            if !*head_done {
                batch = head.claim();
                *head_done = batch.is_none();
            }
            let (_, batch) = batch.or_else(|| tail.claim())?;
            let no = *next_no;
            *next_no += 1;
            Some((no, batch))
        };
        Splitter { next: Arc::new(next), config }
    }

    /// 对之后取出的每个批次套上一个阶段。
    pub(crate) fn map_batches<U, F>(self, f: F) -> Splitter<U>
    where
        U: Send + 'static,
        F: Fn(PipeIter<T>) -> PipeIter<U> + Send + Sync + 'static,
    {
        let prev = self.next;
        let next = move || (*prev)().map(|(no, batch)| (no, f(batch)));
        Splitter { next: Arc::new(next), config: self.config }
    }

    /// 按遇见顺序领取下一个批次。批次内的阶段是惰性的，领取时只从数据源取出元素。
    pub(crate) fn claim(&self) -> Option<Batch<T>> {
        (*self.next)()
    }

    /// 并行求值全部批次并收集，`ordered`时按遇见顺序。
    pub(crate) fn gather(&self, op: &'static str, ordered: bool) -> Vec<T> {
        self.run(op, ordered, &Halt::never(), |_, batch| batch.collect::<Vec<_>>())
            .into_iter()
            .flat_map(|(_, part)| part)
            .collect()
    }

    /// 启动工作任务，每个任务循环领取批次并对其执行`work`，返回带批次编号的部分结果。
    ///
    /// `ordered`时结果按批次编号排序，否则为完成顺序。
    /// 一旦`halt`不再接受某个编号，领取到该编号批次的任务即停止，由于编号单调递增，
    /// 之后的批次也都不再需要。
    pub(crate) fn run<R, W>(&self, op: &'static str, ordered: bool, halt: &Halt, work: W) -> Vec<(usize, R)>
    where
        R: Send,
        W: Fn(usize, PipeIter<T>) -> R + Send + Sync,
    {
        let workers = self.config.worker_count();
        let per_worker = (0..workers)
            .into_par_iter()
            .map(|worker| {
                let mut partials = Vec::new();
                while !halt.stopped() {
                    let Some((no, batch)) = self.claim() else { break };
                    if !halt.admits(no) {
                        break;
                    }
                    trace!(op, worker, batch = no, "evaluating batch");
                    partials.push((no, work(no, batch)));
                }
                partials
            })
            .collect::<Vec<_>>();
        let mut partials = per_worker.into_iter().flatten().collect::<Vec<_>>();
        if ordered {
            partials.sort_unstable_by_key(|(no, _)| *no);
        }
        debug!(op, workers, batches = partials.len(), "parallel evaluation finished");
        partials
    }
}

/// 可切分的游标，按遇见顺序遍历剩余元素。
///
/// [`SplitCursor::try_split`]把紧接着的一段元素切分为新的游标，当前游标只保留其后的元素，
/// 切分出的游标可以交给其他线程处理。
///
/// ```
/// use lazypipe::Pipe;
///
/// let mut rest = Pipe::of(vec![1, 2, 3, 4]).spliterator().unwrap();
/// let prefix = rest.try_split().unwrap();
/// let mut all = prefix.collect::<Vec<_>>();
/// rest.for_each_remaining(|n| all.push(n));
/// assert_eq!(all, vec![1, 2, 3, 4]);
/// ```
pub struct SplitCursor<T> {
    /// 已领取但尚未遍历完的元素
    head: Option<PipeIter<T>>,
    /// 尚未领取的批次，`None`表示已全部领取
    rest: Option<Splitter<T>>,
}

impl<T: Send + 'static> SplitCursor<T> {
    pub(crate) fn new(split: Splitter<T>) -> SplitCursor<T> {
        SplitCursor { head: None, rest: Some(split) }
    }

    /// 切分出当前位置之后的下一个批次（连同当前批次未遍历的元素），没有剩余批次时返回`None`。
    pub fn try_split(&mut self) -> Option<SplitCursor<T>> {
        let batch = self.claim()?;
        let prefix: PipeIter<T> = match self.head.take() {
            Some(head) => Box::new(head.chain(batch)),
            None => batch,
        };
        Some(SplitCursor { head: Some(prefix), rest: None })
    }

    /// 对下一个元素执行`action`，没有剩余元素时返回`false`。
    pub fn try_advance(&mut self, action: impl FnOnce(T)) -> bool {
        match self.next() {
            Some(item) => {
                action(item);
                true
            }
            None => false,
        }
    }

    pub fn for_each_remaining(&mut self, action: impl FnMut(T)) {
        self.by_ref().for_each(action);
    }

    fn claim(&mut self) -> Option<PipeIter<T>> {
        let claimed = self.rest.as_ref()?.claim();
        if claimed.is_none() {
            self.rest = None;
        }
        claimed.map(|(_, batch)| batch)
    }
}

impl<T: Send + 'static> Iterator for SplitCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.head.as_mut().and_then(|head| head.next()) {
                return Some(item);
            }
            self.head = Some(self.claim()?);
        }
    }
}

/// 短路信号：记录之后仍然需要的批次编号上界（不含）。
pub(crate) struct Halt {
    bound: AtomicUsize,
}

impl Halt {
    pub(crate) fn never() -> Halt {
        Halt { bound: AtomicUsize::new(usize::MAX) }
    }

    /// 只需要编号小于`no`的批次。
    pub(crate) fn before(&self, no: usize) {
        self.bound.fetch_min(no, Ordering::AcqRel);
    }

    /// 不再需要任何批次。
    pub(crate) fn now(&self) {
        self.before(0);
    }

    fn admits(&self, no: usize) -> bool {
        no < self.bound.load(Ordering::Acquire)
    }

    fn stopped(&self) -> bool {
        self.bound.load(Ordering::Acquire) == 0
    }
}
