use crate::PipeRes;
use crate::err::PipeErr;
use crate::par::{ParConfig, Splitter};
use std::mem;
use tracing::debug;

/// 拉取式迭代链，每个阶段独占其上游。
pub type PipeIter<T> = Box<dyn Iterator<Item = T> + Send>;

type CloseHook = Box<dyn FnOnce() + Send>;

/// 终止操作开始时确定的求值方式
pub(crate) enum Flow<T> {
    /// 顺序：单条拉取链，严格按照遇见顺序。
    Seq(PipeIter<T>),
    /// 并行：数据源被切分为编号批次，由多个工作线程各自拉取。
    Par(Splitter<T>),
}

/// 尚未求值的阶段链。
///
/// 链接时只记录阶段，直到终止操作开始才决定以何种方式求值，
/// 因此`parallel`和`sequential`作用于整条流水线，与调用位置无关。
pub(crate) trait Stage<T>: Send {
    /// 构建逐个元素拉取的迭代链。
    ///
    /// `par`不为空时屏障阶段会立即并行求值其上游，其余阶段仍在拉取线程上按遇见顺序执行。
    fn pull(self: Box<Self>, par: Option<ParConfig>) -> PipeIter<T>;

    /// 构建批次分发器，两个有状态阶段之间的无状态阶段在工作任务上逐批执行。
    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T>;
}

/// 数据源
pub(crate) struct Source<T>(pub(crate) PipeIter<T>);

impl<T: Send + 'static> Stage<T> for Source<T> {
    fn pull(self: Box<Self>, _par: Option<ParConfig>) -> PipeIter<T> {
        self.0
    }

    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T> {
        Splitter::new(self.0, config)
    }
}

struct Stateless<S, F> {
    upstream: Box<dyn Stage<S>>,
    f: F,
}

impl<S, T, F> Stage<T> for Stateless<S, F>
where
    S: Send + 'static,
    T: Send + 'static,
    F: Fn(PipeIter<S>) -> PipeIter<T> + Send + Sync + 'static,
{
    fn pull(self: Box<Self>, par: Option<ParConfig>) -> PipeIter<T> {
        let Stateless { upstream, f } = *self;
        f(upstream.pull(par))
    }

    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T> {
        let Stateless { upstream, f } = *self;
        upstream.split(config).map_batches(f)
    }
}

/// 有状态阶段，并行时在拉取线程上按遇见顺序逐个拉取上游，再重新切分。
struct Stateful<S, F> {
    upstream: Box<dyn Stage<S>>,
    f: F,
}

impl<S, T, F> Stage<T> for Stateful<S, F>
where
    S: Send + 'static,
    T: Send + 'static,
    F: FnOnce(PipeIter<S>) -> PipeIter<T> + Send + 'static,
{
    fn pull(self: Box<Self>, par: Option<ParConfig>) -> PipeIter<T> {
        let Stateful { upstream, f } = *self;
        f(upstream.pull(par))
    }

    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T> {
        Splitter::new(Stage::<T>::pull(self, Some(config)), config)
    }
}

/// 屏障阶段，并行时先并行求值全部上游，再重新切分。
///
/// 上游在构建下游分发器之前就已求值完毕，工作任务不会在持有下游锁时嵌套执行并行任务。
struct Barrier<S, F> {
    upstream: Box<dyn Stage<S>>,
    f: F,
    ordered: bool,
}

impl<S, T, F> Stage<T> for Barrier<S, F>
where
    S: Send + 'static,
    T: Send + 'static,
    F: FnOnce(PipeIter<S>) -> PipeIter<T> + Send + 'static,
{
    fn pull(self: Box<Self>, par: Option<ParConfig>) -> PipeIter<T> {
        let Barrier { upstream, f, ordered } = *self;
        match par {
            None => f(upstream.pull(None)),
            Some(config) => {
                let gathered = upstream.split(config).gather("barrier", ordered);
                f(Box::new(gathered.into_iter()))
            }
        }
    }

    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T> {
        Splitter::new(Stage::<T>::pull(self, Some(config)), config)
    }
}

/// 惰性流水线：数据源加上有序的阶段链，只有终止操作拉取时才会求值。
///
/// 流水线只能使用一次：首个终止操作取走内部的阶段链，此后任何终止操作都返回
/// [`PipeErr::AlreadyConsumed`]。中间操作按值消耗当前流水线并返回新的流水线，
/// 因此原流水线无法再次被链接。
///
/// 通过 [`Pipe::on_close`] 注册的关闭钩子在 [`Pipe::close`] 或析构时按注册顺序执行且仅执行一次。
pub struct Pipe<T> {
    /// `None`表示已被消耗。
    pub(crate) stages: Option<Box<dyn Stage<T>>>,
    /// 并行配置，`None`表示顺序求值。
    pub(crate) par: Option<ParConfig>,
    pub(crate) ordered: bool,
    pub(crate) close_hooks: Vec<CloseHook>,
}

impl<T: Send + 'static> Pipe<T> {
    pub(crate) fn from_iter_box(iter: PipeIter<T>) -> Pipe<T> {
        Pipe { stages: Some(Box::new(Source(iter))), par: None, ordered: true, close_hooks: Vec::new() }
    }

    /// 在阶段链末尾追加一个阶段，保留求值方式、顺序提示和关闭钩子。
    fn then<U: Send + 'static>(mut self, f: impl FnOnce(Box<dyn Stage<T>>) -> Box<dyn Stage<U>>) -> Pipe<U> {
        Pipe {
            stages: self.stages.take().map(f),
            par: self.par,
            ordered: self.ordered,
            close_hooks: mem::take(&mut self.close_hooks),
        }
    }

    /// 无状态阶段：顺序时作用于整条拉取链，并行时分别作用于每个批次。
    pub(crate) fn stateless<U, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        F: Fn(PipeIter<T>) -> PipeIter<U> + Send + Sync + 'static,
    {
        self.then(|upstream| -> Box<dyn Stage<U>> { Box::new(Stateless { upstream, f }) })
    }

    /// 有状态阶段：并行时先按遇见顺序在拉取线程上逐个拉取上游，再重新切分。
    /// 上游不会被提前求值，因此对无限数据源依然是惰性的。
    pub(crate) fn stateful<U, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        F: FnOnce(PipeIter<T>) -> PipeIter<U> + Send + 'static,
    {
        self.then(|upstream| -> Box<dyn Stage<U>> { Box::new(Stateful { upstream, f }) })
    }

    /// 屏障阶段：并行时终止操作开始时就会并行地求值全部上游，然后再重新切分。
    pub(crate) fn barrier<U, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        F: FnOnce(PipeIter<T>) -> PipeIter<U> + Send + 'static,
    {
        let ordered = self.ordered;
        self.then(move |upstream| -> Box<dyn Stage<U>> { Box::new(Barrier { upstream, f, ordered }) })
    }

    /// 取走阶段链并将流水线标记为已消耗。
    pub(crate) fn take_stages(&mut self, op: &'static str) -> PipeRes<Box<dyn Stage<T>>> {
        match self.stages.take() {
            Some(stages) => {
                debug!(op, parallel = self.par.is_some(), ordered = self.ordered, "evaluating pipe");
                Ok(stages)
            }
            None => {
                debug!(op, "pipe already consumed");
                Err(PipeErr::AlreadyConsumed)
            }
        }
    }

    /// 取走阶段链，按当前求值方式构建拉取链或批次分发器。
    pub(crate) fn take_flow(&mut self, op: &'static str) -> PipeRes<Flow<T>> {
        let stages = self.take_stages(op)?;
        Ok(match self.par {
            Some(config) => Flow::Par(stages.split(config)),
            None => Flow::Seq(stages.pull(None)),
        })
    }

    /// 切换为并行求值，使用默认的并行配置。
    pub fn parallel(self) -> Pipe<T> {
        self.parallel_with(ParConfig::default())
    }

    /// 切换为并行求值。
    ///
    /// 求值方式作用于整条流水线，之前链接的阶段同样在工作任务上逐批执行。
    /// 多次调用时以最后一次的配置为准。
    pub fn parallel_with(mut self, config: ParConfig) -> Pipe<T> {
        self.par = Some(config);
        self
    }

    /// 切换回顺序求值，整条流水线都退化为逐个元素拉取。
    pub fn sequential(mut self) -> Pipe<T> {
        self.par = None;
        self
    }

    /// 提示不关心遇见顺序，并行终止操作可以跳过按批次重新排序的步骤。
    pub fn unordered(mut self) -> Pipe<T> {
        self.ordered = false;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.par.is_some()
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn is_consumed(&self) -> bool {
        self.stages.is_none()
    }

    /// 注册关闭钩子。
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Pipe<T> {
        self.close_hooks.push(Box::new(hook));
        self
    }

    /// 关闭流水线，执行全部关闭钩子。
    pub fn close(mut self) {
        self.stages = None;
        self.run_close_hooks();
    }
}

impl<T> Pipe<T> {
    fn run_close_hooks(&mut self) {
        if !self.close_hooks.is_empty() {
            debug!(hooks = self.close_hooks.len(), "closing pipe");
            for hook in self.close_hooks.drain(..) {
                hook();
            }
        }
    }
}

impl<T> Drop for Pipe<T> {
    fn drop(&mut self) {
        self.run_close_hooks();
    }
}
