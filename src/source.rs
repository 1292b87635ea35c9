use crate::par::{ParConfig, Splitter};
use crate::pipe::{Pipe, PipeIter, Stage};
use std::mem;
use tracing::debug;

/// 创建流水线的工厂方法，创建时不会拉取任何元素。
impl<T: Send + 'static> Pipe<T> {
    /// 以任意可迭代对象为数据源，例如`Vec`、数组、`HashMap::into_keys`等。
    pub fn of<I>(items: I) -> Pipe<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Pipe::from_iter_box(Box::new(items.into_iter()))
    }

    /// `None`时为空流水线，否则只有一个元素。
    pub fn of_nullable(value: Option<T>) -> Pipe<T> {
        Pipe::of(value)
    }

    pub fn empty() -> Pipe<T> {
        Pipe::from_iter_box(Box::new(std::iter::empty()))
    }

    /// 无限数据源，每次拉取调用一次`supplier`。
    pub fn generate<F>(supplier: F) -> Pipe<T>
    where
        F: FnMut() -> T + Send + 'static,
    {
        Pipe::from_iter_box(Box::new(std::iter::repeat_with(supplier)))
    }

    /// 无限数据源：`seed`, `f(seed)`, `f(f(seed))`, ...
    pub fn iterate<F>(seed: T, mut f: F) -> Pipe<T>
    where
        F: FnMut(&T) -> T + Send + 'static,
    {
        Pipe::from_iter_box(Box::new(std::iter::successors(Some(seed), move |prev| Some(f(prev)))))
    }

    /// 有限数据源：从`seed`开始不断应用`next`，直到`has_next`首次不满足。
    pub fn iterate_while<P, F>(seed: T, has_next: P, mut next: F) -> Pipe<T>
    where
        P: FnMut(&T) -> bool + Send + 'static,
        F: FnMut(&T) -> T + Send + 'static,
    {
        let iter = std::iter::successors(Some(seed), move |prev| Some(next(prev))).take_while(has_next);
        Pipe::from_iter_box(Box::new(iter))
    }

    /// 连接两个流水线，先拉取`first`的全部元素，再拉取`second`。
    ///
    /// 任意一个为并行时结果为并行，两者都保持顺序时结果才保持顺序，两者的关闭钩子都会保留。
    /// 任意一个已被消耗时，结果也是已消耗的。
    pub fn concat(mut first: Pipe<T>, mut second: Pipe<T>) -> Pipe<T> {
        let par = first.par.or(second.par);
        let ordered = first.ordered && second.ordered;
        let mut close_hooks = mem::take(&mut first.close_hooks);
        close_hooks.append(&mut second.close_hooks);
        let stages = match (first.stages.take(), second.stages.take()) {
            (Some(head), Some(tail)) => Some(Box::new(Concat { head, tail }) as Box<dyn Stage<T>>),
            _ => {
                debug!("concatenating consumed pipe");
                None
            }
        };
        Pipe { stages, par, ordered, close_hooks }
    }

    pub fn builder() -> PipeBuilder<T> {
        PipeBuilder { items: Vec::new() }
    }
}

/// 两段阶段链首尾相接，并行时两段各自的无状态阶段仍在工作任务上逐批执行。
struct Concat<T> {
    head: Box<dyn Stage<T>>,
    tail: Box<dyn Stage<T>>,
}

impl<T: Send + 'static> Stage<T> for Concat<T> {
    fn pull(self: Box<Self>, par: Option<ParConfig>) -> PipeIter<T> {
        let Concat { head, tail } = *self;
        Box::new(head.pull(par).chain(tail.pull(par)))
    }

    fn split(self: Box<Self>, config: ParConfig) -> Splitter<T> {
        let Concat { head, tail } = *self;
        Splitter::chain(head.split(config), tail.split(config), config)
    }
}

/// 先收集元素后构建流水线，`build`消耗构建器，因此构建后无法再添加元素。
#[derive(Debug)]
pub struct PipeBuilder<T> {
    items: Vec<T>,
}

impl<T: Send + 'static> PipeBuilder<T> {
    pub fn add(mut self, item: T) -> PipeBuilder<T> {
        self.items.push(item);
        self
    }

    pub fn accept(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn build(self) -> Pipe<T> {
        Pipe::of(self.items)
    }
}

/// 转换为流水线。
pub trait IntoPipe<T> {
    fn into_pipe(self) -> Pipe<T>;
}

impl<T, I> IntoPipe<T> for I
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    fn into_pipe(self) -> Pipe<T> {
        Pipe::of(self)
    }
}

/// 元素会先被缓存，迭代器本身不要求`Send`。
impl<T: Send + 'static> FromIterator<T> for Pipe<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Pipe<T> {
        Pipe::of(iter.into_iter().collect::<Vec<_>>())
    }
}
