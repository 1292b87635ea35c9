mod stateful;

use crate::pipe::{Pipe, PipeIter};
use crate::{Integer, PipeErr, PipeRes};
use std::sync::Arc;

/// 无状态的中间操作：逐个元素处理，并行时在各批次内独立执行。
///
/// 闭包需要满足`Fn + Send + Sync`，并行时会被多个工作线程共享。
impl<T: Send + 'static> Pipe<T> {
    /// 保留满足条件的元素，保持原有顺序。
    pub fn filter<P>(self, predicate: P) -> Pipe<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.stateless(move |iter| -> PipeIter<T> {
            let predicate = predicate.clone();
            Box::new(iter.filter(move |item| predicate(item)))
        })
    }

    /// 一对一转换。
    pub fn map<U, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.stateless(move |iter| -> PipeIter<U> {
            let f = f.clone();
            Box::new(iter.map(move |item| f(item)))
        })
    }

    /// 每个元素转换为一个序列，再按外层顺序惰性展开。
    pub fn flat_map<U, I, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U> + 'static,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.stateless(move |iter| -> PipeIter<U> {
            let f = f.clone();
            Box::new(iter.flat_map(move |item| f(item)))
        })
    }

    /// 一对多转换，`f`通过`emit`输出零个或多个元素。
    ///
    /// ```
    /// use lazypipe::Pipe;
    ///
    /// let mut pipe = Pipe::of(["a", "b"]).map_multi(|s, emit| {
    ///     emit(format!("{s}1"));
    ///     emit(format!("{s}2"));
    /// });
    /// assert_eq!(pipe.to_list().unwrap(), vec!["a1", "a2", "b1", "b2"]);
    /// ```
    pub fn map_multi<U, F>(self, f: F) -> Pipe<U>
    where
        U: Send + 'static,
        F: Fn(T, &mut dyn FnMut(U)) + Send + Sync + 'static,
    {
        self.flat_map(move |item| {
            let mut out: Vec<U> = Vec::new();
            f(item, &mut |u: U| out.push(u));
            out
        })
    }

    /// 观察流经的每个元素，不改变元素。
    pub fn peek<F>(self, f: F) -> Pipe<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.stateless(move |iter| -> PipeIter<T> {
            let f = f.clone();
            Box::new(iter.inspect(move |item| f(item)))
        })
    }
}

/// 计数参数必须为非负数。
pub(crate) fn count_arg(op: &'static str, count: Integer) -> PipeRes<usize> {
    usize::try_from(count).map_err(|_| PipeErr::InvalidArgument { op, arg: "count", value: count.to_string() })
}
