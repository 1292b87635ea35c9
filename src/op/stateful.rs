use crate::op::count_arg;
use crate::pipe::{Pipe, PipeIter};
use crate::{Integer, PipeRes};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::hash::Hash;

/// 有状态的中间操作。
///
/// 并行时`sorted`为屏障，其余操作在拉取线程上按遇见顺序逐个拉取上游，然后重新切分。
impl<T: Send + 'static> Pipe<T> {
    /// 去重，保留首次出现的元素。
    pub fn distinct(self) -> Pipe<T>
    where
        T: Eq + Hash + Clone,
    {
        self.stateful(|iter| -> PipeIter<T> {
            let mut seen = FxHashSet::default();
            Box::new(iter.filter(move |item| seen.insert(item.clone()))) // 返回 true 表示保留（首次出现）
        })
    }

    /// 自然顺序的稳定排序。
    pub fn sorted(self) -> Pipe<T>
    where
        T: Ord,
    {
        self.sorted_by(Ord::cmp)
    }

    /// 按比较器稳定排序，首次拉取时才排序。
    pub fn sorted_by<F>(self, cmp: F) -> Pipe<T>
    where
        F: FnMut(&T, &T) -> Ordering + Send + 'static,
    {
        self.barrier(|iter| -> PipeIter<T> { Box::new(std::iter::once_with(move || iter.sorted_by(cmp)).flatten()) })
    }

    /// 保留前`count`个元素，满足后不再从上游拉取。
    pub fn limit(self, count: Integer) -> PipeRes<Pipe<T>> {
        let count = count_arg("limit", count)?;
        Ok(self.stateful(move |iter| -> PipeIter<T> { Box::new(iter.take(count)) }))
    }

    /// 丢弃前`count`个元素。
    pub fn skip(self, count: Integer) -> PipeRes<Pipe<T>> {
        let count = count_arg("skip", count)?;
        Ok(self.stateful(move |iter| -> PipeIter<T> { Box::new(iter.skip(count)) }))
    }

    /// 持续保留元素，直到条件首次不满足。
    pub fn take_while<P>(self, predicate: P) -> Pipe<T>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.stateful(|iter| -> PipeIter<T> { Box::new(iter.take_while(predicate)) })
    }

    /// 持续丢弃元素，直到条件首次不满足，之后的元素全部保留。
    pub fn drop_while<P>(self, predicate: P) -> Pipe<T>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.stateful(|iter| -> PipeIter<T> { Box::new(iter.skip_while(predicate)) })
    }
}
