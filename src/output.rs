use crate::PipeRes;
use crate::err::PipeErr;
use crate::par::{Halt, SplitCursor};
use crate::pipe::{Flow, Pipe, PipeIter};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::Display;

/// 合并为字符串时使用的分隔符、前缀和后缀。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinInfo {
    pub delimiter: String,
    pub prefix: String,
    pub postfix: String,
}

impl JoinInfo {
    pub fn new(delimiter: impl Into<String>, prefix: impl Into<String>, postfix: impl Into<String>) -> JoinInfo {
        JoinInfo { delimiter: delimiter.into(), prefix: prefix.into(), postfix: postfix.into() }
    }
}

/// 终止操作：每个终止操作都会取走拉取链，流水线随即变为已消耗。
///
/// 并行时每个批次由一个工作任务独立处理，部分结果按批次编号合并。
impl<T: Send + 'static> Pipe<T> {
    /// 对每个元素执行`action`，并行时执行顺序不确定。
    pub fn for_each<F>(&mut self, action: F) -> PipeRes<()>
    where
        F: Fn(T) + Send + Sync,
    {
        match self.take_flow("for_each")? {
            Flow::Seq(iter) => iter.for_each(action),
            Flow::Par(split) => {
                split.run("for_each", false, &Halt::never(), |_, batch| batch.for_each(&action));
            }
        }
        Ok(())
    }

    /// 按遇见顺序对每个元素执行`action`。
    ///
    /// 并行时各批次在工作任务上求值，`action`在调用线程上按顺序执行。
    pub fn for_each_ordered<F>(&mut self, mut action: F) -> PipeRes<()>
    where
        F: FnMut(T),
    {
        match self.take_flow("for_each_ordered")? {
            Flow::Seq(iter) => iter.for_each(action),
            Flow::Par(split) => split.gather("for_each_ordered", true).into_iter().for_each(&mut action),
        }
        Ok(())
    }

    /// 收集为`Vec`，并行且未设置无序提示时保持遇见顺序。
    pub fn to_list(&mut self) -> PipeRes<Vec<T>> {
        self.gather("to_list")
    }

    /// 收集为任意`FromIterator`容器。
    pub fn collect<B: FromIterator<T>>(&mut self) -> PipeRes<B> {
        match self.take_flow("collect")? {
            Flow::Seq(iter) => Ok(iter.collect()),
            Flow::Par(split) => Ok(split.gather("collect", self.ordered).into_iter().collect()),
        }
    }

    /// 可变归约：每个批次通过`supplier`创建独立的容器并用`accumulator`累加，
    /// 最后用`combiner`把各批次的容器依次合并到一个新容器中。
    ///
    /// 顺序执行时只创建一个容器，不会调用`combiner`。
    pub fn collect_with<R, S, A, C>(&mut self, supplier: S, accumulator: A, combiner: C) -> PipeRes<R>
    where
        R: Send,
        S: Fn() -> R + Send + Sync,
        A: Fn(&mut R, T) + Send + Sync,
        C: FnMut(&mut R, R),
    {
        self.collect_with_op("collect_with", supplier, accumulator, combiner)
    }

    pub(crate) fn collect_with_op<R, S, A, C>(
        &mut self, op: &'static str, supplier: S, accumulator: A, mut combiner: C,
    ) -> PipeRes<R>
    where
        R: Send,
        S: Fn() -> R + Send + Sync,
        A: Fn(&mut R, T) + Send + Sync,
        C: FnMut(&mut R, R),
    {
        match self.take_flow(op)? {
            Flow::Seq(iter) => {
                let mut container = supplier();
                iter.for_each(|item| accumulator(&mut container, item));
                Ok(container)
            }
            Flow::Par(split) => {
                let partials = split.run(op, self.ordered, &Halt::never(), |_, batch| {
                    let mut container = supplier();
                    batch.for_each(|item| accumulator(&mut container, item));
                    container
                });
                let mut result = supplier();
                for (_, partial) in partials {
                    combiner(&mut result, partial);
                }
                Ok(result)
            }
        }
    }

    /// 以`delimiter`连接全部元素。
    pub fn joining(&mut self, delimiter: &str) -> PipeRes<String>
    where
        T: Display,
    {
        Ok(self.gather("joining")?.into_iter().join(delimiter))
    }

    /// 以`JoinInfo`描述的分隔符、前缀、后缀连接全部元素。
    pub fn joining_with(&mut self, join_info: &JoinInfo) -> PipeRes<String>
    where
        T: Display,
    {
        let joined = self.gather("joining_with")?.into_iter().join(&join_info.delimiter);
        Ok(format!("{}{}{}", join_info.prefix, joined, join_info.postfix))
    }

    /// 以`identity`为初值从左到右归约，并行时`op`同时作为合并函数，必须满足结合律。
    pub fn reduce<F>(&mut self, identity: T, op: F) -> PipeRes<T>
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync,
    {
        self.reduce_with_op("reduce", identity, &op, &op)
    }

    /// 三参数归约：`accumulator`把元素并入部分结果，`combiner`合并两个部分结果。
    ///
    /// `accumulator`满足结合律且`identity`为真正的单位元时，并行结果与顺序结果一致，与如何切分无关。
    pub fn reduce_with<U, A, C>(&mut self, identity: U, accumulator: A, combiner: C) -> PipeRes<U>
    where
        U: Clone + Send + Sync,
        A: Fn(U, T) -> U + Send + Sync,
        C: Fn(U, U) -> U,
    {
        self.reduce_with_op("reduce_with", identity, accumulator, combiner)
    }

    pub(crate) fn reduce_with_op<U, A, C>(&mut self, op: &'static str, identity: U, accumulator: A, combiner: C) -> PipeRes<U>
    where
        U: Clone + Send + Sync,
        A: Fn(U, T) -> U + Send + Sync,
        C: Fn(U, U) -> U,
    {
        match self.take_flow(op)? {
            Flow::Seq(iter) => Ok(iter.fold(identity, accumulator)),
            Flow::Par(split) => {
                // 部分结果必须按批次顺序合并
                let partials =
                    split.run(op, true, &Halt::never(), |_, batch| batch.fold(identity.clone(), &accumulator));
                Ok(partials.into_iter().map(|(_, partial)| partial).fold(identity, combiner))
            }
        }
    }

    /// 无初值归约，空流水线返回`None`。
    pub fn reduce_opt<F>(&mut self, op: F) -> PipeRes<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        match self.take_flow("reduce_opt")? {
            Flow::Seq(iter) => Ok(iter.reduce(&op)),
            Flow::Par(split) => {
                let partials = split.run("reduce_opt", true, &Halt::never(), |_, batch| batch.reduce(&op));
                Ok(partials.into_iter().filter_map(|(_, partial)| partial).reduce(&op))
            }
        }
    }

    pub fn count(&mut self) -> PipeRes<usize> {
        match self.take_flow("count")? {
            Flow::Seq(iter) => Ok(iter.count()),
            Flow::Par(split) => {
                Ok(split.run("count", false, &Halt::never(), |_, batch| batch.count()).into_iter().map(|(_, n)| n).sum())
            }
        }
    }

    /// 最小值，存在多个时返回第一个，空流水线返回[`PipeErr::EmptySequence`]。
    pub fn min_by<F>(&mut self, cmp: F) -> PipeRes<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.extreme_by("min", cmp, false)
    }

    /// 最大值，存在多个时返回最后一个，空流水线返回[`PipeErr::EmptySequence`]。
    pub fn max_by<F>(&mut self, cmp: F) -> PipeRes<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.extreme_by("max", cmp, true)
    }

    pub(crate) fn extreme_by<F>(&mut self, op: &'static str, cmp: F, max: bool) -> PipeRes<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        let pick = |iter: &mut dyn Iterator<Item = T>| if max { iter.max_by(&cmp) } else { iter.min_by(&cmp) };
        let found = match self.take_flow(op)? {
            Flow::Seq(mut iter) => pick(&mut iter),
            Flow::Par(split) => {
                let partials = split.run(op, true, &Halt::never(), |_, mut batch| pick(&mut batch));
                pick(&mut partials.into_iter().filter_map(|(_, partial)| partial))
            }
        };
        found.ok_or(PipeErr::EmptySequence { op })
    }

    /// 按遇见顺序的第一个元素，找到后立即停止拉取。
    pub fn find_first(&mut self) -> PipeRes<Option<T>> {
        match self.take_flow("find_first")? {
            Flow::Seq(mut iter) => Ok(iter.next()),
            Flow::Par(split) => {
                let halt = Halt::never();
                let partials = split.run("find_first", true, &halt, |no, mut batch| {
                    let found = batch.next();
                    if found.is_some() {
                        // 之后的批次不可能更靠前
                        halt.before(no + 1);
                    }
                    found
                });
                Ok(partials.into_iter().find_map(|(_, found)| found))
            }
        }
    }

    /// 任意一个元素，并行时不保证是哪一个。
    pub fn find_any(&mut self) -> PipeRes<Option<T>> {
        match self.take_flow("find_any")? {
            Flow::Seq(mut iter) => Ok(iter.next()),
            Flow::Par(split) => {
                let halt = Halt::never();
                let partials = split.run("find_any", false, &halt, |_, mut batch| {
                    let found = batch.next();
                    if found.is_some() {
                        halt.now();
                    }
                    found
                });
                Ok(partials.into_iter().find_map(|(_, found)| found))
            }
        }
    }

    /// 是否存在满足条件的元素，找到即停止。
    pub fn any_match<P>(&mut self, predicate: P) -> PipeRes<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.any_op("any_match", |item| predicate(item))
    }

    /// 是否全部元素满足条件，遇到不满足的即停止。
    pub fn all_match<P>(&mut self, predicate: P) -> PipeRes<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.any_op("all_match", |item| !predicate(item)).map(|found| !found)
    }

    /// 是否没有元素满足条件，遇到满足的即停止。
    pub fn none_match<P>(&mut self, predicate: P) -> PipeRes<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.any_op("none_match", |item| predicate(item)).map(|found| !found)
    }

    fn any_op<P>(&mut self, op: &'static str, predicate: P) -> PipeRes<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        match self.take_flow(op)? {
            Flow::Seq(mut iter) => Ok(iter.any(|item| predicate(&item))),
            Flow::Par(split) => {
                let halt = Halt::never();
                let partials = split.run(op, false, &halt, |_, mut batch| {
                    let hit = batch.any(|item| predicate(&item));
                    if hit {
                        halt.now();
                    }
                    hit
                });
                Ok(partials.into_iter().any(|(_, hit)| hit))
            }
        }
    }

    /// 取出拉取链本身，按遇见顺序逐个拉取。
    ///
    /// 并行时屏障阶段之前的部分会先并行求值，其余阶段在调用线程上执行。
    pub fn iterator(&mut self) -> PipeRes<PipeIter<T>> {
        let par = self.par;
        Ok(self.take_stages("iterator")?.pull(par))
    }

    /// 取出可切分的游标，按批次切分，切分出的部分可以交给其他线程遍历。
    ///
    /// 顺序流水线使用默认的批次大小。
    pub fn spliterator(&mut self) -> PipeRes<SplitCursor<T>> {
        let config = self.par.unwrap_or_default();
        Ok(SplitCursor::new(self.take_stages("spliterator")?.split(config)))
    }

    fn gather(&mut self, op: &'static str) -> PipeRes<Vec<T>> {
        match self.take_flow(op)? {
            Flow::Seq(iter) => Ok(iter.collect()),
            Flow::Par(split) => Ok(split.gather(op, self.ordered)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParConfig;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn numbers() -> Pipe<i32> {
        Pipe::of(vec![1, 2, 3, 4, 5, 2, 3])
    }

    fn par_numbers() -> Pipe<i32> {
        numbers().parallel_with(ParConfig::new().batch_size(2).workers(3))
    }

    #[test]
    fn test_for_each() {
        let sum = AtomicUsize::new(0);
        numbers()
            .for_each(|n| {
                sum.fetch_add(n as usize, AtomicOrdering::SeqCst);
            })
            .unwrap();
        assert_eq!(sum.load(AtomicOrdering::SeqCst), 20);

        let sum = AtomicUsize::new(0);
        par_numbers()
            .for_each(|n| {
                sum.fetch_add(n as usize, AtomicOrdering::SeqCst);
            })
            .unwrap();
        assert_eq!(sum.load(AtomicOrdering::SeqCst), 20);
    }

    #[test]
    fn test_for_each_ordered_parallel() {
        let mut seen = Vec::new();
        par_numbers().for_each_ordered(|n| seen.push(n)).unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 2, 3]);
    }

    #[test]
    fn test_for_each_parallel_visits_all() {
        let seen = Mutex::new(Vec::new());
        Pipe::<i32>::range(0, 200)
            .parallel_with(ParConfig::new().batch_size(5).workers(4))
            .for_each(|n| seen.lock().unwrap().push(n))
            .unwrap();
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_to_list_and_collect() {
        assert_eq!(numbers().to_list(), Ok(vec![1, 2, 3, 4, 5, 2, 3]));
        assert_eq!(par_numbers().to_list(), Ok(vec![1, 2, 3, 4, 5, 2, 3]));
        assert_eq!(numbers().collect::<HashSet<_>>(), Ok(HashSet::from([1, 2, 3, 4, 5])));
        assert_eq!(par_numbers().collect::<HashSet<_>>(), Ok(HashSet::from([1, 2, 3, 4, 5])));
    }

    #[test]
    fn test_unordered_to_list_keeps_elements() {
        let mut list = par_numbers().unordered().map(|n| n * 2).to_list().unwrap();
        list.sort_unstable();
        assert_eq!(list, vec![2, 4, 4, 6, 6, 8, 10]);
    }

    #[test]
    fn test_collect_with() {
        let collected = par_numbers()
            .collect_with(Vec::new, |acc: &mut Vec<i32>, n| acc.push(n), |acc, mut other| acc.append(&mut other))
            .unwrap();
        assert_eq!(collected, vec![1, 2, 3, 4, 5, 2, 3]);
    }

    #[test]
    fn test_joining() {
        assert_eq!(numbers().joining(", "), Ok("1, 2, 3, 4, 5, 2, 3".to_owned()));
        assert_eq!(par_numbers().joining_with(&JoinInfo::new(",", "[", "]")), Ok("[1,2,3,4,5,2,3]".to_owned()));
        assert_eq!(Pipe::<i32>::empty().joining_with(&JoinInfo::new(",", "<", ">")), Ok("<>".to_owned()));
    }

    #[test]
    fn test_reduce() {
        assert_eq!(numbers().reduce(0, |a, b| a + b), Ok(20));
        assert_eq!(par_numbers().reduce(0, |a, b| a + b), Ok(20));
        assert_eq!(numbers().reduce_opt(|a, b| a + b), Ok(Some(20)));
        assert_eq!(Pipe::<i32>::empty().reduce_opt(|a, b| a + b), Ok(None));
        assert_eq!(par_numbers().reduce_opt(|a, b| a.max(b)), Ok(Some(5)));
    }

    #[test]
    fn test_reduce_with_string_keeps_order() {
        let concat = numbers().map(|n| n.to_string()).reduce(String::new(), |s, n| s + &n + "-");
        assert_eq!(concat, Ok("1-2-3-4-5-2-3-".to_owned()));
        let concat = par_numbers().reduce_with(String::new(), |s, n| format!("{s}{n}"), |a, b| a + &b);
        assert_eq!(concat, Ok("1234523".to_owned()));
    }

    #[test]
    fn test_count() {
        assert_eq!(numbers().count(), Ok(7));
        assert_eq!(par_numbers().count(), Ok(7));
        assert_eq!(Pipe::<i32>::empty().parallel().count(), Ok(0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(numbers().min_by(i32::cmp), Ok(1));
        assert_eq!(par_numbers().max_by(i32::cmp), Ok(5));
        assert_eq!(Pipe::<i32>::empty().min_by(i32::cmp), Err(PipeErr::EmptySequence { op: "min" }));
        assert_eq!(Pipe::<i32>::empty().parallel().max_by(i32::cmp), Err(PipeErr::EmptySequence { op: "max" }));
    }

    #[test]
    fn test_min_max_ties() {
        let pairs = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let by_key = |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0);
        assert_eq!(Pipe::of(pairs.clone()).min_by(by_key), Ok((0, 'b')));
        assert_eq!(Pipe::of(pairs.clone()).max_by(by_key), Ok((1, 'c')));
        let config = ParConfig::new().batch_size(1).workers(4);
        assert_eq!(Pipe::of(pairs.clone()).parallel_with(config).min_by(by_key), Ok((0, 'b')));
        assert_eq!(Pipe::of(pairs).parallel_with(config).max_by(by_key), Ok((1, 'c')));
    }

    #[test]
    fn test_find_first() {
        let mut pipe = Pipe::of(vec![1, 3, 5, 6, 7, 8]).filter(|n| n % 2 == 0);
        assert_eq!(pipe.find_first(), Ok(Some(6)));
        assert_eq!(Pipe::<i32>::empty().find_first(), Ok(None));
    }

    #[test]
    fn test_find_first_parallel_is_first() {
        let config = ParConfig::new().batch_size(3).workers(8);
        for _ in 0..20 {
            let mut pipe = Pipe::<i32>::range(0, 1000).parallel_with(config).filter(|n| n % 97 == 50);
            assert_eq!(pipe.find_first(), Ok(Some(50)));
        }
    }

    #[test]
    fn test_find_first_parallel_on_infinite_source() {
        let mut pipe =
            Pipe::iterate(0u64, |n| n + 1).parallel_with(ParConfig::new().batch_size(4).workers(4)).filter(|n| *n == 37);
        assert_eq!(pipe.find_first(), Ok(Some(37)));
    }

    #[test]
    fn test_find_any() {
        let found = Pipe::of(vec![1, 2, 3, 4, 5]).parallel().filter(|n| n % 2 == 0).find_any().unwrap();
        assert!(matches!(found, Some(2) | Some(4)));
        assert_eq!(Pipe::of(vec![1, 2, 3]).find_any(), Ok(Some(1)));
    }

    #[test]
    fn test_matching() {
        assert_eq!(Pipe::of(vec!["a", "b", "", "c"]).any_match(|s| s.is_empty()), Ok(true));
        assert_eq!(Pipe::of(vec![1, 2, 3, -1]).all_match(|n| *n > 0), Ok(false));
        assert_eq!(Pipe::of(vec![1, 2, 3]).none_match(|n| *n < 0), Ok(true));
        assert_eq!(Pipe::of(vec![1, -2, 3]).none_match(|n| *n < 0), Ok(false));
        assert_eq!(par_numbers().any_match(|n| n % 2 == 0), Ok(true));
        assert_eq!(par_numbers().all_match(|n| *n > 0), Ok(true));
        assert_eq!(par_numbers().none_match(|n| *n < 0), Ok(true));
        assert_eq!(Pipe::<i32>::empty().all_match(|_| false), Ok(true));
        assert_eq!(Pipe::<i32>::empty().any_match(|_| true), Ok(false));
    }

    #[test]
    fn test_any_match_short_circuits() {
        let pulled = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let mut pipe = Pipe::iterate(1, |n| n + 1).peek(move |_| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });
        assert_eq!(pipe.any_match(|n| *n == 3), Ok(true));
        assert_eq!(pulled.load(AtomicOrdering::SeqCst), 3);
    }

    #[test]
    fn test_any_match_parallel_on_infinite_source() {
        let mut pipe = Pipe::generate(|| 5).parallel_with(ParConfig::new().batch_size(8).workers(2));
        assert_eq!(pipe.any_match(|n| *n == 5), Ok(true));
    }

    #[test]
    fn test_iterator() {
        let mut pipe = numbers().map(|n| n + 1);
        let iter = pipe.iterator().unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 3, 4]);
        assert!(pipe.iterator().is_err());
        let iter = par_numbers().iterator().unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 2, 3]);
        let iter = par_numbers().sorted().map(|n| n * 10).iterator().unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![10, 20, 20, 30, 30, 40, 50]);
    }

    #[test]
    fn test_spliterator() {
        let mut cursor = numbers().map(|n| n * 2).spliterator().unwrap();
        let mut seen = Vec::new();
        assert!(cursor.try_advance(|n| seen.push(n)));
        cursor.for_each_remaining(|n| seen.push(n));
        assert_eq!(seen, vec![2, 4, 6, 8, 10, 4, 6]);
        assert!(!cursor.try_advance(|n| seen.push(n)));

        let mut pipe = numbers();
        pipe.spliterator().unwrap();
        assert!(pipe.spliterator().is_err());
    }

    #[test]
    fn test_spliterator_split_parts_cover_source_in_order() {
        let mut rest = par_numbers().filter(|n| *n != 4).spliterator().unwrap();
        let first = rest.try_split().unwrap();
        let second = rest.try_split().unwrap();
        let mut all = first.collect::<Vec<_>>();
        all.extend(second);
        rest.for_each_remaining(|n| all.push(n));
        assert_eq!(all, vec![1, 2, 3, 5, 2, 3]);
    }
}
