//! 数值流水线：求和、平均值、最值、汇总统计，以及整数区间和数值类型转换。

use crate::PipeRes;
use crate::pipe::Pipe;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// 可以参与数值汇总的元素类型。
pub trait Numeric: Copy + Send + Sync + Debug + Display + 'static {
    /// 求和结果的类型，整数求和时拓宽为`i64`。
    type Sum: Copy + Send + Sync + Debug + Display;

    /// 汇总统计的类型名前缀，如`Int`、`Long`、`Double`。
    const KIND: &'static str;
    const ZERO_SUM: Self::Sum;
    /// 空统计的最小值，任何元素都不大于它。
    const MIN_IDENTITY: Self;
    /// 空统计的最大值，任何元素都不小于它。
    const MAX_IDENTITY: Self;

    fn widen(self) -> Self::Sum;

    fn add_sum(sum: Self::Sum, value: Self::Sum) -> Self::Sum;

    fn sum_to_f64(sum: Self::Sum) -> f64;

    fn to_f64(self) -> f64;

    /// 全序比较，浮点数中`NaN`大于一切其他值。
    fn num_cmp(&self, other: &Self) -> Ordering;

    fn render(self) -> String;

    fn render_sum(sum: Self::Sum) -> String;
}

macro_rules! impl_int_numeric {
    ($ty:ty, $kind:literal) => {
        impl Numeric for $ty {
            type Sum = i64;

            const KIND: &'static str = $kind;
            const ZERO_SUM: i64 = 0;
            const MIN_IDENTITY: $ty = <$ty>::MAX;
            const MAX_IDENTITY: $ty = <$ty>::MIN;

            fn widen(self) -> i64 {
                i64::from(self)
            }

            /// 溢出时回绕。
            fn add_sum(sum: i64, value: i64) -> i64 {
                sum.wrapping_add(value)
            }

            fn sum_to_f64(sum: i64) -> f64 {
                sum as f64
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn num_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            fn render(self) -> String {
                self.to_string()
            }

            fn render_sum(sum: i64) -> String {
                sum.to_string()
            }
        }
    };
}

impl_int_numeric!(i32, "Int");
impl_int_numeric!(i64, "Long");

impl Numeric for f64 {
    type Sum = f64;

    const KIND: &'static str = "Double";
    const ZERO_SUM: f64 = 0.0;
    const MIN_IDENTITY: f64 = f64::INFINITY;
    const MAX_IDENTITY: f64 = f64::NEG_INFINITY;

    fn widen(self) -> f64 {
        self
    }

    fn add_sum(sum: f64, value: f64) -> f64 {
        sum + value
    }

    fn sum_to_f64(sum: f64) -> f64 {
        sum
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn num_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(*self).cmp(&OrderedFloat(*other))
    }

    fn render(self) -> String {
        fmt_fixed(self)
    }

    fn render_sum(sum: f64) -> String {
        fmt_fixed(sum)
    }
}

/// 保留六位小数，无穷大和非数显示为`Infinity`、`-Infinity`、`NaN`。
fn fmt_fixed(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else {
        format!("{value:.6}")
    }
}

/// 汇总统计：数量、和、最小值、最大值、平均值。
///
/// 可以通过[`SummaryStatistics::combine`]合并，因此能在并行时按批次分别统计。
#[derive(Debug, Clone, Copy)]
pub struct SummaryStatistics<T: Numeric> {
    count: u64,
    sum: T::Sum,
    min: T,
    max: T,
}

impl<T: Numeric> Default for SummaryStatistics<T> {
    fn default() -> Self {
        SummaryStatistics::new()
    }
}

impl<T: Numeric> SummaryStatistics<T> {
    pub fn new() -> SummaryStatistics<T> {
        SummaryStatistics { count: 0, sum: T::ZERO_SUM, min: T::MIN_IDENTITY, max: T::MAX_IDENTITY }
    }

    pub fn accept(&mut self, value: T) {
        self.count += 1;
        self.sum = T::add_sum(self.sum, value.widen());
        if value.num_cmp(&self.min) == Ordering::Less {
            self.min = value;
        }
        if value.num_cmp(&self.max) == Ordering::Greater {
            self.max = value;
        }
    }

    pub fn combine(&mut self, other: SummaryStatistics<T>) {
        self.count += other.count;
        self.sum = T::add_sum(self.sum, other.sum);
        if other.min.num_cmp(&self.min) == Ordering::Less {
            self.min = other.min;
        }
        if other.max.num_cmp(&self.max) == Ordering::Greater {
            self.max = other.max;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> T::Sum {
        self.sum
    }

    /// 没有元素时为`None`。
    pub fn min(&self) -> Option<T> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<T> {
        (self.count > 0).then_some(self.max)
    }

    /// 没有元素时为`0.0`。
    pub fn average(&self) -> f64 {
        if self.count > 0 { T::sum_to_f64(self.sum) / self.count as f64 } else { 0.0 }
    }
}

impl<T: Numeric> Display for SummaryStatistics<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}SummaryStatistics{{count={}, sum={}, min={}, average={:.6}, max={}}}",
            T::KIND,
            self.count,
            T::render_sum(self.sum),
            self.min.render(),
            self.average(),
            self.max.render()
        )
    }
}

/// 数值终止操作和类型转换。
impl<T: Numeric> Pipe<T> {
    /// 求和，空流水线为0，整数求和结果为`i64`。
    pub fn sum(&mut self) -> PipeRes<T::Sum> {
        self.reduce_with_op("sum", T::ZERO_SUM, |sum, value| T::add_sum(sum, value.widen()), T::add_sum)
    }

    /// 算术平均值，空流水线为`None`。
    pub fn average(&mut self) -> PipeRes<Option<f64>> {
        let stats = self.statistics_op("average")?;
        Ok((stats.count() > 0).then(|| stats.average()))
    }

    /// 最小值，空流水线返回[`crate::PipeErr::EmptySequence`]。
    pub fn min(&mut self) -> PipeRes<T> {
        self.extreme_by("min", T::num_cmp, false)
    }

    /// 最大值，空流水线返回[`crate::PipeErr::EmptySequence`]。
    pub fn max(&mut self) -> PipeRes<T> {
        self.extreme_by("max", T::num_cmp, true)
    }

    pub fn summary_statistics(&mut self) -> PipeRes<SummaryStatistics<T>> {
        self.statistics_op("summary_statistics")
    }

    pub fn as_double_pipe(self) -> Pipe<f64> {
        self.map(T::to_f64)
    }

    fn statistics_op(&mut self, op: &'static str) -> PipeRes<SummaryStatistics<T>> {
        self.collect_with_op(op, SummaryStatistics::new, SummaryStatistics::accept, SummaryStatistics::combine)
    }
}

impl Pipe<i32> {
    pub fn as_long_pipe(self) -> Pipe<i64> {
        self.map(i64::from)
    }
}

macro_rules! impl_range {
    ($ty:ty) => {
        impl Pipe<$ty> {
            /// 左闭右开区间`[start, end)`，`start >= end`时为空。
            pub fn range(start: $ty, end: $ty) -> Pipe<$ty> {
                Pipe::of(start..end)
            }

            /// 闭区间`[start, end]`，`start > end`时为空。
            pub fn range_closed(start: $ty, end: $ty) -> Pipe<$ty> {
                Pipe::of(start..=end)
            }
        }
    };
}

impl_range!(i32);
impl_range!(i64);

impl Pipe<i64> {
    /// 闭区间`[start, end]`内按步长生成整数。
    ///
    /// 步长为正时从`start`正序生成，为负时从`end`逆序生成，为0时无限重复`start`。
    pub fn range_step(start: i64, end: i64, step: i64) -> Pipe<i64> {
        let iter = RangeIter { start, end, step: step.saturating_abs(), next: start, next_back: end };
        if step < 0 { Pipe::of(iter.rev()) } else { Pipe::of(iter) }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct RangeIter {
    start: i64,
    end: i64,
    step: i64,
    next: i64,
    next_back: i64,
}

impl Iterator for RangeIter {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.start && self.next <= self.end && self.next <= self.next_back {
            let res = self.next;
            match res.checked_add(self.step) {
                Some(next) => self.next = next,
                // 溢出时res必然为正数
                None => self.next_back = res - 1,
            }
            Some(res)
        } else {
            None
        }
    }
}

impl DoubleEndedIterator for RangeIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next_back >= self.start && self.next_back <= self.end && self.next_back >= self.next {
            let res = self.next_back;
            match res.checked_sub(self.step) {
                Some(next_back) => self.next_back = next_back,
                None => self.next = res + 1,
            }
            Some(res)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParConfig, PipeErr};

    fn one_to_five() -> Pipe<i32> {
        Pipe::of(vec![1, 2, 3, 4, 5])
    }

    #[test]
    fn test_sum() {
        assert_eq!(one_to_five().sum(), Ok(15i64));
        assert_eq!(Pipe::of(vec![100i64, 200, 300]).sum(), Ok(600));
        assert_eq!(Pipe::of(vec![1.5, 2.5, 3.5]).sum(), Ok(7.5));
        assert_eq!(Pipe::<i32>::empty().sum(), Ok(0));
    }

    #[test]
    fn test_int_sum_widens() {
        assert_eq!(Pipe::of(vec![i32::MAX, i32::MAX]).sum(), Ok(2 * i32::MAX as i64));
        assert_eq!(Pipe::of(vec![i64::MAX, 1]).sum(), Ok(i64::MIN));
    }

    #[test]
    fn test_parallel_sum() {
        let config = ParConfig::new().batch_size(7).workers(3);
        assert_eq!(Pipe::<i32>::range_closed(1, 1000).parallel_with(config).sum(), Ok(500500));
    }

    #[test]
    fn test_average() {
        assert_eq!(one_to_five().average(), Ok(Some(3.0)));
        assert_eq!(Pipe::of(vec![1.5, 2.5, 3.5]).average(), Ok(Some(2.5)));
        assert_eq!(Pipe::<i64>::empty().average(), Ok(None));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(one_to_five().min(), Ok(1));
        assert_eq!(one_to_five().parallel_with(ParConfig::new().batch_size(2)).max(), Ok(5));
        assert_eq!(Pipe::of(vec![2.5, -1.0, 7.25]).max(), Ok(7.25));
        assert_eq!(Pipe::<f64>::empty().min(), Err(PipeErr::EmptySequence { op: "min" }));
    }

    #[test]
    fn test_float_total_order() {
        let max = Pipe::of(vec![1.0, f64::NAN, 3.0]).max().unwrap();
        assert!(max.is_nan());
        assert_eq!(Pipe::of(vec![1.0, f64::NAN, 3.0]).min(), Ok(1.0));
    }

    #[test]
    fn test_summary_statistics() {
        let stats = one_to_five().summary_statistics().unwrap();
        assert_eq!(stats.count(), 5);
        assert_eq!(stats.sum(), 15);
        assert_eq!(stats.min(), Some(1));
        assert_eq!(stats.max(), Some(5));
        assert_eq!(stats.average(), 3.0);
        assert_eq!(stats.to_string(), "IntSummaryStatistics{count=5, sum=15, min=1, average=3.000000, max=5}");
    }

    #[test]
    fn test_summary_statistics_display() {
        let stats = Pipe::of(vec![1.5, 2.5, 3.5]).summary_statistics().unwrap();
        assert_eq!(
            stats.to_string(),
            "DoubleSummaryStatistics{count=3, sum=7.500000, min=1.500000, average=2.500000, max=3.500000}"
        );
        let stats = Pipe::of(vec![10i64]).summary_statistics().unwrap();
        assert_eq!(stats.to_string(), "LongSummaryStatistics{count=1, sum=10, min=10, average=10.000000, max=10}");
    }

    #[test]
    fn test_empty_summary_statistics() {
        let stats = Pipe::<i32>::empty().summary_statistics().unwrap();
        assert_eq!(stats.min(), None);
        assert_eq!(stats.average(), 0.0);
        assert_eq!(
            stats.to_string(),
            "IntSummaryStatistics{count=0, sum=0, min=2147483647, average=0.000000, max=-2147483648}"
        );
        let stats = SummaryStatistics::<f64>::new();
        assert_eq!(
            stats.to_string(),
            "DoubleSummaryStatistics{count=0, sum=0.000000, min=Infinity, average=0.000000, max=-Infinity}"
        );
    }

    #[test]
    fn test_parallel_summary_statistics() {
        let config = ParConfig::new().batch_size(3).workers(4);
        let stats = Pipe::<i32>::range(-50, 51).parallel_with(config).summary_statistics().unwrap();
        assert_eq!(stats.count(), 101);
        assert_eq!(stats.sum(), 0);
        assert_eq!(stats.min(), Some(-50));
        assert_eq!(stats.max(), Some(50));
    }

    #[test]
    fn test_combine() {
        let mut left = SummaryStatistics::<i64>::new();
        left.accept(3);
        let mut right = SummaryStatistics::new();
        right.accept(-1);
        right.accept(9);
        left.combine(right);
        left.combine(SummaryStatistics::new());
        assert_eq!((left.count(), left.sum(), left.min(), left.max()), (3, 11, Some(-1), Some(9)));
    }

    #[test]
    fn test_ranges() {
        assert_eq!(Pipe::<i32>::range(1, 5).to_list(), Ok(vec![1, 2, 3, 4]));
        assert_eq!(Pipe::<i32>::range_closed(1, 5).to_list(), Ok(vec![1, 2, 3, 4, 5]));
        assert_eq!(Pipe::<i32>::range(5, 5).count(), Ok(0));
        assert_eq!(Pipe::<i64>::range(3, 1).count(), Ok(0));
        assert_eq!(Pipe::<i64>::range_closed(3, 3).to_list(), Ok(vec![3]));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Pipe::of(vec![1i32, 2, 3]).as_long_pipe().to_list(), Ok(vec![1i64, 2, 3]));
        assert_eq!(Pipe::of(vec![10i64, 20, 30]).as_double_pipe().to_list(), Ok(vec![10.0, 20.0, 30.0]));
        assert_eq!(Pipe::of(vec![i32::MAX]).as_long_pipe().map(|n| n + 1).to_list(), Ok(vec![i32::MAX as i64 + 1]));
    }

    fn steps(start: i64, end: i64, step: i64) -> Vec<i64> {
        Pipe::<i64>::range_step(start, end, step).to_list().unwrap()
    }

    #[test]
    fn test_range_step_positive() {
        assert_eq!(steps(0, 10, 1), (0..=10).collect::<Vec<_>>());
        assert_eq!(steps(0, 10, 2), (0..=10).step_by(2).collect::<Vec<_>>());
        assert_eq!(steps(0, 0, 2), vec![0]);
    }

    #[test]
    fn test_range_step_negative() {
        assert_eq!(steps(0, 10, -1), (0..=10).rev().collect::<Vec<_>>());
        assert_eq!(steps(0, 10, -2), (0..=10).rev().step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_step_reverted_range() {
        assert!(steps(10, 0, 1).is_empty());
        assert!(steps(10, 0, -2).is_empty());
    }

    #[test]
    fn test_range_step_zero_step() {
        assert_eq!(Pipe::<i64>::range_step(0, 0, 0).find_first(), Ok(Some(0)));
        assert_eq!(Pipe::<i64>::range_step(3, 5, 0).limit(10).unwrap().to_list(), Ok(vec![3; 10]));
    }

    #[test]
    fn test_range_step_near_bounds() {
        assert_eq!(steps(i64::MAX - 2, i64::MAX, 2), vec![i64::MAX - 2, i64::MAX]);
        assert_eq!(steps(i64::MIN, i64::MIN + 2, -2), vec![i64::MIN + 2, i64::MIN]);
        assert_eq!(steps(i64::MAX - 1, i64::MAX, i64::MAX), vec![i64::MAX - 1]);
    }
}
