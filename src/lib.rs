//! 惰性、单次使用的数据流水线。
//!
//! 流水线由数据源和有序的中间操作链组成，只有在调用终止操作时才会拉取元素。
//! 同一条流水线可以顺序或并行求值，除非显式声明不关心顺序，否则结果与顺序求值一致。
//!
//! ```
//! use lazypipe::Pipe;
//!
//! let mut pipe = Pipe::of(vec![1, 2, 3, 4, 5, 2, 3]).distinct().limit(3).unwrap();
//! assert_eq!(pipe.reduce(0, |a, b| a + b), Ok(6));
//! ```

mod err;
mod num;
mod op;
mod output;
mod par;
mod pipe;
mod source;

pub use err::PipeErr;
pub use num::{Numeric, SummaryStatistics};
pub use output::JoinInfo;
pub use par::{DEFAULT_BATCH_SIZE, ParConfig, SplitCursor};
pub use pipe::{Pipe, PipeIter};
pub use source::{IntoPipe, PipeBuilder};

/// 整数类型
pub type Integer = i64;

pub type PipeRes<T> = Result<T, PipeErr>;
