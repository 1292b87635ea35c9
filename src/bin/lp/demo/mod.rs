use crate::config::Config;
use crate::err::LpErr;
use cmd_help::CmdHelp;
use itertools::Itertools;
use std::fmt::Display;

mod creation;
mod intermediate;
mod parallel;
mod primitive;
mod short_circuit;
mod terminal;

#[derive(Debug, Clone, Copy, Eq, PartialEq, CmdHelp)]
pub(crate) enum Demo {
    /// creation        创建流水线：集合、数组、映射的键值、of、of_nullable、empty、
    ///                 generate、iterate、iterate_while、concat、builder。
    Creation,
    /// intermediate    中间操作：filter、map、flat_map、distinct、sorted、limit、skip、
    ///                 take_while、drop_while、map_multi、peek。
    Intermediate,
    /// terminal        终止操作：for_each、to_list、collect、reduce、joining、count、
    ///                 min、max、summary_statistics、各种match、find_first、find_any、iterator。
    Terminal,
    /// short_circuit   短路操作：find_first、find_any、any_match、all_match、none_match、
    ///                 limit、take_while、drop_while，以及并行求和与遍历。
    ShortCircuit,
    /// parallel        并行与顺序切换、unordered、is_parallel、iterator、on_close与close。
    Parallel,
    /// primitive       数值流水线：sum、average、min、max、summary_statistics、
    ///                 range、range_closed、as_long_pipe、as_double_pipe。
    Primitive,
}

impl Demo {
    pub(crate) const ALL: [Demo; 6] =
        [Demo::Creation, Demo::Intermediate, Demo::Terminal, Demo::ShortCircuit, Demo::Parallel, Demo::Primitive];

    pub(crate) fn run(self, configs: &'static [Config]) -> Result<(), LpErr> {
        match self {
            Demo::Creation => creation::run(configs),
            Demo::Intermediate => intermediate::run(configs),
            Demo::Terminal => terminal::run(configs),
            Demo::ShortCircuit => short_circuit::run(configs),
            Demo::Parallel => parallel::run(configs),
            Demo::Primitive => primitive::run(configs),
        }
    }
}

/// 列表格式：`[a, b, c]`
pub(crate) fn fmt_list<T: Display>(items: &[T]) -> String {
    format!("[{}]", items.iter().join(", "))
}

/// 带小数点的浮点数列表：`[10.0, 20.5]`
pub(crate) fn fmt_float_list(items: &[f64]) -> String {
    format!("[{}]", items.iter().map(|n| format!("{n:?}")).join(", "))
}
