use crate::config::Config;
use crate::demo::{fmt_float_list, fmt_list};
use crate::err::LpErr;
use crate::println_info;
use lazypipe::Pipe;

fn ints() -> Pipe<i32> {
    Pipe::of([1, 2, 3, 4, 5])
}

pub(crate) fn run(_configs: &'static [Config]) -> Result<(), LpErr> {
    println_info!("=== i32 Pipe ===");
    println!("i32 sum: {}", ints().sum()?);
    // 数值流水线同样只能使用一次
    println!("i32 average: {:?}", ints().average()?.unwrap_or(0.0));
    println!("i32 min: {}", ints().min()?);
    println!("i32 max: {}", ints().max()?);
    println!("i32 summary_statistics: {}", ints().summary_statistics()?);
    println!("i32 to_list: {}", fmt_list(&ints().to_list()?));

    println!();
    println_info!("=== Numeric Ranges ===");
    println!("range(1, 5): {}", fmt_list(&Pipe::<i32>::range(1, 5).to_list()?));
    println!("range_closed(1, 5): {}", fmt_list(&Pipe::<i32>::range_closed(1, 5).to_list()?));
    println!("range_step(0, 10, 3): {}", fmt_list(&Pipe::<i64>::range_step(0, 10, 3).to_list()?));
    println!("range_step(0, 10, -3): {}", fmt_list(&Pipe::<i64>::range_step(0, 10, -3).to_list()?));

    println!();
    println_info!("=== Type Conversions ===");
    let longs = Pipe::of([1i32, 2, 3]).as_long_pipe().to_list()?;
    println!("i32 -> i64: {}", fmt_list(&longs));
    let doubles = Pipe::of([10i64, 20, 30]).as_double_pipe().to_list()?;
    println!("i64 -> f64: {}", fmt_float_list(&doubles));

    println!();
    println_info!("=== i64 and f64 Pipes ===");
    println!("i64 sum: {}", Pipe::of([100i64, 200, 300]).sum()?);
    println!("f64 average: {:?}", Pipe::of([1.5, 2.5, 3.5]).average()?.unwrap_or(0.0));
    println!("f64 summary_statistics: {}", Pipe::of([1.5, 2.5, 3.5]).summary_statistics()?);
    Ok(())
}
