use crate::config::{Config, par_config};
use crate::demo::fmt_list;
use crate::err::LpErr;
use crate::println_info;
use lazypipe::Pipe;

pub(crate) fn run(configs: &'static [Config]) -> Result<(), LpErr> {
    let par = par_config(configs);

    println_info!("=== Terminal Short-Circuit Examples ===");
    // 找到第一个偶数后不再拉取
    let first_even = Pipe::of([1, 3, 5, 6, 7, 8]).filter(|n| n % 2 == 0).find_first()?;
    println!("find_first even: {}", first_even.map_or_else(|| "null".to_owned(), |n| n.to_string()));

    let any_even = Pipe::of([1, 2, 3, 4, 5]).parallel_with(par).filter(|n| n % 2 == 0).find_any()?;
    println!("find_any even (parallel): {}", any_even.map_or_else(|| "null".to_owned(), |n| n.to_string()));

    println!("any_match empty string? {}", Pipe::of(["a", "b", "", "c"]).any_match(|s| s.is_empty())?);
    println!("all_match positive? {}", Pipe::of([1, 2, 3, -1]).all_match(|n| *n > 0)?);
    println!("none_match negative (all positive): {}", Pipe::of([1, 2, 3]).none_match(|n| *n < 0)?);
    println!("none_match negative (contains negative): {}", Pipe::of([1, -2, 3]).none_match(|n| *n < 0)?);

    println!();
    println_info!("=== Intermediate Short-Circuit Examples ===");
    println!("limit(3): {}", fmt_list(&Pipe::<i32>::range(1, 100).limit(3)?.to_list()?));
    println!("take_while <5: {}", fmt_list(&Pipe::<i32>::range(1, 10).take_while(|n| *n < 5).to_list()?));
    println!("drop_while <5: {}", fmt_list(&Pipe::<i32>::range(1, 10).drop_while(|n| *n < 5).to_list()?));

    println!();
    println_info!("=== Parallel Pipe Examples ===");
    let list = Pipe::<i32>::range_closed(1, 10).to_list()?;
    println!("Parallel sum: {}", Pipe::of(list.clone()).parallel_with(par).sum()?);
    print!("parallel for_each: ");
    Pipe::of(list.clone()).parallel_with(par).for_each(|n| print!("{n} "))?;
    println!();
    print!("parallel for_each_ordered: ");
    Pipe::of(list).parallel_with(par).for_each_ordered(|n| print!("{n} "))?;
    println!();
    Ok(())
}
