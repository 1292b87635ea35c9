use crate::config::{Config, par_config};
use crate::demo::fmt_list;
use crate::err::LpErr;
use lazypipe::{JoinInfo, Pipe};
use std::collections::BTreeSet;

const NUMBERS: [i32; 7] = [1, 2, 3, 4, 5, 2, 3];

fn numbers() -> Pipe<i32> {
    Pipe::of(NUMBERS)
}

pub(crate) fn run(configs: &'static [Config]) -> Result<(), LpErr> {
    let par = par_config(configs);
    println!("Original List: {}", fmt_list(&NUMBERS));

    print!("for_each (order not guaranteed in parallel): ");
    numbers().parallel_with(par).for_each(|n| print!("{n} "))?;
    println!();
    print!("for_each_ordered (preserves order): ");
    numbers().parallel_with(par).for_each_ordered(|n| print!("{n} "))?;
    println!();

    println!("to_list(): {}", fmt_list(&numbers().to_list()?));
    let set = numbers().collect::<BTreeSet<_>>()?;
    println!("collect::<BTreeSet>(): {}", fmt_list(&set.into_iter().collect::<Vec<_>>()));
    let collected = numbers()
        .parallel_with(par)
        .collect_with(Vec::new, |list: &mut Vec<i32>, n| list.push(n), |list, mut other| list.append(&mut other))?;
    println!("collect_with(Vec::new, push, append) parallel: {}", fmt_list(&collected));

    println!("reduce_opt(+): {}", numbers().reduce_opt(|a, b| a + b)?.unwrap_or(0));
    println!("reduce(0, +): {}", numbers().reduce(0, |a, b| a + b)?);
    let concatenated = numbers().map(|n| n.to_string()).reduce(String::new(), |s, n| s + &n + "-")?;
    println!("Custom reduce (concatenate): {concatenated}");
    let sum = numbers().parallel_with(par).reduce_with(0, |a, b| a + b, |a, b| a + b)?;
    println!("reduce_with(0, +, +) parallel: {sum}");

    println!("joining(\", \"): {}", numbers().joining(", ")?);
    println!("joining_with(\"|\", \"<\", \">\"): {}", numbers().joining_with(&JoinInfo::new("|", "<", ">"))?);

    println!("count(): {}", numbers().count()?);
    println!("min(): {}, max(): {}", numbers().min_by(i32::cmp)?, numbers().max_by(i32::cmp)?);
    println!("summary_statistics(): {}", numbers().summary_statistics()?);

    println!("any_match even? {}", numbers().any_match(|n| n % 2 == 0)?);
    println!("all_match positive? {}", numbers().all_match(|n| *n > 0)?);
    println!("none_match negative? {}", numbers().none_match(|n| *n < 0)?);

    println!("find_first(): {}", fmt_option(numbers().find_first()?));
    println!("find_any(): {}", fmt_option(numbers().parallel_with(par).find_any()?));

    print!("iterator(): ");
    for n in numbers().iterator()? {
        print!("{n} ");
    }
    println!();
    print!("spliterator(): ");
    numbers().spliterator()?.for_each_remaining(|n| print!("{n} "));
    println!();
    Ok(())
}

fn fmt_option(value: Option<i32>) -> String {
    value.map_or_else(|| "null".to_owned(), |n| n.to_string())
}
