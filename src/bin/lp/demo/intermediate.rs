use crate::config::Config;
use crate::demo::fmt_list;
use crate::err::LpErr;
use lazypipe::Pipe;

const NUMBERS: [i32; 7] = [1, 2, 3, 4, 5, 2, 3];

fn numbers() -> Pipe<i32> {
    Pipe::of(NUMBERS)
}

pub(crate) fn run(_configs: &'static [Config]) -> Result<(), LpErr> {
    println!("Original List: {}", fmt_list(&NUMBERS));

    println!("Filter even numbers: {}", fmt_list(&numbers().filter(|n| n % 2 == 0).to_list()?));

    println!("Squared numbers: {}", fmt_list(&numbers().map(|n| n * n).to_list()?));
    println!("Numeric sum: {}", numbers().sum()?);

    let lists = vec![vec![1, 2], vec![3, 4], vec![5]];
    println!("Flattened list: {}", fmt_list(&Pipe::of(lists).flat_map(|list| list).to_list()?));

    println!("Distinct numbers: {}", fmt_list(&numbers().distinct().to_list()?));

    println!("Sorted numbers: {}", fmt_list(&numbers().sorted().to_list()?));
    println!("Reverse sorted numbers: {}", fmt_list(&numbers().sorted_by(|a, b| b.cmp(a)).to_list()?));

    println!("Limited (first 3): {}", fmt_list(&numbers().limit(3)?.to_list()?));
    println!("Skipped first 2: {}", fmt_list(&numbers().skip(2)?.to_list()?));

    println!("take_while < 4: {}", fmt_list(&numbers().take_while(|n| *n < 4).to_list()?));
    println!("drop_while < 4: {}", fmt_list(&numbers().drop_while(|n| *n < 4).to_list()?));

    let multi = Pipe::of(["a", "b", "c"])
        .map_multi(|s, emit| {
            emit(format!("{s}1"));
            emit(format!("{s}2"));
        })
        .to_list()?;
    println!("map_multi result: {}", fmt_list(&multi));

    // peek在终止操作拉取时才执行，与下游交替进行
    let peeked = numbers().peek(|n| println!("Peek: {n}")).map(|n| n * 10).to_list()?;
    println!("After peek & multiply by 10: {}", fmt_list(&peeked));
    Ok(())
}
