use crate::config::{Config, par_config};
use crate::demo::fmt_list;
use crate::err::LpErr;
use lazypipe::{IntoPipe, Pipe};

const NUMBERS: [i32; 5] = [1, 2, 3, 4, 5];

pub(crate) fn run(configs: &'static [Config]) -> Result<(), LpErr> {
    let par = par_config(configs);

    let sequential = Pipe::of(NUMBERS);
    let parallel = sequential.parallel_with(par);
    println!("Is parallel? {}", parallel.is_parallel());
    let back_to_sequential = parallel.sequential();
    println!("Is parallel after sequential()? {}", back_to_sequential.is_parallel());

    // 只是提示，结果可能仍然保持原有顺序
    let unordered = Pipe::of(NUMBERS).unordered().parallel_with(par).map(|n| n * 2).to_list()?;
    println!("Unordered result (parallel map x2): {}", fmt_list(&unordered));

    println!("Sequential pipe is_parallel? {}", Pipe::of(NUMBERS).is_parallel());
    println!("Parallel pipe is_parallel? {}", NUMBERS.into_pipe().parallel_with(par).is_parallel());

    print!("Iterator: ");
    for n in Pipe::of(NUMBERS).iterator()? {
        print!("{n} ");
    }
    println!();
    print!("Spliterator: ");
    Pipe::of(NUMBERS).spliterator()?.for_each_remaining(|n| print!("{n} "));
    println!();

    // 结果取出后关闭，关闭钩子只执行一次
    let mut closable = Pipe::of(NUMBERS).on_close(|| println!("Pipe closed!"));
    let result = closable.to_list()?;
    println!("Closable pipe result: {}", fmt_list(&result));
    closable.close();
    Ok(())
}
