use crate::config::{Config, par_config};
use crate::demo::{fmt_float_list, fmt_list};
use crate::err::LpErr;
use lazypipe::{IntoPipe, Pipe};
use rand::Rng;
use std::collections::BTreeMap;

pub(crate) fn run(configs: &'static [Config]) -> Result<(), LpErr> {
    // 流水线只能使用一次，每个示例都重新创建
    let list = vec!["a", "b", "c"];
    println!("Sequential Pipe: {}", fmt_list(&Pipe::of(list.clone()).to_list()?));
    println!();

    let mut parallel = list.into_pipe().parallel_with(par_config(configs));
    println!("Parallel Pipe: {}", fmt_list(&parallel.to_list()?));
    println!();

    let array = ["x", "y", "z"];
    println!("Array Pipe: {}", fmt_list(&Pipe::of(array).to_list()?));
    println!();

    // 映射本身不是序列，需要分别取键、值或键值对
    let map = BTreeMap::from([(1, "one"), (2, "two"), (3, "three")]);
    println!("Map Keys Pipe: {}", fmt_list(&Pipe::of(map.clone().into_keys()).to_list()?));
    println!();
    println!("Map Values Pipe: {}", fmt_list(&Pipe::of(map.clone().into_values()).to_list()?));
    println!();
    let entries = Pipe::of(map).map(|(key, value)| format!("{key}={value}")).to_list()?;
    println!("Map Entries Pipe: {}", fmt_list(&entries));
    println!();

    println!("Fixed Pipe (Pipe::of): {}", fmt_list(&Pipe::of(["p", "q", "r"]).to_list()?));
    println!();

    println!("of_nullable (some): {}", fmt_list(&Pipe::of_nullable(Some("not null")).to_list()?));
    println!("of_nullable (none): {}", fmt_list(&Pipe::<&str>::of_nullable(None).to_list()?));
    println!();

    println!("Empty Pipe: {}", fmt_list(&Pipe::<String>::empty().to_list()?));
    println!();

    // 无限数据源，必须通过limit等短路操作截断
    let generated = Pipe::generate(rand::random::<f64>).limit(3)?.to_list()?;
    println!("Generated Pipe (limited): {}", fmt_float_list(&generated));
    println!();

    let iterated = Pipe::iterate(1, |n| n + 1).limit(5)?.to_list()?;
    println!("Iterated Pipe (limited): {}", fmt_list(&iterated));
    println!();

    let finite = Pipe::iterate_while(1, |n| *n <= 5, |n| n + 1).to_list()?;
    println!("Finite Iterated Pipe (iterate_while): {}", fmt_list(&finite));
    println!();

    let mut concatenated = Pipe::concat(Pipe::of(["A", "B"]), Pipe::of(["C", "D"]));
    println!("Concatenated Pipe: {}", fmt_list(&concatenated.to_list()?));
    println!();

    let add_extra = rand::rng().random::<bool>();
    let mut builder = Pipe::builder().add("build1");
    if add_extra {
        builder.accept("build-extra");
    }
    builder.accept("build2");
    println!("Built Pipe (conditional builder): {}", fmt_list(&builder.build().to_list()?));
    Ok(())
}
