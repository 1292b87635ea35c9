use crate::config::Config;
use crate::demo::Demo;
use crate::err::LpErr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;
mod err;
mod parse;
mod print;

fn main() {
    if let Err(e) = run() {
        e.termination();
    }
}

fn run() -> Result<(), LpErr> {
    let mut args = std::env::args().skip(1).peekable();
    let configs = parse::parse_configs(&mut args)?;
    if configs.contains(&Config::Help) {
        print_help();
        return Ok(());
    }
    if configs.contains(&Config::Version) {
        println!("lp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    init_tracing(configs.contains(&Config::Verbose));
    let demos = parse::parse_demos(args)?;
    let configs: &'static [Config] = configs.leak();
    for demo in demos {
        crate::println_info!("========== {} ==========", demo.name());
        demo.run(configs)?;
        println!();
    }
    Ok(())
}

/// 日志输出到标准错误，`RUST_LOG`优先于`-v`。
fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("lp [-h] [-V] [-v] [-w <workers>] [-b <batch>] [<demo>...]");
    println!("    -h              打印帮助信息。");
    println!("    -V              打印版本。");
    println!("    -v              输出调试日志。");
    println!("    -w <workers>    并行工作任务数，必须为正数，默认为rayon线程数。");
    println!("    -b <batch>      并行批次大小，必须为正数，默认为{}。", lazypipe::DEFAULT_BATCH_SIZE);
    println!("    <demo>          需要运行的演示，未指定时运行全部演示：");
    for (_, help) in Demo::all_help() {
        for line in help.lines() {
            println!("        {}", line.strip_prefix(' ').unwrap_or(line));
        }
    }
}
