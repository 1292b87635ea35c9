use lazypipe::ParConfig;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Config {
    /// 帮助 `-h`
    Help,
    /// 版本 `-V`
    Version,
    /// 输出调试日志 `-v`
    Verbose,
    /// 并行工作任务数 `-w <workers>`
    Workers(usize),
    /// 并行批次大小 `-b <batch>`
    Batch(usize),
}

/// 演示中并行流水线使用的配置，同一选项出现多次时以最后一次为准。
pub(crate) fn par_config(configs: &[Config]) -> ParConfig {
    configs.iter().fold(ParConfig::new(), |par, config| match config {
        Config::Workers(workers) => par.workers(*workers),
        Config::Batch(batch) => par.batch_size(*batch),
        _ => par,
    })
}
