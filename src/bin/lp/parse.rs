use crate::config::Config;
use crate::demo::Demo;
use crate::err::LpErr;
use std::iter::Peekable;

/// 解析开头的选项，遇到非选项参数时停止。
pub(crate) fn parse_configs(args: &mut Peekable<impl Iterator<Item = String>>) -> Result<Vec<Config>, LpErr> {
    let mut configs = Vec::new();
    while let Some(arg) = args.peek().cloned() {
        let config = match arg.as_str() {
            "-h" => Config::Help,
            "-V" => Config::Version,
            "-v" => Config::Verbose,
            "-w" => {
                args.next();
                Config::Workers(parse_positive(args.next(), "-w", "workers")?)
            }
            "-b" => {
                args.next();
                Config::Batch(parse_positive(args.next(), "-b", "batch")?)
            }
            _ => break, // 剩余参数均为演示名称
        };
        if matches!(config, Config::Help | Config::Version | Config::Verbose) {
            args.next();
        }
        configs.push(config);
    }
    Ok(configs)
}

/// 解析演示名称，未指定时为全部演示。
pub(crate) fn parse_demos(args: impl Iterator<Item = String>) -> Result<Vec<Demo>, LpErr> {
    let demos = args.map(|name| Demo::from_name(&name).ok_or(LpErr::UnknownDemo(name))).collect::<Result<Vec<_>, _>>()?;
    Ok(if demos.is_empty() { Demo::ALL.to_vec() } else { demos })
}

fn parse_positive(value: Option<String>, cmd: &'static str, arg: &'static str) -> Result<usize, LpErr> {
    let Some(value) = value else {
        return Err(LpErr::MissingArg { cmd, arg });
    };
    match value.parse::<usize>() {
        Ok(0) => Err(LpErr::ArgParseErr { cmd, arg, arg_value: value, error: "must be positive".to_owned() }),
        Ok(n) => Ok(n),
        Err(err) => Err(LpErr::ArgParseErr { cmd, arg, arg_value: value, error: err.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Peekable<std::vec::IntoIter<String>> {
        args.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter().peekable()
    }

    #[test]
    fn test_parse_configs() {
        let mut args = args(&["-v", "-w", "4", "-b", "16", "terminal"]);
        assert_eq!(parse_configs(&mut args), Ok(vec![Config::Verbose, Config::Workers(4), Config::Batch(16)]));
        assert_eq!(args.next(), Some("terminal".to_owned()));
    }

    #[test]
    fn test_parse_configs_stop_at_demo() {
        let mut args = args(&["parallel", "-v"]);
        assert_eq!(parse_configs(&mut args), Ok(vec![]));
        assert_eq!(args.count(), 2);
    }

    #[test]
    fn test_parse_configs_bad_value() {
        assert_eq!(parse_configs(&mut args(&["-w"])), Err(LpErr::MissingArg { cmd: "-w", arg: "workers" }));
        assert_eq!(
            parse_configs(&mut args(&["-b", "0"])),
            Err(LpErr::ArgParseErr {
                cmd: "-b",
                arg: "batch",
                arg_value: "0".to_owned(),
                error: "must be positive".to_owned()
            })
        );
        assert!(matches!(parse_configs(&mut args(&["-w", "x"])), Err(LpErr::ArgParseErr { cmd: "-w", .. })));
    }

    #[test]
    fn test_parse_demos() {
        assert_eq!(parse_demos(args(&[])), Ok(Demo::ALL.to_vec()));
        assert_eq!(
            parse_demos(args(&["short_circuit", "primitive"])),
            Ok(vec![Demo::ShortCircuit, Demo::Primitive])
        );
        assert_eq!(parse_demos(args(&["creation", "nope"])), Err(LpErr::UnknownDemo("nope".to_owned())));
    }
}
