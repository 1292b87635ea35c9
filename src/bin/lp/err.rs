use lazypipe::PipeErr;
use std::process::{ExitCode, Termination};
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub(crate) enum LpErr {
    #[error(transparent)]
    Pipe(#[from] PipeErr),

    #[error("[Missing Arg] Missing argument `{arg}` of cmd `{cmd}`")]
    MissingArg { cmd: &'static str, arg: &'static str },

    #[error("[Arg Parse Err] Unable to parse `{arg_value}` in argument `{arg}` of cmd `{cmd}`, error: {error}")]
    ArgParseErr { cmd: &'static str, arg: &'static str, arg_value: String, error: String },

    #[error("[Bad Arg] Unknown demo `{0}`, see `-h` for all demos")]
    UnknownDemo(String),
}

impl Termination for LpErr {
    fn report(self) -> ExitCode {
        crate::println_err!("{}", self);
        ExitCode::from(self.exit_code())
    }
}

impl LpErr {
    pub(crate) fn termination(self) -> ! {
        let exit_code = self.exit_code();
        self.report();
        std::process::exit(exit_code as i32);
    }

    fn exit_code(&self) -> u8 {
        match self {
            LpErr::MissingArg { .. } => 1,
            LpErr::ArgParseErr { .. } => 2,
            LpErr::UnknownDemo(_) => 3,
            // 流水线错误从10开始编号
            LpErr::Pipe(err) => 10 + err.code(),
        }
    }
}
