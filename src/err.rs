use thiserror::Error;

/// 流水线错误，均为调用方误用，直接返回给调用方，不做任何重试或恢复。
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PipeErr {
    #[error("[Consumed] Pipe has already been operated upon or closed")]
    AlreadyConsumed,

    #[error("[Bad Arg] Invalid value `{value}` for argument `{arg}` of op `{op}`")]
    InvalidArgument { op: &'static str, arg: &'static str, value: String },

    #[error("[Empty] Op `{op}` requires at least one element")]
    EmptySequence { op: &'static str },
}

impl PipeErr {
    /// 用于命令行退出码，按变体顺序编号。
    pub fn code(&self) -> u8 {
        match self {
            PipeErr::AlreadyConsumed => 1,
            PipeErr::InvalidArgument { .. } => 2,
            PipeErr::EmptySequence { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PipeErr::AlreadyConsumed.to_string(), "[Consumed] Pipe has already been operated upon or closed");
        assert_eq!(
            PipeErr::InvalidArgument { op: "limit", arg: "count", value: "-1".to_owned() }.to_string(),
            "[Bad Arg] Invalid value `-1` for argument `count` of op `limit`"
        );
        assert_eq!(PipeErr::EmptySequence { op: "min" }.to_string(), "[Empty] Op `min` requires at least one element");
    }

    #[test]
    fn test_code_is_distinct() {
        let codes = [
            PipeErr::AlreadyConsumed.code(),
            PipeErr::InvalidArgument { op: "", arg: "", value: String::new() }.code(),
            PipeErr::EmptySequence { op: "" }.code(),
        ];
        assert_eq!(codes, [1, 2, 3]);
    }
}
