//! CLI 参数与交互命令
//!
//! 参数由 clap 解析；每行 stdin 由 `Command::parse` 区分为普通查询或 `:` 开头的命令。

use std::path::PathBuf;

use clap::Parser;

/// 多智能体编排：知识检索 → SQL 生成 → 代码生成
#[derive(Parser, Debug)]
#[command(name = "consilium", version, about)]
pub struct CliArgs {
    /// 会话 id；不填时生成一个随机 id
    #[arg(long = "conversation")]
    pub conversation: Option<String>,

    /// 额外的配置文件，叠加在 config/default.toml 之上
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    pub fn resolve_conversation_id(&self) -> String {
        self.conversation
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

/// 一行输入对应的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:clear`
    Clear,
    /// `:history`
    History,
    /// `:graphql <query>`：单独咨询 GraphQL 专家
    Graphql(String),
    /// 其余非空行：跑完整流水线
    Query(String),
}

impl Command {
    /// 空行返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line {
            ":clear" => Some(Command::Clear),
            ":history" => Some(Command::History),
            _ => match line.strip_prefix(":graphql") {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    Some(Command::Graphql(rest.trim().to_string()))
                }
                _ => Some(Command::Query(line.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_flags_in_both_forms() {
        let args = CliArgs::try_parse_from(["consilium", "--conversation=abc", "--config", "x.toml"]).unwrap();
        assert_eq!(args.conversation.as_deref(), Some("abc"));
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
        assert_eq!(args.resolve_conversation_id(), "abc");
    }

    #[test]
    fn test_defaults_generate_conversation_id() {
        let args = CliArgs::try_parse_from(["consilium"]).unwrap();
        assert!(args.config.is_none());
        let id = args.resolve_conversation_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_help_and_unknown_flags() {
        let err = CliArgs::try_parse_from(["consilium", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = CliArgs::try_parse_from(["consilium", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse(":clear"), Some(Command::Clear));
        assert_eq!(Command::parse(" :history "), Some(Command::History));
        assert_eq!(
            Command::parse(":graphql  users with orders"),
            Some(Command::Graphql("users with orders".to_string()))
        );
        assert_eq!(
            Command::parse(":graphqlish"),
            Some(Command::Query(":graphqlish".to_string()))
        );
        assert_eq!(
            Command::parse("list users"),
            Some(Command::Query("list users".to_string()))
        );
    }
}
