//! Interactive prompts for connection values missing from flags and config.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Password, Select};
use schema_doc::{Config, EngineKind, IntrospectError, JdbcUrl};

type PromptResult<T> = Result<T, IntrospectError>;

/// Answer preselected for "Connect with a JDBC URL?".
const JDBC_FIRST_DEFAULT: bool = true;

const ENGINES: [EngineKind; 3] = [EngineKind::Mysql, EngineKind::Postgres, EngineKind::PgCatalog];

/// Prompt only on an interactive terminal and when not disabled.
pub fn should_prompt(no_prompt: bool) -> bool {
    !no_prompt && std::io::stdin().is_terminal()
}

/// Ask for every required connection value that is still empty.
pub fn fill_missing(config: &mut Config) -> PromptResult<()> {
    let conn = &config.connection;
    let nothing_given = conn.host.is_empty() && conn.database.is_empty();

    if nothing_given {
        let use_jdbc = Confirm::new()
            .with_prompt("Connect with a JDBC URL?")
            .default(JDBC_FIRST_DEFAULT)
            .interact()
            .map_err(prompt_error)?;

        if use_jdbc {
            let url: String = Input::new()
                .with_prompt("  JDBC URL")
                .interact_text()
                .map_err(prompt_error)?;
            config.apply_jdbc(&JdbcUrl::parse(url.trim())?);
        } else {
            let selection = Select::new()
                .with_prompt("  Engine")
                .items(&ENGINES.map(|e| e.as_str()))
                .default(0)
                .interact()
                .map_err(prompt_error)?;
            config.connection.engine = ENGINES[selection];
        }
    }

    let conn = &mut config.connection;

    if conn.host.is_empty() {
        let answer: String = Input::new()
            .with_prompt("  Host")
            .default("localhost".to_string())
            .interact_text()
            .map_err(prompt_error)?;
        let (host, port) = split_host_port(&answer);
        conn.host = host;
        if port.is_some() {
            conn.port = port;
        }
    }

    if conn.database.is_empty() {
        conn.database = Input::new()
            .with_prompt("  Database")
            .interact_text()
            .map_err(prompt_error)?;
    }

    if conn.user.is_empty() {
        conn.user = Input::new()
            .with_prompt("  User")
            .interact_text()
            .map_err(prompt_error)?;
    }

    if conn.password.is_empty() {
        conn.password = Password::new()
            .with_prompt("  Password")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?;
    }

    Ok(())
}

/// Split `host:port`; a suffix that is not a port stays part of the host.
fn split_host_port(answer: &str) -> (String, Option<u16>) {
    let answer = answer.trim();
    match answer.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (answer.to_string(), None),
        },
        _ => (answer.to_string(), None),
    }
}

fn prompt_error(e: dialoguer::Error) -> IntrospectError {
    IntrospectError::Config(format!("Prompt failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("db.local:3307"), ("db.local".to_string(), Some(3307)));
        assert_eq!(split_host_port("db.local"), ("db.local".to_string(), None));
        assert_eq!(split_host_port(" pg:5432 "), ("pg".to_string(), Some(5432)));
    }

    #[test]
    fn test_split_host_port_invalid_port_kept() {
        assert_eq!(split_host_port("db:abc"), ("db:abc".to_string(), None));
        assert_eq!(split_host_port(":5432"), (":5432".to_string(), None));
    }

    #[test]
    fn test_jdbc_question_defaults_to_yes() {
        assert!(JDBC_FIRST_DEFAULT);
    }

    #[test]
    fn test_no_prompt_flag_disables() {
        assert!(!should_prompt(true));
    }
}
