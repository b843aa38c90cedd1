//! Export format rendering.
//!
//! Pure helpers turning decrypted (secret, value) pairs into shell exports,
//! dotenv lines, or a JSON object.

use clap::ValueEnum;

/// Output format for `covert export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportFormat {
    /// Shell export format: `export VAR=value`
    #[default]
    Env,
    /// Dotenv format: `VAR=value`
    Dotenv,
    /// JSON object: `{"VAR": "value"}`
    Json,
}

/// Convert a secret path to an environment variable name.
///
/// `database/password` becomes `DATABASE_PASSWORD`.
pub fn env_var_name(secret: &str) -> String {
    secret
        .to_uppercase()
        .replace(['/', '-', '.'], "_")
}

/// Quote a value for safe use in shell `export` lines.
pub fn shell_quote(value: &str) -> String {
    const SPECIAL: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '$', '`', '\\', '!', '#', '&', '|', ';', '<', '>', '(', ')',
        '{', '}', '[', ']',
    ];
    if !value.contains(SPECIAL) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// Render pairs in the requested format, prefixing each variable name.
pub fn render(format: ExportFormat, prefix: &str, pairs: &[(String, String)]) -> String {
    match format {
        ExportFormat::Env => pairs
            .iter()
            .map(|(secret, value)| {
                format!(
                    "export {}{}={}\n",
                    prefix,
                    env_var_name(secret),
                    shell_quote(value)
                )
            })
            .collect(),
        ExportFormat::Dotenv => pairs
            .iter()
            .map(|(secret, value)| format!("{}{}={}\n", prefix, env_var_name(secret), value))
            .collect(),
        ExportFormat::Json => {
            let mut object = serde_json::Map::new();
            for (secret, value) in pairs {
                object.insert(
                    format!("{}{}", prefix, env_var_name(secret)),
                    serde_json::Value::String(value.clone()),
                );
            }
            // Map serialization cannot fail
            let mut rendered = serde_json::to_string_pretty(&object).unwrap_or_default();
            rendered.push('\n');
            rendered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(String, String)> {
        vec![
            ("database/password".to_string(), "p@ss word".to_string()),
            ("api-key".to_string(), "plain".to_string()),
        ]
    }

    #[test]
    fn env_var_names() {
        assert_eq!(env_var_name("database/password"), "DATABASE_PASSWORD");
        assert_eq!(env_var_name("api-key"), "API_KEY");
        assert_eq!(env_var_name("a.b/c-d"), "A_B_C_D");
    }

    #[test]
    fn shell_quoting() {
        assert_eq!(shell_quote("plain"), "plain");
        assert_eq!(shell_quote("has space"), "'has space'");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
        assert_eq!(shell_quote("$HOME"), "'$HOME'");
    }

    #[test]
    fn renders_env_format() {
        let out = render(ExportFormat::Env, "", &pairs());
        assert!(out.contains("export DATABASE_PASSWORD='p@ss word'\n"));
        assert!(out.contains("export API_KEY=plain\n"));
    }

    #[test]
    fn renders_dotenv_with_prefix() {
        let out = render(ExportFormat::Dotenv, "APP_", &pairs());
        assert!(out.contains("APP_DATABASE_PASSWORD=p@ss word\n"));
        assert!(out.contains("APP_API_KEY=plain\n"));
    }

    #[test]
    fn renders_valid_json() {
        let out = render(ExportFormat::Json, "", &pairs());
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["DATABASE_PASSWORD"], "p@ss word");
        assert_eq!(parsed["API_KEY"], "plain");
    }
}
