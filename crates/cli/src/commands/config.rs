use std::env;
use std::fs;
use std::path::Path;

use customers_core::config::{env_key, resolve_config_path, AppConfig, LoadOptions, SETTINGS};
use toml::Value;

use crate::commands::{CommandFailure, CommandResult, FailureClass};

pub fn run() -> CommandResult {
    CommandResult::from_outcome("config", describe())
}

fn describe() -> Result<String, CommandFailure> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        let message = format!("config validation failed: {error}");
        CommandFailure::new(FailureClass::ConfigValidation, message)
    })?;

    let file = resolve_config_path(None);
    let file_doc = file.as_deref().and_then(read_doc);

    let mut lines = vec!["effective config (env > file > default):".to_string()];
    for setting in SETTINGS {
        let value = config.setting(setting).unwrap_or_default();
        let source = source_of(setting, file.as_deref(), file_doc.as_ref());
        lines.push(format!("- {setting} = {value} (source: {source})"));
    }
    Ok(lines.join("\n"))
}

fn source_of(setting: &str, file: Option<&Path>, file_doc: Option<&Value>) -> String {
    let key = env_key(setting);
    if env::var(&key).is_ok_and(|value| !value.trim().is_empty()) {
        return format!("env ({key})");
    }

    match (file, file_doc) {
        (Some(path), Some(doc)) if lookup(doc, setting).is_some() => {
            format!("file ({})", path.display())
        }
        _ => "default".to_string(),
    }
}

fn read_doc(path: &Path) -> Option<Value> {
    fs::read_to_string(path).ok()?.parse().ok()
}

fn lookup<'a>(doc: &'a Value, setting: &str) -> Option<&'a Value> {
    setting.split('.').try_fold(doc, |table, key| table.get(key))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{lookup, source_of};

    #[test]
    fn lookup_follows_dotted_setting_names() {
        let doc: Value = "[server]\nport = 9000\n".parse().expect("toml");

        assert_eq!(lookup(&doc, "server.port").and_then(Value::as_integer), Some(9000));
        assert!(lookup(&doc, "server.bind_address").is_none());
        assert!(lookup(&doc, "database.url").is_none());
    }

    #[test]
    fn file_source_requires_the_key_in_the_document() {
        let doc: Value = "[logging]\nlevel = \"warn\"\n".parse().expect("toml");
        let path = Path::new("customers.toml");

        assert_eq!(source_of("logging.level", Some(path), Some(&doc)), "file (customers.toml)");
        assert_eq!(source_of("logging.format", Some(path), Some(&doc)), "default");
    }
}
