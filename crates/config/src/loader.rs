use std::{fmt::Write, path::Path, str::FromStr};

use anyhow::{Context, bail};
use indoc::indoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::Config;

/// Fields that may point to an unset environment variable. They are dropped
/// instead of failing the load, so the command line can still provide them.
const OPTIONAL_ENV_FIELDS: &[&str] = &["relay.api_key", "relay.base_url"];

pub(crate) fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    parse(&content)
}

pub(crate) fn parse(content: &str) -> anyhow::Result<Config> {
    let mut raw_config: Value = toml::from_str(content)?;
    let mut unresolved = Vec::new();

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config, &mut unresolved)?;

    for field in unresolved {
        remove_field(&mut raw_config, &field);
    }

    let config = Config::deserialize(raw_config)?;

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    if !config.relay.has_api_key() {
        bail!(indoc! {r#"
            No upstream API key configured. The relay needs a credential to call the completion API.

            Set the GROQ_API_KEY environment variable, pass --api-key, or add it to the configuration file:

              [relay]
              api_key = "{{ env.GROQ_API_KEY }}"
        "#});
    }

    if !config.relay.path.starts_with('/') {
        bail!("relay.path must start with '/', got '{}'", config.relay.path);
    }

    if config.server.health.enabled && !config.server.health.path.starts_with('/') {
        bail!(
            "server.health.path must start with '/', got '{}'",
            config.server.health.path
        );
    }

    Ok(())
}

fn expand_dynamic_strings<'a>(
    path: &mut Vec<Result<&'a str, usize>>,
    value: &'a mut Value,
    unresolved: &mut Vec<String>,
) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let p = render_path(path);

                if OPTIONAL_ENV_FIELDS.contains(&p.as_str()) {
                    log::warn!("Ignoring '{p}' from the configuration file: {err}");
                    unresolved.push(p);
                } else {
                    bail!("Failed to expand dynamic string at path '{p}': {err}");
                }
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value, unresolved)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value, unresolved)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

fn render_path(path: &[Result<&str, usize>]) -> String {
    let mut p = String::new();

    for segment in path {
        match segment {
            Ok(s) => {
                if !p.is_empty() {
                    p.push('.');
                }

                p.push_str(s);
            }
            Err(i) => {
                let _ = write!(p, "[{i}]");
            }
        }
    }

    p
}

fn remove_field(config: &mut Value, path: &str) {
    let Some((parents, last)) = path.rsplit_once('.') else {
        if let Some(table) = config.as_table_mut() {
            table.remove(path);
        }

        return;
    };

    let mut current = config;

    for part in parents.split('.') {
        match current.as_table_mut().and_then(|table| table.get_mut(part)) {
            Some(value) => current = value,
            None => return,
        }
    }

    if let Some(table) = current.as_table_mut() {
        table.remove(last);
    }
}
