//! Publishing a [`Me`] as environment variables.
//!
//! The properties of Me are placed into the environment according to the
//! following rules:
//!
//! - In general, all variables are prefixed with `MY_` (`MY_IP`, `MY_NAMESPACE`)
//! - Labels become `MY_LABEL_[NAME]=[value]`
//! - Annotations become `MY_ANNOTATION_[NAME]=[value]`
//!
//! Prefer passing [`env_vars`] to a child process over [`shunt_env`], which
//! mutates the environment of the whole process.
use std::collections::BTreeMap;

use crate::me::Me;

pub const ENV_MY_APISERVER: &str = "MY_APISERVER";
pub const ENV_MY_NAME: &str = "MY_NAME";
pub const ENV_MY_IP: &str = "MY_IP";
pub const ENV_MY_NODEIP: &str = "MY_NODEIP";
pub const ENV_MY_NAMESPACE: &str = "MY_NAMESPACE";
pub const ENV_MY_SELFLINK: &str = "MY_SELFLINK";
pub const ENV_MY_UID: &str = "MY_UID";

const LABEL_PREFIX: &str = "MY_LABEL_";
const ANNOTATION_PREFIX: &str = "MY_ANNOTATION_";

/// The environment variables describing `me`.
///
/// Keys that collide once upper-cased (`app` and `APP`) keep the value of the
/// last one in map order.
pub fn env_vars(me: &Me) -> BTreeMap<String, String> {
    let mut env: BTreeMap<String, String> = [
        (ENV_MY_APISERVER, me.api_server.as_str()),
        (ENV_MY_NAME, me.name()),
        (ENV_MY_IP, me.ip.as_str()),
        (ENV_MY_NODEIP, me.node_ip.as_str()),
        (ENV_MY_NAMESPACE, me.namespace.as_str()),
        (ENV_MY_SELFLINK, me.self_link.as_str()),
        (ENV_MY_UID, me.uid.as_str()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in &me.labels {
        env.insert(format!("{LABEL_PREFIX}{}", k.to_uppercase()), v.clone());
    }
    for (k, v) in &me.annotations {
        env.insert(format!("{ANNOTATION_PREFIX}{}", k.to_uppercase()), v.clone());
    }
    env
}

/// Put `me` into the environment of the current process.
pub fn shunt_env(me: &Me) {
    for (k, v) in env_vars(me) {
        std::env::set_var(k, v);
    }
}

/// Render `me` as `export` lines suitable for `eval` in a POSIX shell.
///
/// Label and annotation keys may hold characters such as `.` or `/` that are not
/// valid in shell variable names; those entries are skipped here but are still
/// present in [`env_vars`].
pub fn export_lines(me: &Me) -> String {
    env_vars(me)
        .into_iter()
        .filter(|(k, _)| is_shell_name(k))
        .map(|(k, v)| format!("export {}={}\n", k, shell_quote(&v)))
        .collect()
}

fn is_shell_name(name: &str) -> bool {
    name.chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn me() -> Me {
        let mut me = Me::seeded("https://10.96.0.1:443", "c", "default");
        me.labels.insert("b".to_string(), "b".to_string());
        me.annotations.insert("a".to_string(), "a".to_string());
        me
    }

    #[test]
    fn test_env_vars() {
        let env = env_vars(&me());

        assert_eq!(env.get("MY_LABEL_B").map(String::as_str), Some("b"));
        assert_eq!(env.get("MY_ANNOTATION_A").map(String::as_str), Some("a"));
        assert_eq!(env.get("MY_NAME").map(String::as_str), Some("c"));
        assert_eq!(
            env.get("MY_APISERVER").map(String::as_str),
            Some("https://10.96.0.1:443")
        );
        assert_eq!(env.get("MY_NAMESPACE").map(String::as_str), Some("default"));
        for key in [ENV_MY_IP, ENV_MY_NODEIP, ENV_MY_SELFLINK, ENV_MY_UID] {
            assert_eq!(env.get(key).map(String::as_str), Some(""));
        }
        assert_eq!(env.len(), 9);
    }

    #[test]
    fn test_env_vars_key_collision() {
        let mut me = me();
        me.labels.insert("APP".to_string(), "upper".to_string());
        me.labels.insert("app".to_string(), "lower".to_string());

        let env = env_vars(&me);

        // "APP" sorts before "app", so the lower-case key is written last.
        assert_eq!(env.get("MY_LABEL_APP").map(String::as_str), Some("lower"));
    }

    #[test]
    fn test_shunt_env() {
        let mut me = me();
        // The environment is shared by every test thread, use keys nothing else sets.
        me.labels.insert("shunt_test_label".to_string(), "b".to_string());
        me.annotations
            .insert("shunt_test_annotation".to_string(), "a".to_string());

        shunt_env(&me);

        assert_eq!(std::env::var("MY_LABEL_SHUNT_TEST_LABEL").unwrap(), "b");
        assert_eq!(std::env::var("MY_ANNOTATION_SHUNT_TEST_ANNOTATION").unwrap(), "a");
        assert_eq!(std::env::var("MY_NAME").unwrap(), "c");
    }

    #[test]
    fn test_export_lines() {
        let mut me = me();
        me.labels.insert("app.kubernetes.io/name".to_string(), "x".to_string());
        me.annotations.insert("note".to_string(), "it's here".to_string());

        let lines = export_lines(&me);

        assert!(lines.contains("export MY_NAME='c'\n"));
        assert!(lines.contains("export MY_LABEL_B='b'\n"));
        assert!(lines.contains(r"export MY_ANNOTATION_NOTE='it'\''s here'"));
        assert!(!lines.contains("APP.KUBERNETES.IO/NAME"));
    }
}
