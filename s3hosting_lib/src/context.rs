use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_CONTEXT_FILE: &str = "s3hosting.json";

/// Key/value context an invocation runs with. Values come from the context
/// file first, then `key=value` arguments, later ones winning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppContext {
    values: Map<String, Value>,
}

#[derive(Deserialize)]
struct ContextFile {
    #[serde(default)]
    context: Map<String, Value>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// loads `path` if given, otherwise `./s3hosting.json` when it exists.
    /// an explicitly requested file that is missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = PathBuf::from(DEFAULT_CONTEXT_FILE);
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    debug!("no {DEFAULT_CONTEXT_FILE} found, starting with an empty context");
                    Ok(Self::new())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ContextFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: ContextFile = serde_json::from_str(&contents).map_err(|e| Error::ContextFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = ?path, keys = file.context.len(), "loaded context file");
        Ok(Self { values: file.context })
    }

    /// applies one `key=value` argument. the value is parsed as json when
    /// possible, so `-c 'site={"domainName": ...}'` works, otherwise kept as a string.
    pub fn set_arg(&mut self, arg: &str) -> Result<()> {
        let (key, value) = match arg.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => (k.trim(), v),
            _ => return Err(Error::InvalidContextArg(arg.to_string())),
        };
        let value = match serde_json::from_str::<Value>(value) {
            Ok(v @ Value::Object(_)) | Ok(v @ Value::Array(_)) => v,
            _ => Value::String(value.to_string()),
        };
        self.insert(key, value);
        Ok(())
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn try_get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn args_split_on_first_equals() {
        let mut ctx = AppContext::new();
        ctx.set_arg("env=example.com").unwrap();
        ctx.set_arg("query=a=b").unwrap();
        assert_eq!(ctx.try_get("env"), Some(&json!("example.com")));
        assert_eq!(ctx.try_get("query"), Some(&json!("a=b")));
    }

    #[test]
    fn scalars_stay_strings_objects_parse() {
        let mut ctx = AppContext::new();
        ctx.set_arg("n=42").unwrap();
        ctx.set_arg(r#"site={"domainName":"a.io"}"#).unwrap();
        assert_eq!(ctx.try_get("n"), Some(&json!("42")));
        assert_eq!(ctx.try_get("site").unwrap()["domainName"], "a.io");
    }

    #[test]
    fn empty_value_is_allowed_but_empty_key_is_not() {
        let mut ctx = AppContext::new();
        ctx.set_arg("env=").unwrap();
        assert_eq!(ctx.try_get("env"), Some(&json!("")));
        assert!(matches!(ctx.set_arg("=x"), Err(Error::InvalidContextArg(_))));
        assert!(matches!(ctx.set_arg("novalue"), Err(Error::InvalidContextArg(_))));
    }

    #[test]
    fn reads_context_file_and_args_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"app": "x", "context": {{"env": "a.io", "a.io": {{"domainName": "a.io"}}}}}}"#).unwrap();
        let mut ctx = AppContext::load(Some(file.path())).unwrap();
        assert_eq!(ctx.try_get("env"), Some(&json!("a.io")));
        ctx.set_arg("env=b.io").unwrap();
        assert_eq!(ctx.try_get("env"), Some(&json!("b.io")));
        assert_eq!(ctx.try_get("a.io").unwrap()["domainName"], "a.io");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppContext::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::ContextFile { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(AppContext::from_file(file.path()), Err(Error::ContextFile { .. })));
    }
}
