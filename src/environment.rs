//! Container environment metadata extraction

use std::collections::HashMap;

/// Key carrying the logical service name of a container
pub const SERVICE_NAME_KEY: &str = "SERVICE_NAME";

/// Key carrying the deployed application revision
pub const APP_REVISION_KEY: &str = "APP_REVISION";

/// Variable name to value mapping built from a container's `KEY=VALUE` list.
///
/// Later entries win over earlier ones with the same key. Entries without an
/// `=` are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentIndex {
    vars: HashMap<String, String>,
}

impl EnvironmentIndex {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value for `key`, treating an empty value as absent
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn service_name(&self) -> Option<&str> {
        self.non_empty(SERVICE_NAME_KEY)
    }

    pub fn app_revision(&self) -> Option<&str> {
        self.non_empty(APP_REVISION_KEY)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for EnvironmentIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vars = HashMap::new();

        for entry in iter {
            if let Some((key, value)) = entry.as_ref().split_once('=') {
                vars.insert(key.to_string(), value.to_string());
            }
        }

        Self { vars }
    }
}

/// Build an [`EnvironmentIndex`] from raw `KEY=VALUE` strings
pub fn extract<S: AsRef<str>>(env: &[S]) -> EnvironmentIndex {
    env.iter().collect()
}
