//! The set of record kinds a process knows how to read.
//!
//! A [`Scheme`] is built once at startup and handed to whatever needs to
//! recognize serialized records. Nothing is registered globally.

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::{
    installation::{Installation, InstallationList},
    meta::TypeMeta,
};

pub const GROUP: &str = "embeddedcluster.replicated.com";
pub const VERSION: &str = "v1beta1";
pub const API_VERSION: &str = "embeddedcluster.replicated.com/v1beta1";

/// A record kind that can be registered in a [`Scheme`].
pub trait Resource {
    const KIND: &'static str;
    const API_VERSION: &'static str = API_VERSION;

    fn type_meta() -> TypeMeta {
        TypeMeta {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
        }
    }
}

/// A registered kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindInfo {
    pub api_version: &'static str,
    pub kind: &'static str,
    /// Rust type name, for diagnostics.
    pub type_name: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Scheme {
    kinds: BTreeMap<(String, String), KindInfo>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: Resource>(&mut self) -> Result<()> {
        let key = (R::API_VERSION.to_string(), R::KIND.to_string());
        if self.kinds.contains_key(&key) {
            bail!("kind already registered: {}, Kind={}", R::API_VERSION, R::KIND);
        }
        self.kinds.insert(
            key,
            KindInfo {
                api_version: R::API_VERSION,
                kind: R::KIND,
                type_name: std::any::type_name::<R>(),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, type_meta: &TypeMeta) -> Option<&KindInfo> {
        self.kinds.get(&(type_meta.api_version.clone(), type_meta.kind.clone()))
    }

    pub fn recognizes(&self, type_meta: &TypeMeta) -> bool {
        self.lookup(type_meta).is_some()
    }

    /// Like [`Self::lookup`], with an error that says what was expected.
    pub fn check(&self, type_meta: &TypeMeta) -> Result<&KindInfo> {
        match self.lookup(type_meta) {
            Some(info) => Ok(info),
            None => bail!(
                "unrecognized record type: apiVersion={:?}, kind={:?}; known kinds: {}",
                type_meta.api_version,
                type_meta.kind,
                self.kinds
                    .values()
                    .map(|k| format!("{}/{}", k.api_version, k.kind))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindInfo> {
        self.kinds.values()
    }
}

/// The scheme for the Installation kinds.
pub fn installation_scheme() -> Result<Scheme> {
    let mut scheme = Scheme::new();
    scheme.register::<Installation>()?;
    scheme.register::<InstallationList>()?;
    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_version_is_group_and_version() {
        assert_eq!(API_VERSION, format!("{}/{}", GROUP, VERSION));
    }

    #[test]
    fn installation_scheme_knows_both_kinds() {
        let scheme = installation_scheme().unwrap();
        let kinds: Vec<_> = scheme.kinds().map(|k| k.kind).collect();
        assert_eq!(kinds, vec!["Installation", "InstallationList"]);
        assert!(scheme.recognizes(&Installation::type_meta()));
        assert!(scheme.recognizes(&InstallationList::type_meta()));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut scheme = installation_scheme().unwrap();
        let err = scheme.register::<Installation>().unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let scheme = installation_scheme().unwrap();
        let other = TypeMeta {
            api_version: API_VERSION.to_string(),
            kind: "Config".to_string(),
        };
        assert!(!scheme.recognizes(&other));
        let err = scheme.check(&other).unwrap_err();
        assert!(err.to_string().contains("kind=\"Config\""));
    }

    #[test]
    fn other_version_is_rejected() {
        let scheme = installation_scheme().unwrap();
        let other = TypeMeta {
            api_version: format!("{}/v1", GROUP),
            kind: "Installation".to_string(),
        };
        assert!(scheme.check(&other).is_err());
    }

    #[test]
    fn empty_scheme_recognizes_nothing() {
        assert!(!Scheme::new().recognizes(&Installation::type_meta()));
    }
}
