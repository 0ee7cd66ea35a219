//! Registre des namespaces XML utilisés par DIDL-Lite
//!
//! Fait correspondre les préfixes courts (`dc`, `upnp`, `dlna`, ...) aux URIs
//! de namespace et inversement. Le parser s'en sert pour expanser les noms
//! qualifiés, le serializer pour ne déclarer sur la racine `DIDL-Lite` que
//! les namespaces réellement utilisés.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// URI du namespace DIDL-Lite (namespace par défaut des documents)
pub const DIDL_LITE_NS: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
/// URI du namespace Dublin Core
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
/// URI du namespace UPnP
pub const UPNP_NS: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
/// URI du namespace DLNA
pub const DLNA_NS: &str = "urn:schemas-dlna-org:metadata-1-0/";
/// URI du namespace vendeur Samsung
pub const SEC_NS: &str = "http://www.sec.co.kr/";
/// URI du namespace vendeur PacketVideo
pub const PV_NS: &str = "http://www.pv.com/pvns/";
/// URI du namespace XML Schema instance
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Table des préfixes bien connus, dans l'ordre de déclaration.
const WELL_KNOWN: &[(&str, &str)] = &[
    ("didl-lite", DIDL_LITE_NS),
    ("dc", DC_NS),
    ("upnp", UPNP_NS),
    ("dlna", DLNA_NS),
    ("sec", SEC_NS),
    ("pv", PV_NS),
    ("xsi", XSI_NS),
];

/// Registre préfixe ↔ URI.
///
/// Pré-rempli avec les namespaces bien connus, extensible par l'appelant pour
/// les namespaces vendeur via [`register`](Self::register). Le registre est en
/// lecture seule après initialisation : si un appelant l'étend pendant que des
/// parse/serialize concurrents le lisent, c'est à lui de sérialiser l'accès.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    by_prefix: IndexMap<String, String>,
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceRegistry {
    /// Registre contenant les namespaces bien connus.
    pub fn new() -> Self {
        let by_prefix = WELL_KNOWN
            .iter()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .collect();
        Self { by_prefix }
    }

    /// Registre vide, sans aucun préfixe.
    pub fn empty() -> Self {
        Self {
            by_prefix: IndexMap::new(),
        }
    }

    /// Enregistre (ou remplace) un préfixe vendeur.
    pub fn register(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.by_prefix.insert(prefix.into(), uri.into());
    }

    /// URI associée à un préfixe.
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Préfixe associé à une URI.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.by_prefix
            .iter()
            .find(|(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Expanse un nom qualifié en `(uri, nom_local)`.
    ///
    /// `expand("dc:title")` donne `(DC_NS, "title")`. Un nom sans préfixe
    /// appartient au namespace par défaut DIDL-Lite.
    pub fn expand<'a>(&'a self, name: &'a str) -> Result<(&'a str, &'a str)> {
        match name.split_once(':') {
            Some((prefix, local)) => {
                let uri = self
                    .uri_for(prefix)
                    .ok_or_else(|| Error::UnknownNamespace(prefix.to_string()))?;
                Ok((uri, local))
            }
            None => Ok((DIDL_LITE_NS, name)),
        }
    }

    /// Replie `(uri, nom_local)` en nom qualifié.
    ///
    /// L'URI DIDL-Lite se replie en nom nu (namespace par défaut du
    /// document), les autres en `prefixe:nom`.
    pub fn collapse(&self, uri: &str, local: &str) -> Result<String> {
        if uri == DIDL_LITE_NS {
            return Ok(local.to_string());
        }
        let prefix = self
            .prefix_for(uri)
            .ok_or_else(|| Error::UnknownNamespace(uri.to_string()))?;
        Ok(format!("{prefix}:{local}"))
    }

    /// Itère sur les paires `(préfixe, uri)` dans l'ordre de déclaration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_prefix.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_prefix() {
        let reg = NamespaceRegistry::new();
        assert_eq!(reg.expand("dc:title").unwrap(), (DC_NS, "title"));
        assert_eq!(reg.expand("upnp:class").unwrap(), (UPNP_NS, "class"));
    }

    #[test]
    fn test_expand_bare_name_is_didl_lite() {
        let reg = NamespaceRegistry::new();
        assert_eq!(reg.expand("res").unwrap(), (DIDL_LITE_NS, "res"));
    }

    #[test]
    fn test_expand_unknown_prefix() {
        let reg = NamespaceRegistry::new();
        let err = reg.expand("vendor:thing").unwrap_err();
        assert!(matches!(err, Error::UnknownNamespace(_)));
    }

    #[test]
    fn test_collapse() {
        let reg = NamespaceRegistry::new();
        assert_eq!(reg.collapse(DC_NS, "title").unwrap(), "dc:title");
        assert_eq!(reg.collapse(DIDL_LITE_NS, "res").unwrap(), "res");
        assert!(matches!(
            reg.collapse("urn:nope", "x").unwrap_err(),
            Error::UnknownNamespace(_)
        ));
    }

    #[test]
    fn test_register_vendor_namespace() {
        let mut reg = NamespaceRegistry::new();
        reg.register("acme", "urn:acme:metadata/");
        assert_eq!(reg.expand("acme:rating").unwrap(), ("urn:acme:metadata/", "rating"));
        assert_eq!(reg.collapse("urn:acme:metadata/", "rating").unwrap(), "acme:rating");
    }
}
