//! Types d'erreurs pour pmodidl

/// Erreurs de lecture/écriture DIDL-Lite
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Le document n'est pas du XML bien formé, ou sa structure ne
    /// correspond pas à un document DIDL-Lite (mode strict).
    #[error("Malformed DIDL-Lite document: {0}")]
    MalformedDocument(String),

    /// La valeur `upnp:class` ne peut être résolue vers aucune classe
    /// connue (parse strict), ou est absente à la sérialisation.
    #[error("Invalid upnp:class: {0}")]
    InvalidClass(String),

    /// Préfixe ou URI de namespace non enregistré.
    #[error("Unknown XML namespace: {0}")]
    UnknownNamespace(String),

    /// Erreur d'émission XML.
    #[error("XML write error: {0}")]
    Write(#[from] xmltree::Error),
}

/// Type Result spécialisé pour pmodidl
pub type Result<T> = std::result::Result<T, Error>;
