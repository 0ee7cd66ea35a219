//! # pmodidl - Lecture et écriture DIDL-Lite
//!
//! Cette crate convertit dans les deux sens entre documents XML DIDL-Lite
//! (le vocabulaire UPnP/DLNA des serveurs et renderers de médias) et un
//! modèle objet en mémoire : containers, items, ressources et descripteurs.
//!
//! ## Vue d'ensemble
//!
//! - Résolution des chaînes `upnp:class` vers des variantes typées, par plus
//!   long préfixe sur une table statique ([`resolve_class`]).
//! - Propriétés dynamiques : chaque variante connaît sa table de propriétés,
//!   tout le reste est préservé dans un sac d'extras pour que la
//!   resérialisation ne perde pas les extensions vendeur.
//! - Strictness réglable : le mode strict échoue à la première violation, le
//!   mode non strict récupère le maximum face aux firmwares UPnP déviants
//!   (racine absente, classes en mauvaise casse, namespaces manquants).
//! - Aucune coercion de type des valeurs de propriétés : tout est chaîne,
//!   l'appelant convertit dans les deux sens.
//!
//! Le parsing s'appuie sur `xmltree`/`xml-rs`, qui ne résout ni DTD ni
//! entités externes.
//!
//! ## Architecture
//!
//! ```text
//! pmodidl
//!     ├── namespaces.rs - registre préfixe ↔ URI
//!     ├── classes.rs    - table des upnp:class, résolution par préfixe
//!     ├── properties.rs - tables de propriétés par variante, PropertyBag
//!     ├── model.rs      - Item, Container, Resource, Descriptor
//!     ├── parser.rs     - XML → objets (strict / non strict)
//!     └── serializer.rs - objets → XML (namespaces minimaux)
//! ```
//!
//! Parser et serializer sont deux points d'entrée indépendants ; les tables
//! des registres sont construites une fois au démarrage et ne sont plus que
//! lues ensuite, les appels concurrents sont donc sûrs.
//!
//! ## Utilisation
//!
//! ### Lire un document
//!
//! ```rust
//! use pmodidl::parse;
//!
//! # fn main() -> pmodidl::Result<()> {
//! let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
//!     xmlns:dc="http://purl.org/dc/elements/1.1/"
//!     xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
//!   <item id="1" parentID="0" restricted="1">
//!     <dc:title>Test Song</dc:title>
//!     <upnp:class>object.item.audioItem.musicTrack</upnp:class>
//!     <res protocolInfo="http-get:*:audio/mpeg:*">http://example.com/song.mp3</res>
//!   </item>
//! </DIDL-Lite>"#;
//!
//! let objects = parse(xml)?;
//! let item = objects[0].as_item().unwrap();
//! assert_eq!(item.title(), Some("Test Song"));
//! assert_eq!(item.upnp_class(), "object.item.audioItem.musicTrack");
//! # Ok(())
//! # }
//! ```
//!
//! ### Construire et émettre un document
//!
//! ```rust
//! use pmodidl::{DidlObject, Item, ObjectClass, Resource, serialize};
//!
//! # fn main() -> pmodidl::Result<()> {
//! let track = Item::new(ObjectClass::MusicTrack)
//!     .with_id("t1")
//!     .with_parent_id("0")
//!     .with_title("Test Song")
//!     .with_property("upnp:artist", "Test Artist")
//!     .with_resource(Resource::new(
//!         "http://example.com/t.flac",
//!         "http-get:*:audio/flac:*",
//!     ));
//!
//! let xml = serialize(&[DidlObject::Item(track)])?;
//! assert!(xml.contains("<upnp:class>object.item.audioItem.musicTrack</upnp:class>"));
//! # Ok(())
//! # }
//! ```
//!
//! Pour les documents de devices non conformes, [`parse_lenient`] saute les
//! entrées irrécupérables au lieu d'échouer, et [`ParseOptions`] règle
//! l'ordre des rattrapages de classe.

pub mod classes;
pub mod error;
pub mod model;
pub mod namespaces;
pub mod parser;
pub mod properties;
pub mod serializer;

pub use classes::{ClassPolicy, ObjectClass, UpnpClass, resolve_class};
pub use error::{Error, Result};
pub use model::{Container, Descendants, Descriptor, DidlObject, ExtraElement, Item, Resource};
pub use namespaces::{
    DC_NS, DIDL_LITE_NS, DLNA_NS, NamespaceRegistry, PV_NS, SEC_NS, UPNP_NS, XSI_NS,
};
pub use parser::{ParseOptions, parse, parse_element, parse_lenient, parse_with};
pub use properties::{Ns, PropertyBag, PropertyDef, PropertyValue, default_ns_for, properties_of};
pub use serializer::{serialize, serialize_with};
