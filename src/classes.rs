//! Classes d'objets UPnP et résolution des chaînes `upnp:class`
//!
//! Une chaîne `upnp:class` est un chemin hiérarchique séparé par des points
//! (ex: `object.item.audioItem.musicTrack`). La résolution se fait par
//! correspondance du plus long préfixe sur une table statique construite au
//! démarrage, jamais par chaîne de tests de types.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Variantes d'objets DIDL connues, une par `upnp:class` de la spécification
/// ContentDirectory, plus la variante de repli [`Unknown`](Self::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    // items
    Item,
    ImageItem,
    Photo,
    AudioItem,
    MusicTrack,
    AudioBroadcast,
    AudioBook,
    VideoItem,
    Movie,
    VideoBroadcast,
    MusicVideoClip,
    PlaylistItem,
    TextItem,
    BookmarkItem,
    EpgItem,
    AudioProgram,
    VideoProgram,
    // containers
    Container,
    Person,
    MusicArtist,
    PlaylistContainer,
    Album,
    MusicAlbum,
    PhotoAlbum,
    Genre,
    MusicGenre,
    MovieGenre,
    ChannelGroup,
    AudioChannelGroup,
    VideoChannelGroup,
    EpgContainer,
    StorageSystem,
    StorageVolume,
    StorageFolder,
    BookmarkFolder,
    /// Classe inconnue, acceptée en mode non strict uniquement.
    Unknown,
}

/// Table statique classe → variante, dans l'ordre de la spécification.
const CLASS_TABLE: &[(&str, ObjectClass)] = &[
    ("object.item", ObjectClass::Item),
    ("object.item.imageItem", ObjectClass::ImageItem),
    ("object.item.imageItem.photo", ObjectClass::Photo),
    ("object.item.audioItem", ObjectClass::AudioItem),
    ("object.item.audioItem.musicTrack", ObjectClass::MusicTrack),
    ("object.item.audioItem.audioBroadcast", ObjectClass::AudioBroadcast),
    ("object.item.audioItem.audioBook", ObjectClass::AudioBook),
    ("object.item.videoItem", ObjectClass::VideoItem),
    ("object.item.videoItem.movie", ObjectClass::Movie),
    ("object.item.videoItem.videoBroadcast", ObjectClass::VideoBroadcast),
    ("object.item.videoItem.musicVideoClip", ObjectClass::MusicVideoClip),
    ("object.item.playlistItem", ObjectClass::PlaylistItem),
    ("object.item.textItem", ObjectClass::TextItem),
    ("object.item.bookmarkItem", ObjectClass::BookmarkItem),
    ("object.item.epgItem", ObjectClass::EpgItem),
    ("object.item.epgItem.audioProgram", ObjectClass::AudioProgram),
    ("object.item.epgItem.videoProgram", ObjectClass::VideoProgram),
    ("object.container", ObjectClass::Container),
    ("object.container.person", ObjectClass::Person),
    ("object.container.person.musicArtist", ObjectClass::MusicArtist),
    ("object.container.playlistContainer", ObjectClass::PlaylistContainer),
    ("object.container.album", ObjectClass::Album),
    ("object.container.album.musicAlbum", ObjectClass::MusicAlbum),
    ("object.container.album.photoAlbum", ObjectClass::PhotoAlbum),
    ("object.container.genre", ObjectClass::Genre),
    ("object.container.genre.musicGenre", ObjectClass::MusicGenre),
    ("object.container.genre.movieGenre", ObjectClass::MovieGenre),
    ("object.container.channelGroup", ObjectClass::ChannelGroup),
    (
        "object.container.channelGroup.audioChannelGroup",
        ObjectClass::AudioChannelGroup,
    ),
    (
        "object.container.channelGroup.videoChannelGroup",
        ObjectClass::VideoChannelGroup,
    ),
    ("object.container.epgContainer", ObjectClass::EpgContainer),
    ("object.container.storageSystem", ObjectClass::StorageSystem),
    ("object.container.storageVolume", ObjectClass::StorageVolume),
    ("object.container.storageFolder", ObjectClass::StorageFolder),
    ("object.container.bookmarkFolder", ObjectClass::BookmarkFolder),
];

impl ObjectClass {
    /// Chaîne `upnp:class` canonique de la variante.
    pub fn canonical(self) -> &'static str {
        if self == ObjectClass::Unknown {
            return "object";
        }
        CLASS_TABLE
            .iter()
            .find(|(_, oc)| *oc == self)
            .map(|(s, _)| *s)
            .unwrap_or("object")
    }

    /// Vrai pour les variantes container.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ObjectClass::Container
                | ObjectClass::Person
                | ObjectClass::MusicArtist
                | ObjectClass::PlaylistContainer
                | ObjectClass::Album
                | ObjectClass::MusicAlbum
                | ObjectClass::PhotoAlbum
                | ObjectClass::Genre
                | ObjectClass::MusicGenre
                | ObjectClass::MovieGenre
                | ObjectClass::ChannelGroup
                | ObjectClass::AudioChannelGroup
                | ObjectClass::VideoChannelGroup
                | ObjectClass::EpgContainer
                | ObjectClass::StorageSystem
                | ObjectClass::StorageVolume
                | ObjectClass::StorageFolder
                | ObjectClass::BookmarkFolder
        )
    }

    /// Tag XML de l'élément porteur (`item` ou `container`).
    ///
    /// [`Unknown`](Self::Unknown) n'a pas de forme propre ; le parser décide
    /// alors d'après le tag source et le serializer d'après la structure.
    pub fn tag(self) -> &'static str {
        if self.is_container() { "container" } else { "item" }
    }
}

/// Chaîne `upnp:class` résolue : la variante, plus la valeur brute vue en
/// entrée, réémise telle quelle à la sérialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpnpClass {
    /// Variante résolue
    pub object_class: ObjectClass,
    /// Chaîne de classe d'origine
    pub raw: String,
}

impl UpnpClass {
    /// Classe canonique pour une variante donnée.
    pub fn new(object_class: ObjectClass) -> Self {
        Self {
            object_class,
            raw: object_class.canonical().to_string(),
        }
    }

    /// Variante résolue accompagnée de la chaîne d'origine.
    pub fn with_raw(object_class: ObjectClass, raw: impl Into<String>) -> Self {
        Self {
            object_class,
            raw: raw.into(),
        }
    }

    /// Chaîne de classe telle qu'elle sera émise.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<ObjectClass> for UpnpClass {
    fn from(object_class: ObjectClass) -> Self {
        Self::new(object_class)
    }
}

/// Ordre d'application des deux rattrapages non stricts : repli sur la casse
/// et repli sur le plus long préfixe. Le comportement observé des firmwares
/// varie d'une version à l'autre, l'ordre est donc un réglage et non une
/// constante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassPolicy {
    /// Correspondance exacte insensible à la casse d'abord, préfixe ensuite.
    #[default]
    CaseFoldFirst,
    /// Plus long préfixe sensible à la casse d'abord, casse ensuite.
    PrefixFirst,
}

static EXACT: Lazy<HashMap<&'static str, ObjectClass>> =
    Lazy::new(|| CLASS_TABLE.iter().copied().collect());

static FOLDED: Lazy<HashMap<String, ObjectClass>> = Lazy::new(|| {
    CLASS_TABLE
        .iter()
        .map(|(s, oc)| (s.to_ascii_lowercase(), *oc))
        .collect()
});

fn lookup(class: &str) -> Option<ObjectClass> {
    EXACT.get(class).copied()
}

fn lookup_folded(class: &str) -> Option<ObjectClass> {
    FOLDED.get(&class.to_ascii_lowercase()).copied()
}

/// Plus long préfixe strict (en nombre de segments) présent dans la table.
fn prefix_lookup(class: &str, folded: bool) -> Option<ObjectClass> {
    let mut current = class;
    while let Some(idx) = current.rfind('.') {
        current = &current[..idx];
        let hit = if folded {
            lookup_folded(current)
        } else {
            lookup(current)
        };
        if let Some(oc) = hit {
            return Some(oc);
        }
    }
    None
}

/// Résout une chaîne `upnp:class` vers sa variante.
///
/// Dans les deux modes, une correspondance exacte ou un préfixe aboutissant à
/// une variante plus spécifique que `object.item`/`object.container` est
/// accepté (`…musicTrack.extension` → `MusicTrack`). En mode strict, tout le
/// reste est une erreur [`Error::InvalidClass`]. En mode non strict, le repli
/// de casse et le repli vers la variante de base s'appliquent dans l'ordre
/// fixé par `policy`, et une chaîne totalement inconnue donne
/// [`ObjectClass::Unknown`].
pub fn resolve_class(class: &str, strict: bool, policy: ClassPolicy) -> Result<ObjectClass> {
    let class = class.trim();
    if class.is_empty() {
        return Err(Error::InvalidClass("empty class string".to_string()));
    }

    if let Some(oc) = lookup(class) {
        return Ok(oc);
    }

    if let Some(oc) = prefix_lookup(class, false) {
        let is_base = matches!(oc, ObjectClass::Item | ObjectClass::Container);
        if strict {
            if is_base {
                return Err(Error::InvalidClass(class.to_string()));
            }
            return Ok(oc);
        }
        match policy {
            ClassPolicy::PrefixFirst => return Ok(oc),
            ClassPolicy::CaseFoldFirst => {
                if let Some(folded) = lookup_folded(class) {
                    return Ok(folded);
                }
                return Ok(oc);
            }
        }
    }

    if strict {
        return Err(Error::InvalidClass(class.to_string()));
    }

    if let Some(oc) = lookup_folded(class) {
        return Ok(oc);
    }
    if let Some(oc) = prefix_lookup(class, true) {
        return Ok(oc);
    }
    Ok(ObjectClass::Unknown)
}
