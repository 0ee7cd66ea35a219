//! Tables de propriétés par variante et sac de propriétés ordonné
//!
//! Chaque variante d'objet connaît sa liste statique de propriétés
//! (namespace, nom local, cardinalité), construite une fois au démarrage.
//! Les valeurs vivent dans un [`PropertyBag`] ordonné par insertion, indexé
//! par nom qualifié canonique (`upnp:artist`) ; l'accès accepte aussi l'alias
//! snake_case (`original_track_number`) et le nom local nu.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::classes::ObjectClass;
use crate::namespaces::{DC_NS, UPNP_NS};

/// Namespace d'une propriété de la table statique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ns {
    /// Dublin Core (`dc`)
    Dc,
    /// UPnP (`upnp`)
    Upnp,
}

impl Ns {
    /// URI du namespace.
    pub fn uri(self) -> &'static str {
        match self {
            Ns::Dc => DC_NS,
            Ns::Upnp => UPNP_NS,
        }
    }

    /// Préfixe canonique.
    pub fn prefix(self) -> &'static str {
        match self {
            Ns::Dc => "dc",
            Ns::Upnp => "upnp",
        }
    }
}

/// Définition d'une propriété connue d'une variante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    /// Namespace de l'élément
    pub ns: Ns,
    /// Nom local, en camelCase comme dans le XML
    pub name: &'static str,
    /// Propriété requise par le schéma ContentDirectory
    pub required: bool,
    /// Propriété répétable (multi-valuée)
    pub multi: bool,
}

impl PropertyDef {
    /// URI du namespace de la propriété.
    pub fn uri(&self) -> &'static str {
        self.ns.uri()
    }

    /// Nom qualifié canonique (`upnp:artist`).
    pub fn key(&self) -> String {
        format!("{}:{}", self.ns.prefix(), self.name)
    }
}

const fn opt(ns: Ns, name: &'static str) -> PropertyDef {
    PropertyDef {
        ns,
        name,
        required: false,
        multi: false,
    }
}

const fn req(ns: Ns, name: &'static str) -> PropertyDef {
    PropertyDef {
        ns,
        name,
        required: true,
        multi: false,
    }
}

const fn many(ns: Ns, name: &'static str) -> PropertyDef {
    PropertyDef {
        ns,
        name,
        required: false,
        multi: true,
    }
}

use Ns::{Dc, Upnp};

// Les attributs de l'élément objet (@id, @restricted, @childCount, ...) sont
// des champs typés du modèle, pas des entrées de table. `upnp:class` et `res`
// sont traités structurellement par le parser et le serializer.

static OBJECT_PROPS: &[PropertyDef] = &[
    req(Dc, "title"),
    opt(Dc, "creator"),
    opt(Upnp, "writeStatus"),
];

static ITEM_EXTRA: &[PropertyDef] = &[opt(Upnp, "bookmarkID")];

static IMAGE_ITEM_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "longDescription"),
    opt(Upnp, "storageMedium"),
    opt(Upnp, "rating"),
    opt(Dc, "description"),
    many(Dc, "publisher"),
    opt(Dc, "date"),
    many(Dc, "rights"),
];

static PHOTO_EXTRA: &[PropertyDef] = &[opt(Upnp, "album")];

static AUDIO_ITEM_EXTRA: &[PropertyDef] = &[
    many(Upnp, "genre"),
    opt(Dc, "description"),
    opt(Upnp, "longDescription"),
    many(Dc, "publisher"),
    opt(Dc, "language"),
    many(Dc, "relation"),
    many(Dc, "rights"),
];

static MUSIC_TRACK_EXTRA: &[PropertyDef] = &[
    many(Upnp, "artist"),
    opt(Upnp, "album"),
    opt(Upnp, "originalTrackNumber"),
    opt(Upnp, "playlist"),
    opt(Upnp, "storageMedium"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
];

static AUDIO_BROADCAST_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "region"),
    opt(Upnp, "radioCallSign"),
    opt(Upnp, "radioStationID"),
    opt(Upnp, "radioBand"),
    opt(Upnp, "channelNr"),
    opt(Upnp, "signalStrength"),
    opt(Upnp, "signalLocked"),
    opt(Upnp, "tuned"),
    opt(Upnp, "recordable"),
];

static AUDIO_BOOK_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "storageMedium"),
    many(Upnp, "producer"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
];

static VIDEO_ITEM_EXTRA: &[PropertyDef] = &[
    many(Upnp, "genre"),
    opt(Upnp, "longDescription"),
    many(Upnp, "producer"),
    opt(Upnp, "rating"),
    many(Upnp, "actor"),
    many(Upnp, "director"),
    opt(Dc, "description"),
    many(Dc, "publisher"),
    opt(Dc, "language"),
    many(Dc, "relation"),
    opt(Upnp, "playbackCount"),
    opt(Upnp, "lastPlaybackTime"),
    opt(Upnp, "lastPlaybackPosition"),
    opt(Upnp, "recordedDayOfWeek"),
    opt(Upnp, "srsRecordScheduleID"),
];

static MOVIE_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "storageMedium"),
    opt(Upnp, "DVDRegionCode"),
    opt(Upnp, "channelName"),
    opt(Upnp, "scheduledStartTime"),
    opt(Upnp, "scheduledEndTime"),
    opt(Upnp, "programTitle"),
    opt(Upnp, "seriesTitle"),
    opt(Upnp, "episodeCount"),
    opt(Upnp, "episodeNr"),
];

static VIDEO_BROADCAST_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "icon"),
    opt(Upnp, "region"),
    opt(Upnp, "channelNr"),
    opt(Upnp, "signalStrength"),
    opt(Upnp, "signalLocked"),
    opt(Upnp, "tuned"),
    opt(Upnp, "recordable"),
    opt(Upnp, "callSign"),
    opt(Upnp, "price"),
    opt(Upnp, "payPerView"),
];

static MUSIC_VIDEO_CLIP_EXTRA: &[PropertyDef] = &[
    many(Upnp, "artist"),
    opt(Upnp, "storageMedium"),
    opt(Upnp, "album"),
    opt(Upnp, "scheduledStartTime"),
    opt(Upnp, "scheduledStopTime"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
];

static PLAYLIST_ITEM_EXTRA: &[PropertyDef] = &[
    many(Upnp, "artist"),
    many(Upnp, "genre"),
    opt(Upnp, "longDescription"),
    opt(Upnp, "storageMedium"),
    opt(Dc, "description"),
    opt(Dc, "date"),
    opt(Dc, "language"),
];

static TEXT_ITEM_EXTRA: &[PropertyDef] = &[
    many(Upnp, "author"),
    opt(Upnp, "longDescription"),
    opt(Upnp, "storageMedium"),
    opt(Upnp, "rating"),
    opt(Dc, "description"),
    many(Dc, "publisher"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
    many(Dc, "relation"),
    opt(Dc, "language"),
    many(Dc, "rights"),
];

static BOOKMARK_ITEM_EXTRA: &[PropertyDef] = &[
    req(Upnp, "bookmarkedObjectID"),
    opt(Upnp, "neverPlayable"),
    req(Upnp, "deviceUDN"),
    req(Upnp, "serviceType"),
    req(Upnp, "serviceId"),
    opt(Dc, "date"),
    req(Dc, "stateVariableCollection"),
];

static EPG_ITEM_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "channelGroupName"),
    opt(Upnp, "epgProviderName"),
    opt(Upnp, "serviceProvider"),
    opt(Upnp, "channelName"),
    opt(Upnp, "channelNr"),
    opt(Upnp, "programTitle"),
    opt(Upnp, "seriesTitle"),
    opt(Upnp, "programID"),
    opt(Upnp, "seriesID"),
    opt(Upnp, "channelID"),
    opt(Upnp, "episodeCount"),
    opt(Upnp, "episodeNumber"),
    opt(Upnp, "programCode"),
    opt(Upnp, "rating"),
    opt(Upnp, "episodeType"),
    many(Upnp, "genre"),
    many(Upnp, "artist"),
    many(Upnp, "actor"),
    many(Upnp, "author"),
    many(Upnp, "producer"),
    many(Upnp, "director"),
    many(Dc, "publisher"),
    many(Dc, "contributor"),
    opt(Upnp, "networkAffiliation"),
    opt(Upnp, "price"),
    opt(Upnp, "payPerView"),
    opt(Dc, "description"),
    opt(Upnp, "longDescription"),
    opt(Upnp, "icon"),
    opt(Upnp, "region"),
    opt(Dc, "language"),
    many(Dc, "relation"),
    opt(Upnp, "scheduledStartTime"),
    opt(Upnp, "scheduledEndTime"),
    opt(Upnp, "recordable"),
];

// Dans le schéma, audioProgram et videoProgram repartent de la liste d'item,
// sans hériter de celle d'epgItem.
static AUDIO_PROGRAM_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "radioCallSign"),
    opt(Upnp, "radioStationID"),
    opt(Upnp, "radioBand"),
];

static VIDEO_PROGRAM_EXTRA: &[PropertyDef] = &[opt(Upnp, "price"), opt(Upnp, "payPerView")];

static CONTAINER_EXTRA: &[PropertyDef] = &[many(Upnp, "createClass"), many(Upnp, "searchClass")];

static PERSON_EXTRA: &[PropertyDef] = &[opt(Dc, "language")];

static MUSIC_ARTIST_EXTRA: &[PropertyDef] =
    &[many(Upnp, "genre"), opt(Upnp, "artistDiscographyURI")];

static PLAYLIST_CONTAINER_EXTRA: &[PropertyDef] = &[
    many(Upnp, "artist"),
    many(Upnp, "genre"),
    opt(Upnp, "longDescription"),
    many(Upnp, "producer"),
    opt(Upnp, "storageMedium"),
    opt(Dc, "description"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
    opt(Dc, "language"),
    many(Dc, "rights"),
];

static ALBUM_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "storageMedium"),
    opt(Dc, "longDescription"),
    opt(Dc, "description"),
    many(Dc, "publisher"),
    many(Dc, "contributor"),
    opt(Dc, "date"),
    many(Dc, "relation"),
    many(Dc, "rights"),
];

static MUSIC_ALBUM_EXTRA: &[PropertyDef] = &[
    many(Upnp, "artist"),
    many(Upnp, "genre"),
    many(Upnp, "producer"),
    opt(Upnp, "albumArtURI"),
    opt(Upnp, "toc"),
];

static GENRE_EXTRA: &[PropertyDef] = &[
    many(Upnp, "genre"),
    opt(Upnp, "longDescription"),
    opt(Dc, "description"),
];

static CHANNEL_GROUP_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "channelGroupName"),
    opt(Upnp, "epgProviderName"),
    opt(Upnp, "serviceProvider"),
    opt(Upnp, "icon"),
    opt(Upnp, "region"),
];

static EPG_CONTAINER_EXTRA: &[PropertyDef] = &[
    opt(Upnp, "channelGroupName"),
    opt(Upnp, "epgProviderName"),
    opt(Upnp, "serviceProvider"),
    opt(Upnp, "channelName"),
    opt(Upnp, "channelNr"),
    opt(Upnp, "channelID"),
    opt(Upnp, "radioCallSign"),
    opt(Upnp, "radioStationID"),
    opt(Upnp, "radioBand"),
    opt(Upnp, "callSign"),
    opt(Upnp, "networkAffiliation"),
    opt(Upnp, "price"),
    opt(Upnp, "payPerView"),
    opt(Upnp, "icon"),
    opt(Upnp, "region"),
    opt(Dc, "language"),
    many(Dc, "relation"),
    opt(Upnp, "dateTimeRange"),
];

static STORAGE_SYSTEM_EXTRA: &[PropertyDef] = &[
    req(Upnp, "storageTotal"),
    req(Upnp, "storageUsed"),
    req(Upnp, "storageFree"),
    req(Upnp, "storageMaxPartition"),
    req(Upnp, "storageMedium"),
];

static STORAGE_VOLUME_EXTRA: &[PropertyDef] = &[
    req(Upnp, "storageTotal"),
    req(Upnp, "storageUsed"),
    req(Upnp, "storageFree"),
    req(Upnp, "storageMedium"),
];

static STORAGE_FOLDER_EXTRA: &[PropertyDef] = &[req(Upnp, "storageUsed")];

static BOOKMARK_FOLDER_EXTRA: &[PropertyDef] = &[
    many(Upnp, "genre"),
    opt(Upnp, "longDescription"),
    opt(Dc, "description"),
];

/// Toutes les tables, dans l'ordre de déclaration du schéma. Sert à
/// construire l'index nom local → namespace par défaut.
static ALL_TABLES: &[&[PropertyDef]] = &[
    OBJECT_PROPS,
    ITEM_EXTRA,
    IMAGE_ITEM_EXTRA,
    PHOTO_EXTRA,
    AUDIO_ITEM_EXTRA,
    MUSIC_TRACK_EXTRA,
    AUDIO_BROADCAST_EXTRA,
    AUDIO_BOOK_EXTRA,
    VIDEO_ITEM_EXTRA,
    MOVIE_EXTRA,
    VIDEO_BROADCAST_EXTRA,
    MUSIC_VIDEO_CLIP_EXTRA,
    PLAYLIST_ITEM_EXTRA,
    TEXT_ITEM_EXTRA,
    BOOKMARK_ITEM_EXTRA,
    EPG_ITEM_EXTRA,
    AUDIO_PROGRAM_EXTRA,
    VIDEO_PROGRAM_EXTRA,
    CONTAINER_EXTRA,
    PERSON_EXTRA,
    MUSIC_ARTIST_EXTRA,
    PLAYLIST_CONTAINER_EXTRA,
    ALBUM_EXTRA,
    MUSIC_ALBUM_EXTRA,
    GENRE_EXTRA,
    CHANNEL_GROUP_EXTRA,
    EPG_CONTAINER_EXTRA,
    STORAGE_SYSTEM_EXTRA,
    STORAGE_VOLUME_EXTRA,
    STORAGE_FOLDER_EXTRA,
    BOOKMARK_FOLDER_EXTRA,
];

fn concat(base: &[PropertyDef], extra: &[PropertyDef]) -> Vec<PropertyDef> {
    base.iter().chain(extra.iter()).copied().collect()
}

fn build_tables() -> HashMap<ObjectClass, Vec<PropertyDef>> {
    use ObjectClass::*;

    let object = OBJECT_PROPS.to_vec();
    let item = concat(&object, ITEM_EXTRA);
    let image_item = concat(&item, IMAGE_ITEM_EXTRA);
    let photo = concat(&image_item, PHOTO_EXTRA);
    let audio_item = concat(&item, AUDIO_ITEM_EXTRA);
    let music_track = concat(&audio_item, MUSIC_TRACK_EXTRA);
    let audio_broadcast = concat(&audio_item, AUDIO_BROADCAST_EXTRA);
    let audio_book = concat(&audio_item, AUDIO_BOOK_EXTRA);
    let video_item = concat(&item, VIDEO_ITEM_EXTRA);
    let movie = concat(&video_item, MOVIE_EXTRA);
    let video_broadcast = concat(&video_item, VIDEO_BROADCAST_EXTRA);
    let music_video_clip = concat(&video_item, MUSIC_VIDEO_CLIP_EXTRA);
    let playlist_item = concat(&item, PLAYLIST_ITEM_EXTRA);
    let text_item = concat(&item, TEXT_ITEM_EXTRA);
    let bookmark_item = concat(&item, BOOKMARK_ITEM_EXTRA);
    let epg_item = concat(&item, EPG_ITEM_EXTRA);
    let audio_program = concat(&item, AUDIO_PROGRAM_EXTRA);
    let video_program = concat(&item, VIDEO_PROGRAM_EXTRA);

    let container = concat(&object, CONTAINER_EXTRA);
    let person = concat(&container, PERSON_EXTRA);
    let music_artist = concat(&container, MUSIC_ARTIST_EXTRA);
    let playlist_container = concat(&container, PLAYLIST_CONTAINER_EXTRA);
    let album = concat(&container, ALBUM_EXTRA);
    let music_album = concat(&container, MUSIC_ALBUM_EXTRA);
    let photo_album = container.clone();
    let genre = concat(&container, GENRE_EXTRA);
    let music_genre = container.clone();
    let movie_genre = container.clone();
    let channel_group = concat(&container, CHANNEL_GROUP_EXTRA);
    let audio_channel_group = container.clone();
    let video_channel_group = container.clone();
    let epg_container = concat(&container, EPG_CONTAINER_EXTRA);
    let storage_system = concat(&container, STORAGE_SYSTEM_EXTRA);
    let storage_volume = concat(&container, STORAGE_VOLUME_EXTRA);
    let storage_folder = concat(&container, STORAGE_FOLDER_EXTRA);
    let bookmark_folder = concat(&container, BOOKMARK_FOLDER_EXTRA);

    let mut tables = HashMap::new();
    tables.insert(Item, item);
    tables.insert(ImageItem, image_item);
    tables.insert(Photo, photo);
    tables.insert(AudioItem, audio_item);
    tables.insert(MusicTrack, music_track);
    tables.insert(AudioBroadcast, audio_broadcast);
    tables.insert(AudioBook, audio_book);
    tables.insert(VideoItem, video_item);
    tables.insert(Movie, movie);
    tables.insert(VideoBroadcast, video_broadcast);
    tables.insert(MusicVideoClip, music_video_clip);
    tables.insert(PlaylistItem, playlist_item);
    tables.insert(TextItem, text_item);
    tables.insert(BookmarkItem, bookmark_item);
    tables.insert(EpgItem, epg_item);
    tables.insert(AudioProgram, audio_program);
    tables.insert(VideoProgram, video_program);
    tables.insert(Container, container);
    tables.insert(Person, person);
    tables.insert(MusicArtist, music_artist);
    tables.insert(PlaylistContainer, playlist_container);
    tables.insert(Album, album);
    tables.insert(MusicAlbum, music_album);
    tables.insert(PhotoAlbum, photo_album);
    tables.insert(Genre, genre);
    tables.insert(MusicGenre, music_genre);
    tables.insert(MovieGenre, movie_genre);
    tables.insert(ChannelGroup, channel_group);
    tables.insert(AudioChannelGroup, audio_channel_group);
    tables.insert(VideoChannelGroup, video_channel_group);
    tables.insert(EpgContainer, epg_container);
    tables.insert(StorageSystem, storage_system);
    tables.insert(StorageVolume, storage_volume);
    tables.insert(StorageFolder, storage_folder);
    tables.insert(BookmarkFolder, bookmark_folder);
    // La variante de repli ne connaît que les propriétés de base.
    tables.insert(Unknown, object);
    tables
}

static TABLES: Lazy<HashMap<ObjectClass, Vec<PropertyDef>>> = Lazy::new(build_tables);

static DEFAULT_NS: Lazy<HashMap<&'static str, Ns>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for table in ALL_TABLES {
        for def in *table {
            map.entry(def.name).or_insert(def.ns);
        }
    }
    map
});

/// Table des propriétés connues d'une variante, dans l'ordre d'émission.
pub fn properties_of(class: ObjectClass) -> &'static [PropertyDef] {
    TABLES.get(&class).map(Vec::as_slice).unwrap_or_default()
}

/// Namespace par défaut d'un nom local de propriété connue.
pub fn default_ns_for(local: &str) -> Option<Ns> {
    DEFAULT_NS.get(local).copied()
}

/// `original_track_number` → `originalTrackNumber`. Les noms déjà en
/// camelCase passent inchangés.
pub(crate) fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Valeur d'une propriété : texte plus attributs dépendants éventuels
/// (`upnp:genre id="..."` porte son attribut sur la valeur qu'il qualifie).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Texte de l'élément
    pub value: String,
    /// Attributs de l'élément, dans l'ordre du document
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
}

impl PropertyValue {
    /// Valeur simple sans attributs.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Ajoute un attribut dépendant.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Nom qualifié canonique pour un nom donné par l'appelant.
fn canonical_key(name: &str) -> String {
    match name.split_once(':') {
        Some((prefix, local)) => format!("{prefix}:{}", snake_to_camel(local)),
        None => {
            let camel = snake_to_camel(name);
            match default_ns_for(camel.as_str()) {
                Some(ns) => format!("{}:{camel}", ns.prefix()),
                None => camel,
            }
        }
    }
}

/// Sac de propriétés ordonné par insertion.
///
/// Les clés sont les noms qualifiés canoniques. La cardinalité est portée par
/// la table de la variante : le parser remplace les propriétés simples et
/// accumule les propriétés répétables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: IndexMap<String, Vec<PropertyValue>>,
}

impl PropertyBag {
    /// Sac vide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre de propriétés distinctes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Vrai si le sac est vide.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Résout un nom d'accès vers la clé stockée : clé exacte, puis forme
    /// canonique, puis nom local (sensible à la casse, puis insensible).
    fn find_key<'a>(&'a self, name: &str) -> Option<&'a str> {
        if let Some((key, _)) = self.entries.get_key_value(name) {
            return Some(key.as_str());
        }
        let canon = canonical_key(name);
        if let Some((key, _)) = self.entries.get_key_value(canon.as_str()) {
            return Some(key.as_str());
        }
        let local = canon.split_once(':').map(|(_, l)| l).unwrap_or(&canon);
        if let Some(key) = self.entries.keys().find(|k| {
            let kl = k.split_once(':').map(|(_, l)| l).unwrap_or(k);
            kl == local
        }) {
            return Some(key.as_str());
        }
        self.entries
            .keys()
            .find(|k| {
                let kl = k.split_once(':').map(|(_, l)| l).unwrap_or(k);
                kl.eq_ignore_ascii_case(local)
            })
            .map(String::as_str)
    }

    /// Première valeur d'une propriété.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        let key = self.find_key(name)?;
        self.entries.get(key).and_then(|values| values.first())
    }

    /// Texte de la première valeur d'une propriété.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(|value| value.value.as_str())
    }

    /// Toutes les valeurs d'une propriété répétable.
    pub fn get_all(&self, name: &str) -> &[PropertyValue] {
        self.find_key(name)
            .and_then(|key| self.entries.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Valeurs stockées sous une clé exacte, sans résolution d'alias.
    pub fn get_exact(&self, key: &str) -> Option<&[PropertyValue]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Vrai si la propriété est présente.
    pub fn contains(&self, name: &str) -> bool {
        self.find_key(name).is_some()
    }

    /// Remplace la ou les valeurs d'une propriété.
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) {
        let key = self
            .find_key(name)
            .map(str::to_string)
            .unwrap_or_else(|| canonical_key(name));
        self.entries.insert(key, vec![value.into()]);
    }

    /// Ajoute une valeur à une propriété répétable.
    pub fn push(&mut self, name: &str, value: impl Into<PropertyValue>) {
        let key = self
            .find_key(name)
            .map(str::to_string)
            .unwrap_or_else(|| canonical_key(name));
        self.entries.entry(key).or_default().push(value.into());
    }

    /// Retire une propriété et retourne ses valeurs.
    pub fn remove(&mut self, name: &str) -> Option<Vec<PropertyValue>> {
        let key = self.find_key(name)?.to_string();
        self.entries.shift_remove(&key)
    }

    /// Itère sur `(clé canonique, valeurs)` dans l'ordre d'insertion.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyValue])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Clés canoniques, dans l'ordre d'insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("original_track_number"), "originalTrackNumber");
        assert_eq!(snake_to_camel("writeStatus"), "writeStatus");
        assert_eq!(snake_to_camel("title"), "title");
    }

    #[test]
    fn test_canonical_key_resolution() {
        assert_eq!(canonical_key("upnp:artist"), "upnp:artist");
        assert_eq!(canonical_key("original_track_number"), "upnp:originalTrackNumber");
        assert_eq!(canonical_key("title"), "dc:title");
        // nom inconnu sans préfixe : conservé nu
        assert_eq!(canonical_key("vendorThing"), "vendorThing");
    }

    #[test]
    fn test_bag_alias_access() {
        let mut bag = PropertyBag::new();
        bag.set("upnp:originalTrackNumber", "7");
        assert_eq!(bag.get_str("upnp:originalTrackNumber"), Some("7"));
        assert_eq!(bag.get_str("original_track_number"), Some("7"));
        assert_eq!(bag.get_str("originalTrackNumber"), Some("7"));
        assert!(bag.get_str("upnp:album").is_none());
    }

    #[test]
    fn test_bag_set_replaces_push_accumulates() {
        let mut bag = PropertyBag::new();
        bag.push("upnp:artist", "A");
        bag.push("artist", "B");
        assert_eq!(bag.get_all("upnp:artist").len(), 2);
        bag.set("artist", "C");
        assert_eq!(bag.get_all("upnp:artist").len(), 1);
        assert_eq!(bag.get_str("artist"), Some("C"));
    }

    #[test]
    fn test_bag_preserves_insertion_order() {
        let mut bag = PropertyBag::new();
        bag.set("dc:title", "t");
        bag.set("upnp:album", "a");
        bag.set("dc:date", "d");
        let keys: Vec<&str> = bag.keys().collect();
        assert_eq!(keys, vec!["dc:title", "upnp:album", "dc:date"]);
    }

    #[test]
    fn test_property_value_attributes() {
        let value = PropertyValue::new("Action").with_attribute("id", "genreId");
        assert_eq!(value.value, "Action");
        assert_eq!(value.attributes.get("id").map(String::as_str), Some("genreId"));
    }

    #[test]
    fn test_tables_follow_hierarchy() {
        let track = properties_of(ObjectClass::MusicTrack);
        // hérite de la base objet et de audioItem
        assert!(track.iter().any(|d| d.name == "title" && d.ns == Ns::Dc));
        assert!(track.iter().any(|d| d.name == "genre" && d.multi));
        assert!(track.iter().any(|d| d.name == "artist" && d.multi));
        assert!(track.iter().any(|d| d.name == "originalTrackNumber"));

        let folder = properties_of(ObjectClass::StorageFolder);
        assert!(folder.iter().any(|d| d.name == "storageUsed" && d.required));
        assert!(folder.iter().any(|d| d.name == "createClass" && d.multi));

        // photoAlbum repart de la liste container, sans celle d'album
        let photo_album = properties_of(ObjectClass::PhotoAlbum);
        assert!(!photo_album.iter().any(|d| d.name == "publisher"));

        let unknown = properties_of(ObjectClass::Unknown);
        assert_eq!(unknown.len(), OBJECT_PROPS.len());
    }
}
