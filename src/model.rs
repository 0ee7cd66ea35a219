//! Modèle objet DIDL-Lite
//!
//! Les structures de ce module sont de simples porteurs de données à champs
//! publics : le parser les construit depuis le XML, le serializer les réémet,
//! et l'appelant peut les construire directement via les méthodes `with_*`.
//!
//! Un [`Container`] possède ses objets enfants, ses ressources et ses
//! descripteurs ; aucune donnée n'est partagée entre entités.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xmltree::{Element, XMLNode};

use crate::classes::{ObjectClass, UpnpClass};
use crate::properties::{PropertyBag, PropertyValue};

fn default_true() -> bool {
    true
}

/// Ressource média : un élément `<res>`.
///
/// L'URI vient du texte de l'élément, les attributs (protocolInfo, size,
/// duration, bitrate, ...) sont conservés tels quels, en chaînes, dans
/// l'ordre du document. Aucune coercion de type n'est faite : c'est à
/// l'appelant de produire et d'interpréter les valeurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// URI de lecture (chaîne vide si absente)
    pub uri: String,
    /// Attributs de l'élément `res`, dans l'ordre du document
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
}

impl Resource {
    /// Ressource avec son `protocolInfo`, seul attribut attendu partout.
    pub fn new(uri: impl Into<String>, protocol_info: impl Into<String>) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert("protocolInfo".to_string(), protocol_info.into());
        Self {
            uri: uri.into(),
            attributes,
        }
    }

    /// Ajoute un attribut.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Valeur d'un attribut.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Pose un attribut.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// `protocolInfo` de la ressource.
    pub fn protocol_info(&self) -> Option<&str> {
        self.attribute("protocolInfo")
    }

    /// Durée (`duration`), non interprétée.
    pub fn duration(&self) -> Option<&str> {
        self.attribute("duration")
    }

    /// Taille (`size`), non interprétée.
    pub fn size(&self) -> Option<&str> {
        self.attribute("size")
    }

    /// Bits par échantillon (`bitsPerSample`).
    pub fn bits_per_sample(&self) -> Option<&str> {
        self.attribute("bitsPerSample")
    }

    /// Fréquence d'échantillonnage (`sampleFrequency`).
    pub fn sample_frequency(&self) -> Option<&str> {
        self.attribute("sampleFrequency")
    }

    /// Nombre de canaux audio (`nrAudioChannels`).
    pub fn nr_audio_channels(&self) -> Option<&str> {
        self.attribute("nrAudioChannels")
    }

    /// Vrai si le `protocolInfo` annonce un flux audio.
    pub fn is_audio(&self) -> bool {
        self.protocol_info()
            .map(|p| p.contains("audio/"))
            .unwrap_or(false)
    }
}

/// Descripteur opaque : un élément `upnp:desc`, restitué tel quel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Identifiant du descripteur
    pub id: String,
    /// Attribut `nameSpace`
    pub name_space: String,
    /// Attribut `type`, optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc_type: Option<String>,
    /// Contenu textuel brut
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Descriptor {
    pub fn new(id: impl Into<String>, name_space: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name_space: name_space.into(),
            desc_type: None,
            text: None,
        }
    }

    pub fn with_type(mut self, desc_type: impl Into<String>) -> Self {
        self.desc_type = Some(desc_type.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Élément non reconnu rencontré au parsing, conservé pour que la
/// resérialisation ne perde pas les extensions vendeur. La position exacte
/// dans l'objet n'est pas garantie, le contenu l'est.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraElement {
    /// Nom qualifié tel que vu dans le document (`sec:preference`)
    pub name: String,
    /// URI de namespace résolue, si le document la déclarait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Attributs, dans l'ordre du document
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Contenu textuel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Sous-éléments, récursivement
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExtraElement>,
}

impl ExtraElement {
    pub(crate) fn from_element(el: &Element) -> Self {
        let name = match &el.prefix {
            Some(prefix) => format!("{prefix}:{}", el.name),
            None => el.name.clone(),
        };
        Self {
            name,
            namespace: el.namespace.clone(),
            attributes: el
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            text: el
                .get_text()
                .map(|t| t.into_owned())
                .filter(|t| !t.trim().is_empty()),
            children: el
                .children
                .iter()
                .filter_map(XMLNode::as_element)
                .map(Self::from_element)
                .collect(),
        }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut el = Element::new(&self.name);
        for (name, value) in &self.attributes {
            el.attributes.insert(name.clone(), value.clone());
        }
        if let Some(text) = &self.text {
            el.children.push(XMLNode::Text(text.clone()));
        }
        for child in &self.children {
            el.children.push(XMLNode::Element(child.to_element()));
        }
        el
    }
}

/// Item DIDL : un objet feuille (`<item>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identifiant d'objet (chaîne vide si absent, jamais manquant)
    #[serde(default)]
    pub id: String,
    /// Identifiant du parent (chaîne vide si absent)
    #[serde(default)]
    pub parent_id: String,
    /// Attribut `restricted`, vrai par défaut
    #[serde(default = "default_true")]
    pub restricted: bool,
    /// Attribut `refID`, optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Classe UPnP résolue
    pub class: UpnpClass,
    /// Propriétés connues et inconnues, ordonnées
    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
    /// Ressources, dans l'ordre du document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Descripteurs, dans l'ordre du document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptors: Vec<Descriptor>,
    /// Éléments non reconnus, préservés
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_elements: Vec<ExtraElement>,
    /// Attributs non reconnus de l'élément objet
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra_attributes: IndexMap<String, String>,
}

macro_rules! didl_object_builders {
    () => {
        /// Fixe l'identifiant.
        pub fn with_id(mut self, id: impl Into<String>) -> Self {
            self.id = id.into();
            self
        }

        /// Fixe l'identifiant du parent.
        pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
            self.parent_id = parent_id.into();
            self
        }

        /// Fixe l'attribut `restricted`.
        pub fn with_restricted(mut self, restricted: bool) -> Self {
            self.restricted = restricted;
            self
        }

        /// Fixe le titre (`dc:title`).
        pub fn with_title(mut self, title: impl Into<String>) -> Self {
            self.properties.set("dc:title", title.into());
            self
        }

        /// Fixe le créateur (`dc:creator`).
        pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
            self.properties.set("dc:creator", creator.into());
            self
        }

        /// Pose une propriété par nom canonique ou alias.
        pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
            self.properties.set(name, value);
            self
        }

        /// Ajoute une ressource.
        pub fn with_resource(mut self, resource: Resource) -> Self {
            self.resources.push(resource);
            self
        }

        /// Ajoute un descripteur.
        pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
            self.descriptors.push(descriptor);
            self
        }

        /// Chaîne `upnp:class` de l'objet.
        pub fn upnp_class(&self) -> &str {
            self.class.as_str()
        }

        /// Variante résolue de l'objet.
        pub fn object_class(&self) -> ObjectClass {
            self.class.object_class
        }

        /// Titre (`dc:title`).
        pub fn title(&self) -> Option<&str> {
            self.properties.get_str("dc:title")
        }

        /// Pose le titre.
        pub fn set_title(&mut self, title: impl Into<String>) {
            self.properties.set("dc:title", title.into());
        }

        /// Créateur (`dc:creator`).
        pub fn creator(&self) -> Option<&str> {
            self.properties.get_str("dc:creator")
        }

        /// Statut d'écriture (`upnp:writeStatus`).
        pub fn write_status(&self) -> Option<&str> {
            self.properties.get_str("upnp:writeStatus")
        }

        /// Texte de la première valeur d'une propriété.
        pub fn property(&self, name: &str) -> Option<&str> {
            self.properties.get_str(name)
        }

        /// Toutes les valeurs d'une propriété répétable.
        pub fn property_values(&self, name: &str) -> &[PropertyValue] {
            self.properties.get_all(name)
        }

        /// Pose une propriété.
        pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
            self.properties.set(name, value);
        }

        /// Première ressource disponible.
        pub fn primary_resource(&self) -> Option<&Resource> {
            self.resources.first()
        }
    };
}

impl Item {
    /// Item vide d'une variante donnée.
    pub fn new(class: ObjectClass) -> Self {
        Self {
            id: String::new(),
            parent_id: String::new(),
            restricted: true,
            ref_id: None,
            class: UpnpClass::new(class),
            properties: PropertyBag::new(),
            resources: Vec::new(),
            descriptors: Vec::new(),
            extra_elements: Vec::new(),
            extra_attributes: IndexMap::new(),
        }
    }

    didl_object_builders!();

    /// Fixe l'attribut `refID`.
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    /// Artiste (`upnp:artist`), première valeur.
    pub fn artist(&self) -> Option<&str> {
        self.properties.get_str("upnp:artist")
    }

    /// Album (`upnp:album`).
    pub fn album(&self) -> Option<&str> {
        self.properties.get_str("upnp:album")
    }

    /// Genre (`upnp:genre`), première valeur.
    pub fn genre(&self) -> Option<&str> {
        self.properties.get_str("upnp:genre")
    }

    /// Pochette (`upnp:albumArtURI`).
    pub fn album_art_uri(&self) -> Option<&str> {
        self.properties.get_str("upnp:albumArtURI")
    }

    /// Date (`dc:date`).
    pub fn date(&self) -> Option<&str> {
        self.properties.get_str("dc:date")
    }

    /// Numéro de piste (`upnp:originalTrackNumber`).
    pub fn original_track_number(&self) -> Option<&str> {
        self.properties.get_str("upnp:originalTrackNumber")
    }

    /// Ressources audio uniquement.
    pub fn audio_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_audio())
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new(ObjectClass::Item)
    }
}

/// Container DIDL : un objet pouvant contenir d'autres objets
/// (`<container>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Identifiant d'objet (chaîne vide si absent, jamais manquant)
    #[serde(default)]
    pub id: String,
    /// Identifiant du parent (chaîne vide si absent)
    #[serde(default)]
    pub parent_id: String,
    /// Attribut `restricted`, vrai par défaut
    #[serde(default = "default_true")]
    pub restricted: bool,
    /// Attribut `searchable`, optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    /// Attribut `childCount`, optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_count: Option<u32>,
    /// Attribut `neverPlayable`, optionnel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub never_playable: Option<bool>,
    /// Classe UPnP résolue
    pub class: UpnpClass,
    /// Propriétés connues et inconnues, ordonnées
    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
    /// Ressources, dans l'ordre du document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Descripteurs, dans l'ordre du document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptors: Vec<Descriptor>,
    /// Objets enfants, dans l'ordre du document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DidlObject>,
    /// Éléments non reconnus, préservés
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_elements: Vec<ExtraElement>,
    /// Attributs non reconnus de l'élément objet
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra_attributes: IndexMap<String, String>,
}

impl Container {
    /// Container vide d'une variante donnée.
    pub fn new(class: ObjectClass) -> Self {
        Self {
            id: String::new(),
            parent_id: String::new(),
            restricted: true,
            searchable: None,
            child_count: None,
            never_playable: None,
            class: UpnpClass::new(class),
            properties: PropertyBag::new(),
            resources: Vec::new(),
            descriptors: Vec::new(),
            children: Vec::new(),
            extra_elements: Vec::new(),
            extra_attributes: IndexMap::new(),
        }
    }

    didl_object_builders!();

    /// Fixe l'attribut `searchable`.
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = Some(searchable);
        self
    }

    /// Fixe l'attribut `childCount`.
    pub fn with_child_count(mut self, child_count: u32) -> Self {
        self.child_count = Some(child_count);
        self
    }

    /// Ajoute un objet enfant.
    pub fn with_child(mut self, child: impl Into<DidlObject>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Itère sur tous les objets descendants, en profondeur d'abord et dans
    /// l'ordre du document.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Premier descendant portant l'identifiant donné.
    pub fn find_by_id(&self, id: &str) -> Option<&DidlObject> {
        self.descendants().find(|obj| obj.id() == id)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(ObjectClass::Container)
    }
}

/// Itérateur des descendants d'un [`Container`].
pub struct Descendants<'a> {
    stack: Vec<&'a DidlObject>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DidlObject;

    fn next(&mut self) -> Option<Self::Item> {
        let object = self.stack.pop()?;
        if let DidlObject::Container(container) = object {
            self.stack.extend(container.children.iter().rev());
        }
        Some(object)
    }
}

/// Un objet d'une séquence DIDL-Lite.
///
/// Les documents réels admettent aussi des `desc` directement sous la
/// racine ; ils apparaissent dans la séquence comme les objets, à leur
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DidlObject {
    Container(Container),
    Item(Item),
    Descriptor(Descriptor),
}

impl DidlObject {
    /// Identifiant de l'objet.
    pub fn id(&self) -> &str {
        match self {
            DidlObject::Container(c) => &c.id,
            DidlObject::Item(i) => &i.id,
            DidlObject::Descriptor(d) => &d.id,
        }
    }

    /// Identifiant du parent (les descripteurs n'en ont pas).
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            DidlObject::Container(c) => Some(&c.parent_id),
            DidlObject::Item(i) => Some(&i.parent_id),
            DidlObject::Descriptor(_) => None,
        }
    }

    /// Titre (`dc:title`).
    pub fn title(&self) -> Option<&str> {
        match self {
            DidlObject::Container(c) => c.title(),
            DidlObject::Item(i) => i.title(),
            DidlObject::Descriptor(_) => None,
        }
    }

    /// Chaîne `upnp:class`.
    pub fn upnp_class(&self) -> Option<&str> {
        match self {
            DidlObject::Container(c) => Some(c.upnp_class()),
            DidlObject::Item(i) => Some(i.upnp_class()),
            DidlObject::Descriptor(_) => None,
        }
    }

    /// Vrai pour un container.
    pub fn is_container(&self) -> bool {
        matches!(self, DidlObject::Container(_))
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            DidlObject::Item(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            DidlObject::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&Descriptor> {
        match self {
            DidlObject::Descriptor(d) => Some(d),
            _ => None,
        }
    }
}

impl From<Item> for DidlObject {
    fn from(item: Item) -> Self {
        DidlObject::Item(item)
    }
}

impl From<Container> for DidlObject {
    fn from(container: Container) -> Self {
        DidlObject::Container(container)
    }
}

impl From<Descriptor> for DidlObject {
    fn from(descriptor: Descriptor) -> Self {
        DidlObject::Descriptor(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let item = Item::new(ObjectClass::MusicTrack)
            .with_id("t1")
            .with_parent_id("root")
            .with_title("Test Song")
            .with_property("upnp:artist", "Test Artist")
            .with_property("album", "Test Album")
            .with_resource(Resource::new("http://example.com/t.flac", "http-get:*:audio/flac:*"));

        assert_eq!(item.id, "t1");
        assert_eq!(item.title(), Some("Test Song"));
        assert_eq!(item.artist(), Some("Test Artist"));
        // alias sans préfixe résolu vers upnp:album
        assert_eq!(item.album(), Some("Test Album"));
        assert_eq!(item.upnp_class(), "object.item.audioItem.musicTrack");
        assert!(item.restricted);
        assert_eq!(item.primary_resource().unwrap().protocol_info(), Some("http-get:*:audio/flac:*"));
    }

    #[test]
    fn test_audio_resources_filter() {
        let item = Item::new(ObjectClass::MusicTrack)
            .with_resource(Resource::new("a", "http-get:*:audio/mpeg:*"))
            .with_resource(Resource::new("b", "http-get:*:image/jpeg:*"));
        let audio: Vec<&Resource> = item.audio_resources().collect();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].uri, "a");
    }

    #[test]
    fn test_container_descendants_order() {
        let album = Container::new(ObjectClass::MusicAlbum)
            .with_id("album")
            .with_child(Item::new(ObjectClass::MusicTrack).with_id("t1"))
            .with_child(Item::new(ObjectClass::MusicTrack).with_id("t2"));
        let root = Container::new(ObjectClass::StorageFolder)
            .with_id("root")
            .with_child(album)
            .with_child(Item::new(ObjectClass::MusicTrack).with_id("t3"));

        let ids: Vec<&str> = root.descendants().map(|o| o.id()).collect();
        assert_eq!(ids, vec!["album", "t1", "t2", "t3"]);
        assert!(root.find_by_id("t2").is_some());
        assert!(root.find_by_id("nope").is_none());
    }

    #[test]
    fn test_descriptor_round_fields() {
        let desc = Descriptor::new("1", "ns").with_type("type").with_text("Text");
        assert_eq!(desc.id, "1");
        assert_eq!(desc.name_space, "ns");
        assert_eq!(desc.desc_type.as_deref(), Some("type"));
        assert_eq!(desc.text.as_deref(), Some("Text"));
    }
}
