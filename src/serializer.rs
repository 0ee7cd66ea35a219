//! Sérialisation de documents DIDL-Lite
//!
//! Construit l'arbre `xmltree` à la main (noms préfixés littéraux, `xmlns:*`
//! posés en attributs sur la racine) puis l'émet via `EmitterConfig`. La
//! racine ne déclare que les namespaces réellement utilisés par les objets
//! émis. La sortie est compacte, avec déclaration XML, et stable octet à
//! octet pour un même modèle.

use indexmap::IndexMap;
use std::collections::HashSet;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::classes::UpnpClass;
use crate::error::{Error, Result};
use crate::model::{Container, Descriptor, DidlObject, ExtraElement, Item, Resource};
use crate::namespaces::{DIDL_LITE_NS, NamespaceRegistry};
use crate::properties::{PropertyBag, PropertyValue, properties_of};

/// Sérialise une séquence d'objets avec les namespaces bien connus.
pub fn serialize(objects: &[DidlObject]) -> Result<String> {
    serialize_with(objects, &NamespaceRegistry::new())
}

/// Sérialise une séquence d'objets avec un registre de namespaces fourni par
/// l'appelant (préfixes vendeur).
///
/// La sérialisation n'a pas de mode non strict : l'appelant contrôle
/// entièrement les données émises. Un objet sans `upnp:class` est une erreur
/// [`Error::InvalidClass`], un préfixe irrésoluble une erreur
/// [`Error::UnknownNamespace`].
pub fn serialize_with(objects: &[DidlObject], namespaces: &NamespaceRegistry) -> Result<String> {
    let mut decls: IndexMap<String, String> = IndexMap::new();
    let mut children = Vec::with_capacity(objects.len());
    for object in objects {
        children.push(object_to_element(object, namespaces, &mut decls)?);
    }

    let mut root = Element::new("DIDL-Lite");
    root.attributes
        .insert("xmlns".to_string(), DIDL_LITE_NS.to_string());
    for (prefix, uri) in &decls {
        root.attributes.insert(format!("xmlns:{prefix}"), uri.clone());
    }
    for child in children {
        root.children.push(XMLNode::Element(child));
    }

    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    let mut buf = Vec::new();
    root.write_with_config(&mut buf, config)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn object_to_element(
    object: &DidlObject,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<Element> {
    match object {
        DidlObject::Item(item) => item_to_element(item, namespaces, decls),
        DidlObject::Container(container) => container_to_element(container, namespaces, decls),
        DidlObject::Descriptor(descriptor) => Ok(descriptor_to_element(descriptor)),
    }
}

fn ensure_class(class: &UpnpClass) -> Result<()> {
    if class.raw.trim().is_empty() {
        return Err(Error::InvalidClass(
            "object without a resolvable upnp:class".to_string(),
        ));
    }
    Ok(())
}

fn bool_token(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Enregistre la déclaration `xmlns:prefix` si elle manque encore. `fallback`
/// porte l'URI vue au parsing pour les préfixes hors registre.
fn declare(
    prefix: &str,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
    fallback: Option<&str>,
) -> Result<()> {
    if prefix == "xml" || decls.contains_key(prefix) {
        return Ok(());
    }
    let uri = namespaces
        .uri_for(prefix)
        .map(str::to_string)
        .or_else(|| fallback.map(str::to_string))
        .ok_or_else(|| Error::UnknownNamespace(prefix.to_string()))?;
    decls.insert(prefix.to_string(), uri);
    Ok(())
}

fn declare_qualified(
    name: &str,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
    fallback: Option<&str>,
) -> Result<()> {
    if let Some((prefix, _)) = name.split_once(':') {
        declare(prefix, namespaces, decls, fallback)?;
    }
    Ok(())
}

fn declare_extra(
    extra: &ExtraElement,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<()> {
    declare_qualified(&extra.name, namespaces, decls, extra.namespace.as_deref())?;
    for attr in extra.attributes.keys() {
        declare_qualified(attr, namespaces, decls, None)?;
    }
    for child in &extra.children {
        declare_extra(child, namespaces, decls)?;
    }
    Ok(())
}

fn item_to_element(
    item: &Item,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<Element> {
    ensure_class(&item.class)?;

    let mut el = Element::new("item");
    el.attributes.insert("id".to_string(), item.id.clone());
    el.attributes
        .insert("parentID".to_string(), item.parent_id.clone());
    el.attributes
        .insert("restricted".to_string(), bool_token(item.restricted).to_string());
    if let Some(ref_id) = &item.ref_id {
        el.attributes.insert("refID".to_string(), ref_id.clone());
    }
    append_extra_attributes(&mut el, &item.extra_attributes, namespaces, decls)?;

    fill_object_element(
        &mut el,
        &item.class,
        &item.properties,
        &item.resources,
        &item.descriptors,
        &item.extra_elements,
        namespaces,
        decls,
    )?;
    Ok(el)
}

fn container_to_element(
    container: &Container,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<Element> {
    ensure_class(&container.class)?;

    let mut el = Element::new("container");
    el.attributes.insert("id".to_string(), container.id.clone());
    el.attributes
        .insert("parentID".to_string(), container.parent_id.clone());
    el.attributes.insert(
        "restricted".to_string(),
        bool_token(container.restricted).to_string(),
    );
    if let Some(child_count) = container.child_count {
        el.attributes
            .insert("childCount".to_string(), child_count.to_string());
    }
    if let Some(searchable) = container.searchable {
        el.attributes
            .insert("searchable".to_string(), bool_token(searchable).to_string());
    }
    if let Some(never_playable) = container.never_playable {
        el.attributes.insert(
            "neverPlayable".to_string(),
            bool_token(never_playable).to_string(),
        );
    }
    append_extra_attributes(&mut el, &container.extra_attributes, namespaces, decls)?;

    fill_object_element(
        &mut el,
        &container.class,
        &container.properties,
        &container.resources,
        &container.descriptors,
        &container.extra_elements,
        namespaces,
        decls,
    )?;

    for child in &container.children {
        el.children
            .push(XMLNode::Element(object_to_element(child, namespaces, decls)?));
    }
    Ok(el)
}

fn append_extra_attributes(
    el: &mut Element,
    extra_attributes: &IndexMap<String, String>,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<()> {
    for (name, value) in extra_attributes {
        declare_qualified(name, namespaces, decls, None)?;
        el.attributes.insert(name.clone(), value.clone());
    }
    Ok(())
}

/// Émet le corps commun d'un objet : `upnp:class`, propriétés connues dans
/// l'ordre de la table puis propriétés hors table, `res`, `desc`, extras.
#[allow(clippy::too_many_arguments)]
fn fill_object_element(
    el: &mut Element,
    class: &UpnpClass,
    properties: &PropertyBag,
    resources: &[Resource],
    descriptors: &[Descriptor],
    extra_elements: &[ExtraElement],
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<()> {
    declare("upnp", namespaces, decls, None)?;
    let mut class_el = Element::new("upnp:class");
    class_el.children.push(XMLNode::Text(class.raw.clone()));
    el.children.push(XMLNode::Element(class_el));

    let defs = properties_of(class.object_class);
    let mut table_keys: HashSet<String> = HashSet::new();
    for def in defs {
        let key = def.key();
        if let Some(values) = properties.get_exact(&key) {
            declare(def.ns.prefix(), namespaces, decls, None)?;
            for value in values {
                el.children
                    .push(XMLNode::Element(property_element(&key, value, namespaces, decls)?));
            }
        }
        table_keys.insert(key);
    }
    for (key, values) in properties.iter() {
        if table_keys.contains(key) {
            continue;
        }
        declare_qualified(key, namespaces, decls, None)?;
        for value in values {
            el.children
                .push(XMLNode::Element(property_element(key, value, namespaces, decls)?));
        }
    }

    for resource in resources {
        el.children
            .push(XMLNode::Element(resource_to_element(resource, namespaces, decls)?));
    }
    for descriptor in descriptors {
        el.children
            .push(XMLNode::Element(descriptor_to_element(descriptor)));
    }
    for extra in extra_elements {
        declare_extra(extra, namespaces, decls)?;
        el.children.push(XMLNode::Element(extra.to_element()));
    }
    Ok(())
}

fn property_element(
    key: &str,
    value: &PropertyValue,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<Element> {
    let mut el = Element::new(key);
    for (attr, attr_value) in &value.attributes {
        declare_qualified(attr, namespaces, decls, None)?;
        el.attributes.insert(attr.clone(), attr_value.clone());
    }
    if !value.value.is_empty() {
        el.children.push(XMLNode::Text(value.value.clone()));
    }
    Ok(el)
}

fn resource_to_element(
    resource: &Resource,
    namespaces: &NamespaceRegistry,
    decls: &mut IndexMap<String, String>,
) -> Result<Element> {
    let mut el = Element::new("res");
    for (name, value) in &resource.attributes {
        declare_qualified(name, namespaces, decls, None)?;
        el.attributes.insert(name.clone(), value.clone());
    }
    if !resource.uri.is_empty() {
        el.children.push(XMLNode::Text(resource.uri.clone()));
    }
    Ok(el)
}

fn descriptor_to_element(descriptor: &Descriptor) -> Element {
    let mut el = Element::new("desc");
    el.attributes.insert("id".to_string(), descriptor.id.clone());
    el.attributes
        .insert("nameSpace".to_string(), descriptor.name_space.clone());
    if let Some(desc_type) = &descriptor.desc_type {
        el.attributes.insert("type".to_string(), desc_type.clone());
    }
    if let Some(text) = &descriptor.text {
        el.children.push(XMLNode::Text(text.clone()));
    }
    el
}
