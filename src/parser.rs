//! Parser de documents DIDL-Lite
//!
//! Deux modes de fonctionnement :
//!
//! - **strict** : toute violation structurelle (racine absente, classe
//!   irrésoluble, attribut mal formé) interrompt le document entier. C'est le
//!   mode par défaut.
//! - **non strict** : récupération maximale face aux firmwares UPnP
//!   défaillants. Une entrée mal formée est sautée avec un `warn!` et le
//!   parsing continue sur ses voisines ; seules les erreurs de document
//!   (XML mal formé) remontent à l'appelant.
//!
//! Le parsing s'appuie sur `xmltree`/`xml-rs`, qui ne résout ni DTD ni
//! entités externes : pas de vecteur d'injection XML par expansion
//! d'entités.

use tracing::{debug, warn};
use xmltree::{Element, XMLNode};

use crate::classes::{ClassPolicy, ObjectClass, UpnpClass, resolve_class};
use crate::error::{Error, Result};
use crate::model::{Container, Descriptor, DidlObject, ExtraElement, Item, Resource};
use crate::namespaces::{DIDL_LITE_NS, UPNP_NS};
use crate::properties::{PropertyBag, PropertyDef, PropertyValue, properties_of};

/// Réglages de parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Mode strict (voir la doc du module)
    pub strict: bool,
    /// Ordre des rattrapages de classe en mode non strict
    pub class_policy: ClassPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: true,
            class_policy: ClassPolicy::default(),
        }
    }
}

impl ParseOptions {
    /// Réglages non stricts.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Change l'ordre des rattrapages de classe.
    pub fn with_class_policy(mut self, class_policy: ClassPolicy) -> Self {
        self.class_policy = class_policy;
        self
    }
}

/// Parse un document DIDL-Lite en mode strict.
pub fn parse(xml: &str) -> Result<Vec<DidlObject>> {
    parse_with(xml, &ParseOptions::default())
}

/// Parse un document DIDL-Lite en mode non strict.
pub fn parse_lenient(xml: &str) -> Result<Vec<DidlObject>> {
    parse_with(xml, &ParseOptions::lenient())
}

/// Parse un document DIDL-Lite avec des réglages explicites.
pub fn parse_with(xml: &str, options: &ParseOptions) -> Result<Vec<DidlObject>> {
    let root = Element::parse(xml.as_bytes())
        .map_err(|e| Error::MalformedDocument(e.to_string()))?;
    parse_element(&root, options)
}

/// Parse un arbre XML déjà construit.
///
/// En mode strict, `root` doit être l'élément `DIDL-Lite` qualifié. En mode
/// non strict, une racine `DIDL-Lite` est cherchée dans tout l'arbre, puis à
/// défaut les éléments objets eux-mêmes (certains serveurs renvoient des
/// fragments sans enveloppe).
pub fn parse_element(root: &Element, options: &ParseOptions) -> Result<Vec<DidlObject>> {
    if is_didl_root(root, options.strict) {
        return parse_didl_children(root, options);
    }
    if options.strict {
        return Err(Error::MalformedDocument(format!(
            "root element <{}> is not a DIDL-Lite element",
            root.name
        )));
    }
    if let Some(didl) = find_didl_descendant(root) {
        return parse_didl_children(didl, options);
    }
    let mut objects = Vec::new();
    collect_orphans(root, options, &mut objects);
    Ok(objects)
}

fn is_didl_root(el: &Element, strict: bool) -> bool {
    if strict {
        el.name == "DIDL-Lite" && el.namespace.as_deref() == Some(DIDL_LITE_NS)
    } else {
        el.name.eq_ignore_ascii_case("DIDL-Lite")
            && matches!(el.namespace.as_deref(), Some(DIDL_LITE_NS) | None)
    }
}

fn child_elements(el: &Element) -> impl Iterator<Item = &Element> {
    el.children.iter().filter_map(XMLNode::as_element)
}

fn find_didl_descendant(el: &Element) -> Option<&Element> {
    for child in child_elements(el) {
        if child.name.eq_ignore_ascii_case("DIDL-Lite") {
            return Some(child);
        }
        if let Some(found) = find_didl_descendant(child) {
            return Some(found);
        }
    }
    None
}

/// Ramasse les objets hors enveloppe : tout élément `item`/`container`, ou
/// portant un enfant `upnp:class`, le plus haut dans l'arbre.
fn collect_orphans(el: &Element, options: &ParseOptions, objects: &mut Vec<DidlObject>) {
    let candidate =
        el.name == "item" || el.name == "container" || find_class_child(el, false).is_some();
    if candidate {
        match parse_object(el, options, el.name == "container") {
            Ok(Some(object)) => objects.push(object),
            Ok(None) => {}
            Err(e) => warn!("⚠️ Skipping malformed orphan object <{}>: {}", el.name, e),
        }
        return;
    }
    for child in child_elements(el) {
        collect_orphans(child, options, objects);
    }
}

fn parse_didl_children(didl: &Element, options: &ParseOptions) -> Result<Vec<DidlObject>> {
    let mut objects = Vec::new();
    for child in child_elements(didl) {
        match classify_and_parse(child, options) {
            Ok(Some(object)) => objects.push(object),
            Ok(None) => {}
            Err(e) => {
                if options.strict {
                    return Err(e);
                }
                warn!("⚠️ Skipping malformed DIDL-Lite entry <{}>: {}", child.name, e);
            }
        }
    }
    Ok(objects)
}

fn classify_and_parse(el: &Element, options: &ParseOptions) -> Result<Option<DidlObject>> {
    if is_didl_child(el, "item", options.strict) {
        return parse_object(el, options, false);
    }
    if is_didl_child(el, "container", options.strict) {
        return parse_object(el, options, true);
    }
    if is_didl_child(el, "desc", options.strict) {
        return parse_descriptor(el, options).map(|d| Some(DidlObject::Descriptor(d)));
    }
    if !options.strict && find_class_child(el, false).is_some() {
        // élément au tag inattendu mais porteur d'une classe : on tente
        return parse_object(el, options, el.name == "container");
    }
    debug!("Skipping unknown top-level element <{}>", el.name);
    Ok(None)
}

/// Vrai si l'élément est `local` dans le namespace DIDL-Lite. En mode non
/// strict, l'absence de namespace est tolérée.
fn is_didl_child(el: &Element, local: &str, strict: bool) -> bool {
    if el.name != local {
        return false;
    }
    match el.namespace.as_deref() {
        Some(ns) => ns == DIDL_LITE_NS,
        None => !strict,
    }
}

/// Cherche l'enfant `upnp:class`. En mode non strict, le nom est comparé sans
/// tenir compte de la casse et un élément non qualifié est accepté.
fn find_class_child(el: &Element, strict: bool) -> Option<&Element> {
    child_elements(el).find(|c| is_class_child(c, strict))
}

fn is_class_child(el: &Element, strict: bool) -> bool {
    let name_ok = if strict {
        el.name == "class"
    } else {
        el.name.eq_ignore_ascii_case("class")
    };
    if !name_ok {
        return false;
    }
    match el.namespace.as_deref() {
        Some(ns) => ns == UPNP_NS || (!strict && ns == DIDL_LITE_NS),
        None => !strict,
    }
}

/// `"0"`/`"false"` valent faux, tout le reste vaut vrai (jeton émis par les
/// devices : `"1"`/`"0"`).
fn parse_bool(value: &str) -> bool {
    let v = value.trim();
    !(v == "0" || v.eq_ignore_ascii_case("false"))
}

fn text_of(el: &Element) -> String {
    el.get_text().map(|t| t.into_owned()).unwrap_or_default()
}

fn match_property<'a>(
    el: &Element,
    defs: &'a [PropertyDef],
    strict: bool,
) -> Option<&'a PropertyDef> {
    defs.iter().find(|def| {
        if el.name != def.name {
            return false;
        }
        match el.namespace.as_deref() {
            Some(ns) => ns == def.uri() || (!strict && ns == DIDL_LITE_NS),
            None => !strict,
        }
    })
}

fn parse_object(
    el: &Element,
    options: &ParseOptions,
    container_hint: bool,
) -> Result<Option<DidlObject>> {
    let class_text = find_class_child(el, options.strict)
        .map(text_of)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    if class_text.is_empty() {
        if options.strict {
            return Err(Error::InvalidClass(format!(
                "object <{}> has no upnp:class",
                el.name
            )));
        }
        warn!("⚠️ Skipping object <{}> without usable upnp:class", el.name);
        return Ok(None);
    }

    let object_class = resolve_class(&class_text, options.strict, options.class_policy)?;
    let class = UpnpClass::with_raw(object_class, class_text);
    let is_container = if object_class == ObjectClass::Unknown {
        container_hint
    } else {
        object_class.is_container()
    };

    let object = if is_container {
        DidlObject::Container(parse_container(el, options, class)?)
    } else {
        DidlObject::Item(parse_item(el, options, class)?)
    };
    Ok(Some(object))
}

fn parse_item(el: &Element, options: &ParseOptions, class: UpnpClass) -> Result<Item> {
    let mut item = Item::new(ObjectClass::Item);
    item.class = class;

    for (name, value) in &el.attributes {
        match name.as_str() {
            "id" => item.id = value.clone(),
            "parentID" => item.parent_id = value.clone(),
            "restricted" => item.restricted = parse_bool(value),
            "refID" => item.ref_id = Some(value.clone()),
            _ => {
                item.extra_attributes.insert(name.clone(), value.clone());
            }
        }
    }

    let mut children = Vec::new();
    parse_object_children(
        el,
        options,
        &item.class,
        false,
        &mut item.properties,
        &mut item.resources,
        &mut item.descriptors,
        &mut children,
        &mut item.extra_elements,
    )?;
    Ok(item)
}

fn parse_container(el: &Element, options: &ParseOptions, class: UpnpClass) -> Result<Container> {
    let mut container = Container::new(ObjectClass::Container);
    container.class = class;

    for (name, value) in &el.attributes {
        match name.as_str() {
            "id" => container.id = value.clone(),
            "parentID" => container.parent_id = value.clone(),
            "restricted" => container.restricted = parse_bool(value),
            "searchable" => container.searchable = Some(parse_bool(value)),
            "neverPlayable" => container.never_playable = Some(parse_bool(value)),
            "childCount" => match value.trim().parse::<u32>() {
                Ok(count) => container.child_count = Some(count),
                Err(_) => {
                    if options.strict {
                        return Err(Error::MalformedDocument(format!(
                            "container <{}> has a non-numeric childCount '{}'",
                            container.id, value
                        )));
                    }
                    warn!("⚠️ Dropping non-numeric childCount '{}' on container", value);
                }
            },
            _ => {
                container
                    .extra_attributes
                    .insert(name.clone(), value.clone());
            }
        }
    }

    parse_object_children(
        el,
        options,
        &container.class,
        true,
        &mut container.properties,
        &mut container.resources,
        &mut container.descriptors,
        &mut container.children,
        &mut container.extra_elements,
    )?;
    Ok(container)
}

#[allow(clippy::too_many_arguments)]
fn parse_object_children(
    el: &Element,
    options: &ParseOptions,
    class: &UpnpClass,
    accept_children: bool,
    properties: &mut PropertyBag,
    resources: &mut Vec<Resource>,
    descriptors: &mut Vec<Descriptor>,
    children: &mut Vec<DidlObject>,
    extra_elements: &mut Vec<ExtraElement>,
) -> Result<()> {
    let defs = properties_of(class.object_class);

    for child in child_elements(el) {
        if is_class_child(child, options.strict) {
            continue;
        }
        if is_didl_child(child, "res", options.strict) {
            resources.push(parse_resource(child));
            continue;
        }
        if is_didl_child(child, "desc", options.strict) {
            descriptors.push(parse_descriptor(child, options)?);
            continue;
        }
        if accept_children
            && (is_didl_child(child, "item", options.strict)
                || is_didl_child(child, "container", options.strict))
        {
            match parse_object(child, options, child.name == "container") {
                Ok(Some(object)) => children.push(object),
                Ok(None) => {}
                Err(e) => {
                    if options.strict {
                        return Err(e);
                    }
                    warn!("⚠️ Skipping malformed nested object <{}>: {}", child.name, e);
                }
            }
            continue;
        }
        if let Some(def) = match_property(child, defs, options.strict) {
            let value = PropertyValue {
                value: text_of(child),
                attributes: child
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            };
            let key = def.key();
            if def.multi {
                properties.push(&key, value);
            } else {
                properties.set(&key, value);
            }
            continue;
        }
        extra_elements.push(ExtraElement::from_element(child));
    }
    Ok(())
}

fn parse_resource(el: &Element) -> Resource {
    Resource {
        uri: text_of(el),
        attributes: el
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

fn parse_descriptor(el: &Element, options: &ParseOptions) -> Result<Descriptor> {
    let id = el.attributes.get("id").cloned();
    let name_space = el.attributes.get("nameSpace").cloned();
    if options.strict && (id.is_none() || name_space.is_none()) {
        return Err(Error::MalformedDocument(
            "desc element is missing its id or nameSpace attribute".to_string(),
        ));
    }
    Ok(Descriptor {
        id: id.unwrap_or_default(),
        name_space: name_space.unwrap_or_default(),
        desc_type: el.attributes.get("type").cloned(),
        text: el.get_text().map(|t| t.into_owned()),
    })
}
