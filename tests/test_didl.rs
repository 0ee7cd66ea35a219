//! Tests d'intégration : aller-retour complet modèle ↔ XML, modes strict et
//! non strict, récupération sur documents déviants.

use pmodidl::{
    ClassPolicy, Container, Descriptor, DidlObject, Error, Item, ObjectClass, ParseOptions,
    Resource, parse, parse_lenient, parse_with, serialize,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn sample_objects() -> Vec<DidlObject> {
    let track = Item::new(ObjectClass::MusicTrack)
        .with_id("0$album$1")
        .with_parent_id("0$album")
        .with_title("Test Song")
        .with_creator("Test Artist")
        .with_property("upnp:artist", "Test Artist")
        .with_property("upnp:album", "Test Album")
        .with_property("upnp:originalTrackNumber", "7")
        .with_resource(
            Resource::new("http://example.com/t.flac", "http-get:*:audio/flac:*")
                .with_attribute("duration", "0:03:00")
                .with_attribute("sampleFrequency", "44100"),
        )
        .with_descriptor(
            Descriptor::new("rg", "urn:acme:replaygain")
                .with_type("ratio")
                .with_text("-6.02"),
        );

    let album = Container::new(ObjectClass::MusicAlbum)
        .with_id("0$album")
        .with_parent_id("0")
        .with_child_count(1)
        .with_searchable(true)
        .with_title("Test Album")
        .with_property("upnp:artist", "Test Artist")
        .with_child(track);

    vec![DidlObject::Container(album)]
}

#[test]
fn round_trip_preserves_objects() -> pmodidl::Result<()> {
    init_tracing();
    let objects = sample_objects();
    let xml = serialize(&objects)?;
    let parsed = parse(&xml)?;
    assert_eq!(parsed, objects);
    Ok(())
}

#[test]
fn serialization_is_idempotent() -> pmodidl::Result<()> {
    let first = serialize(&sample_objects())?;
    let reparsed = parse(&first)?;
    let second = serialize(&reparsed)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn serialization_is_idempotent_with_extras() -> pmodidl::Result<()> {
    // Extensions vendeur : élément inconnu et attribut inconnu sur res.
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:sec="http://www.sec.co.kr/">
    <item id="1" parentID="0" restricted="1">
        <dc:title>T</dc:title>
        <upnp:class>object.item.audioItem.musicTrack</upnp:class>
        <sec:preference order="2">5</sec:preference>
        <res protocolInfo="http-get:*:audio/mpeg:*" sampleRate="44100">http://example.com/a.mp3</res>
    </item>
</DIDL-Lite>"#;

    let first = serialize(&parse(xml)?)?;
    let second = serialize(&parse(&first)?)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn strict_parse_fails_on_unknown_class() {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>T</dc:title>
        <upnp:class>object.item.bogus</upnp:class>
    </item>
</DIDL-Lite>"#;
    assert!(matches!(parse(xml).unwrap_err(), Error::InvalidClass(_)));
}

#[test]
fn lenient_parse_recovers_with_fallback_variant() -> pmodidl::Result<()> {
    init_tracing();
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>Broken</dc:title>
        <upnp:class>object.item.bogus</upnp:class>
    </item>
    <item id="2" parentID="0">
        <dc:title>Fine</dc:title>
        <upnp:class>object.item.audioItem.musicTrack</upnp:class>
    </item>
</DIDL-Lite>"#;

    let objects = parse_lenient(xml)?;
    assert_eq!(objects.len(), 2);

    let fallback = objects[0].as_item().unwrap();
    assert_eq!(fallback.object_class(), ObjectClass::Item);
    // la chaîne d'origine est conservée telle quelle
    assert_eq!(fallback.upnp_class(), "object.item.bogus");

    assert_eq!(objects[1].as_item().unwrap().object_class(), ObjectClass::MusicTrack);
    Ok(())
}

#[test]
fn class_matching_is_case_insensitive_in_lenient_only() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>T</dc:title>
        <upnp:class>OBJECT.ITEM.AUDIOITEM.MUSICTRACK</upnp:class>
    </item>
</DIDL-Lite>"#;

    assert!(matches!(parse(xml).unwrap_err(), Error::InvalidClass(_)));

    let objects = parse_lenient(xml)?;
    assert_eq!(objects[0].as_item().unwrap().object_class(), ObjectClass::MusicTrack);
    Ok(())
}

#[test]
fn class_fallback_order_is_configurable() -> pmodidl::Result<()> {
    // Seul le dernier segment est en mauvaise casse : les deux politiques
    // divergent.
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>T</dc:title>
        <upnp:class>object.item.audioItem.MUSICTRACK</upnp:class>
    </item>
</DIDL-Lite>"#;

    let case_fold = ParseOptions::lenient().with_class_policy(ClassPolicy::CaseFoldFirst);
    let objects = parse_with(xml, &case_fold)?;
    assert_eq!(objects[0].as_item().unwrap().object_class(), ObjectClass::MusicTrack);

    let prefix_first = ParseOptions::lenient().with_class_policy(ClassPolicy::PrefixFirst);
    let objects = parse_with(xml, &prefix_first)?;
    assert_eq!(objects[0].as_item().unwrap().object_class(), ObjectClass::AudioItem);
    Ok(())
}

#[test]
fn storage_folder_scenario() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <container id="64" parentID="0" restricted="1" searchable="1">
        <dc:title>Music</dc:title>
        <upnp:class>object.container.storageFolder</upnp:class>
        <upnp:storageUsed>-1</upnp:storageUsed>
    </container>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    assert_eq!(objects.len(), 1);

    let container = objects[0].as_container().unwrap();
    assert_eq!(container.id, "64");
    assert_eq!(container.parent_id, "0");
    assert!(container.restricted);
    assert_eq!(container.searchable, Some(true));
    assert_eq!(container.title(), Some("Music"));
    assert_eq!(container.upnp_class(), "object.container.storageFolder");
    assert_eq!(container.object_class(), ObjectClass::StorageFolder);
    assert_eq!(container.property("upnp:storageUsed"), Some("-1"));
    assert_eq!(container.property("storage_used"), Some("-1"));
    Ok(())
}

#[test]
fn vendor_res_attribute_round_trips() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>T</dc:title>
        <upnp:class>object.item.audioItem.musicTrack</upnp:class>
        <res protocolInfo="http-get:*:audio/mpeg:*" sampleRate="44100">http://example.com/a.mp3</res>
    </item>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    let item = objects[0].as_item().unwrap();
    assert_eq!(item.resources[0].attribute("sampleRate"), Some("44100"));

    let emitted = serialize(&objects)?;
    assert!(emitted.contains(r#"sampleRate="44100""#));
    Ok(())
}

#[test]
fn malformed_xml_fails_in_both_modes() {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">
    <item id="1" parentID="0">"#;
    assert!(matches!(parse(xml).unwrap_err(), Error::MalformedDocument(_)));
    assert!(matches!(
        parse_lenient(xml).unwrap_err(),
        Error::MalformedDocument(_)
    ));
}

#[test]
fn sibling_order_is_preserved() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="0" parentID="0" restricted="1">
        <dc:title>Audio Item Title 1</dc:title>
        <upnp:class>object.item.audioItem</upnp:class>
    </item>
    <container id="1" parentID="0" restricted="1">
        <dc:title>Album Container Title</dc:title>
        <upnp:class>object.container.album</upnp:class>
    </container>
    <item id="2" parentID="0" restricted="1">
        <dc:title>Audio Item Title 2</dc:title>
        <upnp:class>object.item.audioItem</upnp:class>
    </item>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[0].as_item().unwrap().object_class(), ObjectClass::AudioItem);
    assert_eq!(objects[1].as_container().unwrap().object_class(), ObjectClass::Album);
    assert_eq!(objects[2].as_item().unwrap().object_class(), ObjectClass::AudioItem);
    assert_eq!(objects.iter().map(|o| o.id()).collect::<Vec<_>>(), vec!["0", "1", "2"]);

    // réémission dans le même ordre
    let emitted = serialize(&objects)?;
    let reparsed = parse(&emitted)?;
    assert_eq!(reparsed.iter().map(|o| o.id()).collect::<Vec<_>>(), vec!["0", "1", "2"]);
    Ok(())
}

#[test]
fn descriptor_attached_to_nested_item() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <container id="0" parentID="0" restricted="1">
        <dc:title>Album Container Title</dc:title>
        <upnp:class>object.container.album</upnp:class>
        <item id="1" parentID="0" restricted="1">
            <dc:title>Audio Item Title</dc:title>
            <upnp:class>object.item.audioItem</upnp:class>
            <desc id="1" nameSpace="ns" type="type">Text</desc>
        </item>
    </container>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    let container = objects[0].as_container().unwrap();
    let item = container.children[0].as_item().unwrap();
    let descriptor = &item.descriptors[0];
    assert_eq!(descriptor.id, "1");
    assert_eq!(descriptor.name_space, "ns");
    assert_eq!(descriptor.desc_type.as_deref(), Some("type"));
    assert_eq!(descriptor.text.as_deref(), Some("Text"));
    Ok(())
}

#[test]
fn unknown_properties_survive_reserialization() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="0" parentID="0" restricted="1">
        <dc:title>Video Item Title</dc:title>
        <upnp:class>object.item.videoItem</upnp:class>
        <upnp:albumArtURI>extra_property</upnp:albumArtURI>
    </item>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    let item = objects[0].as_item().unwrap();
    // albumArtURI n'est pas une propriété de videoItem : préservée en extra
    assert_eq!(item.extra_elements[0].name, "upnp:albumArtURI");

    let emitted = serialize(&objects)?;
    assert!(emitted.contains("<upnp:albumArtURI>extra_property</upnp:albumArtURI>"));
    Ok(())
}

#[test]
fn entirely_unknown_class_becomes_unknown_variant() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="1" parentID="0">
        <dc:title>Weird</dc:title>
        <upnp:class>vendor.custom.thing</upnp:class>
    </item>
</DIDL-Lite>"#;

    let objects = parse_lenient(xml)?;
    let item = objects[0].as_item().unwrap();
    assert_eq!(item.object_class(), ObjectClass::Unknown);
    assert_eq!(item.upnp_class(), "vendor.custom.thing");

    // la classe brute repart telle quelle
    let emitted = serialize(&objects)?;
    assert!(emitted.contains("<upnp:class>vendor.custom.thing</upnp:class>"));
    Ok(())
}

#[test]
fn genre_dependent_attribute_round_trips() -> pmodidl::Result<()> {
    let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
        xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <item id="0" parentID="0" restricted="1">
        <dc:title>Video Item Title</dc:title>
        <upnp:class>object.item.videoItem</upnp:class>
        <upnp:genre id="genreId">Action</upnp:genre>
    </item>
</DIDL-Lite>"#;

    let objects = parse(xml)?;
    let item = objects[0].as_item().unwrap();
    let genre = &item.property_values("upnp:genre")[0];
    assert_eq!(genre.value, "Action");
    assert_eq!(genre.attributes.get("id").map(String::as_str), Some("genreId"));

    let emitted = serialize(&objects)?;
    assert!(emitted.contains(r#"<upnp:genre id="genreId">Action</upnp:genre>"#));
    Ok(())
}

#[test]
fn restricted_tokens_are_emitted_as_digits() -> pmodidl::Result<()> {
    let item = Item::new(ObjectClass::MusicTrack)
        .with_id("1")
        .with_title("T")
        .with_restricted(false);
    let emitted = serialize(&[DidlObject::Item(item)])?;
    assert!(emitted.contains(r#"restricted="0""#));

    let reparsed = parse(&emitted)?;
    assert!(!reparsed[0].as_item().unwrap().restricted);
    Ok(())
}
