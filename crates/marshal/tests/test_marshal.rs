use helios_marshal::{ErrorKind, MarshalOptions, Result, XmlName, XmlRecord, marshal, marshal_to_writer};

fn pretty(indent: &str) -> MarshalOptions {
    MarshalOptions {
        indent: indent.to_string(),
        include_prolog: true,
        ..Default::default()
    }
}

fn marshal_str<V: helios_marshal::XmlValue>(value: &V, options: &MarshalOptions) -> Result<String> {
    let bytes = marshal(value, options)?;
    Ok(String::from_utf8(bytes).expect("marshaled output is UTF-8"))
}

#[derive(XmlRecord)]
struct SimpleStruct {
    #[xml("id,attr")]
    id: i32,
    #[xml("name")]
    name: String,
}

#[derive(XmlRecord)]
struct VerbatimName {
    #[xml("id,attr")]
    id: i32,
    #[allow(non_snake_case)]
    Name: String,
}

#[test]
fn test_custom_root_tag() -> Result<()> {
    let options = MarshalOptions {
        root_tag: "CustomRootTag".to_string(),
        ..pretty("  ")
    };

    let xml = marshal_str(&SimpleStruct { id: 1, name: "TestName".into() }, &options)?;
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomRootTag id="1">
  <name>TestName</name>
</CustomRootTag>"#
    );

    let xml = marshal_str(&SimpleStruct { id: 2, name: String::new() }, &options)?;
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomRootTag id="2">
  <name></name>
</CustomRootTag>"#
    );

    Ok(())
}

#[test]
fn test_untagged_field_uses_its_identifier() -> Result<()> {
    let options = MarshalOptions {
        root_tag: "CustomRootTag".to_string(),
        ..pretty("  ")
    };

    let xml = marshal_str(&VerbatimName { id: 1, Name: "TestName".into() }, &options)?;
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomRootTag id="1">
  <Name>TestName</Name>
</CustomRootTag>"#
    );
    Ok(())
}

#[derive(XmlRecord)]
struct ChildStruct {
    #[xml("id,attr")]
    id: i32,
    #[xml("data")]
    data: String,
}

#[derive(XmlRecord)]
struct ParentStruct {
    #[xml("id,attr")]
    id: i32,
    #[xml("title")]
    title: String,
    #[xml("child,omitempty")]
    child: Option<Box<ChildStruct>>,
    #[xml("children>child")]
    children: Vec<ChildStruct>,
}

#[test]
fn test_nested_records() -> Result<()> {
    let mut parent = ParentStruct {
        id: 3,
        title: "Parent".into(),
        child: Some(Box::new(ChildStruct { id: 4, data: "ChildData".into() })),
        children: vec![
            ChildStruct { id: 5, data: "Child1".into() },
            ChildStruct { id: 6, data: "Child2".into() },
        ],
    };

    let xml = marshal_str(&parent, &pretty("  "))?;
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ParentStruct id="3">
  <title>Parent</title>
  <child id="4">
    <data>ChildData</data>
  </child>
  <children>
    <child id="5">
      <data>Child1</data>
    </child>
    <child id="6">
      <data>Child2</data>
    </child>
  </children>
</ParentStruct>"#
    );

    parent.child = None;
    let xml = marshal_str(&parent, &pretty("  "))?;
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ParentStruct id="3">
  <title>Parent</title>
  <children>
    <child id="5">
      <data>Child1</data>
    </child>
    <child id="6">
      <data>Child2</data>
    </child>
  </children>
</ParentStruct>"#
    );

    Ok(())
}

#[derive(XmlRecord)]
struct ElementWithEmptyFields {
    #[xml("id,attr")]
    id: i32,
    #[xml("content")]
    content: String,
    #[xml("description")]
    description: String,
    #[xml("note")]
    note: String,
}

#[test]
fn test_self_closing_tags() -> Result<()> {
    let options = pretty("  ").with_self_closing(["content", "description", "note"]);

    let empty = ElementWithEmptyFields {
        id: 7,
        content: String::new(),
        description: String::new(),
        note: String::new(),
    };
    assert_eq!(
        marshal_str(&empty, &options)?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ElementWithEmptyFields id="7">
  <content/>
  <description/>
  <note/>
</ElementWithEmptyFields>"#
    );

    let partial = ElementWithEmptyFields {
        id: 8,
        content: "Has content".into(),
        description: String::new(),
        note: "Also has content".into(),
    };
    assert_eq!(
        marshal_str(&partial, &options)?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ElementWithEmptyFields id="8">
  <content>Has content</content>
  <description/>
  <note>Also has content</note>
</ElementWithEmptyFields>"#
    );

    let spaced = MarshalOptions {
        spaced_self_close: true,
        indent: String::new(),
        include_prolog: false,
        ..options
    };
    assert_eq!(
        marshal_str(&empty, &spaced)?,
        r#"<ElementWithEmptyFields id="7"><content /><description /><note /></ElementWithEmptyFields>"#
    );

    Ok(())
}

#[derive(XmlRecord)]
struct SpecialCharStruct {
    #[xml("text")]
    text: String,
}

#[test]
fn test_special_characters() -> Result<()> {
    let value = SpecialCharStruct {
        text: "Special chars: & < > \" '".into(),
    };
    assert_eq!(
        marshal_str(&value, &pretty("  "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SpecialCharStruct>
  <text>Special chars: &amp; &lt; &gt; &quot; &apos;</text>
</SpecialCharStruct>"#
    );
    Ok(())
}

#[derive(XmlRecord)]
struct OmitEmptyStruct {
    #[xml("id,attr")]
    id: i32,
    #[xml("name,omitempty")]
    name: String,
    #[xml("value,omitempty")]
    value: f64,
    #[xml("note,omitempty")]
    note: Option<String>,
}

#[test]
fn test_omit_empty_fields() -> Result<()> {
    let empty = OmitEmptyStruct {
        id: 8,
        name: String::new(),
        value: 0.0,
        note: None,
    };
    assert_eq!(
        marshal_str(&empty, &pretty("  "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OmitEmptyStruct id="8"></OmitEmptyStruct>"#
    );

    let filled = OmitEmptyStruct {
        id: 9,
        name: "TestName".into(),
        value: 123.45,
        note: None,
    };
    assert_eq!(
        marshal_str(&filled, &pretty("  "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OmitEmptyStruct id="9">
  <name>TestName</name>
  <value>123.45</value>
</OmitEmptyStruct>"#
    );

    Ok(())
}

#[derive(XmlRecord)]
struct OmitEmptyAttr {
    #[xml("code,attr,omitempty")]
    code: u32,
    #[xml("label,attr")]
    label: String,
}

#[test]
fn test_omit_empty_applies_to_attributes() -> Result<()> {
    let options = MarshalOptions::default();
    assert_eq!(
        marshal_str(&OmitEmptyAttr { code: 0, label: String::new() }, &options)?,
        r#"<OmitEmptyAttr label=""></OmitEmptyAttr>"#
    );
    assert_eq!(
        marshal_str(&OmitEmptyAttr { code: 7, label: "x".into() }, &options)?,
        r#"<OmitEmptyAttr code="7" label="x"></OmitEmptyAttr>"#
    );
    Ok(())
}

#[derive(XmlRecord)]
struct NamespacedStruct {
    #[xml("id,attr")]
    id: i32,
    #[xml("name")]
    name: String,
}

#[test]
fn test_namespace_is_first_attribute() -> Result<()> {
    let options = MarshalOptions {
        namespace: "http://example.com/schema".to_string(),
        ..pretty("  ")
    };
    let value = NamespacedStruct { id: 9, name: "Namespaced".into() };
    assert_eq!(
        marshal_str(&value, &options)?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<NamespacedStruct xmlns="http://example.com/schema" id="9">
  <name>Namespaced</name>
</NamespacedStruct>"#
    );
    Ok(())
}

#[derive(XmlRecord)]
struct OwnNamespace {
    #[xml("id,attr")]
    id: i32,
    #[xml("xmlns,attr")]
    xmlns: String,
}

#[test]
fn test_existing_namespace_attribute_is_kept() -> Result<()> {
    let options = MarshalOptions {
        namespace: "urn:configured".to_string(),
        ..Default::default()
    };
    let value = OwnNamespace { id: 1, xmlns: "urn:own".into() };
    assert_eq!(
        marshal_str(&value, &options)?,
        r#"<OwnNamespace xmlns="urn:own" id="1"></OwnNamespace>"#
    );
    Ok(())
}

#[derive(XmlRecord)]
struct PointerStruct {
    #[xml("id,attr,omitempty")]
    id: Option<i32>,
    #[xml("name,omitempty")]
    name: Option<String>,
    #[xml("active,omitempty")]
    active: Option<bool>,
}

#[test]
fn test_optional_fields() -> Result<()> {
    let all = PointerStruct {
        id: Some(10),
        name: Some("Pointer".into()),
        active: Some(true),
    };
    assert_eq!(
        marshal_str(&all, &pretty("  "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<PointerStruct id="10">
  <name>Pointer</name>
  <active>true</active>
</PointerStruct>"#
    );

    let some = PointerStruct {
        id: Some(10),
        name: None,
        active: None,
    };
    assert_eq!(
        marshal_str(&some, &pretty("  "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<PointerStruct id="10"></PointerStruct>"#
    );

    Ok(())
}

#[derive(XmlRecord)]
struct MixedContent {
    #[xml("id,attr")]
    id: i32,
    #[xml("title")]
    title: String,
    #[xml("values>value")]
    values: Vec<String>,
    #[xml("note,omitempty")]
    note: String,
}

#[test]
fn test_mixed_content() -> Result<()> {
    let mut value = MixedContent {
        id: 11,
        title: "Mixed Content".into(),
        values: vec!["One".into(), "Two".into(), "Three".into()],
        note: "Note content".into(),
    };
    assert_eq!(
        marshal_str(&value, &pretty("    "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MixedContent id="11">
    <title>Mixed Content</title>
    <values>
        <value>One</value>
        <value>Two</value>
        <value>Three</value>
    </values>
    <note>Note content</note>
</MixedContent>"#
    );

    value.note.clear();
    assert_eq!(
        marshal_str(&value, &pretty("    "))?,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MixedContent id="11">
    <title>Mixed Content</title>
    <values>
        <value>One</value>
        <value>Two</value>
        <value>Three</value>
    </values>
</MixedContent>"#
    );

    Ok(())
}

#[derive(XmlRecord)]
struct Tagged {
    #[xml("tags>tag,omitempty")]
    tags: Vec<String>,
    #[xml("amount")]
    amount: f64,
}

#[test]
fn test_wrapper_chain_and_float_format() -> Result<()> {
    let options = MarshalOptions::default();

    let value = Tagged {
        tags: vec!["a".into(), "b".into()],
        amount: 5000.0,
    };
    assert_eq!(
        marshal_str(&value, &options)?,
        "<Tagged><tags><tag>a</tag><tag>b</tag></tags><amount>5000.00</amount></Tagged>"
    );

    let value = Tagged {
        tags: Vec::new(),
        amount: 5000.0,
    };
    assert_eq!(
        marshal_str(&value, &options)?,
        "<Tagged><amount>5000.00</amount></Tagged>"
    );
    Ok(())
}

#[derive(XmlRecord)]
struct Deep {
    #[xml("a>b>c")]
    leaf: u8,
}

#[test]
fn test_multi_level_wrapper_chain() -> Result<()> {
    assert_eq!(
        marshal_str(&Deep { leaf: 1 }, &pretty("\t"))?,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Deep>\n\t<a>\n\t\t<b>\n\t\t\t<c>1</c>\n\t\t</b>\n\t</a>\n</Deep>"
    );
    Ok(())
}

#[derive(XmlRecord)]
struct Audit {
    #[xml("created,attr")]
    created: String,
    #[xml("by")]
    by: String,
}

#[derive(XmlRecord)]
struct Document {
    #[xml("id,attr")]
    id: u32,
    #[xml(embed)]
    audit: Audit,
    #[xml("body")]
    body: String,
    #[xml("-")]
    #[allow(dead_code)]
    cache_key: String,
}

#[test]
fn test_embedded_fields_are_flattened_and_excluded_fields_skipped() -> Result<()> {
    let value = Document {
        id: 1,
        audit: Audit {
            created: "2024-01-01".into(),
            by: "me".into(),
        },
        body: "text".into(),
        cache_key: "secret".into(),
    };
    let xml = marshal_str(&value, &MarshalOptions::default())?;
    assert_eq!(
        xml,
        r#"<Document id="1" created="2024-01-01"><by>me</by><body>text</body></Document>"#
    );
    assert!(!xml.contains("secret"));
    Ok(())
}

#[derive(XmlRecord)]
struct Renamed {
    name: XmlName,
    #[xml("v")]
    v: i32,
}

#[test]
fn test_element_name_field_overrides_tag() -> Result<()> {
    let options = MarshalOptions::default();
    assert_eq!(
        marshal_str(&Renamed { name: XmlName::new("Custom"), v: 1 }, &options)?,
        "<Custom><v>1</v></Custom>"
    );
    assert_eq!(
        marshal_str(&Renamed { name: XmlName::default(), v: 1 }, &options)?,
        "<Renamed><v>1</v></Renamed>"
    );
    Ok(())
}

#[derive(XmlRecord)]
struct Page<T> {
    #[xml("total,attr")]
    total: usize,
    #[xml("items>item")]
    items: Vec<T>,
}

#[test]
fn test_generic_record() -> Result<()> {
    let page = Page {
        total: 2,
        items: vec![1u8, 2u8],
    };
    assert_eq!(
        marshal_str(&page, &MarshalOptions::default())?,
        r#"<Page total="2"><items><item>1</item><item>2</item></items></Page>"#
    );
    Ok(())
}

#[test]
fn test_root_resolution() -> Result<()> {
    let options = MarshalOptions::default();

    let err = marshal(&None::<SimpleStruct>, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NilRoot);

    let err = marshal(&vec![1, 2], &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingTag);

    let err = marshal(&5, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingTag);

    let list = MarshalOptions {
        root_tag: "items>item".to_string(),
        ..Default::default()
    };
    assert_eq!(
        marshal_str(&vec![1, 2], &list)?,
        "<items><item>1</item><item>2</item></items>"
    );

    let scalar = MarshalOptions {
        root_tag: "count".to_string(),
        ..Default::default()
    };
    assert_eq!(marshal_str(&5, &scalar)?, "<count>5</count>");

    let boxed = Some(Box::new(SimpleStruct { id: 1, name: "n".into() }));
    assert_eq!(
        marshal_str(&boxed, &options)?,
        r#"<SimpleStruct id="1"><name>n</name></SimpleStruct>"#
    );

    Ok(())
}

#[test]
fn test_sequence_without_item_name_fails_with_context() {
    let options = MarshalOptions {
        root_tag: "items".to_string(),
        ..Default::default()
    };
    let err = marshal(&vec![1, 2], &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert_eq!(err.root_cause().kind(), ErrorKind::MissingTag);
}

#[derive(XmlRecord)]
struct BadAttr {
    #[xml("list,attr")]
    list: Vec<u8>,
}

#[test]
fn test_attribute_must_be_scalar() {
    let err = marshal(&BadAttr { list: vec![1] }, &MarshalOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(err.to_string().contains("list"));
}

#[test]
fn test_prolog_without_indent_stays_on_one_line() -> Result<()> {
    let options = MarshalOptions {
        include_prolog: true,
        ..Default::default()
    };
    assert_eq!(
        marshal_str(&SimpleStruct { id: 1, name: "x".into() }, &options)?,
        r#"<?xml version="1.0" encoding="UTF-8"?><SimpleStruct id="1"><name>x</name></SimpleStruct>"#
    );
    Ok(())
}

#[test]
fn test_marshal_to_writer_matches_marshal() -> Result<()> {
    let value = ParentStruct {
        id: 1,
        title: "t".into(),
        child: None,
        children: vec![ChildStruct { id: 2, data: "d".into() }],
    };

    for compress in [false, true] {
        let options = MarshalOptions {
            compress,
            ..pretty("  ")
        };
        let mut sink = Vec::new();
        marshal_to_writer(&value, &options, &mut sink)?;
        if compress {
            assert_eq!(&sink[..2], &[0x1f, 0x8b]);
        } else {
            assert_eq!(sink, marshal(&value, &options)?);
        }
    }
    Ok(())
}

#[test]
fn test_options_from_json() -> Result<()> {
    let options = MarshalOptions::from_json_str(
        r#"{ "indent": "  ", "root_tag": "Root", "self_closing_tags": ["name"] }"#,
    )?;
    assert_eq!(
        marshal_str(&SimpleStruct { id: 3, name: String::new() }, &options)?,
        "<Root id=\"3\">\n  <name/>\n</Root>"
    );

    let err = MarshalOptions::from_json_str("{ not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    Ok(())
}
