//! Comprehensive tests for stamper-html
//!
//! Parsing of stamper markup and serialization back to HTML.

use stamper_dom::Selector;
use stamper_html::{get_outer_html, parse, HtmlParser, HtmlSerializer};

#[test]
fn test_parse_minimal_html() {
    let doc = parse("").unwrap();
    assert!(doc.tree().len() >= 1, "Even empty HTML should have a root");
    assert!(doc.body().is_valid());
}

#[test]
fn test_parse_with_url() {
    let doc = HtmlParser::new().parse_with_url("<p>x</p>", "file:///page.html").unwrap();
    assert_eq!(doc.url(), "file:///page.html");
}

#[test]
fn test_parse_stamper_scope() {
    let html = r#"
        <div stamper="list">
            <template s-temp="list">
                <li s-index="name" name="item-{{index}}"><span s-sequence="00"></span></li>
            </template>
            <ul s-crate="list"></ul>
            <button s-cast="list" s-preadd="alert('hi')">Add</button>
        </div>"#;
    let doc = parse(html).unwrap();
    let tree = doc.tree();

    let trigger = doc.query_selector(&Selector::attr_eq("s-cast", "list")).unwrap();
    assert_eq!(tree.tag_name(trigger), Some("button"));
    assert_eq!(tree.get_attribute(trigger, "s-preadd"), Some("alert('hi')"));

    let template = doc.query_selector(&Selector::attr_eq("s-temp", "list")).unwrap();
    let content = tree.template_content(template).unwrap();
    let items = tree.element_children(content);
    assert_eq!(items.len(), 1);
    assert_eq!(tree.get_attribute(items[0], "name"), Some("item-{{index}}"));
}

#[test]
fn test_nested_template_content() {
    let html = "<template id=outer><div><template id=inner><p>x</p></template></div></template>";
    let doc = parse(html).unwrap();
    let tree = doc.tree();

    let outer = doc.get_element_by_id("outer").unwrap();
    let outer_content = tree.template_content(outer).unwrap();
    let inner = tree
        .query_selector(outer_content, &Selector::Id("inner".into()))
        .unwrap();
    let inner_content = tree.template_content(inner).unwrap();
    assert_eq!(tree.text_content(inner_content), "x");
}

#[test]
fn test_serialize_round_trip_of_scope() {
    let html = r#"<div stamper="list"><template s-temp="list"><li>item</li></template><ul s-crate="list"></ul></div>"#;
    let doc = parse(html).unwrap();
    let root = doc.query_selector(&Selector::has_attr("stamper")).unwrap();
    assert_eq!(get_outer_html(doc.tree(), root), html);
}

#[test]
fn test_serialize_escapes_text() {
    let doc = parse("<p title='a \"b\"'>1 &lt; 2</p>").unwrap();
    let p = doc.query_selector(&Selector::Tag("p".into())).unwrap();
    assert_eq!(
        HtmlSerializer::new().serialize_outer(doc.tree(), p),
        "<p title=\"a &quot;b&quot;\">1 &lt; 2</p>"
    );
}

#[test]
fn test_serialize_document() {
    let doc = parse("<!DOCTYPE html><title>T</title>").unwrap();
    let html = HtmlSerializer::new().serialize_outer(doc.tree(), doc.tree().root());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>T</title>"));
}
