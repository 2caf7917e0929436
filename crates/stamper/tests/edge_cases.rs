//! Edge cases for stamper
//!
//! Invalid scopes, several scopes on one page, configuration and the
//! failure paths of initialization.

use stamper::dom::{NodeId, Selector};
use stamper::{Config, Page, ScriptedHost};

fn load(html: &str) -> Page<ScriptedHost> {
    let mut page = Page::from_html(html, ScriptedHost::new(true)).unwrap();
    page.initialize_all();
    page
}

fn select(page: &Page<ScriptedHost>, selector: &str) -> NodeId {
    page.document()
        .query_selector(&Selector::parse(selector).unwrap())
        .unwrap_or_else(|| panic!("nothing matches {}", selector))
}

fn click(page: &mut Page<ScriptedHost>, selector: &str) {
    let target = select(page, selector);
    page.click(target);
}

// ============================================================================
// INVALID SCOPES
// ============================================================================

#[test]
fn test_missing_container() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li></li></template>
      <button s-cast="mock">add</button>
    </div>"#;
    let mut page = load(html);
    let root = select(&page, "[stamper=mock]");

    assert!(!page.scopes()[0].is_initialized());
    assert!(!page.tree().has_attribute(root, "s-inited"));

    // the trigger was never wired
    click(&mut page, "[s-cast=mock]");
    assert!(page.document().query_selector(&Selector::Tag("li".into())).is_none());
}

#[test]
fn test_elements_must_match_identifier() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li></li></template>
      <ul s-crate="other"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let page = load(html);
    assert!(!page.scopes()[0].is_initialized());
}

#[test]
fn test_empty_identifier() {
    let html = r#"
    <div stamper="">
      <template s-temp=""><li></li></template>
      <ul s-crate=""></ul>
      <button s-cast="">add</button>
    </div>"#;
    let page = load(html);
    assert_eq!(page.scopes().len(), 1);
    assert!(!page.scopes()[0].is_initialized());
}

#[test]
fn test_template_with_two_children() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li>a</li><li>b</li></template>
      <ul s-crate="mock"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let page = load(html);
    assert!(!page.scopes()[0].is_initialized());
}

#[test]
fn test_template_marker_on_non_template() {
    let html = r#"
    <div stamper="mock">
      <div s-temp="mock"><li>a</li></div>
      <ul s-crate="mock"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let page = load(html);
    assert!(!page.scopes()[0].is_initialized());
}

#[test]
fn test_seeded_child_without_pattern_aborts_init() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li s-sequence="0"></li></template>
      <ul s-crate="mock"><li s-sequence="0">x</li><li s-sequence="">y</li></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let page = load(html);

    assert!(!page.scopes()[0].is_initialized());
    assert_eq!(page.scopes()[0].current_index(), 0);
    // nothing was stamped
    let first = select(&page, "[s-crate=mock]");
    let first = page.tree().element_children(first)[0];
    assert_eq!(page.tree().text_content(first), "x");
}

#[test]
fn test_empty_template_adds_nothing_but_counts() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"></template>
      <ul s-crate="mock"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let mut page = load(html);
    click(&mut page, "[s-cast=mock]");

    let container = select(&page, "[s-crate=mock]");
    assert!(page.tree().element_children(container).is_empty());
    assert_eq!(page.scopes()[0].current_index(), 1);
}

// ============================================================================
// DELETE CONTROLS
// ============================================================================

#[test]
fn test_non_button_delete_marker_is_ignored() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li><span s-delete="mock">x</span></li></template>
      <ul s-crate="mock"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let mut page = load(html);
    click(&mut page, "[s-cast=mock]");
    click(&mut page, "[s-delete=mock]");

    let container = select(&page, "[s-crate=mock]");
    assert_eq!(page.tree().element_children(container).len(), 1);
    assert!(page.host().confirms.is_empty());
}

#[test]
fn test_click_inside_delete_button_bubbles() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li><button s-delete="mock"><i class="icon">x</i></button></li></template>
      <ul s-crate="mock"></ul>
      <button s-cast="mock"><span class="label">add</span></button>
    </div>"#;
    let mut page = load(html);
    click(&mut page, ".label");
    click(&mut page, ".label");
    click(&mut page, ".icon");

    let container = select(&page, "[s-crate=mock]");
    assert_eq!(page.tree().element_children(container).len(), 1);
    assert_eq!(page.scopes()[0].current_index(), 2);
}

#[test]
fn test_custom_config() {
    let html = r#"
    <div stamper="mock">
      <template s-temp="mock"><li><a s-delete="mock" aria-label="Drop">x</a></li></template>
      <ul s-crate="mock"></ul>
      <button s-cast="mock">add</button>
    </div>"#;
    let config = Config::from_json_str(
        r#"{ "confirm_template": "Sure? {label}", "inited_value": "done", "delete_control_tags": ["button", "a"] }"#,
    )
    .unwrap();
    let document = stamper::html::parse(html).unwrap();
    let mut page = Page::with_config(document, ScriptedHost::new(true), config);
    page.initialize_all();

    let root = select(&page, "[stamper=mock]");
    assert_eq!(page.tree().get_attribute(root, "s-inited"), Some("done"));

    click(&mut page, "[s-cast=mock]");
    click(&mut page, "[s-delete=mock]");
    let container = select(&page, "[s-crate=mock]");
    assert!(page.tree().element_children(container).is_empty());
    assert_eq!(page.host().confirms, vec!["Sure? Drop"]);
}

// ============================================================================
// SEVERAL SCOPES
// ============================================================================

const TWO_SCOPES: &str = r#"
<section stamper="a">
  <template s-temp="a"><li s-sequence="0" s-index="data-ref" data-ref="{{a:index}}/{{b:index}}/{{index}}"></li></template>
  <ul s-crate="a"></ul>
  <button s-cast="a">add a</button>
</section>
<section stamper="b">
  <template s-temp="b"><li s-sequence="0" s-index="data-ref" data-ref="{{a:index}}/{{b:index}}/{{index}}"></li></template>
  <ul s-crate="b"></ul>
  <button s-cast="b">add b</button>
</section>
"#;

#[test]
fn test_scopes_keep_their_own_counters() {
    let mut page = load(TWO_SCOPES);
    assert_eq!(page.scopes().len(), 2);

    click(&mut page, "[s-cast=a]");
    click(&mut page, "[s-cast=a]");
    click(&mut page, "[s-cast=b]");

    let a = page.scope_by_identifier("a").unwrap();
    let b = page.scope_by_identifier("b").unwrap();
    assert_eq!(page.scope(a).unwrap().current_index(), 2);
    assert_eq!(page.scope(b).unwrap().current_index(), 1);

    let crate_b = select(&page, "[s-crate=b]");
    let item = page.tree().element_children(crate_b)[0];
    assert_eq!(page.tree().text_content(item), "1");
    assert_eq!(page.tree().get_attribute(item, "data-ref"), Some("{{a:index}}/0/0"));

    let crate_a = select(&page, "[s-crate=a]");
    let item = page.tree().element_children(crate_a)[1];
    assert_eq!(page.tree().get_attribute(item, "data-ref"), Some("1/{{b:index}}/1"));
}

#[test]
fn test_nested_template_tokens_are_scoped() {
    let html = r#"
    <div stamper="outer">
      <template s-temp="outer">
        <div class="row" s-index="id" id="row-{{outer:index}}">
          <template class="nested">
            <p s-index="data-owner" data-owner="{{outer:index}}-{{inner:index}}"></p>
          </template>
        </div>
      </template>
      <div s-crate="outer"></div>
      <button s-cast="outer">add</button>
    </div>"#;
    let mut page = load(html);
    click(&mut page, "[s-cast=outer]");
    click(&mut page, "[s-cast=outer]");

    let container = select(&page, "[s-crate=outer]");
    let row = page.tree().element_children(container)[1];
    assert_eq!(page.tree().get_attribute(row, "id"), Some("row-1"));

    let nested = page
        .tree()
        .query_selector(row, &Selector::Class("nested".into()))
        .unwrap();
    let content = page.tree().template_content(nested).unwrap();
    let p = page.tree().element_children(content)[0];
    assert_eq!(page.tree().get_attribute(p, "data-owner"), Some("1-{{inner:index}}"));
}
