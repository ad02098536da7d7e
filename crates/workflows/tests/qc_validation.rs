//! Sample type designer scenario: QC field validation surfacing.

use bancada::mock::{MockDriver, MockNode};
use bancada::{BancadaError, PageDriver};
use bancada_workflows::SampleTypeDesignerPage;
use std::sync::Arc;

fn designer_fixture() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    driver.with_dom(|dom| {
        dom.insert_root(MockNode::new("form", "table").with_class("detail-table"));

        dom.insert_child("form", MockNode::new("r0", "tr").with_class("field-row"));
        dom.insert_child(
            "r0",
            MockNode::new("c0", "td").with_class("field-caption").with_text("Name"),
        );
        dom.insert_child("r0", MockNode::new("v0", "td").with_class("field-value"));
        dom.insert_child("v0", MockNode::new("name-input", "input").with_attr("value", ""));
        dom.insert_child(
            "v0",
            MockNode::new("name-err", "div")
                .with_class("field-error")
                .with_text("Name is required"),
        );

        dom.insert_child("form", MockNode::new("r1", "tr").with_class("field-row"));
        dom.insert_child(
            "r1",
            MockNode::new("c1", "td")
                .with_class("field-caption")
                .with_text("Missing Values"),
        );
        dom.insert_child("r1", MockNode::new("v1", "td").with_class("field-value"));
        dom.insert_child(
            "v1",
            MockNode::new("mv-toggle", "input").with_attr("type", "checkbox"),
        );

        dom.insert_child("form", MockNode::new("r2", "tr").with_class("field-row"));
        dom.insert_child(
            "r2",
            MockNode::new("c2", "td")
                .with_class("field-caption")
                .with_text("Modified"),
        );
        dom.insert_child(
            "r2",
            MockNode::new("v2", "td")
                .with_class("field-value")
                .with_class("field-read-only"),
        );
        dom.insert_child("v2", MockNode::new("mod-input", "input").with_attr("value", "today"));

        dom.insert_root(MockNode::new("save-btn", "button").with_text("Save"));
    });
    driver
}

#[tokio::test]
async fn surfaces_field_error_by_caption() {
    let driver = designer_fixture();
    let page = SampleTypeDesignerPage::new(Arc::clone(&driver) as Arc<dyn PageDriver>);

    assert_eq!(
        page.field_error("Name").await.unwrap().as_deref(),
        Some("Name is required")
    );
    assert_eq!(page.field_error("Missing Values").await.unwrap(), None);
    assert_eq!(
        page.validation_errors().await.unwrap(),
        vec!["Name is required"]
    );
}

#[tokio::test]
async fn sets_name_through_the_detail_form() {
    let driver = designer_fixture();
    let page = SampleTypeDesignerPage::new(Arc::clone(&driver) as Arc<dyn PageDriver>);

    page.set_name("Plasma Samples").await.unwrap();
    assert_eq!(driver.calls_matching("click:name-input"), 1);
    assert_eq!(driver.calls_matching("type:name-input:Plasma Samples"), 1);
}

#[tokio::test]
async fn toggles_missing_value_indicators() {
    let driver = designer_fixture();
    let page = SampleTypeDesignerPage::new(Arc::clone(&driver) as Arc<dyn PageDriver>);

    page.set_missing_values_enabled("Missing Values", true)
        .await
        .unwrap();
    assert_eq!(driver.calls_matching("click:mv-toggle"), 1);

    // Already unchecked, so disabling is a no-op.
    page.set_missing_values_enabled("Missing Values", false)
        .await
        .unwrap();
    assert_eq!(driver.calls_matching("click:mv-toggle"), 1);
}

#[tokio::test]
async fn read_only_property_rejects_writes() {
    let driver = designer_fixture();
    let page = SampleTypeDesignerPage::new(Arc::clone(&driver) as Arc<dyn PageDriver>);

    let err = page
        .properties()
        .set_text_field("Modified", "yesterday")
        .await
        .unwrap_err();
    assert!(matches!(err, BancadaError::Precondition { .. }));
    assert_eq!(driver.calls_matching("type:mod-input"), 0);
}

#[tokio::test]
async fn save_clicks_the_save_button() {
    let driver = designer_fixture();
    let page = SampleTypeDesignerPage::new(Arc::clone(&driver) as Arc<dyn PageDriver>);
    page.save().await.unwrap();
    assert_eq!(driver.calls_matching("click:save-btn"), 1);
}
