//! Study security page: per-group role assignment.
//!
//! The screen renders one `tr.group-row` per security group inside
//! `table.security-matrix`, with a `td.group-name` caption and one
//! radio input per role (the role name in the `value` attribute,
//! `checked="true"` on the active one).

use bancada::{
    BancadaError, BancadaResult, Locator, Page, PageDriver, PageObject, UrlMatcher,
    WaitOptions,
};
use std::sync::Arc;
use tracing::info;

/// Page object for the study security matrix
pub struct StudySecurityPage {
    page: Page,
}

impl std::fmt::Debug for StudySecurityPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudySecurityPage").finish_non_exhaustive()
    }
}

impl StudySecurityPage {
    /// Bind the page object to a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            page: Page::new(
                driver,
                "study security",
                UrlMatcher::Contains("/security".to_string()),
            ),
        }
    }

    /// Shared page plumbing
    #[must_use]
    pub fn page(&mut self) -> &mut Page {
        &mut self.page
    }

    fn matrix() -> Locator {
        Locator::css("table.security-matrix")
    }

    fn group_row(index: usize) -> Locator {
        Self::matrix().descendant(&Locator::css("tr.group-row").index(index))
    }

    /// Group captions, top to bottom
    pub async fn group_names(&self) -> BancadaResult<Vec<String>> {
        let captions = Self::matrix()
            .descendant(&Locator::css("td.group-name"))
            .with_strict(false);
        let handles = self.page.driver().find_all(captions.selector()).await?;
        let driver = self.page.driver();
        let mut names = Vec::with_capacity(handles.len());
        for handle in &handles {
            names.push(driver.text(handle).await?);
        }
        Ok(names)
    }

    async fn group_index(&self, group: &str) -> BancadaResult<usize> {
        self.group_names()
            .await?
            .iter()
            .position(|n| n == group)
            .ok_or_else(|| BancadaError::NotFound {
                selector: format!("security group '{group}'"),
            })
    }

    /// Assign a role to a group by clicking its radio button
    pub async fn set_role(&self, group: &str, role: &str) -> BancadaResult<()> {
        let index = self.group_index(group).await?;
        info!(group, role, "assigning security role");
        let radio = Self::group_row(index)
            .descendant(&Locator::css("input[type='radio']").with_attribute("value", role));
        self.page.lazy(radio).click().await
    }

    /// The role currently assigned to a group, if any
    pub async fn role_of(&self, group: &str) -> BancadaResult<Option<String>> {
        let index = self.group_index(group).await?;
        let checked = Self::group_row(index).descendant(
            &Locator::css("input[type='radio']").with_attribute("checked", "true"),
        );
        let found = self.page.driver().find_all(checked.selector()).await?;
        match found.first() {
            Some(handle) => self.page.driver().attribute(handle, "value").await,
            None => Ok(None),
        }
    }

    /// Save the matrix and wait for the confirmation marker
    pub async fn save(&self) -> BancadaResult<()> {
        self.page.click_button("Save").await?;
        self.page
            .wait_for_element(
                Locator::css("div.save-confirmation"),
                WaitOptions::default(),
            )
            .await
    }

    /// Assign a role and read it back
    pub async fn set_and_verify_role(&self, group: &str, role: &str) -> BancadaResult<()> {
        self.set_role(group, role).await?;
        let actual = self.role_of(group).await?;
        if actual.as_deref() == Some(role) {
            Ok(())
        } else {
            Err(BancadaError::assertion(
                role,
                actual.unwrap_or_else(|| "<none>".to_string()),
            ))
        }
    }
}

#[async_trait::async_trait]
impl PageObject for StudySecurityPage {
    fn url_pattern(&self) -> UrlMatcher {
        UrlMatcher::Contains("/security".to_string())
    }

    fn page_name(&self) -> &str {
        "study security"
    }

    async fn is_loaded(&self) -> BancadaResult<bool> {
        self.page.lazy(Self::matrix()).is_displayed().await
    }
}
