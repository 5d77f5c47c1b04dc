//! Page objects. Each one owns a [`BasePage`] and sends every element interaction
//! through its helper.

mod text_box;

pub use text_box::{verify_the_value, FormEntry, TextBoxPage};

use pagewright::{Driver, HelperConfig, InteractionHelper, Page};

/// Shared state of every page object: the interaction helper for one page.
#[derive(Debug, Clone)]
pub struct BasePage<'p, D: Driver = Page> {
    helper: InteractionHelper<'p, D>,
}

impl<'p, D: Driver> BasePage<'p, D> {
    pub fn new(driver: &'p D, config: HelperConfig) -> Self {
        Self::from_helper(InteractionHelper::new(driver, config))
    }

    /// Build on an existing helper, keeping its sink and scope.
    pub fn from_helper(helper: InteractionHelper<'p, D>) -> Self {
        Self { helper }
    }

    pub fn helper(&self) -> &InteractionHelper<'p, D> {
        &self.helper
    }
}
