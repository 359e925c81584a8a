use serde::Serialize;

use crate::services::categories::display_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "isReserved")]
    pub reserved: bool,
    pub created_at: String,
}

impl Category {
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Category as returned by the API, decorated with its display form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryJson {
    #[serde(flatten)]
    pub category: Category,
    pub display_name: String,
}

impl From<Category> for CategoryJson {
    fn from(category: Category) -> Self {
        let display_name = category.display_name();
        Self {
            category,
            display_name,
        }
    }
}
