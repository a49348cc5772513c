//! Static catalog of quiz categories

use serde::Serialize;

/// A themed image category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub display_name: &'static str,
}

impl Category {
    /// Folder holding the category's images under `image_base`
    pub fn source_location(&self, image_base: &str) -> String {
        format!("{}/{}/", image_base.trim_end_matches('/'), self.id)
    }
}

const fn category(id: &'static str, display_name: &'static str) -> Category {
    Category { id, display_name }
}

pub static CATEGORIES: [Category; 15] = [
    category("Animals", "动物"),
    category("Body Parts", "身体部位"),
    category("Clothes", "衣物"),
    category("Colors", "颜色"),
    category("Daily Routine", "日常活动"),
    category("Family & Friends", "家人和朋友"),
    category("Feelings", "情感"),
    category("Food & Drink", "食物和饮料"),
    category("Map", "地图"),
    category("Number", "数字"),
    category("Places&Preposition", "地点和介词"),
    category("School", "学校"),
    category("The Home", "家"),
    category("Things to do", "活动"),
    category("Transportation", "交通工具"),
];

/// Look a category up by id
pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_category() {
        let cat = find_category("Food & Drink").unwrap();
        assert_eq!(cat.display_name, "食物和饮料");
        assert!(find_category("Dinosaurs").is_none());
    }

    #[test]
    fn test_source_location() {
        let cat = find_category("The Home").unwrap();
        assert_eq!(cat.source_location("/data/images/"), "/data/images/The Home/");
    }
}
