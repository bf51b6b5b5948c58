//! Well-known identifiers of schema-defining items.
//!
//! Items based on these templates make up the template/schema definitions
//! the store caches in its template engine. Changing or removing one of them
//! invalidates that cache.

use crate::id::ItemId;

/// Template of template definition items.
pub const TEMPLATE: ItemId = ItemId::from_u128(0xab86861a_6030_46c5_b394_e8f99e8b87db);

/// Template of template section items.
pub const TEMPLATE_SECTION: ItemId = ItemId::from_u128(0xe269fbb5_3750_427a_9149_7aa950b49301);

/// Template of template field items.
pub const TEMPLATE_FIELD: ItemId = ItemId::from_u128(0x455a3e98_a627_4b40_8035_e683a0331ac7);

/// Name of the standard values item stored beneath a template.
pub const STANDARD_VALUES_NAME: &str = "__Standard Values";

/// Returns `true` if `template_id` is one of the schema-defining templates.
pub fn is_schema_template(template_id: &ItemId) -> bool {
    [TEMPLATE, TEMPLATE_SECTION, TEMPLATE_FIELD].contains(template_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_templates_are_recognized() {
        assert!(is_schema_template(&TEMPLATE));
        assert!(is_schema_template(&TEMPLATE_SECTION));
        assert!(is_schema_template(&TEMPLATE_FIELD));
        assert!(!is_schema_template(&ItemId::new_v4()));
        assert!(!is_schema_template(&ItemId::nil()));
    }
}
