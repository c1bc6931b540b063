use serde_json::Value;

use crate::domain::status::ProductStatus;

pub const STOCK_FIELD: &str = "hasStock";

/// The two fields of a catalog listing entry the monitor reads. Listing
/// entries are otherwise opaque and never decoded as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogProduct {
    pub name: String,
    /// `None` when the entry carries no `hasStock` key at all.
    pub has_stock: Option<bool>,
}

impl CatalogProduct {
    /// Reads an entry with a string `name`; anything else is skipped.
    /// `hasStock` follows JSON truthiness, so `null` reads as out of stock.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let name = entry.get("name")?.as_str()?;
        Some(Self { name: name.to_string(), has_stock: entry.get(STOCK_FIELD).map(is_truthy) })
    }

    /// `None` when the stock flag is missing from the entry.
    pub fn status(&self) -> Option<ProductStatus> {
        self.has_stock.map(ProductStatus::from_stock)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// First entry, in listing order, whose name equals `name` ignoring case.
pub fn find_in_listing(entries: &[Value], name: &str) -> Option<CatalogProduct> {
    let wanted = name.to_lowercase();
    entries
        .iter()
        .filter_map(CatalogProduct::from_entry)
        .find(|product| product.name.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{find_in_listing, CatalogProduct};
    use crate::domain::status::ProductStatus;

    fn listing(value: Value) -> Vec<Value> {
        serde_json::from_value(value).expect("listing array")
    }

    #[test]
    fn reads_name_and_flag_and_ignores_other_fields() {
        let entry = json!({ "name": "Pallet Malta Guajira 330ml", "hasStock": true, "price": 12.5, "tags": ["Próximamente"] });

        let product = CatalogProduct::from_entry(&entry).expect("entry has a name");
        assert_eq!(product.name, "Pallet Malta Guajira 330ml");
        assert_eq!(product.status(), Some(ProductStatus::Available));
    }

    #[test]
    fn null_flag_is_unavailable_and_missing_flag_is_unknown() {
        let null_flag = CatalogProduct::from_entry(&json!({ "name": "Malta", "hasStock": null }))
            .expect("named entry");
        let no_flag = CatalogProduct::from_entry(&json!({ "name": "Malta" })).expect("named entry");

        assert_eq!(null_flag.status(), Some(ProductStatus::Unavailable));
        assert_eq!(no_flag.has_stock, None);
        assert_eq!(no_flag.status(), None);
    }

    #[test]
    fn entries_without_string_name_are_skipped() {
        assert!(CatalogProduct::from_entry(&json!({ "hasStock": true })).is_none());
        assert!(CatalogProduct::from_entry(&json!({ "name": 7, "hasStock": true })).is_none());
        assert!(CatalogProduct::from_entry(&json!("Malta")).is_none());

        let entries = listing(json!([
            { "title": "bundle", "hasStock": true },
            { "name": null },
            { "name": "Malta", "hasStock": true }
        ]));
        assert_eq!(find_in_listing(&entries, "malta").and_then(|p| p.has_stock), Some(true));
    }

    #[test]
    fn match_is_case_insensitive_and_exact() {
        let entries = listing(json!([
            { "name": "Pallet Malta Guajira 330ml x24", "hasStock": true },
            { "name": "PALLET MALTA GUAJIRA 330ML", "hasStock": false }
        ]));

        let found = find_in_listing(&entries, "Pallet Malta Guajira 330ml").expect("match");
        assert_eq!(found.has_stock, Some(false), "substring entry must not match");
        assert!(find_in_listing(&entries, "Pallet Malta").is_none());
    }

    #[test]
    fn first_match_wins() {
        let entries = listing(json!([
            { "name": "Malta", "hasStock": false },
            { "name": "malta", "hasStock": true }
        ]));

        let found = find_in_listing(&entries, "MALTA").expect("match");
        assert_eq!(found.name, "Malta");
    }
}
