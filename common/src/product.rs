use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Category of farm produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    Vegetable,
    Fruit,
    Grain,
    Dairy,
    Meat,
    Seafood,
    #[serde(other)]
    Other,
}

impl ProductType {
    pub fn all() -> &'static [ProductType] {
        &[
            ProductType::Vegetable,
            ProductType::Fruit,
            ProductType::Grain,
            ProductType::Dairy,
            ProductType::Meat,
            ProductType::Seafood,
            ProductType::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Vegetable => "VEGETABLE",
            ProductType::Fruit => "FRUIT",
            ProductType::Grain => "GRAIN",
            ProductType::Dairy => "DAIRY",
            ProductType::Meat => "MEAT",
            ProductType::Seafood => "SEAFOOD",
            ProductType::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductType::Vegetable => "Vegetable",
            ProductType::Fruit => "Fruit",
            ProductType::Grain => "Grain",
            ProductType::Dairy => "Dairy",
            ProductType::Meat => "Meat",
            ProductType::Seafood => "Seafood",
            ProductType::Other => "Other",
        }
    }

    /// Parse a form value, falling back to `Other` for anything unrecognised.
    pub fn from_value(value: &str) -> Self {
        ProductType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .unwrap_or(ProductType::Other)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cultivation methods offered on the product form as `(value, label)`.
pub const CULTIVATION_METHODS: &[(&str, &str)] = &[
    ("CONVENTIONAL", "Conventional"),
    ("ORGANIC", "Organic"),
    ("HYDROPONIC", "Hydroponic"),
    ("GREENHOUSE", "Greenhouse"),
    ("VERTICAL_FARMING", "Vertical Farming"),
    ("AQUAPONIC", "Aquaponic"),
];

/// Certifications offered for organic products as `(value, label)`.
pub const CERTIFICATIONS: &[(&str, &str)] = &[
    ("USDA_ORGANIC", "USDA Organic"),
    ("EU_ORGANIC", "EU Organic"),
    ("NON_GMO", "Non-GMO Project Verified"),
    ("FAIR_TRADE", "Fair Trade Certified"),
    ("RAINFOREST_ALLIANCE", "Rainforest Alliance Certified"),
];

/// A catalog entry owned by the user who created it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub organic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environmental_conditions: Vec<EnvironmentalCondition>,
}

impl Product {
    /// Wire value of the type, `UNKNOWN` when the backend sent none.
    pub fn type_key(&self) -> &'static str {
        self.product_type.map_or("UNKNOWN", ProductType::as_str)
    }

    pub fn type_label(&self) -> &'static str {
        self.product_type.map_or("Unknown", ProductType::label)
    }

    /// Normalise a product before it is submitted.
    ///
    /// Non-organic products never carry a certification, and a missing batch
    /// code is generated from the product name and `today`.
    pub fn prepare_for_submit(&mut self, today: NaiveDate) {
        if !self.organic {
            self.certification = None;
        }
        let needs_code = self
            .batch_code
            .as_deref()
            .map_or(true, |c| c.trim().is_empty());
        if needs_code {
            self.batch_code = Some(crate::batch::generate_batch_code(&self.name, today));
        }
    }

    /// Form-level checks done before any request is made.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be zero or more".into());
        }
        if let (Some(harvest), Some(expiry)) = (self.harvest_date, self.expiration_date) {
            if expiry < harvest {
                return Err("Expiration date cannot be before the harvest date".into());
            }
        }
        Ok(())
    }
}

/// One reading in a product's environmental time series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_exposure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Query for `/products/paged`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ProductPageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort_by: "id".into(),
            sort_dir: "DESC".into(),
            search: None,
        }
    }
}

/// A page of products as returned by the paged endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    #[serde(default)]
    pub content: Vec<Product>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

/// Column the product list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    Stock,
    Created,
}

/// Client-side filtering of the user's own products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: String,
    /// `None` shows every type.
    pub product_type: Option<ProductType>,
    pub organic_only: bool,
    pub sort: ProductSort,
    pub descending: bool,
}

impl ProductFilter {
    /// Clicking the active column flips direction; a new column starts ascending.
    pub fn toggle_sort(&mut self, sort: ProductSort) {
        if self.sort == sort {
            self.descending = !self.descending;
        } else {
            self.sort = sort;
            self.descending = false;
        }
    }

    fn matches(&self, p: &Product) -> bool {
        let term = self.search.trim().to_lowercase();
        let text_ok = term.is_empty()
            || p.name.to_lowercase().contains(&term)
            || p.description.to_lowercase().contains(&term)
            || p
                .batch_code
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term));
        text_ok
            && self.product_type.map_or(true, |t| p.product_type == Some(t))
            && (!self.organic_only || p.organic)
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut out: Vec<Product> = products.iter().filter(|p| self.matches(p)).cloned().collect();
        out.sort_by(|a, b| {
            let ord = match self.sort {
                ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProductSort::Price => a.price.total_cmp(&b.price),
                ProductSort::Stock => a.stock.cmp(&b.stock),
                ProductSort::Created => a.created_at.cmp(&b.created_at),
            };
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unknown_product_type_maps_to_other() {
        let t: ProductType = serde_json::from_str("\"MUSHROOM\"").unwrap();
        assert_eq!(t, ProductType::Other);
        assert_eq!(ProductType::from_value("FRUIT"), ProductType::Fruit);
        assert_eq!(ProductType::from_value("nope"), ProductType::Other);
    }

    #[test]
    fn test_missing_product_type_is_unknown() {
        let p: Product = serde_json::from_str(r#"{"id": 1, "name": "Tea"}"#).unwrap();
        assert_eq!(p.product_type, None);
        assert_eq!(p.type_key(), "UNKNOWN");
        assert_eq!(p.type_label(), "Unknown");
        assert!(serde_json::to_value(&p).unwrap().get("productType").is_none());
    }

    #[test]
    fn test_non_organic_clears_certification() {
        let mut p = Product {
            name: "Carrots".into(),
            organic: false,
            certification: Some("USDA_ORGANIC".into()),
            batch_code: Some("CAR-1".into()),
            ..Default::default()
        };
        p.prepare_for_submit(day(2025, 4, 18));
        assert_eq!(p.certification, None);
        assert_eq!(p.batch_code.as_deref(), Some("CAR-1"));
    }

    #[test]
    fn test_missing_batch_code_is_generated() {
        let mut p = Product {
            name: "apples".into(),
            ..Default::default()
        };
        p.prepare_for_submit(day(2025, 4, 18));
        let code = p.batch_code.unwrap();
        assert!(code.starts_with("APP-20250418-"), "{code}");
    }

    #[test]
    fn test_validate() {
        let mut p = Product {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(p.validate().is_err());
        p.name = "Kale".into();
        assert!(p.validate().is_ok());
        p.harvest_date = Some(day(2025, 5, 1));
        p.expiration_date = Some(day(2025, 4, 1));
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_product_json_shape() {
        let json = r#"{
            "id": 3,
            "name": "Roma Tomatoes",
            "description": "Vine ripened",
            "price": 2.5,
            "stock": 40,
            "productType": "VEGETABLE",
            "organic": true,
            "certification": "EU_ORGANIC",
            "harvestDate": "2025-04-12",
            "createdAt": "2025-04-12T08:30:00"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, Some(3));
        assert_eq!(p.harvest_date, Some(day(2025, 4, 12)));
        assert!(p.created_at.is_some());

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["productType"], "VEGETABLE");
        assert!(back.get("imageUrl").is_none());
    }
    #[test]
    fn test_filter_and_sort() {
        let products = vec![
            Product {
                name: "Spinach".into(),
                price: 3.0,
                organic: true,
                ..Default::default()
            },
            Product {
                name: "apples".into(),
                price: 1.5,
                product_type: Some(ProductType::Fruit),
                batch_code: Some("APP-20250418-001".into()),
                ..Default::default()
            },
            Product {
                name: "Beets".into(),
                description: "Red and earthy".into(),
                price: 2.0,
                ..Default::default()
            },
        ];
        let names = |list: Vec<Product>| list.into_iter().map(|p| p.name).collect::<Vec<_>>();

        let mut filter = ProductFilter::default();
        assert_eq!(names(filter.apply(&products)), ["apples", "Beets", "Spinach"]);

        filter.toggle_sort(ProductSort::Price);
        filter.toggle_sort(ProductSort::Price);
        assert_eq!(names(filter.apply(&products)), ["Spinach", "Beets", "apples"]);

        filter.search = "earthy".into();
        assert_eq!(names(filter.apply(&products)), ["Beets"]);
        filter.search = "app-2025".into();
        assert_eq!(names(filter.apply(&products)), ["apples"]);

        filter.search.clear();
        filter.organic_only = true;
        assert_eq!(names(filter.apply(&products)), ["Spinach"]);
        filter.organic_only = false;
        filter.product_type = Some(ProductType::Fruit);
        assert_eq!(names(filter.apply(&products)), ["apples"]);
    }
}
