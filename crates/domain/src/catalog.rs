//! Menu and dining room fixtures.

use common::TableId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Number of tables in the dining room.
pub const TABLE_COUNT: u32 = 12;

/// Product identifier as printed on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Menu section. `Featured` is the landing tab and lists the whole menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "destacados")]
    Featured,
    #[serde(rename = "entrantes")]
    Starters,
    #[serde(rename = "principales")]
    Mains,
    #[serde(rename = "postres")]
    Desserts,
    #[serde(rename = "bebidas")]
    Drinks,
}

impl Category {
    /// Categories in menu tab order.
    pub const ALL: [Category; 5] = [
        Category::Featured,
        Category::Starters,
        Category::Mains,
        Category::Desserts,
        Category::Drinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Featured => "destacados",
            Category::Starters => "entrantes",
            Category::Mains => "principales",
            Category::Desserts => "postres",
            Category::Drinks => "bebidas",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Featured => "Destacados",
            Category::Starters => "Entrantes",
            Category::Mains => "Principales",
            Category::Desserts => "Postres",
            Category::Drinks => "Bebidas",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub category: Category,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
}

/// The restaurant's static menu and tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    tables: Vec<Table>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, tables: Vec<Table>) -> Self {
        Self { products, tables }
    }

    /// The house menu: nine dishes and drinks, tables "Mesa 1" to "Mesa 12".
    pub fn demo() -> Self {
        const IMAGES: &str = "https://images.unsplash.com";
        let product = |id, name: &str, cents, category, photo: &str| Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Money::from_cents(cents),
            category,
            image_url: format!("{IMAGES}/{photo}?q=80&w=600&auto=format&fit=crop"),
        };

        let products = vec![
            product(1, "Combo Pareja", 800, Category::Featured, "photo-1604908554007-1d5859c181df"),
            product(2, "Arroz del Chef", 350, Category::Mains, "photo-1544025162-d76694265947"),
            product(3, "Carne salteada", 680, Category::Mains, "photo-1559628233-7ea3b2e5d8d5"),
            product(4, "Ensalada + atún", 550, Category::Starters, "photo-1540189549336-e6e99c3679fe"),
            product(5, "Filet Argentino", 890, Category::Mains, "photo-1550547660-d9450f859349"),
            product(6, "Tarta de queso", 420, Category::Desserts, "photo-1551024709-8f23befc6cf7"),
            product(7, "Agua 50cl", 150, Category::Drinks, "photo-1548839140-29a749e1cf4d"),
            product(8, "Café", 130, Category::Drinks, "photo-1509042239860-f550ce710b93"),
            product(9, "Helado vainilla", 310, Category::Desserts, "photo-1495197359483-d092478c170a"),
        ];

        let tables = (1..=TABLE_COUNT)
            .map(|n| Table {
                id: TableId::new(n),
                name: format!("Mesa {n}"),
            })
            .collect();

        Self::new(products, tables)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products shown under a menu tab. The featured tab shows everything.
    pub fn products_in(&self, category: Category) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category == Category::Featured || p.category == category)
            .collect()
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}
