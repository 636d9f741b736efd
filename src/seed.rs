//! One-time catalog fixtures, loaded at startup while the store is empty.

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::DbPool;

struct CategoryFixture {
    name: &'static str,
    description: &'static str,
}

struct ProductFixture {
    name: &'static str,
    description: &'static str,
    /// cents
    price: i64,
    image_url: &'static str,
    additional_images: &'static [&'static str],
    category: &'static str,
    stock_quantity: i32,
    featured: bool,
}

const CATEGORIES: &[CategoryFixture] = &[
    CategoryFixture {
        name: "Jewelry",
        description: "Handcrafted jewelry pieces",
    },
    CategoryFixture {
        name: "Pottery",
        description: "Ceramic and pottery items",
    },
    CategoryFixture {
        name: "Textiles",
        description: "Handwoven fabrics and clothing",
    },
    CategoryFixture {
        name: "Woodwork",
        description: "Carved wood items and furniture",
    },
];

const PRODUCTS: &[ProductFixture] = &[
    ProductFixture {
        name: "Handcrafted Silver Pendant",
        description: "Beautiful silver pendant necklace with intricate Celtic knotwork design. \
                      Each piece is hand-forged by skilled artisans using traditional techniques.",
        price: 8999,
        image_url: "/static/images/products/jewelry1.jpg",
        additional_images: &["/static/images/products/jewelry2.jpg"],
        category: "Jewelry",
        stock_quantity: 5,
        featured: true,
    },
    ProductFixture {
        name: "Artisan Ceramic Bowl Set",
        description: "Set of three handmade ceramic bowls in earth tones. Each bowl is \
                      wheel-thrown and glazed with a unique reactive glaze.",
        price: 12499,
        image_url: "/static/images/products/pottery1.jpg",
        additional_images: &["/static/images/products/pottery2.jpg"],
        category: "Pottery",
        stock_quantity: 3,
        featured: true,
    },
    ProductFixture {
        name: "Hand-woven Wool Scarf",
        description: "Luxurious hand-woven wool scarf in traditional patterns, made from \
                      locally sourced wool and dyed with natural plant-based dyes.",
        price: 7850,
        image_url: "/static/images/products/textiles1.jpg",
        additional_images: &["/static/images/products/textiles2.jpg"],
        category: "Textiles",
        stock_quantity: 8,
        featured: false,
    },
    ProductFixture {
        name: "Carved Wooden Jewelry Box",
        description: "Elegant jewelry box hand-carved from sustainable hardwood, with \
                      multiple compartments and a soft velvet lining.",
        price: 15600,
        image_url: "/static/images/products/woodwork1.jpg",
        additional_images: &["/static/images/products/woodwork2.jpg"],
        category: "Woodwork",
        stock_quantity: 2,
        featured: true,
    },
];

/// Seed the catalog once: a no-op whenever any product already exists.
pub async fn seed_if_empty(pool: &DbPool) -> anyhow::Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let categories = seed_categories(pool).await?;
    seed_products(pool, &categories).await?;
    tracing::info!("seeded catalog fixtures");
    Ok(())
}

/// Insert categories and return the name -> id mapping the product fixtures
/// resolve against.
async fn seed_categories(pool: &DbPool) -> anyhow::Result<HashMap<String, Uuid>> {
    let mut categories = HashMap::new();
    for fixture in CATEGORIES {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fixture.name)
        .bind(fixture.description)
        .fetch_one(pool)
        .await?;
        categories.insert(fixture.name.to_string(), id);
    }
    Ok(categories)
}

async fn seed_products(
    pool: &DbPool,
    categories: &HashMap<String, Uuid>,
) -> anyhow::Result<()> {
    for fixture in PRODUCTS {
        let category_id = categories
            .get(fixture.category)
            .ok_or_else(|| anyhow::anyhow!("unknown category {}", fixture.category))?;

        let additional_images: Vec<String> = fixture
            .additional_images
            .iter()
            .map(|s| s.to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, image_url, additional_images,
                 category_id, stock_quantity, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fixture.name)
        .bind(fixture.description)
        .bind(fixture.price)
        .bind(fixture.image_url)
        .bind(&additional_images)
        .bind(category_id)
        .bind(fixture.stock_quantity)
        .bind(fixture.featured)
        .execute(pool)
        .await?;
    }
    Ok(())
}
