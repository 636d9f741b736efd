use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::products::{CategoryList, ProductDetail, ProductList},
    error::{AppError, AppResult},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
};

pub async fn list_products(
    pool: &DbPool,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());

    let items = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE ($1::uuid IS NULL OR category_id = $1)
          AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR description ILIKE '%' || $2 || '%')
          AND ($3::boolean IS NULL OR featured = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(query.category)
    .bind(search)
    .bind(query.featured)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM products
        WHERE ($1::uuid IS NULL OR category_id = $1)
          AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR description ILIKE '%' || $2 || '%')
          AND ($3::boolean IS NULL OR featured = $3)
        "#,
    )
    .bind(query.category)
    .bind(search)
    .bind(query.featured)
    .fetch_one(pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let related = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE category_id = $1 AND id <> $2
        ORDER BY created_at DESC
        LIMIT 3
        "#,
    )
    .bind(product.category_id)
    .bind(product.id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(
        "Product",
        ProductDetail { product, related },
        None,
    ))
}

pub async fn list_categories(pool: &DbPool) -> AppResult<ApiResponse<CategoryList>> {
    let items = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}
