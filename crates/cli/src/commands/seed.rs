//! Demo catalog data.
//!
//! Categories and suppliers are matched by name and products are skipped
//! when one with the same name exists, so the command can be re-run.

use rust_decimal::Decimal;

use papeleria_storefront::db::CatalogRepository;
use papeleria_storefront::models::{ProductImageInput, ProductInput, SupplierInput};

use super::{CliError, connect};

struct SeedSupplier {
    name: &'static str,
    contact: &'static str,
    phone: &'static str,
    email: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    /// Prices in cents.
    purchase_cents: i64,
    sale_cents: i64,
    stock: i32,
    category: &'static str,
    supplier: &'static str,
    image: &'static str,
}

const CATEGORIES: &[&str] = &["Cuadernos", "Escritura", "Arte y dibujo", "Oficina"];

const SUPPLIERS: &[SeedSupplier] = &[
    SeedSupplier {
        name: "Distribuidora Escolar del Centro",
        contact: "Laura Méndez",
        phone: "555-010-2030",
        email: "ventas@escolarcentro.example",
    },
    SeedSupplier {
        name: "Papeles Finos del Norte",
        contact: "Jorge Salinas",
        phone: "555-040-5060",
        email: "pedidos@papelesnorte.example",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Cuaderno profesional raya 100 hojas",
        description: "Cuaderno cosido tamaño carta, pasta dura.",
        purchase_cents: 2_800,
        sale_cents: 4_950,
        stock: 120,
        category: "Cuadernos",
        supplier: "Distribuidora Escolar del Centro",
        image: "/static/img/cuaderno-profesional.svg",
    },
    SeedProduct {
        name: "Libreta de bolsillo cuadriculada",
        description: "Libreta A6 con elástico y 80 hojas de 90 g.",
        purchase_cents: 1_500,
        sale_cents: 2_900,
        stock: 60,
        category: "Cuadernos",
        supplier: "Papeles Finos del Norte",
        image: "/static/img/libreta-bolsillo.svg",
    },
    SeedProduct {
        name: "Bolígrafo de gel negro (paquete de 4)",
        description: "Punta de 0.7 mm, tinta de secado rápido.",
        purchase_cents: 3_200,
        sale_cents: 5_800,
        stock: 200,
        category: "Escritura",
        supplier: "Distribuidora Escolar del Centro",
        image: "/static/img/boligrafo-gel.svg",
    },
    SeedProduct {
        name: "Lápices de colores 24 piezas",
        description: "Colores intensos, madera reforestada.",
        purchase_cents: 6_500,
        sale_cents: 11_900,
        stock: 45,
        category: "Arte y dibujo",
        supplier: "Papeles Finos del Norte",
        image: "/static/img/lapices-colores.svg",
    },
    SeedProduct {
        name: "Block de acuarela 300 g",
        description: "12 hojas de papel prensado en frío.",
        purchase_cents: 9_000,
        sale_cents: 15_500,
        stock: 20,
        category: "Arte y dibujo",
        supplier: "Papeles Finos del Norte",
        image: "/static/img/block-acuarela.svg",
    },
    SeedProduct {
        name: "Engrapadora metálica",
        description: "Capacidad de 25 hojas, incluye 1000 grapas.",
        purchase_cents: 8_000,
        sale_cents: 13_900,
        stock: 0,
        category: "Oficina",
        supplier: "Distribuidora Escolar del Centro",
        image: "/static/img/engrapadora.svg",
    },
];

/// Insert the demo catalog.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;
    let catalog = CatalogRepository::new(&pool);

    for name in CATEGORIES {
        catalog.ensure_category(name).await?;
    }
    for supplier in SUPPLIERS {
        catalog
            .ensure_supplier(&SupplierInput {
                name: supplier.name.to_owned(),
                contact: Some(supplier.contact.to_owned()),
                phone: Some(supplier.phone.to_owned()),
                email: Some(supplier.email.to_owned()),
            })
            .await?;
    }

    let mut created = 0_usize;
    for seed in PRODUCTS {
        if catalog.find_product_by_name(seed.name).await?.is_some() {
            tracing::debug!(product = seed.name, "Already present");
            continue;
        }

        let category = catalog.ensure_category(seed.category).await?;
        let supplier = catalog
            .ensure_supplier(&SupplierInput {
                name: seed.supplier.to_owned(),
                contact: None,
                phone: None,
                email: None,
            })
            .await?;

        let product = catalog
            .create_product(&ProductInput {
                name: seed.name.to_owned(),
                description: Some(seed.description.to_owned()),
                purchase_price: Decimal::new(seed.purchase_cents, 2),
                sale_price: Decimal::new(seed.sale_cents, 2),
                stock: seed.stock,
                category_id: Some(category.id),
                supplier_id: Some(supplier.id),
            })
            .await?;

        catalog
            .create_image(&ProductImageInput {
                product_id: product.id,
                url: seed.image.to_owned(),
                is_primary: true,
            })
            .await?;

        created += 1;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        suppliers = SUPPLIERS.len(),
        products_created = created,
        "Seed complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_products_reference_known_rows() {
        for product in PRODUCTS {
            assert!(CATEGORIES.contains(&product.category), "{}", product.name);
            assert!(
                SUPPLIERS.iter().any(|s| s.name == product.supplier),
                "{}",
                product.name
            );
            assert!(product.sale_cents >= product.purchase_cents);
        }
    }
}
