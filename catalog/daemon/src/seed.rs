//! Catalog contents
//!
//! The built-in menu, plus loading a replacement catalog from a JSON file.

use std::path::{Path, PathBuf};

use catalog_core::{Item, ItemId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error("Failed to read catalog file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Catalog file at {path} is not a JSON array of items: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Catalog file at {path}: item {id} has invalid price {price}")]
    InvalidPrice { path: PathBuf, id: String, price: f64 },
}

fn coffee(id: &str, name: &str, origin: &str, roast: &str, price: f64, description: &str) -> Item {
    Item {
        id: ItemId::new(id),
        name: name.to_string(),
        origin: origin.to_string(),
        roast: roast.to_string(),
        price,
        description: description.to_string(),
    }
}

/// The built-in menu
pub fn seed_catalog() -> Vec<Item> {
    vec![
        coffee(
            "1",
            "Midnight Blend",
            "Ethiopia / Brazil",
            "Dark",
            18.50,
            "Notes of dark chocolate and toasted marshmallow. Perfect for late nights.",
        ),
        coffee(
            "2",
            "Golden Hour",
            "Colombia",
            "Light",
            22.00,
            "Bright acidity with citrus notes and a honey-like sweetness.",
        ),
        coffee(
            "3",
            "Velvet Espresso",
            "Guatemala",
            "Medium",
            20.00,
            "Smooth body with a nutty finish and hints of red apple.",
        ),
        coffee(
            "4",
            "Cloud Nine",
            "Costa Rica",
            "Medium-Light",
            24.50,
            "Floral aroma with a clean, tea-like body and jasmine finish.",
        ),
        coffee(
            "5",
            "Cardamom Dream",
            "Yemen",
            "Medium-Dark",
            21.00,
            "قهوه‌ای گرم با عطر هل و پایانی شیرین. Warm cardamom spice with a syrupy finish.",
        ),
    ]
}

/// Load a catalog from a JSON file
///
/// The file must hold a JSON array in the same shape `GET /products` serves.
pub async fn load_catalog_file(path: &Path) -> Result<Vec<Item>, CatalogFileError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CatalogFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let items: Vec<Item> =
        serde_json::from_slice(&bytes).map_err(|source| CatalogFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(bad) = items
        .iter()
        .find(|item| !item.price.is_finite() || item.price < 0.0)
    {
        return Err(CatalogFileError::InvalidPrice {
            path: path.to_path_buf(),
            id: bad.id.to_string(),
            price: bad.price,
        });
    }

    tracing::info!(path = %path.display(), count = items.len(), "Loaded catalog file");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_seed_catalog_ids_are_unique() {
        let items = seed_catalog();
        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn test_seed_catalog_prices_are_valid() {
        assert!(seed_catalog().iter().all(|i| i.price >= 0.0));
    }

    #[tokio::test]
    async fn test_load_catalog_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"id":"a","name":"House","origin":"Peru","roast":"Dark","price":9.0,"description":"x"}]"#,
        )
        .unwrap();

        let items = load_catalog_file(file.path()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "House");
    }

    #[tokio::test]
    async fn test_load_catalog_file_rejects_negative_price() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"id":"a","name":"House","origin":"Peru","roast":"Dark","price":-2.0,"description":"x"}]"#,
        )
        .unwrap();

        let err = load_catalog_file(file.path()).await.unwrap_err();
        assert!(matches!(err, CatalogFileError::InvalidPrice { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_catalog_file() {
        let err = load_catalog_file(Path::new("/nonexistent/catalog.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogFileError::Read { .. }));
    }
}
