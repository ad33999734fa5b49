//! The fixed registry of vector store collections (spec §2, §4.6).
//!
//! Collection names, descriptions and estimated sizes are pinned from the
//! catalog loader this service's queries were generated against — they are
//! load-bearing for the fallback query table in `services::planner`, not
//! just descriptive metadata.

/// Dimensionality of the embedding vectors stored in every collection.
pub const VECTOR_SIZE: usize = 768;

#[derive(Debug, Clone, Copy)]
pub struct CollectionInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub estimated_count: usize,
}

pub const COLLECTIONS: &[CollectionInfo] = &[
    CollectionInfo {
        name: "baked-breads",
        description: "Baking-focused dishes",
        estimated_count: 885,
    },
    CollectionInfo {
        name: "quick-light",
        description: "Fast preparation and light meals",
        estimated_count: 2476,
    },
    CollectionInfo {
        name: "protein-mains",
        description: "Meat, poultry, seafood main dishes",
        estimated_count: 1379,
    },
    CollectionInfo {
        name: "comfort-cooked",
        description: "Slow-cooked and braised dishes",
        estimated_count: 718,
    },
    CollectionInfo {
        name: "desserts-sweets",
        description: "All sweet treats and desserts",
        estimated_count: 2465,
    },
    CollectionInfo {
        name: "breakfast-morning",
        description: "Morning-specific foods",
        estimated_count: 415,
    },
    CollectionInfo {
        name: "plant-based",
        description: "Vegetarian and vegan dishes",
        estimated_count: 78,
    },
    CollectionInfo {
        name: "fresh-cold",
        description: "Salads and raw preparations",
        estimated_count: 950,
    },
];

pub fn all_names() -> Vec<String> {
    COLLECTIONS.iter().map(|c| c.name.to_string()).collect()
}

pub fn is_known(name: &str) -> bool {
    COLLECTIONS.iter().any(|c| c.name == name)
}

pub fn describe(name: &str) -> Option<&'static CollectionInfo> {
    COLLECTIONS.iter().find(|c| c.name == name)
}
