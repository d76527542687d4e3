//! Built-in species catalogue used by mock mode.

use crate::output::Category;

/// One species known to the built-in catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesInfo {
    /// Scientific name.
    pub scientific_name: &'static str,
    /// English common name.
    pub common_name: &'static str,
    /// Japanese common name.
    pub japanese_name: &'static str,
    /// Taxonomic group.
    pub category: Category,
}

const fn species(
    scientific_name: &'static str,
    common_name: &'static str,
    japanese_name: &'static str,
    category: Category,
) -> SpeciesInfo {
    SpeciesInfo {
        scientific_name,
        common_name,
        japanese_name,
        category,
    }
}

/// Common wildlife of Japan.
pub const SPECIES_CATALOG: &[SpeciesInfo] = &[
    // Birds
    species("Passer montanus", "Eurasian Tree Sparrow", "スズメ", Category::Bird),
    species("Corvus macrorhynchos", "Large-billed Crow", "ハシブトガラス", Category::Bird),
    species("Ardea cinerea", "Grey Heron", "アオサギ", Category::Bird),
    species("Buteo buteo", "Common Buzzard", "ノスリ", Category::Bird),
    species("Falco peregrinus", "Peregrine Falcon", "ハヤブサ", Category::Bird),
    species("Hirundo rustica", "Barn Swallow", "ツバメ", Category::Bird),
    species("Turdus naumanni", "Naumann's Thrush", "ツグミ", Category::Bird),
    species("Phoenicurus auroreus", "Daurian Redstart", "ジョウビタキ", Category::Bird),
    species("Motacilla cinerea", "Grey Wagtail", "キセキレイ", Category::Bird),
    species("Cyanopica cyanus", "Azure-winged Magpie", "オナガ", Category::Bird),
    // Mammals
    species("Macaca fuscata", "Japanese Macaque", "ニホンザル", Category::Mammal),
    species("Cervus nippon", "Sika Deer", "ニホンジカ", Category::Mammal),
    species("Sus scrofa", "Wild Boar", "イノシシ", Category::Mammal),
    species("Nyctereutes procyonoides", "Raccoon Dog", "タヌキ", Category::Mammal),
    species("Vulpes vulpes", "Red Fox", "キツネ", Category::Mammal),
    species("Lepus brachyurus", "Japanese Hare", "ノウサギ", Category::Mammal),
    species("Sciurus lis", "Japanese Squirrel", "ニホンリス", Category::Mammal),
    species("Mustela itatsi", "Japanese Weasel", "イタチ", Category::Mammal),
    species("Ursus thibetanus", "Asian Black Bear", "ツキノワグマ", Category::Mammal),
    species("Felis catus", "Feral Cat", "ノネコ", Category::Mammal),
    // Amphibians and reptiles
    species("Bufo japonicus", "Japanese Common Toad", "ニホンヒキガエル", Category::Amphibian),
    species("Rana japonica", "Japanese Brown Frog", "ニホンアカガエル", Category::Amphibian),
    species("Elaphe climacophora", "Japanese Rat Snake", "アオダイショウ", Category::Reptile),
    species("Gloydius blomhoffii", "Mamushi", "マムシ", Category::Reptile),
];

/// File name keywords that hint at a category.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Bird, &["bird", "crow", "sparrow", "eagle", "hawk"]),
    (Category::Mammal, &["deer", "fox", "bear", "rabbit", "squirrel"]),
    (Category::Amphibian, &["frog", "toad"]),
    (Category::Reptile, &["snake", "lizard"]),
];

/// Species of a given category.
pub fn species_in(category: Category) -> Vec<&'static SpeciesInfo> {
    SPECIES_CATALOG
        .iter()
        .filter(|s| s.category == category)
        .collect()
}

/// Category hinted by a file name, if any keyword matches.
pub fn category_from_keywords(file_name: &str) -> Option<Category> {
    let lower = file_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(category, _)| *category)
}
