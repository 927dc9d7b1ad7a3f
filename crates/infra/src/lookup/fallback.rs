//! Built-in list of common medication names
//!
//! Used when the remote catalogue is disabled or unreachable, so that name
//! suggestions keep working offline.

use async_trait::async_trait;
use medminder_core::{MedicationLookup, MedicationSuggestion};
use medminder_domain::Result;

const COMMON_MEDICATIONS: &[&str] = &[
    "Acetaminophen",
    "Albuterol",
    "Alprazolam",
    "Amlodipine",
    "Amoxicillin",
    "Aspirin",
    "Atenolol",
    "Atorvastatin",
    "Azithromycin",
    "Bupropion",
    "Cetirizine",
    "Ciprofloxacin",
    "Citalopram",
    "Clopidogrel",
    "Escitalopram",
    "Fluoxetine",
    "Furosemide",
    "Gabapentin",
    "Hydrochlorothiazide",
    "Ibuprofen",
    "Insulin Glargine",
    "Levothyroxine",
    "Lisinopril",
    "Loratadine",
    "Losartan",
    "Metformin",
    "Metoprolol",
    "Montelukast",
    "Naproxen",
    "Omeprazole",
    "Pantoprazole",
    "Prednisone",
    "Rosuvastatin",
    "Sertraline",
    "Simvastatin",
    "Tramadol",
    "Trazodone",
    "Vitamin D3",
    "Warfarin",
    "Zolpidem",
];

/// Case-insensitive substring search over the built-in name list
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackLookup;

impl FallbackLookup {
    pub fn matches(query: &str) -> Vec<MedicationSuggestion> {
        let needle = query.trim().to_lowercase();
        COMMON_MEDICATIONS
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(|name| MedicationSuggestion::named(*name))
            .collect()
    }
}

#[async_trait]
impl MedicationLookup for FallbackLookup {
    async fn search(&self, query: &str) -> Result<Vec<MedicationSuggestion>> {
        Ok(Self::matches(query))
    }
}
