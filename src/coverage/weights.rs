//! Economic weight reference table
//!
//! GDP in trillions USD and population in millions (2024 estimates), keyed by
//! the country's published name. Lookups are exact string matches: a renamed or
//! differently spelled country silently misses and callers apply a fallback.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::constants::{
    GDP_EXPONENT, MIN_GDP_TRILLIONS, MIN_POPULATION_MILLIONS, POPULATION_EXPONENT,
};

/// Economic size of a country
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicWeight {
    pub gdp_trillions_usd: f64,
    pub population_millions: f64,
}

impl EconomicWeight {
    pub const fn new(gdp_trillions_usd: f64, population_millions: f64) -> Self {
        Self {
            gdp_trillions_usd,
            population_millions,
        }
    }

    /// Weight used to order countries that are missing from the table
    pub const UNKNOWN: EconomicWeight =
        EconomicWeight::new(MIN_GDP_TRILLIONS, MIN_POPULATION_MILLIONS);

    pub fn expected_coverage(&self) -> f64 {
        expected_coverage(self.gdp_trillions_usd, self.population_millions)
    }
}

/// (name, GDP trillions USD, population millions)
const COUNTRY_WEIGHTS: &[(&str, f64, f64)] = &[
    ("United States", 27.4, 335.0),
    ("China", 17.8, 1425.0),
    ("Japan", 4.2, 124.0),
    ("Germany", 4.5, 84.0),
    ("India", 3.9, 1428.0),
    ("United Kingdom", 3.3, 67.0),
    ("France", 3.0, 68.0),
    ("Italy", 2.2, 59.0),
    ("Brazil", 2.2, 216.0),
    ("Canada", 2.1, 40.0),
    ("Russia", 1.9, 144.0),
    ("Australia", 1.7, 26.0),
    ("South Korea", 1.7, 52.0),
    ("Mexico", 1.5, 130.0),
    ("Spain", 1.6, 47.0),
    ("Indonesia", 1.4, 277.0),
    ("Netherlands", 1.1, 18.0),
    ("Saudi Arabia", 1.1, 36.0),
    ("Turkey", 1.0, 85.0),
    ("Switzerland", 0.91, 9.0),
    ("Poland", 0.81, 38.0),
    ("Taiwan", 0.79, 24.0),
    ("Belgium", 0.63, 12.0),
    ("Sweden", 0.59, 10.0),
    ("Ireland", 0.55, 5.0),
    ("Argentina", 0.64, 46.0),
    ("Austria", 0.52, 9.0),
    ("Norway", 0.49, 5.0),
    ("Israel", 0.52, 9.0),
    ("United Arab Emirates", 0.51, 10.0),
    ("Thailand", 0.51, 70.0),
    ("Singapore", 0.50, 6.0),
    ("Malaysia", 0.43, 34.0),
    ("South Africa", 0.40, 60.0),
    ("Denmark", 0.41, 6.0),
    ("Philippines", 0.44, 117.0),
    ("Bangladesh", 0.42, 173.0),
    ("Hong Kong", 0.38, 7.0),
    ("Colombia", 0.36, 52.0),
    ("Egypt", 0.39, 111.0),
    ("Chile", 0.34, 20.0),
    ("Finland", 0.31, 6.0),
    ("Vietnam", 0.43, 100.0),
    ("Czech Republic", 0.33, 11.0),
    ("Romania", 0.35, 19.0),
    ("Portugal", 0.29, 10.0),
    ("New Zealand", 0.25, 5.0),
    ("Peru", 0.27, 34.0),
    ("Iraq", 0.27, 44.0),
    ("Greece", 0.24, 10.0),
    ("Qatar", 0.24, 3.0),
    ("Kazakhstan", 0.26, 20.0),
    ("Algeria", 0.24, 45.0),
    ("Hungary", 0.21, 10.0),
    ("Kuwait", 0.16, 4.0),
    ("Ukraine", 0.18, 37.0),
    ("Morocco", 0.15, 37.0),
    ("Puerto Rico", 0.12, 3.0),
    ("Ecuador", 0.12, 18.0),
    ("Slovakia", 0.13, 5.0),
    ("Kenya", 0.11, 54.0),
    ("Angola", 0.12, 36.0),
    ("Oman", 0.11, 5.0),
    ("Dominican Republic", 0.12, 11.0),
    ("Guatemala", 0.10, 18.0),
    ("Luxembourg", 0.09, 0.67),
    ("Bulgaria", 0.10, 7.0),
    ("Ethiopia", 0.16, 126.0),
    ("Uzbekistan", 0.09, 36.0),
    ("Panama", 0.08, 4.0),
    ("Costa Rica", 0.08, 5.0),
    ("Croatia", 0.08, 4.0),
    ("Tanzania", 0.08, 67.0),
    ("Ghana", 0.08, 34.0),
    ("Uruguay", 0.07, 4.0),
    ("Slovenia", 0.07, 2.0),
    ("Lithuania", 0.08, 3.0),
    ("Turkmenistan", 0.08, 6.0),
    ("Azerbaijan", 0.08, 10.0),
    ("Serbia", 0.07, 7.0),
    ("Ivory Coast", 0.08, 28.0),
    ("Cote D'Ivoire", 0.08, 28.0),
    ("Democratic Republic Of Congo", 0.07, 102.0),
    ("Myanmar", 0.06, 55.0),
    ("Jordan", 0.05, 11.0),
    ("Tunisia", 0.05, 12.0),
    ("Bolivia", 0.05, 12.0),
    ("Cameroon", 0.05, 28.0),
    ("Bahrain", 0.05, 2.0),
    ("Paraguay", 0.04, 7.0),
    ("Latvia", 0.04, 2.0),
    ("Libya", 0.05, 7.0),
    ("El Salvador", 0.03, 6.0),
    ("Estonia", 0.04, 1.0),
    ("Honduras", 0.03, 10.0),
    ("Nepal", 0.04, 30.0),
    ("Cyprus", 0.03, 1.0),
    ("Papua New Guinea", 0.03, 10.0),
    ("Cambodia", 0.03, 17.0),
    ("Zimbabwe", 0.03, 16.0),
    ("Senegal", 0.03, 18.0),
    ("Uganda", 0.05, 48.0),
    ("Bosnia And Herzegovina", 0.03, 3.0),
    ("Iceland", 0.03, 0.4),
    ("Georgia", 0.03, 4.0),
    ("Afghanistan", 0.02, 42.0),
    ("Albania", 0.02, 3.0),
    ("Jamaica", 0.02, 3.0),
    ("Zambia", 0.03, 20.0),
    ("Botswana", 0.02, 2.0),
    ("Trinidad And Tobago", 0.03, 1.0),
    ("Mali", 0.02, 23.0),
    ("Gabon", 0.02, 2.0),
    ("Mozambique", 0.02, 33.0),
    ("Benin", 0.02, 14.0),
    ("Burkina Faso", 0.02, 23.0),
    ("Madagascar", 0.02, 30.0),
    ("Mongolia", 0.02, 3.0),
    ("Nicaragua", 0.02, 7.0),
    ("Armenia", 0.02, 3.0),
    ("Malta", 0.02, 0.5),
    ("North Macedonia", 0.02, 2.0),
    ("Macedonia", 0.02, 2.0),
    ("Brunei Darussalam", 0.02, 0.5),
    ("Bahamas", 0.01, 0.4),
    ("Guinea", 0.02, 14.0),
    ("Rwanda", 0.01, 14.0),
    ("Chad", 0.01, 18.0),
    ("Laos", 0.02, 8.0),
    ("Namibia", 0.01, 3.0),
    ("Tajikistan", 0.01, 10.0),
    ("Malawi", 0.01, 20.0),
    ("Mauritius", 0.02, 1.0),
    ("Moldova", 0.02, 3.0),
    ("Kosovo", 0.01, 2.0),
    ("Niger", 0.02, 27.0),
    ("Kyrgyzstan", 0.01, 7.0),
    ("Maldives", 0.01, 0.5),
    ("Haiti", 0.02, 12.0),
    ("Equatorial Guinea", 0.01, 2.0),
    ("Montenegro", 0.01, 0.6),
    ("Barbados", 0.01, 0.3),
    ("Fiji", 0.01, 0.9),
    ("Eswatini", 0.01, 1.0),
    ("Mauritania", 0.01, 5.0),
    ("Guyana", 0.02, 0.8),
    ("Togo", 0.01, 9.0),
    ("Sierra Leone", 0.01, 9.0),
    ("Suriname", 0.004, 0.6),
    ("South Sudan", 0.01, 11.0),
    ("Monaco", 0.008, 0.04),
    ("Bhutan", 0.003, 0.8),
    ("Liechtenstein", 0.007, 0.04),
    ("Central African Republic", 0.003, 5.0),
    ("Lesotho", 0.003, 2.0),
    ("Liberia", 0.004, 5.0),
    ("Cabo Verde", 0.002, 0.6),
    ("Belize", 0.003, 0.4),
    ("Djibouti", 0.004, 1.0),
    ("Timor Leste", 0.003, 1.0),
    ("Andorra", 0.004, 0.08),
    ("Saint Lucia", 0.002, 0.2),
    ("Antigua And Barbuda", 0.002, 0.1),
    ("Seychelles", 0.002, 0.1),
    ("Solomon Islands", 0.002, 0.7),
    ("Guinea Bissau", 0.002, 2.0),
    ("Grenada", 0.001, 0.1),
    ("Saint Kitts And Nevis", 0.001, 0.05),
    ("Gambia", 0.002, 3.0),
    ("Vanuatu", 0.001, 0.3),
    ("Samoa", 0.001, 0.2),
    ("Saint Vincent And The Grenadines", 0.001, 0.1),
    ("Comoros", 0.001, 0.9),
    ("Dominica", 0.001, 0.07),
    ("Tonga", 0.0005, 0.1),
    ("Sao Tome And Principe", 0.0006, 0.2),
    ("Micronesia", 0.0004, 0.1),
    ("Palau", 0.0003, 0.02),
    ("Marshall Islands", 0.0003, 0.04),
    ("Kiribati", 0.0003, 0.1),
    ("Nauru", 0.0002, 0.01),
    ("Tuvalu", 0.0001, 0.01),
    ("San Marino", 0.002, 0.03),
    ("Vatican", 0.0001, 0.0008),
    ("Nigeria", 0.47, 223.0),
    ("Pakistan", 0.34, 235.0),
    ("Iran", 0.39, 89.0),
    ("Venezuela", 0.10, 29.0),
    ("Sri Lanka", 0.08, 22.0),
    ("Lebanon", 0.02, 5.0),
    ("Syria", 0.01, 22.0),
    ("Yemen", 0.02, 34.0),
    ("Cuba", 0.11, 11.0),
    ("North Korea", 0.02, 26.0),
    ("Sudan", 0.03, 48.0),
    ("Somalia", 0.01, 18.0),
    ("Eritrea", 0.003, 4.0),
    ("Burundi", 0.003, 13.0),
    ("Republic of the Congo", 0.01, 6.0),
    ("Curacao", 0.003, 0.15),
    ("Bermuda", 0.007, 0.06),
    ("Cayman Islands", 0.006, 0.07),
    ("Palestine", 0.02, 5.0),
    ("European Union", 18.0, 450.0),
];

/// Short labels for names that do not fit a matrix header
const COUNTRY_SHORT_NAMES: &[(&str, &str)] = &[
    ("Bosnia And Herzegovina", "Bosnia"),
    ("Central African Republic", "CAR"),
    ("Democratic Republic Of Congo", "DRC"),
    ("Republic of the Congo", "Congo"),
    ("Saint Kitts And Nevis", "St. Kitts"),
    ("Saint Vincent And The Grenadines", "St. Vincent"),
    ("Sao Tome And Principe", "São Tomé"),
    ("United Arab Emirates", "UAE"),
    ("United States", "USA"),
    ("United Kingdom", "UK"),
    ("Dominican Republic", "Dom. Republic"),
    ("Papua New Guinea", "PNG"),
    ("Trinidad And Tobago", "Trinidad"),
    ("Antigua And Barbuda", "Antigua"),
    ("Equatorial Guinea", "Eq. Guinea"),
    ("Brunei Darussalam", "Brunei"),
];

static WEIGHT_INDEX: OnceLock<HashMap<&'static str, EconomicWeight>> = OnceLock::new();
static SHORT_NAME_INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn weight_index() -> &'static HashMap<&'static str, EconomicWeight> {
    WEIGHT_INDEX.get_or_init(|| {
        COUNTRY_WEIGHTS
            .iter()
            .map(|&(name, gdp, pop)| (name, EconomicWeight::new(gdp, pop)))
            .collect()
    })
}

/// Look up a country's weight by exact name
pub fn country_weight(country_name: &str) -> Option<EconomicWeight> {
    weight_index().get(country_name).copied()
}

/// Number of entries in the reference table
pub fn table_len() -> usize {
    weight_index().len()
}

/// Expected coverage = gdp^0.75 * population^0.25
///
/// Non-positive or non-finite inputs are replaced by small positive floors, so
/// the result is always finite and strictly positive.
pub fn expected_coverage(gdp_trillions: f64, population_millions: f64) -> f64 {
    let gdp = if gdp_trillions.is_finite() && gdp_trillions > 0.0 {
        gdp_trillions
    } else {
        MIN_GDP_TRILLIONS
    };
    let population = if population_millions.is_finite() && population_millions > 0.0 {
        population_millions
    } else {
        MIN_POPULATION_MILLIONS
    };
    gdp.powf(GDP_EXPONENT) * population.powf(POPULATION_EXPONENT)
}

/// Expected coverage used for ordering; unknown countries rank as the floor weight
pub fn sort_weight(country_name: &str) -> f64 {
    country_weight(country_name)
        .unwrap_or(EconomicWeight::UNKNOWN)
        .expected_coverage()
}

/// Shortened display name, or the name itself
pub fn country_display_name(country_name: &str) -> String {
    let index = SHORT_NAME_INDEX.get_or_init(|| COUNTRY_SHORT_NAMES.iter().copied().collect());
    index
        .get(country_name)
        .map(|s| s.to_string())
        .unwrap_or_else(|| country_name.to_string())
}
