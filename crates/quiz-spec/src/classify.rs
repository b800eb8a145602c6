//! Rule-based hair-profile classification.
//!
//! The damage score is the sum of three signals:
//!
//! | signal                                              | points |
//! |-----------------------------------------------------|--------|
//! | main concern is `damage` or `breakage`              | 2      |
//! | treatments include `color`, `bleach` or `chemical`  | 2      |
//! | heat styling is `daily`                             | 1      |
//!
//! `bleach` scores like `color` and `chemical`: it is chemical processing even
//! though older clients only listed the other two labels.
//!
//! A score of 4 or more is severe, 2 or more moderate, 1 mild, 0 minimal.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::answers::AnswerStore;
use crate::builtin::ids;

pub const CONFIDENCE: f64 = 0.92;

const BRAND: &str = "Professional Grade";
const CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HairType {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Porosity {
    Low,
    Normal,
    High,
}

impl Porosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Porosity::Low => "low",
            Porosity::Normal => "normal",
            Porosity::High => "high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Porosity::Low => "Low porosity - hair cuticles are tightly closed",
            Porosity::Normal => "Normal porosity - healthy moisture balance",
            Porosity::High => "High porosity - hair absorbs moisture quickly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScalpType {
    Oily,
    Dry,
    Normal,
}

impl ScalpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalpType::Oily => "oily",
            ScalpType::Dry => "dry",
            ScalpType::Normal => "normal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScalpType::Oily => "Oily scalp - produces excess sebum",
            ScalpType::Dry => "Dry scalp - needs extra moisture",
            ScalpType::Normal => "Normal scalp - well-balanced oil production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DamageLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl DamageLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            4.. => DamageLevel::Severe,
            2..=3 => DamageLevel::Moderate,
            1 => DamageLevel::Mild,
            0 => DamageLevel::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageLevel::Minimal => "minimal",
            DamageLevel::Mild => "mild",
            DamageLevel::Moderate => "moderate",
            DamageLevel::Severe => "severe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DamageLevel::Minimal => "Minimal damage - hair is in great condition",
            DamageLevel::Mild => "Mild damage - some wear but generally healthy",
            DamageLevel::Moderate => "Moderate damage - needs targeted repair",
            DamageLevel::Severe => "Severe damage - requires intensive treatment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductRecommendations {
    pub shampoo: Vec<Product>,
    pub conditioner: Vec<Product>,
    pub treatment: Vec<Product>,
}

/// Derived profile; never mutated once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HairProfile {
    pub hair_type: HairType,
    pub porosity: Porosity,
    pub scalp_type: ScalpType,
    pub damage_level: DamageLevel,
    pub damage_score: u8,
    pub wash_frequency: String,
    pub advice: String,
    pub recommended_products: ProductRecommendations,
    pub confidence: f64,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Texture {
    Straight,
    Wavy,
    Curly,
    Coily,
}

impl Texture {
    fn from_answers(answers: &AnswerStore) -> Self {
        match answers.text(ids::HAIR_TEXTURE) {
            Some("wavy") => Texture::Wavy,
            Some("curly") => Texture::Curly,
            Some("coily") => Texture::Coily,
            _ => Texture::Straight,
        }
    }

    fn hair_type(&self) -> HairType {
        let (code, description) = match self {
            Texture::Straight => ("1", "Straight hair - naturally lies flat"),
            Texture::Wavy => ("2", "Wavy hair - natural wave pattern"),
            Texture::Curly => ("3", "Curly hair - defined curl pattern"),
            Texture::Coily => ("4", "Coily hair - tight curl pattern"),
        };
        HairType {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

/// Maps a set of answers to a hair profile. Identical inputs give identical output.
pub fn classify(answers: &AnswerStore, created_at: OffsetDateTime) -> HairProfile {
    let texture = Texture::from_answers(answers);
    let hair_type = texture.hair_type();
    let porosity = classify_porosity(answers);
    let scalp_type = classify_scalp(answers);
    let damage_score = damage_score(answers);
    let damage_level = DamageLevel::from_score(damage_score);

    HairProfile {
        advice: advice(&hair_type, porosity, scalp_type, damage_level),
        wash_frequency: wash_frequency(texture, scalp_type).to_string(),
        recommended_products: recommend_products(&hair_type, porosity, scalp_type, damage_level),
        hair_type,
        porosity,
        scalp_type,
        damage_level,
        damage_score,
        confidence: CONFIDENCE,
        created_at,
    }
}

pub fn classify_porosity(answers: &AnswerStore) -> Porosity {
    match answers.text(ids::HAIR_POROSITY) {
        Some("floats") => Porosity::Low,
        Some("sinks quickly") => Porosity::High,
        _ => Porosity::Normal,
    }
}

pub fn classify_scalp(answers: &AnswerStore) -> ScalpType {
    let concern = answers.text(ids::HAIR_CONCERN);
    let feel = answers.text(ids::SCALP_FEEL);
    let wash = answers.text(ids::WASH_FREQUENCY);

    if concern == Some("oiliness") || feel == Some("oily") || wash == Some("daily") {
        ScalpType::Oily
    } else if concern == Some("dryness") || feel == Some("dry") {
        ScalpType::Dry
    } else {
        ScalpType::Normal
    }
}

pub fn damage_score(answers: &AnswerStore) -> u8 {
    let mut score = 0;
    if matches!(answers.text(ids::HAIR_CONCERN), Some("damage" | "breakage")) {
        score += 2;
    }
    if ["color", "bleach", "chemical"]
        .iter()
        .any(|label| answers.contains(ids::CHEMICAL_TREATMENTS, label))
    {
        score += 2;
    }
    if answers.text(ids::HEAT_STYLING) == Some("daily") {
        score += 1;
    }
    score
}

fn wash_frequency(texture: Texture, scalp: ScalpType) -> &'static str {
    if scalp == ScalpType::Oily {
        "Every day or every other day"
    } else if texture == Texture::Coily {
        "Once or twice per week"
    } else {
        "2-3 times per week"
    }
}

fn advice(
    hair_type: &HairType,
    porosity: Porosity,
    scalp: ScalpType,
    damage: DamageLevel,
) -> String {
    let mut advice = format!(
        "Based on your {} with {} porosity, here's your personalized care routine:\n\n",
        hair_type.description.to_lowercase(),
        porosity.as_str()
    );

    advice.push_str(match porosity {
        Porosity::Low => {
            "• Use lightweight, water-based products\n\
             • Apply gentle heat when conditioning to open the cuticle\n\
             • Avoid heavy oils and butters\n"
        }
        Porosity::High => {
            "• Use protein treatments monthly\n\
             • Apply leave-in conditioner to damp hair\n\
             • Seal in moisture with heavier creams and oils\n"
        }
        Porosity::Normal => {
            "• Keep a balance with regular conditioning\n\
             • Mix light and medium weight products\n\
             • Deep condition weekly\n"
        }
    });

    match damage {
        DamageLevel::Severe => advice.push_str(
            "\n• Focus on intensive repair treatments\n\
             • Keep heat styling to a minimum\n\
             • Use protein treatments weekly\n",
        ),
        DamageLevel::Moderate | DamageLevel::Mild => advice.push_str(
            "\n• Use protective products before styling\n\
             • Trim every 6-8 weeks\n\
             • Add a deep conditioning treatment to your routine\n",
        ),
        DamageLevel::Minimal => {}
    }

    advice.push_str(match scalp {
        ScalpType::Oily => "\n• Keep conditioner on mid-lengths and ends, away from the scalp\n",
        ScalpType::Dry => "\n• Massage a light oil into the scalp before washing\n",
        ScalpType::Normal => "\n• Your scalp is well balanced, keep your current cleansing rhythm\n",
    });

    advice
}

fn recommend_products(
    hair_type: &HairType,
    porosity: Porosity,
    scalp: ScalpType,
    damage: DamageLevel,
) -> ProductRecommendations {
    let shampoo = match scalp {
        ScalpType::Oily => "Clarifying Balance Shampoo",
        ScalpType::Dry => "Hydrating Cream Shampoo",
        ScalpType::Normal => "Gentle Cleansing Shampoo",
    };
    let conditioner = match porosity {
        Porosity::Low => "Lightweight Moisture Conditioner",
        Porosity::Normal => "Moisture Balance Conditioner",
        Porosity::High => "Rich Repair Conditioner",
    };
    let treatment = match damage {
        DamageLevel::Severe => "Intensive Repair Mask",
        _ => "Weekly Deep Treatment",
    };

    ProductRecommendations {
        shampoo: vec![product(
            shampoo,
            format!(
                "Ideal for your {} and {} scalp",
                hair_type.description.to_lowercase(),
                scalp.as_str()
            ),
            24.99,
        )],
        conditioner: vec![product(
            conditioner,
            format!("Hydration matched to {} porosity", porosity.as_str()),
            26.99,
        )],
        treatment: vec![product(
            treatment,
            format!("Targeted care for {} damage", damage.as_str()),
            32.99,
        )],
    }
}

fn product(name: &str, description: String, price: f64) -> Product {
    Product {
        name: name.to_string(),
        brand: BRAND.to_string(),
        description,
        price,
        currency: CURRENCY.to_string(),
    }
}
